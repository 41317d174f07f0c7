// src/pipeline/mod.rs

//! The concurrent event pipeline of _logpipelib_.
//!
//! ## Overview of the pipeline
//!
//! ```text
//! Initiator → queue → Processor → queue → … → Processor → queue → Terminator
//! ```
//!
//! * An [`Initiator`] reads a byte source and sends `Line` events.
//! * A [`Processor`] applies an [`EventTransform`] to each event, e.g. a
//!   [`LineParsingTransform`].
//! * A [`Terminator`] hands each event to an [`EventSink`], e.g. a
//!   [`PrinterEvent`].
//!
//! Each stage runs on its own thread. Each queue is bounded; a full queue
//! blocks its sender. `EndOfStream` is the last event on every queue.
//!
//! [`Initiator`]: crate::pipeline::initiator::Initiator
//! [`Processor`]: crate::pipeline::processor::Processor
//! [`Terminator`]: crate::pipeline::terminator::Terminator
//! [`EventTransform`]: crate::pipeline::processor::EventTransform
//! [`EventSink`]: crate::pipeline::terminator::EventSink
//! [`LineParsingTransform`]: crate::pipeline::transforms::LineParsingTransform
//! [`PrinterEvent`]: crate::printer::printers::PrinterEvent

pub mod initiator;
pub mod processor;
pub mod queue;
pub mod stage;
pub mod terminator;
pub mod transforms;

use crate::pipeline::initiator::{Initiator, SourceBox};
use crate::pipeline::processor::{EventTransformBox, Processor};
use crate::pipeline::queue::{queue, EventReceiver, EventSender};
use crate::pipeline::stage::{Listener, Stage, StageError};
use crate::pipeline::terminator::{EventSinkBox, Terminator};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Name of the [`Initiator`] of a [`Pipeline`].
pub const INITIATOR_NAME: &str = "initiator";

/// Name of the [`Terminator`] of a [`Pipeline`].
pub const TERMINATOR_NAME: &str = "terminator";

/// A wired chain of stages: one [`Initiator`], one [`Processor`] per
/// transform, and one [`Terminator`].
#[derive(Debug)]
pub struct Pipeline {
    initiator: Initiator,
    processors: Vec<Processor>,
    terminator: Terminator,
}

impl Pipeline {
    /// Wire `source` through each of `transforms`, in order, to `sink`.
    /// Every queue holds at most `capacity` events.
    pub fn new(
        source: SourceBox,
        transforms: Vec<EventTransformBox>,
        sink: EventSinkBox,
        capacity: usize,
    ) -> Pipeline {
        defn!("{} transforms, capacity {}", transforms.len(), capacity);
        let (tx, mut rx): (EventSender, EventReceiver) = queue(capacity);
        let initiator: Initiator = Initiator::new(INITIATOR_NAME)
            .with_source(source)
            .with_output(tx);
        let mut processors: Vec<Processor> = Vec::with_capacity(transforms.len());
        for (i, transform) in transforms.into_iter().enumerate() {
            let (tx_next, rx_next): (EventSender, EventReceiver) = queue(capacity);
            processors.push(
                Processor::new(format!("processor{}", i))
                    .with_input(rx)
                    .with_transform(transform)
                    .with_output(tx_next),
            );
            rx = rx_next;
        }
        let terminator: Terminator = Terminator::new(TERMINATOR_NAME)
            .with_input(rx)
            .with_sink(sink);
        defx!();

        Pipeline {
            initiator,
            processors,
            terminator,
        }
    }

    /// Register `listener` to be called once when the terminator has
    /// written the `EndOfStream`.
    pub fn on_end_of_stream(
        &mut self,
        listener: Listener,
    ) {
        self.terminator
            .on_end_of_stream(listener);
    }

    /// Start every stage, downstream first.
    pub fn start(&mut self) -> Result<(), StageError> {
        defn!();
        self.terminator.start()?;
        for processor in self.processors.iter_mut().rev() {
            processor.start()?;
        }
        self.initiator.start()?;
        defx!();

        Ok(())
    }

    /// Wait for every stage, upstream first. Every stage is joined even if
    /// one fails; the first error is returned.
    pub fn join(&mut self) -> Result<(), StageError> {
        defn!();
        let mut result: Result<(), StageError> = self.initiator.join();
        for processor in self.processors.iter_mut() {
            let r = processor.join();
            if result.is_ok() {
                result = r;
            }
        }
        let r = self.terminator.join();
        if result.is_ok() {
            result = r;
        }
        defx!("{:?}", result);

        result
    }

    /// `start` then `join`.
    pub fn run(&mut self) -> Result<(), StageError> {
        self.start()?;

        self.join()
    }

    pub fn initiator(&self) -> &Initiator {
        &self.initiator
    }

    pub fn processors(&self) -> &[Processor] {
        self.processors.as_slice()
    }

    pub fn terminator(&self) -> &Terminator {
        &self.terminator
    }
}
