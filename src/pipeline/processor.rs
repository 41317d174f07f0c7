// src/pipeline/processor.rs

//! Implements the [`Processor`] stage and the [`EventTransform`] trait.
//!
//! A `Processor` receives events from its upstream queue, applies its
//! transform to each, and sends the results to its downstream queue.

use crate::data::event::Event;
use crate::pipeline::queue::{EventReceiver, EventSender};
use crate::pipeline::stage::{send, Listener, ResultWorker, Stage, StageCore, StageError, StageFault, StageState};

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EventTransform
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A failure of the transform itself, not of the data it was given.
/// Stops the [`Processor`].
///
/// Per-line data faults must not be returned as a `TransformError`; a
/// transform turns them into `Fault` events.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransformError {
    message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> TransformError {
        TransformError {
            message: message.into(),
        }
    }

    #[inline(always)]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransformError {}

/// Result of transforming one event; zero or more events to send
/// downstream.
pub type ResultTransform = Result<Vec<Event>, TransformError>;

/// Per-event logic of a [`Processor`].
///
/// `transform` is also called with the `EndOfStream` event. If the
/// returned events do not include an `EndOfStream` then the `Processor`
/// sends one. Events returned after an `EndOfStream` are dropped.
pub trait EventTransform: Send {
    fn transform(
        &mut self,
        event: Event,
    ) -> ResultTransform;
}

impl<F> EventTransform for F
where
    F: FnMut(Event) -> ResultTransform + Send,
{
    fn transform(
        &mut self,
        event: Event,
    ) -> ResultTransform {
        self(event)
    }
}

pub type EventTransformBox = Box<dyn EventTransform>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Processor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A stage applying an [`EventTransform`] to each event.
pub struct Processor {
    core: StageCore,
    input: Option<EventReceiver>,
    transform: Option<EventTransformBox>,
    output: Option<EventSender>,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Processor")
            .field("core", &self.core)
            .field("input", &self.input.is_some())
            .field("transform", &self.transform.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}

impl Processor {
    pub fn new(name: impl Into<String>) -> Processor {
        Processor {
            core: StageCore::new(name),
            input: None,
            transform: None,
            output: None,
        }
    }

    pub fn with_input(
        mut self,
        input: EventReceiver,
    ) -> Processor {
        self.input = Some(input);

        self
    }

    pub fn with_transform(
        mut self,
        transform: EventTransformBox,
    ) -> Processor {
        self.transform = Some(transform);

        self
    }

    pub fn with_output(
        mut self,
        output: EventSender,
    ) -> Processor {
        self.output = Some(output);

        self
    }
}

/// Worker body of a [`Processor`].
fn exec_processor(
    input: EventReceiver,
    mut transform: EventTransformBox,
    output: EventSender,
) -> ResultWorker {
    defn!();
    let mut count_in: u64 = 0;
    loop {
        let event: Event = match input.recv() {
            Ok(val) => val,
            Err(_) => {
                // all senders are gone without an `EndOfStream`
                defo!("upstream disconnected");
                Event::EndOfStream
            }
        };
        count_in += 1;
        let is_end: bool = event.is_end_of_stream();
        let events: Vec<Event> = transform
            .transform(event)
            .map_err(StageFault::Transform)?;
        let mut sent_end: bool = false;
        for event_out in events.into_iter() {
            sent_end = event_out.is_end_of_stream();
            send(&output, event_out)?;
            if sent_end {
                break;
            }
        }
        if is_end && !sent_end {
            defo!("synthesize EndOfStream");
            send(&output, Event::EndOfStream)?;
            sent_end = true;
        }
        if sent_end {
            break;
        }
    }
    defx!("processed {} events", count_in);

    Ok(())
}

impl Stage for Processor {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn state(&self) -> StageState {
        self.core.state()
    }

    fn start(&mut self) -> Result<(), StageError> {
        if !self.core.is_idle() {
            return Ok(());
        }
        let (input, transform, output) = match (self.input.take(), self.transform.take(), self.output.take()) {
            (Some(i), Some(t), Some(o)) => (i, t, o),
            (input, transform, output) => {
                let what: &'static str = match (input.is_none(), transform.is_none()) {
                    (true, _) => "input queue",
                    (false, true) => "transform",
                    (false, false) => "output queue",
                };
                self.input = input;
                self.transform = transform;
                self.output = output;
                return Err(self.core.missing(what));
            }
        };
        let downstream: EventSender = output.clone();

        self.core
            .spawn(Some(downstream), move || exec_processor(input, transform, output))
    }

    fn on_end_of_stream(
        &mut self,
        listener: Listener,
    ) {
        self.core.on_end_of_stream(listener)
    }

    fn join(&mut self) -> Result<(), StageError> {
        self.core.join()
    }
}
