// src/pipeline/terminator.rs

//! Implements the [`Terminator`] stage and the [`EventSink`] trait.

use crate::data::event::Event;
use crate::pipeline::queue::EventReceiver;
use crate::pipeline::stage::{Listener, ResultWorker, Stage, StageCore, StageError, StageFault, StageState};

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EventSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The final side effect of a pipeline.
///
/// `write_event` is called for every event in order, ending with exactly
/// one `EndOfStream`. Then `finish` is called once.
pub trait EventSink: Send {
    fn write_event(
        &mut self,
        event: Event,
    ) -> io::Result<()>;

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub type EventSinkBox = Box<dyn EventSink>;

/// Shared list of the events collected by a [`CollectingSink`].
pub type CollectedEventsP = Arc<Mutex<Vec<Event>>>;

/// An [`EventSink`] storing every event.
///
/// Get the shared list with [`events`] before moving the sink into a
/// [`Terminator`].
///
/// [`events`]: CollectingSink::events
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: CollectedEventsP,
    finished: Arc<Mutex<bool>>,
}

impl CollectingSink {
    pub fn new() -> CollectingSink {
        CollectingSink::default()
    }

    pub fn events(&self) -> CollectedEventsP {
        self.events.clone()
    }

    /// Shared flag, set by `finish`.
    pub fn finished(&self) -> Arc<Mutex<bool>> {
        self.finished.clone()
    }
}

impl EventSink for CollectingSink {
    fn write_event(
        &mut self,
        event: Event,
    ) -> io::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);

        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        *self
            .finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;

        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Terminator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A stage handing each event to an [`EventSink`].
pub struct Terminator {
    core: StageCore,
    input: Option<EventReceiver>,
    sink: Option<EventSinkBox>,
}

impl fmt::Debug for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Terminator")
            .field("core", &self.core)
            .field("input", &self.input.is_some())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Terminator {
    pub fn new(name: impl Into<String>) -> Terminator {
        Terminator {
            core: StageCore::new(name),
            input: None,
            sink: None,
        }
    }

    pub fn with_input(
        mut self,
        input: EventReceiver,
    ) -> Terminator {
        self.input = Some(input);

        self
    }

    pub fn with_sink(
        mut self,
        sink: EventSinkBox,
    ) -> Terminator {
        self.sink = Some(sink);

        self
    }
}

/// Worker body of a [`Terminator`].
fn exec_terminator(
    input: EventReceiver,
    mut sink: EventSinkBox,
) -> ResultWorker {
    defn!();
    let mut count: u64 = 0;
    loop {
        let event: Event = match input.recv() {
            Ok(val) => val,
            Err(_) => {
                defo!("upstream disconnected");
                Event::EndOfStream
            }
        };
        count += 1;
        let is_end: bool = event.is_end_of_stream();
        sink.write_event(event)
            .map_err(StageFault::Sink)?;
        if is_end {
            break;
        }
    }
    sink.finish()
        .map_err(StageFault::Sink)?;
    defx!("wrote {} events", count);

    Ok(())
}

impl Stage for Terminator {
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
        let (input, sink) = match (self.input.take(), self.sink.take()) {
            (Some(i), Some(s)) => (i, s),
            (input, sink) => {
                let what: &'static str = if input.is_none() { "input queue" } else { "sink" };
                self.input = input;
                self.sink = sink;
                return Err(self.core.missing(what));
            }
        };

        self.core
            .spawn(None, move || exec_terminator(input, sink))
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
