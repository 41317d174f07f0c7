// src/pipeline/initiator.rs

//! Implements the [`Initiator`] stage, the head of a pipeline.

use crate::pipeline::queue::EventSender;
use crate::pipeline::stage::{send, Listener, ResultWorker, Stage, StageCore, StageError, StageFault, StageState};
use crate::readers::lineconverter::LineConverter;

use std::fmt;
use std::io::{BufReader, Read};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A byte source read by an [`Initiator`], e.g. a `File` or `Stdin`.
pub type SourceBox = Box<dyn Read + Send>;

/// A stage reading a byte source, converting the bytes to `Line` events
/// with a [`LineConverter`], and sending the events downstream.
///
/// The last event sent is always one `EndOfStream`.
///
/// [`LineConverter`]: crate::readers::lineconverter::LineConverter
pub struct Initiator {
    core: StageCore,
    source: Option<SourceBox>,
    output: Option<EventSender>,
}

impl fmt::Debug for Initiator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Initiator")
            .field("core", &self.core)
            .field("source", &self.source.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}

impl Initiator {
    pub fn new(name: impl Into<String>) -> Initiator {
        Initiator {
            core: StageCore::new(name),
            source: None,
            output: None,
        }
    }

    pub fn with_source(
        mut self,
        source: SourceBox,
    ) -> Initiator {
        self.source = Some(source);

        self
    }

    pub fn with_output(
        mut self,
        output: EventSender,
    ) -> Initiator {
        self.output = Some(output);

        self
    }
}

/// Send every event drained from `converter`.
fn send_drained(
    converter: &mut LineConverter,
    output: &EventSender,
) -> ResultWorker {
    for event in converter.drain() {
        send(output, event)?;
    }

    Ok(())
}

/// Worker body of an [`Initiator`].
fn exec_initiator(
    source: SourceBox,
    output: EventSender,
) -> ResultWorker {
    defn!();
    let mut converter: LineConverter = LineConverter::new();
    for byte in BufReader::new(source).bytes() {
        let byte: u8 = byte.map_err(StageFault::Source)?;
        converter
            .process_u8(byte)
            .map_err(StageFault::Converter)?;
        send_drained(&mut converter, &output)?;
    }
    converter
        .process_eos()
        .map_err(StageFault::Converter)?;
    send_drained(&mut converter, &output)?;
    debug_assert!(converter.is_closed());
    defx!("read {} bytes, {} lines", converter.count_bytes(), converter.count_lines());

    Ok(())
}

impl Stage for Initiator {
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
        let (source, output) = match (self.source.take(), self.output.take()) {
            (Some(s), Some(o)) => (s, o),
            (source, output) => {
                let what: &'static str = if source.is_none() { "source" } else { "output queue" };
                self.source = source;
                self.output = output;
                return Err(self.core.missing(what));
            }
        };
        let downstream: EventSender = output.clone();

        self.core
            .spawn(Some(downstream), move || exec_initiator(source, output))
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
