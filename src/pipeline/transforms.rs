// src/pipeline/transforms.rs

//! [`EventTransform`]s provided by _logpipelib_.
//!
//! [`EventTransform`]: crate::pipeline::processor::EventTransform

use crate::common::Count;
use crate::data::event::{Event, FaultEvent};
use crate::parsers::{LineParserP, ParsingError};
use crate::pipeline::processor::{EventTransform, ResultTransform};
use crate::debug::printers::de_wrn;

use std::sync::Arc;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Forwards every event unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughTransform;

impl EventTransform for PassthroughTransform {
    fn transform(
        &mut self,
        event: Event,
    ) -> ResultTransform {
        Ok(vec![event])
    }
}

/// Parses each `Line` event with a [`LineParser`].
///
/// A line that parses becomes a `Generic` event. A line that does not
/// becomes a `Fault` event carrying the [`ParsingError`] location and the
/// error itself as the cause. Other events are forwarded unchanged.
///
/// [`LineParser`]: crate::parsers::LineParser
#[derive(Debug)]
pub struct LineParsingTransform {
    parser: LineParserP,
    count_parsed: Count,
    count_faults: Count,
}

impl LineParsingTransform {
    pub fn new(parser: LineParserP) -> LineParsingTransform {
        LineParsingTransform {
            parser,
            count_parsed: 0,
            count_faults: 0,
        }
    }

    #[inline(always)]
    pub const fn count_parsed(&self) -> Count {
        self.count_parsed
    }

    #[inline(always)]
    pub const fn count_faults(&self) -> Count {
        self.count_faults
    }
}

/// Convert a [`ParsingError`] to a `Fault` event.
pub fn fault_from_parsing_error(err: ParsingError) -> Event {
    let fault = FaultEvent::new(err.message())
        .at(err.line_number(), Some(err.column()))
        .caused_by(Arc::new(err));

    Event::Fault(fault)
}

impl EventTransform for LineParsingTransform {
    fn transform(
        &mut self,
        event: Event,
    ) -> ResultTransform {
        let line = match event {
            Event::Line(line) => line,
            _ => return Ok(vec![event]),
        };
        let event_out: Event = match self
            .parser
            .parse_line(line.line_number(), line.text())
        {
            Ok(val) => {
                self.count_parsed += 1;
                val
            }
            Err(err) => {
                de_wrn!("{}", err);
                self.count_faults += 1;
                fault_from_parsing_error(err)
            }
        };

        Ok(vec![event_out])
    }
}
