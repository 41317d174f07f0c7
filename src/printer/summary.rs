// src/printer/summary.rs

//! Implements `Summary` statistics tracking struct.

use crate::common::{Count, EpochMillis};
use crate::data::event::Event;

use std::fmt;
use std::sync::{Arc, Mutex};

/// Accumulated counts of events seen by a printer.
///
/// For CLI option `--summary`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// `Line` events, not parsed
    pub count_lines: Count,
    /// `Generic` events, parsed lines
    pub count_generic: Count,
    /// `Fault` events
    pub count_faults: Count,
    /// `EndOfStream` events; should be 1
    pub count_end_of_stream: Count,
    /// properties of all `Generic` events
    pub count_properties: Count,
    /// earliest `Generic` event timestamp
    pub timestamp_first: Option<EpochMillis>,
    /// latest `Generic` event timestamp
    pub timestamp_last: Option<EpochMillis>,
}

/// Thread-safe shared [`Summary`].
pub type SummaryP = Arc<Mutex<Summary>>;

impl Summary {
    pub fn update(
        &mut self,
        event: &Event,
    ) {
        match event {
            Event::Line(_) => self.count_lines += 1,
            Event::EndOfStream => self.count_end_of_stream += 1,
            Event::Fault(_) => self.count_faults += 1,
            Event::Generic(generic) => {
                self.count_generic += 1;
                self.count_properties += generic.count_properties() as Count;
                if let Some(ts) = generic.timestamp() {
                    self.timestamp_first = Some(self.timestamp_first.map_or(ts, |t| t.min(ts)));
                    self.timestamp_last = Some(self.timestamp_last.map_or(ts, |t| t.max(ts)));
                }
            }
        }
    }

    /// Count of events derived from lines.
    pub const fn count_line_events(&self) -> Count {
        self.count_lines + self.count_generic + self.count_faults
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  lines unparsed  : {}", self.count_lines)?;
        writeln!(f, "  events parsed   : {}", self.count_generic)?;
        writeln!(f, "  properties      : {}", self.count_properties)?;
        writeln!(f, "  faults          : {}", self.count_faults)?;
        writeln!(f, "  end of stream   : {}", self.count_end_of_stream)?;
        match (self.timestamp_first, self.timestamp_last) {
            (Some(first), Some(last)) => write!(f, "  timestamps (ms) : {} … {}", first, last),
            _ => write!(f, "  timestamps (ms) : none"),
        }
    }
}
