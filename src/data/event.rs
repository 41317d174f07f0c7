// src/data/event.rs

//! Implement [`Event`], the unit of data passed between pipeline stages,
//! and the payloads of its variants.
//!
//! [`Event`]: self::Event

use crate::common::{EpochMillis, LineIndex, LineNumber};
use crate::data::property::{Properties, Property};

use std::error::Error;
use std::fmt;
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineEvent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One line of text read from a byte stream, without the line terminator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineEvent {
    line_number: LineNumber,
    text: String,
}

impl LineEvent {
    pub fn new(
        line_number: LineNumber,
        text: String,
    ) -> LineEvent {
        debug_assert_ne!(line_number, 0, "line numbers are 1-based");

        LineEvent { line_number, text }
    }

    /// 1-based line number.
    #[inline(always)]
    pub const fn line_number(&self) -> LineNumber {
        self.line_number
    }

    #[inline(always)]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FaultEvent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Shared pointer to the error that caused a [`FaultEvent`].
pub type FaultCause = Arc<dyn Error + Send + Sync>;

/// A recoverable processing failure carried as data.
///
/// A `FaultEvent` flows downstream like any other event so that one
/// malformed line does not stop processing of the following lines.
#[derive(Clone)]
pub struct FaultEvent {
    message: String,
    line_number: Option<LineNumber>,
    column: Option<LineIndex>,
    cause: Option<FaultCause>,
}

impl FaultEvent {
    pub fn new(message: impl Into<String>) -> FaultEvent {
        FaultEvent {
            message: message.into(),
            line_number: None,
            column: None,
            cause: None,
        }
    }

    /// Add the location of the fault.
    pub fn at(
        mut self,
        line_number: LineNumber,
        column: Option<LineIndex>,
    ) -> FaultEvent {
        self.line_number = Some(line_number);
        self.column = column;

        self
    }

    /// Add the causing error.
    pub fn caused_by(
        mut self,
        cause: FaultCause,
    ) -> FaultEvent {
        self.cause = Some(cause);

        self
    }

    #[inline(always)]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    #[inline(always)]
    pub const fn line_number(&self) -> Option<LineNumber> {
        self.line_number
    }

    #[inline(always)]
    pub const fn column(&self) -> Option<LineIndex> {
        self.column
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync)> {
        self.cause.as_deref()
    }
}

impl fmt::Debug for FaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FaultEvent")
            .field("message", &self.message)
            .field("line_number", &self.line_number)
            .field("column", &self.column)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl fmt::Display for FaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.line_number, self.column) {
            (Some(ln), Some(col)) => write!(f, "line {} column {}: {}", ln, col, self.message),
            (Some(ln), None) => write!(f, "line {}: {}", ln, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GenericEvent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The result of successfully parsing a line: an ordered, append-only
/// sequence of uniquely named [`Property`] and an optional timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenericEvent {
    line_number: Option<LineNumber>,
    properties: Properties,
    timestamp: Option<EpochMillis>,
}

impl GenericEvent {
    pub fn new(line_number: Option<LineNumber>) -> GenericEvent {
        GenericEvent {
            line_number,
            properties: Properties::new(),
            timestamp: None,
        }
    }

    /// Append `property`.
    ///
    /// Returns `false` and drops `property` if a property of the same name
    /// was already added.
    pub fn add_property(
        &mut self,
        property: Property,
    ) -> bool {
        if self.property(property.name()).is_some() {
            return false;
        }
        self.properties.push(property);

        true
    }

    /// The properties in the order they were added.
    #[inline(always)]
    pub fn properties(&self) -> &[Property] {
        self.properties.as_slice()
    }

    /// The property named `name`, if any.
    pub fn property(
        &self,
        name: &str,
    ) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name() == name)
    }

    /// A copy of the properties sorted by name.
    pub fn properties_sorted(&self) -> Properties {
        let mut properties: Properties = self.properties.clone();
        properties.sort();

        properties
    }

    #[inline(always)]
    pub fn count_properties(&self) -> usize {
        self.properties.len()
    }

    #[inline(always)]
    pub const fn line_number(&self) -> Option<LineNumber> {
        self.line_number
    }

    #[inline(always)]
    pub const fn timestamp(&self) -> Option<EpochMillis> {
        self.timestamp
    }

    pub fn set_timestamp(
        &mut self,
        timestamp: EpochMillis,
    ) {
        self.timestamp = Some(timestamp);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The data passed through the pipeline queues.
///
/// Exactly one `EndOfStream` is the last event read from any queue.
#[derive(Clone, Debug)]
pub enum Event {
    /// A line of text from the byte source.
    Line(LineEvent),
    /// Sentinel, no more events will follow.
    EndOfStream,
    /// A recoverable per-line failure.
    Fault(FaultEvent),
    /// A parsed line.
    Generic(GenericEvent),
}

impl Event {
    /// Create a `Line` event.
    pub fn line(
        line_number: LineNumber,
        text: impl Into<String>,
    ) -> Event {
        Event::Line(LineEvent::new(line_number, text.into()))
    }

    /// Create a `Fault` event with only a message.
    pub fn fault(message: impl Into<String>) -> Event {
        Event::Fault(FaultEvent::new(message))
    }

    #[inline(always)]
    pub const fn is_end_of_stream(&self) -> bool {
        matches!(self, Event::EndOfStream)
    }

    #[inline(always)]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Event::Fault(_))
    }

    /// The originating line number, if the event derives from a line.
    pub const fn line_number(&self) -> Option<LineNumber> {
        match self {
            Event::Line(line) => Some(line.line_number()),
            Event::EndOfStream => None,
            Event::Fault(fault) => fault.line_number(),
            Event::Generic(generic) => generic.line_number(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::Line(line) => write!(f, "Line({}, {:?})", line.line_number(), line.text()),
            Event::EndOfStream => write!(f, "EndOfStream"),
            Event::Fault(fault) => write!(f, "Fault({})", fault),
            Event::Generic(generic) => write!(
                f,
                "Generic(line {:?}, {} properties, timestamp {:?})",
                generic.line_number(),
                generic.count_properties(),
                generic.timestamp()
            ),
        }
    }
}
