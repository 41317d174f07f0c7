// src/parsers/mod.rs

//! Line parsers for _logpipelib_.
//!
//! ## Overview of parsers
//!
//! * A [`LineParserFactory`] selects a [`LineParser`] for a user format
//!   specification by trying each recognizer in order.
//! * A [`LogParser`] parses httpd-like log lines using a compiled
//!   [`LogFormat`]. Unquoted fields that may contain spaces are delimited
//!   by the [micro-parsers].
//! * A [`DelimitedParser`] parses CSV-like lines using a compiled
//!   [`DelimitedFormat`].
//!
//! A `LineParser` turns one line of text into a `Generic` [`Event`] or
//! returns a [`ParsingError`]. It never panics on bad line data.
//!
//! [`Event`]: crate::data::event::Event
//! [`LogFormat`]: crate::data::format::LogFormat
//! [`DelimitedFormat`]: crate::data::format::DelimitedFormat
//! [`LogParser`]: crate::parsers::logparser::LogParser
//! [`DelimitedParser`]: crate::parsers::delimitedparser::DelimitedParser
//! [micro-parsers]: crate::parsers::microparsers

pub mod delimitedparser;
pub mod logparser;
pub mod microparsers;

use crate::common::{LineIndex, LineNumber, ResultS3};
use crate::data::datetime::{utc_offset, FixedOffset};
use crate::data::event::Event;
use crate::data::format::{DelimitedFormat, FormatError, LogFormat, ResultS3Recognize};
use crate::parsers::delimitedparser::DelimitedParser;
use crate::parsers::logparser::LogParser;

use std::fmt;
use std::sync::Arc;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ParsingError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
/// A line of text did not match the expected format.
///
/// Carries the line number and the column where matching failed. Parsers
/// report the column as a count of chars, which is the column in the
/// source line since each source byte is one char.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsingError {
    line_number: LineNumber,
    column: LineIndex,
    message: String,
}

impl ParsingError {
    pub fn new(
        line_number: LineNumber,
        column: LineIndex,
        message: impl Into<String>,
    ) -> ParsingError {
        ParsingError {
            line_number,
            column,
            message: message.into(),
        }
    }

    /// Convert `column` from a byte offset into `text` to a count of chars.
    pub fn into_char_column(
        self,
        text: &str,
    ) -> ParsingError {
        let column: LineIndex = match text.get(..self.column) {
            Some(head) => head.chars().count(),
            None => text
                .char_indices()
                .take_while(|(i, _)| *i < self.column)
                .count(),
        };

        ParsingError { column, ..self }
    }

    #[inline(always)]
    pub const fn line_number(&self) -> LineNumber {
        self.line_number
    }

    #[inline(always)]
    pub const fn column(&self) -> LineIndex {
        self.column
    }

    #[inline(always)]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {} column {}: {}", self.line_number, self.column, self.message)
    }
}

impl std::error::Error for ParsingError {}

/// Result of parsing one line.
pub type ResultParse = Result<Event, ParsingError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineParser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The kinds of [`LineParser`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParserKind {
    /// httpd-like log lines
    Log,
    /// CSV-like delimited lines
    Delimited,
}

/// Turns one line of text into an [`Event`].
///
/// Implementations must be deterministic and free of side-effects; one
/// instance is shared by all lines parsed with it.
pub trait LineParser: fmt::Debug + Send + Sync {
    /// Parse `text`, the line numbered `line_number`, into a `Generic`
    /// event.
    fn parse_line(
        &self,
        line_number: LineNumber,
        text: &str,
    ) -> ResultParse;

    fn kind(&self) -> ParserKind;
}

/// Thread-safe [Atomic Reference Counting pointer] to a [`LineParser`].
///
/// [Atomic Reference Counting pointer]: std::sync::Arc
pub type LineParserP = Arc<dyn LineParser>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineParserFactory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A function that recognizes one kind of format specification.
///
/// * `Found` the specification is this kind and the parser was built
/// * `Done` the specification is not shaped like this kind
/// * `Err` the specification is this kind but is malformed
pub type Recognizer = fn(&str, &FixedOffset) -> ResultS3Recognize<LineParserP>;

/// Recognizer for log-style specifications.
pub fn recognize_log(
    spec: &str,
    tz_offset: &FixedOffset,
) -> ResultS3Recognize<LineParserP> {
    match LogFormat::recognize(spec) {
        ResultS3::Found(logformat) => ResultS3::Found(Arc::new(LogParser::new(logformat, *tz_offset))),
        ResultS3::Done => ResultS3::Done,
        ResultS3::Err(err) => ResultS3::Err(err),
    }
}

/// Recognizer for delimited specifications.
pub fn recognize_delimited(
    spec: &str,
    tz_offset: &FixedOffset,
) -> ResultS3Recognize<LineParserP> {
    match DelimitedFormat::recognize(spec) {
        ResultS3::Found(format) => ResultS3::Found(Arc::new(DelimitedParser::new(format, *tz_offset))),
        ResultS3::Done => ResultS3::Done,
        ResultS3::Err(err) => ResultS3::Err(err),
    }
}

/// The recognizers tried by [`LineParserFactory::resolve`], in order.
pub const RECOGNIZERS: [(ParserKind, Recognizer); 2] = [
    (ParserKind::Log, recognize_log),
    (ParserKind::Delimited, recognize_delimited),
];

/// Selects and builds the [`LineParser`] matching a format specification.
#[derive(Clone, Debug)]
pub struct LineParserFactory {
    /// Timezone offset for timestamps whose pattern has no timezone.
    tz_offset: FixedOffset,
}

impl Default for LineParserFactory {
    fn default() -> Self {
        LineParserFactory::new(utc_offset())
    }
}

impl LineParserFactory {
    pub fn new(tz_offset: FixedOffset) -> LineParserFactory {
        LineParserFactory { tz_offset }
    }

    /// Try each of the [`RECOGNIZERS`] in order, the first match wins.
    ///
    /// Returns `Ok(None)` if no recognizer matched; the caller decides how to
    /// react. Returns `Err` if a recognizer matched but the specification is
    /// malformed; later recognizers are not tried.
    pub fn resolve(
        &self,
        spec: &str,
    ) -> Result<Option<LineParserP>, FormatError> {
        defn!("({:?})", spec);
        for (_kind, recognizer) in RECOGNIZERS.iter() {
            match recognizer(spec, &self.tz_offset) {
                ResultS3::Found(parser) => {
                    defx!("return {:?} parser", _kind);
                    return Ok(Some(parser));
                }
                ResultS3::Done => {
                    defo!("not a {:?} specification", _kind);
                }
                ResultS3::Err(err) => {
                    defx!("{:?} specification is malformed: {}", _kind, err);
                    return Err(err);
                }
            }
        }
        defx!("no known parser");

        Ok(None)
    }
}
