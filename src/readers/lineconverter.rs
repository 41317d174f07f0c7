// src/readers/lineconverter.rs

//! Implements a [`LineConverter`], the byte to [`Line`] state machine.
//!
//! [`Line`]: crate::data::event::Event::Line

use crate::common::{Count, LineNumber, CRu8, NLu8};
use crate::data::event::Event;

use std::collections::vec_deque::Drain;
use std::collections::VecDeque;
use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ConverterError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Misuse of a [`LineConverter`] by the caller. These are not data faults.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConverterError {
    /// Input after the end-of-stream value was processed.
    Closed,
    /// A value outside of `-1..=255`.
    OutOfRange(i32),
}

impl fmt::Display for ConverterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConverterError::Closed => write!(f, "line converter is closed"),
            ConverterError::OutOfRange(value) => {
                write!(f, "value {} is not a byte or the end-of-stream value {}", value, END_OF_STREAM)
            }
        }
    }
}

impl std::error::Error for ConverterError {}

pub type ResultConverter = Result<(), ConverterError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineConverter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The value passed to [`LineConverter::process`] at the end of the byte
/// stream.
pub const END_OF_STREAM: i32 = -1;

/// Turns a stream of bytes into `Line` events.
///
/// Bytes are fed one at a time. After each byte the caller drains the
/// events produced so far with [`drain`].
///
/// * `'\n'` ends the current line, even an empty one
/// * `'\r'` is always dropped; a lone `'\r'` is not a line terminator
/// * the end of the stream flushes a non-empty buffer as the last line,
///   then produces exactly one `EndOfStream`
///
/// Each byte is one `char` (Latin-1).
///
/// [`drain`]: LineConverter::drain
#[derive(Debug)]
pub struct LineConverter {
    /// Text of the current line.
    buffer: String,
    /// Number of the current line, 1-based.
    line_number: LineNumber,
    /// Events produced and not yet drained.
    events: VecDeque<Event>,
    closed: bool,
    /// Count of bytes processed.
    count_bytes: Count,
    /// Count of `Line` events produced.
    count_lines: Count,
}

impl Default for LineConverter {
    fn default() -> Self {
        LineConverter::new()
    }
}

impl LineConverter {
    pub fn new() -> LineConverter {
        LineConverter {
            buffer: String::with_capacity(256),
            line_number: 1,
            events: VecDeque::with_capacity(2),
            closed: false,
            count_bytes: 0,
            count_lines: 0,
        }
    }

    /// Process one byte value, or [`END_OF_STREAM`].
    pub fn process(
        &mut self,
        value: i32,
    ) -> ResultConverter {
        match value {
            END_OF_STREAM => self.process_eos(),
            0..=255 => self.process_u8(value as u8),
            _ => Err(ConverterError::OutOfRange(value)),
        }
    }

    /// Process one byte.
    pub fn process_u8(
        &mut self,
        byte: u8,
    ) -> ResultConverter {
        if self.closed {
            return Err(ConverterError::Closed);
        }
        self.count_bytes += 1;
        match byte {
            NLu8 => self.flush_line(),
            CRu8 => {}
            _ => self.buffer.push(char::from(byte)),
        }

        Ok(())
    }

    /// Process the end of the byte stream. The converter is then closed.
    pub fn process_eos(&mut self) -> ResultConverter {
        if self.closed {
            return Err(ConverterError::Closed);
        }
        defn!("line_number {}, buffer len {}", self.line_number, self.buffer.len());
        if !self.buffer.is_empty() {
            self.flush_line();
        }
        self.events.push_back(Event::EndOfStream);
        self.closed = true;
        defx!("closed after {} bytes, {} lines", self.count_bytes, self.count_lines);

        Ok(())
    }

    fn flush_line(&mut self) {
        let text: String = std::mem::replace(&mut self.buffer, String::with_capacity(256));
        self.events.push_back(Event::line(self.line_number, text));
        self.line_number += 1;
        self.count_lines += 1;
    }

    /// Take the events produced so far, oldest first.
    pub fn drain(&mut self) -> Drain<'_, Event> {
        self.events.drain(..)
    }

    #[inline(always)]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number the next line will have.
    #[inline(always)]
    pub const fn line_number(&self) -> LineNumber {
        self.line_number
    }

    #[inline(always)]
    pub const fn count_bytes(&self) -> Count {
        self.count_bytes
    }

    #[inline(always)]
    pub const fn count_lines(&self) -> Count {
        self.count_lines
    }
}
