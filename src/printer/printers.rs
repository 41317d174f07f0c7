// src/printer/printers.rs

//! Specialized printer struct [`PrinterEvent`], an [`EventSink`] printing
//! [`Event`s] as text with optional color.
//!
//! [`EventSink`]: crate::pipeline::terminator::EventSink
//! [`Event`s]: crate::data::event::Event

use crate::data::event::{Event, FaultEvent, GenericEvent};
use crate::debug::printers::de_err;
use crate::pipeline::terminator::EventSink;
use crate::printer::summary::{Summary, SummaryP};

use std::io::{Result, Write};
use std::sync::PoisonError;

#[doc(hidden)]
pub use ::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Color`] for printing property values and line text.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_DEFAULT: Color = Color::White;

/// [`Color`] for printing property names.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_NAME: Color = Color::Cyan;

/// [`Color`] for printing `Fault` events.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_ERROR: Color = Color::Red;

/// Separator between printed properties.
pub const PROPERTY_SEPARATOR: &str = "\t";

/// Prefix of a printed `Fault` event.
pub const FAULT_PREFIX: &str = "FAULT: ";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PrinterEvent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A printer of [`Event`]s, one per line.
///
/// * `Line` events print their text
/// * `Generic` events print `name=value` for each property, separated by
///   tabs; a null property prints `name=`
/// * `Fault` events print `FAULT: ` and the fault in red
/// * `EndOfStream` prints nothing
///
/// Every event is counted in a shared [`Summary`].
///
/// [`Event`]: crate::data::event::Event
pub struct PrinterEvent<W: WriteColor> {
    writer: W,
    /// should printing be in color?
    do_color: bool,
    color_spec_default: ColorSpec,
    color_spec_name: ColorSpec,
    color_spec_error: ColorSpec,
    /// last value passed to `self.writer.set_color()`
    ///
    /// used by macro `setcolor_or_return`
    color_spec_last: ColorSpec,
    summary: SummaryP,
}

/// Macro that sets output color, only changed if needed and if
/// `self.do_color`.
///
/// Unnecessary changes to `set_color` may cause errant formatting bytes to
/// print to the terminal.
macro_rules! setcolor_or_return {
    ($self:expr, $color_spec:expr) => {
        if $self.do_color && $color_spec != $self.color_spec_last {
            if let Err(err) = $self.writer.set_color(&$color_spec) {
                de_err!("writer.set_color({:?}) returned error {}", $color_spec, err);
                return Err(err);
            };
            $self.color_spec_last = $color_spec.clone();
        }
    };
}

/// Macro to write to the writer. If there is an error then return it.
macro_rules! write_or_return {
    ($self:expr, $str_:expr) => {
        if let Err(err) = $self.writer.write_all($str_.as_bytes()) {
            // XXX: this will print when this program stdout is truncated, like when piping
            //      to `head`, e.g. `logpipe -f … file.log | head`
            //          Broken pipe (os error 32)
            de_err!("writer.write_all(len {}) error {}", $str_.len(), err);
            return Err(err);
        }
    };
}

impl PrinterEvent<StandardStream> {
    /// Create a `PrinterEvent` writing to stdout.
    pub fn stdout(color_choice: ColorChoice) -> PrinterEvent<StandardStream> {
        let do_color: bool = match color_choice {
            ColorChoice::Never => false,
            ColorChoice::Always | ColorChoice::AlwaysAnsi | ColorChoice::Auto => true,
        };

        PrinterEvent::new(StandardStream::stdout(color_choice), do_color)
    }
}

impl<W: WriteColor> PrinterEvent<W> {
    pub fn new(
        writer: W,
        do_color: bool,
    ) -> PrinterEvent<W> {
        let mut color_spec_default: ColorSpec = ColorSpec::new();
        color_spec_default.set_fg(Some(COLOR_DEFAULT));
        let mut color_spec_name: ColorSpec = ColorSpec::new();
        color_spec_name.set_fg(Some(COLOR_NAME));
        let mut color_spec_error: ColorSpec = ColorSpec::new();
        color_spec_error.set_fg(Some(COLOR_ERROR));
        let color_spec_last: ColorSpec = ColorSpec::new();

        PrinterEvent {
            writer,
            do_color,
            color_spec_default,
            color_spec_name,
            color_spec_error,
            color_spec_last,
            summary: SummaryP::default(),
        }
    }

    /// The shared [`Summary`] of printed events.
    pub fn summary(&self) -> SummaryP {
        self.summary.clone()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn print_line(
        &mut self,
        text: &str,
    ) -> Result<()> {
        setcolor_or_return!(self, self.color_spec_default);
        write_or_return!(self, text);
        write_or_return!(self, "\n");

        Ok(())
    }

    pub fn print_generic(
        &mut self,
        generic: &GenericEvent,
    ) -> Result<()> {
        for (i, property) in generic.properties().iter().enumerate() {
            if i != 0 {
                write_or_return!(self, PROPERTY_SEPARATOR);
            }
            setcolor_or_return!(self, self.color_spec_name);
            write_or_return!(self, property.name());
            write_or_return!(self, "=");
            setcolor_or_return!(self, self.color_spec_default);
            if let Some(value) = property.value() {
                write_or_return!(self, value.to_string());
            }
        }
        write_or_return!(self, "\n");

        Ok(())
    }

    pub fn print_fault(
        &mut self,
        fault: &FaultEvent,
    ) -> Result<()> {
        setcolor_or_return!(self, self.color_spec_error);
        write_or_return!(self, FAULT_PREFIX);
        write_or_return!(self, fault.to_string());
        setcolor_or_return!(self, self.color_spec_default);
        write_or_return!(self, "\n");

        Ok(())
    }

    /// Print `event`, see [`PrinterEvent`].
    pub fn print_event(
        &mut self,
        event: &Event,
    ) -> Result<()> {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(event);
        match event {
            Event::Line(line) => self.print_line(line.text()),
            Event::Generic(generic) => self.print_generic(generic),
            Event::Fault(fault) => self.print_fault(fault),
            Event::EndOfStream => Ok(()),
        }
    }

    /// Reset the color and flush.
    pub fn flush(&mut self) -> Result<()> {
        if self.do_color {
            self.writer.reset()?;
            self.color_spec_last = ColorSpec::new();
        }

        self.writer.flush()
    }
}

impl<W: WriteColor + Send> EventSink for PrinterEvent<W> {
    fn write_event(
        &mut self,
        event: Event,
    ) -> Result<()> {
        self.print_event(&event)
    }

    fn finish(&mut self) -> Result<()> {
        self.flush()
    }
}

/// Print the `summary` to stderr.
pub fn print_summary(summary: &Summary) {
    eprintln!("{}", summary);
}
