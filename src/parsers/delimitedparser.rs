// src/parsers/delimitedparser.rs

//! Implement [`DelimitedParser`], a [`LineParser`] for CSV-like lines.
//!
//! [`LineParser`]: crate::parsers::LineParser

use crate::common::{LineIndex, LineNumber};
use crate::data::datetime::{datetime_to_millis, DateTimeL, FixedOffset};
use crate::data::event::{Event, GenericEvent};
use crate::data::format::{DelimitedFormat, Field, FieldType};
use crate::data::property::{Property, PropertyValue};
use crate::debug::printers::str_to_String_noraw;
use crate::parsers::{LineParser, ParserKind, ParsingError, ResultParse};

use std::fmt::Display;
use std::str::FromStr;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Parses delimited lines with a compiled [`DelimitedFormat`].
///
/// A line is split by the delimiter into at most as many tokens as there
/// are fields. Fewer tokens is not an error, the event has fewer
/// properties. Excess text is ignored.
///
/// The first `time` field sets the event timestamp instead of adding a
/// property.
///
/// [`DelimitedFormat`]: crate::data::format::DelimitedFormat
#[derive(Debug)]
pub struct DelimitedParser {
    format: DelimitedFormat,
    tz_offset: FixedOffset,
}

impl DelimitedParser {
    pub fn new(
        format: DelimitedFormat,
        tz_offset: FixedOffset,
    ) -> DelimitedParser {
        DelimitedParser { format, tz_offset }
    }

    #[inline(always)]
    pub const fn format(&self) -> &DelimitedFormat {
        &self.format
    }

    /// Convert `token`, found at `column`, to the value of `field`.
    /// An empty token of a non-string field is `None`.
    fn convert(
        &self,
        field: &Field,
        line_number: LineNumber,
        column: LineIndex,
        token: &str,
    ) -> Result<Option<PropertyValue>, ParsingError> {
        if token.is_empty() && !matches!(field.field_type(), FieldType::String) {
            return Ok(None);
        }
        let value: PropertyValue = match field.field_type() {
            FieldType::String => PropertyValue::String(token.to_string()),
            FieldType::Int => PropertyValue::Integer(parse_number(field, line_number, column, token)?),
            FieldType::Long => PropertyValue::Long(parse_number(field, line_number, column, token)?),
            FieldType::Float => PropertyValue::Float(parse_number(field, line_number, column, token)?),
            FieldType::Double => PropertyValue::Double(parse_number(field, line_number, column, token)?),
            FieldType::Time(pattern) => {
                let dt: DateTimeL = match pattern.parse(token, &self.tz_offset) {
                    Ok(val) => val,
                    Err(err) => {
                        return Err(ParsingError::new(line_number, column, format!("{}: {}", field.name(), err)));
                    }
                };
                PropertyValue::Date(dt)
            }
        };

        Ok(Some(value))
    }
}

/// Parse a numeric token, the error names the field.
fn parse_number<T>(
    field: &Field,
    line_number: LineNumber,
    column: LineIndex,
    token: &str,
) -> Result<T, ParsingError>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    match token.parse::<T>() {
        Ok(val) => Ok(val),
        Err(err) => Err(ParsingError::new(
            line_number,
            column,
            format!("{} {:?} is not a {}: {}", field.name(), token, field.field_type().property_type(), err),
        )),
    }
}

impl DelimitedParser {
    /// Match `text`. Error columns are byte offsets into `text`.
    fn parse_text(
        &self,
        line_number: LineNumber,
        text: &str,
    ) -> ResultParse {
        defn!("({}, {:?})", line_number, str_to_String_noraw(text));
        let fields: &[Field] = self.format.fields();
        let mut event: GenericEvent = GenericEvent::new(Some(line_number));
        let mut column: LineIndex = 0;

        for (index, (field, raw)) in fields
            .iter()
            .zip(text.split(self.format.delimiter()))
            .enumerate()
        {
            let token: &str = raw.trim();
            let token_column: LineIndex = column + (raw.len() - raw.trim_start().len());
            defo!("field {:?} token {:?} at {}", field.name(), token, token_column);
            let value: Option<PropertyValue> = self.convert(field, line_number, token_column, token)?;
            if Some(index) == self.format.timestamp_index() {
                if let Some(PropertyValue::Date(dt)) = value {
                    event.set_timestamp(datetime_to_millis(&dt));
                }
            } else {
                event.add_property(Property::new(field.name(), field.field_type().property_type(), value));
            }
            column += raw.len() + self.format.delimiter().len_utf8();
        }
        defx!("return {} properties, timestamp {:?}", event.count_properties(), event.timestamp());

        Ok(Event::Generic(event))
    }
}

impl LineParser for DelimitedParser {
    fn parse_line(
        &self,
        line_number: LineNumber,
        text: &str,
    ) -> ResultParse {
        self.parse_text(line_number, text)
            .map_err(|err| err.into_char_column(text))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Delimited
    }
}
