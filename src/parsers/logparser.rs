// src/parsers/logparser.rs

//! Implement [`LogParser`], a [`LineParser`] for httpd-like log lines.
//!
//! The compiled [`LogFormat`] elements and the line text are walked in
//! lockstep. Literals and enclosures must match the text verbatim.
//! Placeholders consume one field each; the end of a field is found by,
//! in order of preference,
//!
//! 1. the closing enclosure, if the placeholder is immediately followed by
//!    one
//! 2. the count of words in a `%{pattern}t` timestamp pattern
//! 3. a [micro-parser], for unenclosed fields that may contain spaces
//! 4. the next element of the format
//!
//! [`LineParser`]: crate::parsers::LineParser
//! [`LogFormat`]: crate::data::format::LogFormat
//! [micro-parser]: crate::parsers::microparsers

use crate::common::{LineIndex, LineNumber, ResultS3, SPc};
use crate::data::datetime::{datetime_to_millis, DatePattern, DateTimeL, FixedOffset};
use crate::data::event::{Event, GenericEvent};
use crate::data::format::{Directive, Enclosure, FormatElement, LogFormat, Placeholder};
use crate::data::property::{Property, PropertyMap, PropertyType, PropertyValue};
use crate::debug::printers::{excerpt, str_to_String_noraw};
use crate::parsers::microparsers::{MicroParser, EXCERPT_LEN};
use crate::parsers::{LineParser, ParserKind, ParsingError, ResultParse};

use ::more_asserts::{debug_assert_ge, debug_assert_le};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Field text printed by httpd for an absent value.
pub const ABSENT_FIELD: &str = "-";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FieldPlan
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How the end of a field is found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldEnd {
    /// At the closing char of the enclosure.
    Enclosed(Enclosure),
    /// After this many space-separated words.
    Words(usize),
    /// Where the micro-parser says.
    Micro(MicroParser),
    /// At the text of the next format element.
    Simple,
}

/// Everything needed to match one placeholder, decided once when the
/// parser is created.
#[derive(Clone, Debug)]
struct FieldPlan {
    name: String,
    property_type: PropertyType,
    directive: Directive,
    end: FieldEnd,
    date_pattern: Option<DatePattern>,
}

/// The micro-parser for `placeholder`, if its field may contain spaces
/// and is not enclosed.
pub fn micro_parser_for(placeholder: &Placeholder) -> Option<MicroParser> {
    if placeholder.directive() == Directive::FirstRequestLine {
        return Some(MicroParser::FirstRequestLine);
    }
    if !matches!(placeholder.directive(), Directive::RequestHeader | Directive::ResponseHeader) {
        return None;
    }
    if placeholder.is_cookie_header() {
        return Some(MicroParser::Cookie);
    }
    if placeholder.is_header("User-Agent") {
        return Some(MicroParser::UserAgent);
    }
    let name: String = placeholder
        .argument()
        .unwrap_or("")
        .to_ascii_lowercase();
    match name.as_str() {
        "referer" | "referrer" | "location" | "origin" => Some(MicroParser::Url),
        _ if name.ends_with("-url") || name.ends_with("-uri") => Some(MicroParser::Url),
        _ => None,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogParser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parses httpd-like log lines with a compiled [`LogFormat`].
///
/// [`LogFormat`]: crate::data::format::LogFormat
#[derive(Debug)]
pub struct LogParser {
    format: LogFormat,
    /// `plans[i]` is `Some` for each placeholder element `i`.
    plans: Vec<Option<FieldPlan>>,
    /// Offset for timestamp patterns without a timezone.
    tz_offset: FixedOffset,
}

impl LogParser {
    pub fn new(
        format: LogFormat,
        tz_offset: FixedOffset,
    ) -> LogParser {
        defn!("({:?})", format.spec());
        let elements: &[FormatElement] = format.elements();
        let mut plans: Vec<Option<FieldPlan>> = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            let placeholder: &Placeholder = match element {
                FormatElement::Placeholder(p) => p,
                _ => {
                    plans.push(None);
                    continue;
                }
            };
            let enclosed: Option<Enclosure> = match elements.get(i + 1) {
                Some(FormatElement::ClosingEnclosure(e)) if !format.is_separated(i + 1) => Some(*e),
                _ => None,
            };
            let date_pattern: Option<DatePattern> = match (placeholder.is_timestamp(), placeholder.argument()) {
                (false, _) => None,
                (true, None) => Some(DatePattern::httpd()),
                (true, Some(pattern)) => Some(DatePattern::from_strftime(pattern)),
            };
            let end: FieldEnd = match (enclosed, date_pattern.as_ref()) {
                (Some(e), _) => FieldEnd::Enclosed(e),
                (None, Some(dp)) => FieldEnd::Words(dp.count_spaces() + 1),
                (None, None) => match micro_parser_for(placeholder) {
                    Some(mp) => FieldEnd::Micro(mp),
                    None => FieldEnd::Simple,
                },
            };
            defo!("element {} {:?} end {:?}", i, placeholder.token(), end);
            plans.push(Some(FieldPlan {
                name: placeholder.property_name(),
                property_type: placeholder.property_type(),
                directive: placeholder.directive(),
                end,
                date_pattern,
            }));
        }
        defx!();

        LogParser {
            format,
            plans,
            tz_offset,
        }
    }

    #[inline(always)]
    pub const fn format(&self) -> &LogFormat {
        &self.format
    }

    /// How the end of the field of element `index` is found.
    pub fn field_end(
        &self,
        index: usize,
    ) -> Option<&FieldEnd> {
        self.plans
            .get(index)
            .and_then(|p| p.as_ref())
            .map(|p| &p.end)
    }

    /// The remaining elements from `index`, as written, for error messages.
    fn remainder(
        &self,
        index: usize,
    ) -> String {
        let mut s: String = String::new();
        for (i, element) in self.format.elements()[index..]
            .iter()
            .enumerate()
        {
            if i != 0 && self.format.is_separated(index + i) {
                s.push(SPc);
            }
            s.push_str(element.to_string().as_str());
        }

        s
    }

    /// The line ended before element `index`. That is only allowed if the
    /// remaining elements are all enclosures.
    fn end_of_line(
        &self,
        line_number: LineNumber,
        len: LineIndex,
        index: usize,
    ) -> Result<(), ParsingError> {
        let only_enclosures: bool = self.format.elements()[index..]
            .iter()
            .all(|e| matches!(e, FormatElement::OpeningEnclosure(_) | FormatElement::ClosingEnclosure(_)));
        if only_enclosures {
            return Ok(());
        }

        Err(ParsingError::new(
            line_number,
            len,
            format!("line ended before matching {:?}", self.remainder(index)),
        ))
    }

    /// Find the end of a `FieldEnd::Simple` field starting at `at`, by
    /// looking for the text of the element after `index`.
    fn simple_end(
        &self,
        text: &str,
        at: LineIndex,
        index: usize,
    ) -> LineIndex {
        let next: usize = index + 1;
        let found: Option<LineIndex> = match self.format.elements().get(next) {
            None => None,
            Some(_) if self.format.is_separated(next) => find_char(text, at, SPc),
            Some(FormatElement::Literal(literal)) => text[at..]
                .find(literal.as_str())
                .map(|i| at + i),
            Some(FormatElement::OpeningEnclosure(e)) => find_char(text, at, e.open_char()),
            Some(FormatElement::ClosingEnclosure(e)) => find_closing(text, at, *e),
            // two adjacent placeholders, the first one takes one word
            Some(FormatElement::Placeholder(_)) => find_char(text, at, SPc),
        };

        found.unwrap_or(text.len())
    }

    /// Find the end of a `FieldEnd::Words` field of `words` words starting
    /// at `at`. If the element after `index` follows the field without a
    /// space, the field ends at the first occurrence of that element's text
    /// where the field text is a valid date, else at its first occurrence.
    fn words_end(
        &self,
        text: &str,
        at: LineIndex,
        index: usize,
        words: usize,
        pattern: Option<&DatePattern>,
    ) -> LineIndex {
        let word_end: LineIndex = find_word_end(text, at, words);
        let next: usize = index + 1;
        if self.format.is_separated(next) {
            return word_end;
        }
        let follow: String = match self.format.elements().get(next) {
            Some(FormatElement::Literal(literal)) => literal.clone(),
            Some(FormatElement::OpeningEnclosure(e)) => e.open_char().to_string(),
            _ => return word_end,
        };
        let mut first: Option<LineIndex> = None;
        for (i, _) in text[at..word_end].match_indices(follow.as_str()) {
            let end: LineIndex = at + i;
            if let Some(dp) = pattern {
                if dp.parse(&text[at..end], &self.tz_offset).is_ok() {
                    defñ!("date ends at {:?} {}", follow, end);
                    return end;
                }
            }
            first.get_or_insert(end);
        }

        first.unwrap_or(word_end)
    }

    /// Convert field text `field`, found at column `at`, to a property and
    /// add it to `event`.
    fn add_field(
        &self,
        event: &mut GenericEvent,
        plan: &FieldPlan,
        line_number: LineNumber,
        at: LineIndex,
        field: &str,
    ) -> Result<(), ParsingError> {
        defñ!("{:?} = {:?}", plan.name, str_to_String_noraw(field));
        if field == ABSENT_FIELD {
            event.add_property(Property::null(plan.name.as_str(), plan.property_type));
            return Ok(());
        }
        let value: PropertyValue = match plan.property_type {
            PropertyType::String => PropertyValue::String(field.to_string()),
            PropertyType::Integer => match field.parse::<i32>() {
                Ok(val) => PropertyValue::Integer(val),
                Err(err) => {
                    return Err(ParsingError::new(
                        line_number,
                        at,
                        format!("{} {:?} is not an integer: {}", plan.name, field, err),
                    ));
                }
            },
            PropertyType::Long => match field.parse::<i64>() {
                Ok(val) => PropertyValue::Long(val),
                Err(err) => {
                    return Err(ParsingError::new(
                        line_number,
                        at,
                        format!("{} {:?} is not an integer: {}", plan.name, field, err),
                    ));
                }
            },
            PropertyType::Float => match field.parse::<f32>() {
                Ok(val) => PropertyValue::Float(val),
                Err(err) => {
                    return Err(ParsingError::new(
                        line_number,
                        at,
                        format!("{} {:?} is not a number: {}", plan.name, field, err),
                    ));
                }
            },
            PropertyType::Double => match field.parse::<f64>() {
                Ok(val) => PropertyValue::Double(val),
                Err(err) => {
                    return Err(ParsingError::new(
                        line_number,
                        at,
                        format!("{} {:?} is not a number: {}", plan.name, field, err),
                    ));
                }
            },
            PropertyType::Date => {
                let pattern: &DatePattern = match plan.date_pattern.as_ref() {
                    Some(val) => val,
                    None => {
                        return Err(ParsingError::new(line_number, at, format!("{} has no date pattern", plan.name)));
                    }
                };
                let dt: DateTimeL = match pattern.parse(field, &self.tz_offset) {
                    Ok(val) => val,
                    Err(err) => {
                        return Err(ParsingError::new(line_number, at, err));
                    }
                };
                event.set_timestamp(datetime_to_millis(&dt));
                PropertyValue::Date(dt)
            }
            PropertyType::Map => match plan.directive {
                Directive::QueryString => PropertyValue::Map(decode_query(field)),
                _ => PropertyValue::Map(decode_cookies(field)),
            },
        };
        event.add_property(Property::new(plan.name.as_str(), plan.property_type, Some(value)));

        Ok(())
    }
}

impl LogParser {
    /// Match `text`. Error columns are byte offsets into `text`.
    fn parse_text(
        &self,
        line_number: LineNumber,
        text: &str,
    ) -> ResultParse {
        defn!("({}, {:?})", line_number, str_to_String_noraw(text));
        let len: LineIndex = text.len();
        let mut event: GenericEvent = GenericEvent::new(Some(line_number));
        let mut at: LineIndex = 0;

        for (index, element) in self.format.elements().iter().enumerate() {
            if at >= len {
                self.end_of_line(line_number, len, index)?;
                break;
            }
            if index != 0 && self.format.is_separated(index) {
                if !text[at..].starts_with(SPc) {
                    defx!("missing space at {}", at);
                    return Err(ParsingError::new(
                        line_number,
                        at,
                        format!("expected a space before {:?}, found {:?}", element.to_string(), excerpt(text, at, EXCERPT_LEN)),
                    ));
                }
                at += 1;
                if at >= len {
                    self.end_of_line(line_number, len, index)?;
                    break;
                }
            }
            match element {
                FormatElement::Literal(literal) => {
                    if !text[at..].starts_with(literal.as_str()) {
                        defx!("literal {:?} not at {}", literal, at);
                        return Err(ParsingError::new(
                            line_number,
                            at,
                            format!("expected {:?}, found {:?}", literal, excerpt(text, at, EXCERPT_LEN)),
                        ));
                    }
                    at += literal.len();
                }
                FormatElement::OpeningEnclosure(e) | FormatElement::ClosingEnclosure(e) => {
                    let c: char = match element {
                        FormatElement::OpeningEnclosure(_) => e.open_char(),
                        _ => e.close_char(),
                    };
                    if !text[at..].starts_with(c) {
                        defx!("enclosure {:?} not at {}", c, at);
                        return Err(ParsingError::new(
                            line_number,
                            at,
                            format!("expected {:?}, found {:?}", c, excerpt(text, at, EXCERPT_LEN)),
                        ));
                    }
                    at += c.len_utf8();
                }
                FormatElement::Placeholder(placeholder) => {
                    let plan: &FieldPlan = match self.plans[index].as_ref() {
                        Some(val) => val,
                        None => {
                            return Err(ParsingError::new(
                                line_number,
                                at,
                                format!("no field plan for {:?}", placeholder.token()),
                            ));
                        }
                    };
                    let end: LineIndex = match &plan.end {
                        FieldEnd::Enclosed(e) => match find_closing(text, at, *e) {
                            Some(val) => val,
                            None => {
                                defx!("unterminated {:?}", e);
                                return Err(ParsingError::new(
                                    line_number,
                                    at,
                                    format!("missing closing {:?} for {:?}", e.close_char(), placeholder.token()),
                                ));
                            }
                        },
                        FieldEnd::Words(words) => self.words_end(text, at, index, *words, plan.date_pattern.as_ref()),
                        FieldEnd::Micro(micro) => match micro.identify_end(line_number, text, at) {
                            ResultS3::Found(val) => val,
                            ResultS3::Done => len,
                            ResultS3::Err(err) => {
                                defx!("micro-parser {:?} failed: {}", micro, err);
                                return Err(err);
                            }
                        },
                        FieldEnd::Simple => self.simple_end(text, at, index),
                    };
                    debug_assert_ge!(end, at, "field end before field start");
                    debug_assert_le!(end, len, "field end past end of line");
                    self.add_field(&mut event, plan, line_number, at, &text[at..end])?;
                    at = end;
                }
            }
        }
        if at < len {
            defx!("unmatched text at {}", at);
            return Err(ParsingError::new(
                line_number,
                at,
                format!("unexpected text after the last field: {:?}", excerpt(text, at, EXCERPT_LEN)),
            ));
        }
        defx!("return {} properties", event.count_properties());

        Ok(Event::Generic(event))
    }
}

impl LineParser for LogParser {
    fn parse_line(
        &self,
        line_number: LineNumber,
        text: &str,
    ) -> ResultParse {
        self.parse_text(line_number, text)
            .map_err(|err| err.into_char_column(text))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Log
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[inline(always)]
fn find_char(
    text: &str,
    from: LineIndex,
    c: char,
) -> Option<LineIndex> {
    text[from..].find(c).map(|i| from + i)
}

/// Index of the closing char of `enclosure` at or after `from`.
/// A double quote preceded by a backslash is escaped.
pub fn find_closing(
    text: &str,
    from: LineIndex,
    enclosure: Enclosure,
) -> Option<LineIndex> {
    let close: u8 = enclosure.close_char() as u8;
    let bytes: &[u8] = text.as_bytes();
    let mut at: LineIndex = from;
    while at < bytes.len() {
        match bytes[at] {
            b'\\' if enclosure == Enclosure::DoubleQuote => at += 2,
            b if b == close => return Some(at),
            _ => at += 1,
        }
    }

    None
}

/// End of `words` space-separated words beginning at `from`.
pub fn find_word_end(
    text: &str,
    from: LineIndex,
    words: usize,
) -> LineIndex {
    let mut at: LineIndex = from;
    for _ in 1..words {
        match find_char(text, at, SPc) {
            Some(i) => at = i + 1,
            None => return text.len(),
        }
    }

    find_char(text, at, SPc).unwrap_or(text.len())
}

/// Value of a hex digit.
const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `%XX` escapes and `+` of URL query text. Each decoded byte is
/// one char, like the line text.
pub fn percent_decode(s: &str) -> String {
    let bytes: &[u8] = s.as_bytes();
    let mut decoded: String = String::with_capacity(s.len());
    let mut at: usize = 0;
    while at < bytes.len() {
        match bytes[at] {
            b'%' => match (bytes.get(at + 1).and_then(|b| hex_value(*b)), bytes.get(at + 2).and_then(|b| hex_value(*b))) {
                (Some(hi), Some(lo)) => {
                    decoded.push(char::from(hi << 4 | lo));
                    at += 3;
                    continue;
                }
                _ => decoded.push('%'),
            },
            b'+' => decoded.push(SPc),
            _ => {
                // copy the whole char
                let c: char = s[at..].chars().next().unwrap_or('\u{FFFD}');
                decoded.push(c);
                at += c.len_utf8();
                continue;
            }
        }
        at += 1;
    }

    decoded
}

/// Decode a query string `?k1=v1&k2=v2` into a map. A key without `=` has
/// an empty value.
pub fn decode_query(field: &str) -> PropertyMap {
    let mut map: PropertyMap = PropertyMap::new();
    let query: &str = field.strip_prefix('?').unwrap_or(field);
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        map.insert(percent_decode(k), percent_decode(v));
    }

    map
}

/// Decode a cookie list `k1=v1; k2=v2` into a map.
pub fn decode_cookies(field: &str) -> PropertyMap {
    let mut map: PropertyMap = PropertyMap::new();
    for pair in field.split(';') {
        let pair: &str = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        map.insert(k.trim().to_string(), v.trim().to_string());
    }

    map
}
