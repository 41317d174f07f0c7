// src/parsers/microparsers.rs

//! Heuristic functions that find where one unquoted, possibly
//! space-containing field ends.
//!
//! httpd logs do not quote every field. A URL, a cookie list, a
//! user-agent, or a request line printed without quotes may contain the
//! space that otherwise separates fields. Each [`MicroParser`] knows the
//! shape of one kind of field and uses it to find the field end.
//!
//! These are best-effort heuristics. They are not correct for every
//! possible input.
//!
//! All functions share the contract
//! `identify_end(line_number, line, start_from) -> ResultS3FieldEnd`:
//!
//! * `Found(end)` the index of the first char after the field, usually a
//!   separator
//! * `Done` the field runs to the end of the line
//! * `Err(ParsingError)` the text at `start_from` does not look like this
//!   kind of field; the error carries `line_number` and `start_from`

use crate::common::{LineIndex, LineNumber, ResultS3, SPc};
use crate::debug::printers::{excerpt, str_to_String_noraw};
use crate::parsers::ParsingError;

use ::const_format::concatcp;
use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of a micro-parser, see the [module documentation].
///
/// [module documentation]: self
pub type ResultS3FieldEnd = ResultS3<LineIndex, ParsingError>;

/// Value printed by httpd for an absent header.
pub const ABSENT: char = '-';

/// Marker between the scheme and the host of a URL.
pub const URL_SCHEME_MARKER: &str = "://";

/// Maximum chars of offending text quoted in an error message.
pub const EXCERPT_LEN: usize = 40;

/// One `name=value` cookie pair; no spaces.
const RP_COOKIE_PAIR: &str = r"[^\s=;]+=[^\s;]*";

/// `name=value; name=value`, spaces are only allowed after a `;`.
const RP_COOKIES: &str = concatcp!(r"^(?:", RP_COOKIE_PAIR, r";\s?)*", RP_COOKIE_PAIR, r";?");

/// `name/version` product token.
const RP_UA_TOKEN: &str = r"[^\s()/]+/[^\s()]+";

/// `(comment; comment)`
const RP_UA_COMMENT: &str = r"\([^()]*\)";

/// A product token or a comment.
const RP_UA_PART: &str = concatcp!(r"(?:", RP_UA_TOKEN, "|", RP_UA_COMMENT, r")");

/// Mobile browsers, ending with a `Mobile` token, e.g.
/// `Mozilla/5.0 (iPhone; …) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1`
const RP_UA_MOBILE: &str = concatcp!(
    r"^", RP_UA_PART, r"(?: ", RP_UA_PART, r")*? Mobile(?:/[^\s()]+)?(?: ", RP_UA_TOKEN, r")*"
);

/// Mozilla-like browsers with a `like Gecko` suffix, e.g.
/// `Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36`
/// or `Mozilla/5.0 (Windows NT 6.1; Trident/7.0; rv:11.0) like Gecko`
const RP_UA_LIKE_GECKO: &str = concatcp!(
    r"^Mozilla/[\d.]+ ", RP_UA_COMMENT, r"(?: ", RP_UA_TOKEN, r")*(?: \(KHTML, like Gecko\)| like Gecko)(?: ", RP_UA_TOKEN, r")*"
);

/// Browsers with a `Safari/…` token followed by more tokens.
const RP_UA_SAFARI: &str = concatcp!(
    r"^", RP_UA_PART, r"(?: ", RP_UA_PART, r")*? Safari/[^\s()]+(?: ", RP_UA_TOKEN, r")*"
);

/// Repeating group of `name/version [tag] (comment)`, e.g.
/// `curl/8.4.0` or `Googlebot/2.1 (+http://www.google.com/bot.html)`.
const RP_UA_GENERIC: &str = concatcp!(
    r"^", RP_UA_TOKEN, r"(?: [A-Za-z]+)?(?: ", RP_UA_COMMENT, r")?(?: ", RP_UA_TOKEN, r"(?: [A-Za-z]+)?(?: ", RP_UA_COMMENT, r")?)*"
);

/// Bare `name/version`.
const RP_UA_BARE: &str = r"^[^\s/]+/\S+";

lazy_static! {
    static ref REGEX_COOKIES: Regex = Regex::new(RP_COOKIES).unwrap();

    /// User-agent regular expressions, in order of preference.
    static ref REGEX_USER_AGENTS: [(&'static str, Regex); 5] = [
        ("mobile", Regex::new(RP_UA_MOBILE).unwrap()),
        ("like Gecko", Regex::new(RP_UA_LIKE_GECKO).unwrap()),
        ("Safari", Regex::new(RP_UA_SAFARI).unwrap()),
        ("generic", Regex::new(RP_UA_GENERIC).unwrap()),
        ("bare", Regex::new(RP_UA_BARE).unwrap()),
    ];
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MicroParser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The kinds of field with a known shape.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MicroParser {
    /// `METHOD PATH VERSION`
    FirstRequestLine,
    /// `scheme://host:port/path?query`
    Url,
    /// `name=value; name=value`
    Cookie,
    /// `User-Agent` header
    UserAgent,
}

impl MicroParser {
    /// Find the end of the field starting at `start_from`.
    pub fn identify_end(
        &self,
        line_number: LineNumber,
        line: &str,
        start_from: LineIndex,
    ) -> ResultS3FieldEnd {
        match self {
            MicroParser::FirstRequestLine => identify_end_first_request_line(line_number, line, start_from),
            MicroParser::Url => identify_end_url(line_number, line, start_from),
            MicroParser::Cookie => identify_end_cookie(line_number, line, start_from),
            MicroParser::UserAgent => identify_end_user_agent(line_number, line, start_from),
        }
    }
}

/// `Found(end)`, or `Done` if `end` is the end of `line`.
#[inline(always)]
fn found_or_done(
    line: &str,
    end: LineIndex,
) -> ResultS3FieldEnd {
    if end >= line.len() {
        ResultS3FieldEnd::Done
    } else {
        ResultS3FieldEnd::Found(end)
    }
}

/// If the field at `start_from` is the one-char absent value `-` then
/// return its end.
fn absent_value_end(
    line: &str,
    start_from: LineIndex,
) -> Option<ResultS3FieldEnd> {
    let bytes: &[u8] = line.as_bytes();
    if bytes.get(start_from) != Some(&(ABSENT as u8)) {
        return None;
    }
    match bytes.get(start_from + 1) {
        None => Some(ResultS3FieldEnd::Done),
        Some(b) if *b == SPc as u8 => Some(ResultS3FieldEnd::Found(start_from + 1)),
        Some(_) => None,
    }
}

/// Index of the first `needle` in `line` at or after `from`.
#[inline(always)]
fn find_from(
    line: &str,
    from: LineIndex,
    needle: char,
) -> Option<LineIndex> {
    line.get(from..)?
        .find(needle)
        .map(|i| from + i)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// first request line
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The first request line is `METHOD PATH VERSION`. There must be two
/// spaces past `start_from`; the field ends at the space after the version
/// or at the end of the line.
pub fn identify_end_first_request_line(
    line_number: LineNumber,
    line: &str,
    start_from: LineIndex,
) -> ResultS3FieldEnd {
    defn!("({}, {:?}, {})", line_number, str_to_String_noraw(line), start_from);
    let space1: LineIndex = match find_from(line, start_from, SPc) {
        Some(i) if i > start_from => i,
        _ => {
            defx!("no space after method");
            return ResultS3FieldEnd::Err(ParsingError::new(
                line_number,
                start_from,
                format!("not a request line, missing space after method: {:?}", excerpt(line, start_from, EXCERPT_LEN)),
            ));
        }
    };
    let space2: LineIndex = match find_from(line, space1 + 1, SPc) {
        Some(i) => i,
        None => {
            defx!("no space after path");
            return ResultS3FieldEnd::Err(ParsingError::new(
                line_number,
                start_from,
                format!("not a request line, missing space after path: {:?}", excerpt(line, start_from, EXCERPT_LEN)),
            ));
        }
    };
    let result = match find_from(line, space2 + 1, SPc) {
        Some(end) => ResultS3FieldEnd::Found(end),
        None => ResultS3FieldEnd::Done,
    };
    defx!("return {:?}", result);

    result
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// URL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Walk a URL `scheme://host:port/path?query`.
///
/// The query string is not quoted by httpd and its values may contain
/// spaces. A space in the query terminates the URL only if
///
/// * no `&` follows before the next space, or
/// * the text between the space and the next `&` has the start of another
///   URL (`://`) or a `;`
///
/// otherwise the space is taken to be part of a query value.
pub fn identify_end_url(
    line_number: LineNumber,
    line: &str,
    start_from: LineIndex,
) -> ResultS3FieldEnd {
    defn!("({}, {:?}, {})", line_number, str_to_String_noraw(line), start_from);
    if let Some(result) = absent_value_end(line, start_from) {
        defx!("absent value; return {:?}", result);
        return result;
    }
    let bytes: &[u8] = line.as_bytes();
    let len: LineIndex = bytes.len();
    // the scheme marker must be within the first word
    let marker: LineIndex = match line
        .get(start_from..)
        .and_then(|s| s.find(URL_SCHEME_MARKER))
    {
        Some(i) if !line[start_from..start_from + i].contains(SPc) => start_from + i,
        _ => {
            defx!("no scheme marker");
            return ResultS3FieldEnd::Err(ParsingError::new(
                line_number,
                start_from,
                format!("not a URL, missing {:?}: {:?}", URL_SCHEME_MARKER, excerpt(line, start_from, EXCERPT_LEN)),
            ));
        }
    };
    // host
    let mut at: LineIndex = marker + URL_SCHEME_MARKER.len();
    while at < len && !matches!(bytes[at], b'/' | b':' | b' ') {
        at += 1;
    }
    // port
    if at < len && bytes[at] == b':' {
        at += 1;
        while at < len && bytes[at].is_ascii_digit() {
            at += 1;
        }
    }
    // path
    while at < len && !matches!(bytes[at], b'?' | b' ') {
        at += 1;
    }
    if at >= len {
        defx!("URL runs to end of line");
        return ResultS3FieldEnd::Done;
    }
    if bytes[at] == b' ' {
        defx!("return Found({})", at);
        return ResultS3FieldEnd::Found(at);
    }
    debug_assert_eq!(bytes[at], b'?');
    // query; may contain spaces
    loop {
        let space: LineIndex = match find_from(line, at, SPc) {
            Some(i) => i,
            None => {
                defx!("query runs to end of line");
                return ResultS3FieldEnd::Done;
            }
        };
        let next_amp: Option<LineIndex> = find_from(line, space + 1, '&');
        let next_space: Option<LineIndex> = find_from(line, space + 1, SPc);
        let amp: LineIndex = match (next_amp, next_space) {
            (None, _) => {
                defx!("no more '&'; return Found({})", space);
                return ResultS3FieldEnd::Found(space);
            }
            (Some(amp), Some(sp)) if sp < amp => {
                defx!("space before next '&'; return Found({})", space);
                return ResultS3FieldEnd::Found(space);
            }
            (Some(amp), _) => amp,
        };
        let between: &str = &line[space + 1..amp];
        if between.contains(URL_SCHEME_MARKER) || between.contains(';') {
            defx!("next '&' belongs to another field; return Found({})", space);
            return ResultS3FieldEnd::Found(space);
        }
        defo!("space at {} is within the query value", space);
        at = amp + 1;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Cookie
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Match `name=value; name=value` at `start_from`. Trailing whitespace is
/// not part of the field.
pub fn identify_end_cookie(
    line_number: LineNumber,
    line: &str,
    start_from: LineIndex,
) -> ResultS3FieldEnd {
    defn!("({}, {:?}, {})", line_number, str_to_String_noraw(line), start_from);
    if let Some(result) = absent_value_end(line, start_from) {
        defx!("absent value; return {:?}", result);
        return result;
    }
    let tail: &str = line.get(start_from..).unwrap_or("");
    let matched: &str = match REGEX_COOKIES.find(tail) {
        Some(m) => m.as_str(),
        None => {
            defx!("no match");
            return ResultS3FieldEnd::Err(ParsingError::new(
                line_number,
                start_from,
                format!("not a cookie list: {:?}", excerpt(line, start_from, EXCERPT_LEN)),
            ));
        }
    };
    let end: LineIndex = start_from + matched.trim_end().len();
    let result = found_or_done(line, end);
    defx!("return {:?}", result);

    result
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// User-Agent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Match the first of the user-agent regular expressions at `start_from`.
pub fn identify_end_user_agent(
    line_number: LineNumber,
    line: &str,
    start_from: LineIndex,
) -> ResultS3FieldEnd {
    defn!("({}, {:?}, {})", line_number, str_to_String_noraw(line), start_from);
    if let Some(result) = absent_value_end(line, start_from) {
        defx!("absent value; return {:?}", result);
        return result;
    }
    let tail: &str = line.get(start_from..).unwrap_or("");
    for (_name, regex) in REGEX_USER_AGENTS.iter() {
        if let Some(m) = regex.find(tail) {
            let end: LineIndex = start_from + m.end();
            let result = found_or_done(line, end);
            defx!("matched {:?}; return {:?}", _name, result);
            return result;
        }
    }
    defx!("no match");

    ResultS3FieldEnd::Err(ParsingError::new(
        line_number,
        start_from,
        format!("unknown user-agent: {:?}", excerpt(line, start_from, EXCERPT_LEN)),
    ))
}
