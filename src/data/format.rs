// src/data/format.rs

//! Implement the compiled format specifications: [`LogFormat`] for
//! httpd-like log formats and [`DelimitedFormat`] for CSV-like formats.
//!
//! A format is compiled once from a user specification string and is
//! thereafter immutable. It may be shared by any number of threads.
//!
//! ## Log-style specification
//!
//! An httpd `LogFormat` string, e.g. `[%t] %h "%r" %s %b`.
//!
//! * `%x`, `%>x`, `%{arg}x` are [`Placeholder`]s
//! * `"`, `'`, `[`, `]` are enclosures, they must balance
//! * whitespace separates elements and is not itself an element
//! * any other text is a literal
//!
//! A bare `%t` not already within brackets is wrapped in brackets, as httpd
//! prints brackets around it.
//!
//! ## Delimited specification
//!
//! A delimited list of field descriptors, e.g. `name(string), size(long),
//! when(time:yyyy-MM-dd HH:mm:ss),`. Each descriptor is `name`, `name(type)`
//! or `(type)`.
//!
//! [`LogFormat`]: self::LogFormat
//! [`DelimitedFormat`]: self::DelimitedFormat
//! [`Placeholder`]: self::Placeholder

use crate::common::ResultS3;
use crate::data::datetime::DatePattern;
use crate::data::property::PropertyType;

use std::collections::HashSet;
use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FormatError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A user error in a format specification, raised when compiling a format.
/// Carries the offending token or fragment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormatError {
    message: String,
    fragment: String,
}

impl FormatError {
    pub fn new(
        message: impl Into<String>,
        fragment: impl Into<String>,
    ) -> FormatError {
        FormatError {
            message: message.into(),
            fragment: fragment.into(),
        }
    }

    #[inline(always)]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// The offending token or fragment of the specification.
    #[inline(always)]
    pub fn fragment(&self) -> &str {
        self.fragment.as_str()
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {:?}", self.message, self.fragment)
    }
}

impl std::error::Error for FormatError {}

/// Result of recognizing and compiling a format specification.
///
/// * `Found` the specification is this kind of format
/// * `Done` the specification is not shaped like this kind of format
/// * `Err` the specification is this kind of format but is malformed
pub type ResultS3Recognize<T> = ResultS3<T, FormatError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Enclosure
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A pair of characters that bound a field.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Enclosure {
    DoubleQuote,
    SingleQuote,
    Bracket,
}

impl Enclosure {
    pub const fn open_char(&self) -> char {
        match self {
            Enclosure::DoubleQuote => '"',
            Enclosure::SingleQuote => '\'',
            Enclosure::Bracket => '[',
        }
    }

    pub const fn close_char(&self) -> char {
        match self {
            Enclosure::DoubleQuote => '"',
            Enclosure::SingleQuote => '\'',
            Enclosure::Bracket => ']',
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Placeholder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The httpd `mod_log_config` directives.
///
/// See <https://httpd.apache.org/docs/current/mod/mod_log_config.html#formats>
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Directive {
    /// `%a`
    RemoteIp,
    /// `%A`
    LocalIp,
    /// `%B`
    BytesSentNoDash,
    /// `%b`
    BytesSent,
    /// `%D`
    TimeTakenMicros,
    /// `%f`
    Filename,
    /// `%h`
    RemoteHost,
    /// `%H`
    Protocol,
    /// `%l`
    RemoteLogname,
    /// `%m`
    Method,
    /// `%p`
    Port,
    /// `%P`
    ProcessId,
    /// `%q`
    QueryString,
    /// `%r`
    FirstRequestLine,
    /// `%s`
    Status,
    /// `%>s`
    FinalStatus,
    /// `%t`, `%{pattern}t`
    Timestamp,
    /// `%T`
    TimeTakenSeconds,
    /// `%u`
    RemoteUser,
    /// `%U`
    UrlPath,
    /// `%v`
    ServerName,
    /// `%V`
    CanonicalServerName,
    /// `%X`
    ConnectionStatus,
    /// `%I`
    BytesReceived,
    /// `%O`
    BytesSentTotal,
    /// `%{Name}i`
    RequestHeader,
    /// `%{Name}o`
    ResponseHeader,
    /// `%{Name}C`
    Cookie,
    /// `%{Name}e`
    Environment,
    /// `%{Name}n`
    Note,
}

impl Directive {
    /// The `Directive` for a directive letter, and whether the letter
    /// requires a `{…}` argument.
    pub const fn from_letter(letter: char) -> Option<(Directive, bool)> {
        let d = match letter {
            'a' => (Directive::RemoteIp, false),
            'A' => (Directive::LocalIp, false),
            'B' => (Directive::BytesSentNoDash, false),
            'b' => (Directive::BytesSent, false),
            'D' => (Directive::TimeTakenMicros, false),
            'f' => (Directive::Filename, false),
            'h' => (Directive::RemoteHost, false),
            'H' => (Directive::Protocol, false),
            'l' => (Directive::RemoteLogname, false),
            'm' => (Directive::Method, false),
            'p' => (Directive::Port, false),
            'P' => (Directive::ProcessId, false),
            'q' => (Directive::QueryString, false),
            'r' => (Directive::FirstRequestLine, false),
            's' => (Directive::Status, false),
            't' => (Directive::Timestamp, false),
            'T' => (Directive::TimeTakenSeconds, false),
            'u' => (Directive::RemoteUser, false),
            'U' => (Directive::UrlPath, false),
            'v' => (Directive::ServerName, false),
            'V' => (Directive::CanonicalServerName, false),
            'X' => (Directive::ConnectionStatus, false),
            'I' => (Directive::BytesReceived, false),
            'O' => (Directive::BytesSentTotal, false),
            'i' => (Directive::RequestHeader, true),
            'o' => (Directive::ResponseHeader, true),
            'C' => (Directive::Cookie, true),
            'e' => (Directive::Environment, true),
            'n' => (Directive::Note, true),
            _ => {
                return None;
            }
        };

        Some(d)
    }
}

/// One `%` directive of a [`LogFormat`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placeholder {
    directive: Directive,
    /// The `{…}` argument, e.g. a header name or a strftime pattern.
    argument: Option<String>,
    /// The token as written in the specification, e.g. `%{Referer}i`.
    token: String,
}

impl Placeholder {
    pub fn new(
        directive: Directive,
        argument: Option<String>,
        token: impl Into<String>,
    ) -> Placeholder {
        Placeholder {
            directive,
            argument,
            token: token.into(),
        }
    }

    #[inline(always)]
    pub const fn directive(&self) -> Directive {
        self.directive
    }

    #[inline(always)]
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    #[inline(always)]
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    #[inline(always)]
    pub const fn is_timestamp(&self) -> bool {
        matches!(self.directive, Directive::Timestamp)
    }

    /// A bare `%t` without a `{pattern}`.
    #[inline(always)]
    pub const fn is_bare_timestamp(&self) -> bool {
        self.is_timestamp() && self.argument.is_none()
    }

    /// Name of the property produced by this placeholder.
    pub fn property_name(&self) -> String {
        let name: &str = match self.directive {
            Directive::RemoteIp => "remoteIp",
            Directive::LocalIp => "localIp",
            Directive::BytesSentNoDash | Directive::BytesSent => "bytesSent",
            Directive::TimeTakenMicros => "timeTakenMicros",
            Directive::Filename => "filename",
            Directive::RemoteHost => "remoteHost",
            Directive::Protocol => "protocol",
            Directive::RemoteLogname => "remoteLogname",
            Directive::Method => "method",
            Directive::Port => "port",
            Directive::ProcessId => "processId",
            Directive::QueryString => "queryString",
            Directive::FirstRequestLine => "firstRequestLine",
            Directive::Status => "status",
            Directive::FinalStatus => "finalStatus",
            Directive::Timestamp => "timestamp",
            Directive::TimeTakenSeconds => "timeTakenSeconds",
            Directive::RemoteUser => "remoteUser",
            Directive::UrlPath => "urlPath",
            Directive::ServerName => "serverName",
            Directive::CanonicalServerName => "canonicalServerName",
            Directive::ConnectionStatus => "connectionStatus",
            Directive::BytesReceived => "bytesReceived",
            Directive::BytesSentTotal => "bytesSentTotal",
            Directive::RequestHeader
            | Directive::ResponseHeader
            | Directive::Cookie
            | Directive::Environment
            | Directive::Note => {
                return self
                    .argument
                    .clone()
                    .unwrap_or_default();
            }
        };

        String::from(name)
    }

    /// Type of the property produced by this placeholder.
    pub fn property_type(&self) -> PropertyType {
        match self.directive {
            Directive::Status | Directive::FinalStatus | Directive::TimeTakenSeconds | Directive::Port
            | Directive::ProcessId => PropertyType::Integer,
            Directive::BytesSentNoDash
            | Directive::BytesSent
            | Directive::TimeTakenMicros
            | Directive::BytesReceived
            | Directive::BytesSentTotal => PropertyType::Long,
            Directive::Timestamp => PropertyType::Date,
            Directive::QueryString => PropertyType::Map,
            Directive::RequestHeader | Directive::ResponseHeader if self.is_cookie_header() => PropertyType::Map,
            _ => PropertyType::String,
        }
    }

    /// Is this the `Name` header of a request or response?
    /// Header names are case-insensitive.
    pub fn is_header(
        &self,
        name: &str,
    ) -> bool {
        matches!(self.directive, Directive::RequestHeader | Directive::ResponseHeader)
            && self
                .argument
                .as_deref()
                .map_or(false, |arg| arg.eq_ignore_ascii_case(name))
    }

    /// Is this a `Cookie` or `Set-Cookie` header?
    pub fn is_cookie_header(&self) -> bool {
        self.is_header("Cookie") || self.is_header("Set-Cookie")
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FormatElement, LogFormat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One token of a compiled [`LogFormat`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormatElement {
    /// Text that must appear verbatim.
    Literal(String),
    /// A field.
    Placeholder(Placeholder),
    OpeningEnclosure(Enclosure),
    ClosingEnclosure(Enclosure),
}

impl fmt::Display for FormatElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatElement::Literal(s) => write!(f, "{}", s),
            FormatElement::Placeholder(p) => write!(f, "{}", p),
            FormatElement::OpeningEnclosure(e) => write!(f, "{}", e.open_char()),
            FormatElement::ClosingEnclosure(e) => write!(f, "{}", e.close_char()),
        }
    }
}

/// Sequence of [`FormatElement`].
pub type FormatElements = Vec<FormatElement>;

/// A compiled httpd-like log format.
#[derive(Clone, Debug)]
pub struct LogFormat {
    spec: String,
    elements: FormatElements,
    /// `separated[i]` is `true` if whitespace preceded `elements[i]` in the
    /// specification.
    separated: Vec<bool>,
}

impl LogFormat {
    /// Recognize and compile `spec`.
    ///
    /// A specification without any `%` placeholder is not shaped like a
    /// log format and returns `Done`.
    pub fn recognize(spec: &str) -> ResultS3Recognize<LogFormat> {
        defn!("({:?})", spec);
        if !spec.contains('%') {
            defx!("no '%'; return Done");
            return ResultS3::Done;
        }
        let logformat: LogFormat = match LogFormat::compile(spec) {
            Ok(val) => val,
            Err(err) => {
                defx!("return Err({})", err);
                return ResultS3::Err(err);
            }
        };
        if logformat.placeholders().next().is_none() {
            defx!("no placeholders; return Done");
            return ResultS3::Done;
        }
        defx!("return Found({} elements)", logformat.len());

        ResultS3::Found(logformat)
    }

    /// Compile `spec` into a `LogFormat`.
    pub fn compile(spec: &str) -> Result<LogFormat, FormatError> {
        defn!("({:?})", spec);
        let chars: Vec<char> = spec.chars().collect();
        let mut elements: FormatElements = FormatElements::with_capacity(chars.len() / 2 + 1);
        let mut separated: Vec<bool> = Vec::with_capacity(chars.len() / 2 + 1);
        let mut literal: String = String::new();
        let mut pending_space: bool = false;
        let mut open_double: bool = false;
        let mut open_single: bool = false;
        let mut open_brackets: usize = 0;

        // push `element`, first pushing any pending literal
        macro_rules! push_element {
            ($element:expr) => {{
                if !literal.is_empty() {
                    elements.push(FormatElement::Literal(std::mem::take(&mut literal)));
                    separated.push(pending_space);
                    pending_space = false;
                }
                elements.push($element);
                separated.push(pending_space);
                pending_space = false;
            }};
        }

        let mut at: usize = 0;
        while at < chars.len() {
            let c: char = chars[at];
            match c {
                c if c.is_whitespace() => {
                    if !literal.is_empty() {
                        elements.push(FormatElement::Literal(std::mem::take(&mut literal)));
                        separated.push(pending_space);
                    }
                    pending_space = !elements.is_empty();
                    at += 1;
                }
                '%' => {
                    if chars.get(at + 1) == Some(&'%') {
                        literal.push('%');
                        at += 2;
                        continue;
                    }
                    let (placeholder, next) = LogFormat::compile_placeholder(&chars, at)?;
                    defo!("placeholder {:?}", placeholder);
                    push_element!(FormatElement::Placeholder(placeholder));
                    at = next;
                }
                '"' => {
                    if open_double {
                        push_element!(FormatElement::ClosingEnclosure(Enclosure::DoubleQuote));
                    } else {
                        push_element!(FormatElement::OpeningEnclosure(Enclosure::DoubleQuote));
                    }
                    open_double = !open_double;
                    at += 1;
                }
                '\'' => {
                    if open_single {
                        push_element!(FormatElement::ClosingEnclosure(Enclosure::SingleQuote));
                    } else {
                        push_element!(FormatElement::OpeningEnclosure(Enclosure::SingleQuote));
                    }
                    open_single = !open_single;
                    at += 1;
                }
                '[' => {
                    push_element!(FormatElement::OpeningEnclosure(Enclosure::Bracket));
                    open_brackets += 1;
                    at += 1;
                }
                ']' => {
                    if open_brackets == 0 {
                        defx!("unbalanced ']'");
                        return Err(FormatError::new("closing bracket without opening bracket", fragment_at(&chars, at)));
                    }
                    push_element!(FormatElement::ClosingEnclosure(Enclosure::Bracket));
                    open_brackets -= 1;
                    at += 1;
                }
                _ => {
                    literal.push(c);
                    at += 1;
                }
            }
        }
        if !literal.is_empty() {
            elements.push(FormatElement::Literal(literal));
            separated.push(pending_space);
        }
        if open_double {
            defx!("unbalanced '\"'");
            return Err(FormatError::new("unbalanced double quotes", spec));
        }
        if open_single {
            defx!("unbalanced \"'\"");
            return Err(FormatError::new("unbalanced single quotes", spec));
        }
        if open_brackets != 0 {
            defx!("unbalanced '['");
            return Err(FormatError::new("unbalanced brackets", spec));
        }
        debug_assert_eq!(elements.len(), separated.len());

        let mut logformat = LogFormat {
            spec: spec.to_string(),
            elements,
            separated,
        };
        logformat.wrap_timestamps();
        logformat.check_property_names()?;
        defx!("return {} elements", logformat.len());

        Ok(logformat)
    }

    /// Compile the placeholder beginning with `%` at `chars[at]`.
    /// Returns the `Placeholder` and the index after it.
    fn compile_placeholder(
        chars: &[char],
        at: usize,
    ) -> Result<(Placeholder, usize), FormatError> {
        debug_assert_eq!(chars[at], '%');
        let mut next: usize = at + 1;
        let mut final_modifier: bool = false;
        // `<` and `>` modifiers
        while let Some(c) = chars.get(next) {
            match c {
                '>' => {
                    final_modifier = true;
                    next += 1;
                }
                '<' => next += 1,
                _ => break,
            }
        }
        let mut argument: Option<String> = None;
        if chars.get(next) == Some(&'{') {
            let close: usize = match chars[next..]
                .iter()
                .position(|c| *c == '}')
            {
                Some(i) => next + i,
                None => {
                    return Err(FormatError::new("unterminated placeholder argument", fragment_at(chars, at)));
                }
            };
            argument = Some(chars[next + 1..close].iter().collect());
            next = close + 1;
        }
        let letter: char = match chars.get(next) {
            Some(c) => *c,
            None => {
                return Err(FormatError::new("incomplete placeholder", fragment_at(chars, at)));
            }
        };
        next += 1;
        let token: String = chars[at..next].iter().collect();
        let (mut directive, needs_argument) = match Directive::from_letter(letter) {
            Some(val) => val,
            None => {
                return Err(FormatError::new("unknown placeholder", token));
            }
        };
        if needs_argument
            && argument
                .as_deref()
                .map_or(true, |a| a.trim().is_empty())
        {
            return Err(FormatError::new("placeholder requires a {name} argument", token));
        }
        if final_modifier && directive == Directive::Status {
            directive = Directive::FinalStatus;
        }

        Ok((Placeholder::new(directive, argument, token), next))
    }

    /// Wrap each bare `%t` that is not already within brackets with an
    /// opening and closing bracket.
    fn wrap_timestamps(&mut self) {
        let mut at: usize = 0;
        while at < self.elements.len() {
            let wrap: bool = match &self.elements[at] {
                FormatElement::Placeholder(p) if p.is_bare_timestamp() => {
                    let opened: bool = at > 0
                        && self.elements[at - 1] == FormatElement::OpeningEnclosure(Enclosure::Bracket)
                        && !self.separated[at];
                    let closed: bool = self.elements.get(at + 1)
                        == Some(&FormatElement::ClosingEnclosure(Enclosure::Bracket))
                        && !self.separated[at + 1];
                    !(opened && closed)
                }
                _ => false,
            };
            if !wrap {
                at += 1;
                continue;
            }
            defo!("wrap element {} in brackets", at);
            let sep: bool = self.separated[at];
            self.separated[at] = false;
            self.elements.insert(at, FormatElement::OpeningEnclosure(Enclosure::Bracket));
            self.separated.insert(at, sep);
            self.elements.insert(at + 2, FormatElement::ClosingEnclosure(Enclosure::Bracket));
            self.separated.insert(at + 2, false);
            at += 3;
        }
    }

    /// Each placeholder must produce a distinct property name.
    fn check_property_names(&self) -> Result<(), FormatError> {
        let mut names: HashSet<String> = HashSet::new();
        for placeholder in self.placeholders() {
            if !names.insert(placeholder.property_name()) {
                return Err(FormatError::new("duplicate field", placeholder.token()));
            }
        }

        Ok(())
    }

    /// The specification this format was compiled from.
    #[inline(always)]
    pub fn spec(&self) -> &str {
        self.spec.as_str()
    }

    #[inline(always)]
    pub fn elements(&self) -> &[FormatElement] {
        self.elements.as_slice()
    }

    /// Was the element at `index` preceded by whitespace?
    #[inline(always)]
    pub fn is_separated(
        &self,
        index: usize,
    ) -> bool {
        self.separated
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                FormatElement::Placeholder(p) => Some(p),
                _ => None,
            })
    }
}

/// Up to 12 chars of `chars` beginning at `at`, for error messages.
fn fragment_at(
    chars: &[char],
    at: usize,
) -> String {
    chars[at..]
        .iter()
        .take(12)
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Field, DelimitedFormat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Delimiters recognized in a delimited specification, in order of
/// preference.
pub const DELIMITERS: [char; 4] = [',', ';', '|', '\t'];

/// The declared type of a delimited [`Field`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldType {
    String,
    Int,
    Long,
    Float,
    Double,
    /// A date and time with its parse pattern.
    Time(DatePattern),
}

impl FieldType {
    /// Parse a type token like `long` or `time:yyyy-MM-dd`.
    /// An empty token is `String`.
    pub fn from_token(token: &str) -> Result<FieldType, FormatError> {
        let token_: &str = token.trim();
        let (keyword, pattern): (&str, Option<&str>) = match token_.split_once(':') {
            Some((k, p)) => (k.trim(), Some(p)),
            None => (token_, None),
        };
        let keyword_lower: String = keyword.to_ascii_lowercase();
        let field_type: FieldType = match (keyword_lower.as_str(), pattern) {
            ("" | "string", None) => FieldType::String,
            ("int", None) => FieldType::Int,
            ("long", None) => FieldType::Long,
            ("float", None) => FieldType::Float,
            ("double", None) => FieldType::Double,
            ("time", Some(pattern)) => match DatePattern::from_letters(pattern) {
                Ok(val) => FieldType::Time(val),
                Err(err) => {
                    return Err(FormatError::new(err, token_));
                }
            },
            ("time", None) => {
                return Err(FormatError::new("time type requires a date pattern", token_));
            }
            _ => {
                return Err(FormatError::new("unknown field type", token_));
            }
        };

        Ok(field_type)
    }

    pub const fn property_type(&self) -> PropertyType {
        match self {
            FieldType::String => PropertyType::String,
            FieldType::Int => PropertyType::Integer,
            FieldType::Long => PropertyType::Long,
            FieldType::Float => PropertyType::Float,
            FieldType::Double => PropertyType::Double,
            FieldType::Time(_) => PropertyType::Date,
        }
    }

    #[inline(always)]
    pub const fn is_time(&self) -> bool {
        matches!(self, FieldType::Time(_))
    }
}

/// One field descriptor of a [`DelimitedFormat`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    name: String,
    field_type: FieldType,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
    ) -> Field {
        Field {
            name: name.into(),
            field_type,
        }
    }

    /// The name given to a field with a blank name.
    /// `index` is 0-based, generated names are 1-based.
    pub fn generated_name(index: usize) -> String {
        format!("CSVField{:02}", index + 1)
    }

    /// Parse one descriptor `name`, `name(type)`, or `(type)`.
    pub fn from_descriptor(
        descriptor: &str,
        index: usize,
    ) -> Result<Field, FormatError> {
        let descriptor_: &str = descriptor.trim();
        let (name, field_type): (&str, FieldType) = match descriptor_.find('(') {
            Some(open) => {
                if !descriptor_.ends_with(')') {
                    return Err(FormatError::new("field type is missing closing ')'", descriptor_));
                }
                let type_token: &str = &descriptor_[open + 1..descriptor_.len() - 1];
                if type_token.contains('(') || type_token.contains(')') {
                    return Err(FormatError::new("malformed field descriptor", descriptor_));
                }
                (descriptor_[..open].trim(), FieldType::from_token(type_token)?)
            }
            None => {
                if descriptor_.contains(')') {
                    return Err(FormatError::new("malformed field descriptor", descriptor_));
                }
                (descriptor_, FieldType::String)
            }
        };
        let name: String = match name.is_empty() {
            true => Field::generated_name(index),
            false => name.to_string(),
        };

        Ok(Field::new(name, field_type))
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline(always)]
    pub const fn field_type(&self) -> &FieldType {
        &self.field_type
    }
}

/// Sequence of [`Field`].
pub type Fields = Vec<Field>;

/// A compiled delimited (CSV-like) format.
#[derive(Clone, Debug)]
pub struct DelimitedFormat {
    spec: String,
    delimiter: char,
    fields: Fields,
    /// Index of the first `Time` field, the event timestamp.
    timestamp_index: Option<usize>,
}

impl DelimitedFormat {
    /// Recognize and compile `spec`.
    ///
    /// A specification without any delimiter (outside of parentheses) is not
    /// shaped like a delimited format and returns `Done`.
    pub fn recognize(spec: &str) -> ResultS3Recognize<DelimitedFormat> {
        defn!("({:?})", spec);
        let delimiter: char = match DelimitedFormat::find_delimiter(spec) {
            Some(val) => val,
            None => {
                defx!("no delimiter; return Done");
                return ResultS3::Done;
            }
        };
        match DelimitedFormat::compile(spec, delimiter) {
            Ok(val) => {
                defx!("return Found({} fields)", val.fields.len());
                ResultS3::Found(val)
            }
            Err(err) => {
                defx!("return Err({})", err);
                ResultS3::Err(err)
            }
        }
    }

    /// The first of the [`DELIMITERS`] found in `spec` outside of
    /// parentheses.
    pub fn find_delimiter(spec: &str) -> Option<char> {
        let mut depth: usize = 0;
        for c in spec.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                c if depth == 0 && DELIMITERS.contains(&c) => {
                    return Some(c);
                }
                _ => {}
            }
        }

        None
    }

    /// Compile `spec` with fields separated by `delimiter`.
    pub fn compile(
        spec: &str,
        delimiter: char,
    ) -> Result<DelimitedFormat, FormatError> {
        defn!("({:?}, {:?})", spec, delimiter);
        // split on `delimiter` outside of parentheses
        let mut descriptors: Vec<String> = Vec::new();
        let mut current: String = String::new();
        let mut depth: usize = 0;
        for c in spec.chars() {
            match c {
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    if depth == 0 {
                        return Err(FormatError::new("unbalanced parentheses", current + ")"));
                    }
                    depth -= 1;
                    current.push(c);
                }
                c if c == delimiter && depth == 0 => {
                    descriptors.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }
        if depth != 0 {
            return Err(FormatError::new("unbalanced parentheses", current));
        }
        descriptors.push(current);
        // the specification may end with a delimiter
        if descriptors.len() > 1
            && descriptors
                .last()
                .map_or(false, |d| d.trim().is_empty())
        {
            descriptors.pop();
        }
        defo!("descriptors {:?}", descriptors);

        let mut fields: Fields = Fields::with_capacity(descriptors.len());
        let mut names: HashSet<String> = HashSet::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            let field: Field = Field::from_descriptor(descriptor, index)?;
            if !names.insert(field.name().to_string()) {
                return Err(FormatError::new("duplicate field", descriptor.trim()));
            }
            fields.push(field);
        }
        let timestamp_index: Option<usize> = fields
            .iter()
            .position(|f| f.field_type().is_time());
        defx!("{} fields, timestamp_index {:?}", fields.len(), timestamp_index);

        Ok(DelimitedFormat {
            spec: spec.to_string(),
            delimiter,
            fields,
            timestamp_index,
        })
    }

    #[inline(always)]
    pub fn spec(&self) -> &str {
        self.spec.as_str()
    }

    #[inline(always)]
    pub const fn delimiter(&self) -> char {
        self.delimiter
    }

    #[inline(always)]
    pub fn fields(&self) -> &[Field] {
        self.fields.as_slice()
    }

    #[inline(always)]
    pub const fn timestamp_index(&self) -> Option<usize> {
        self.timestamp_index
    }
}
