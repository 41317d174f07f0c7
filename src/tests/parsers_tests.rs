// src/tests/parsers_tests.rs

//! tests for `src/parsers/mod.rs`

#![allow(non_snake_case)]

use crate::common::LineIndex;
use crate::data::format::FormatError;
use crate::parsers::{
    recognize_delimited,
    recognize_log,
    LineParser,
    LineParserFactory,
    LineParserP,
    ParserKind,
    ParsingError,
    RECOGNIZERS,
};
use crate::tests::common::{generic_of, FORMAT_COMBINED, FO_P1, FO_Z, LINE_COMBINED, MILLIS_20000102_030405};

use ::test_case::test_case;

fn resolve(spec: &str) -> Result<Option<LineParserP>, FormatError> {
    LineParserFactory::default().resolve(spec)
}

#[test_case(FORMAT_COMBINED, ParserKind::Log; "combined")]
#[test_case("%h %u", ParserKind::Log)]
#[test_case("%h, %u", ParserKind::Log; "log wins over delimited")]
#[test_case("a, b", ParserKind::Delimited)]
#[test_case("a;b;c", ParserKind::Delimited)]
#[test_case("host, when(time:yyyy-MM-dd)", ParserKind::Delimited; "typed")]
fn test_LineParserFactory_resolve(
    spec: &str,
    kind: ParserKind,
) {
    let parser = resolve(spec).unwrap().unwrap();
    assert_eq!(parser.kind(), kind);
}

#[test_case("plain text")]
#[test_case("")]
#[test_case("100%% sure")]
fn test_LineParserFactory_resolve_none(spec: &str) {
    assert!(resolve(spec).unwrap().is_none());
}

#[test_case("%h %Z", "%Z"; "unknown placeholder")]
#[test_case(r#"%h "%r"#, r#"%h "%r"#; "unbalanced quote")]
#[test_case("a(bogus), b", "bogus"; "unknown delimited type")]
fn test_LineParserFactory_resolve_error(
    spec: &str,
    fragment: &str,
) {
    let err = resolve(spec).unwrap_err();
    assert_eq!(err.fragment(), fragment, "{}", err);
}

#[test]
fn test_LineParserFactory_parses() {
    let parser = resolve(FORMAT_COMBINED).unwrap().unwrap();
    let event = parser.parse_line(1, LINE_COMBINED).unwrap();
    assert_eq!(generic_of(&event).count_properties(), 9);
    let err: ParsingError = parser.parse_line(2, "garbage").unwrap_err();
    assert_eq!(err.line_number(), 2);
}

#[test]
fn test_LineParserFactory_tz_offset() {
    let spec = "%{%Y-%m-%d %H:%M:%S}t %h";
    let line = "2000-01-02 03:04:05 host";
    let utc = LineParserFactory::new(*FO_Z)
        .resolve(spec)
        .unwrap()
        .unwrap();
    let p1 = LineParserFactory::new(*FO_P1)
        .resolve(spec)
        .unwrap()
        .unwrap();
    let e_utc = utc.parse_line(1, line).unwrap();
    let e_p1 = p1.parse_line(1, line).unwrap();
    assert_eq!(generic_of(&e_utc).timestamp(), Some(MILLIS_20000102_030405));
    assert_eq!(generic_of(&e_p1).timestamp(), Some(MILLIS_20000102_030405 - 3600 * 1000));
}

#[test]
fn test_RECOGNIZERS_order() {
    let kinds: Vec<ParserKind> = RECOGNIZERS
        .iter()
        .map(|(kind, _)| *kind)
        .collect();
    assert_eq!(kinds, vec![ParserKind::Log, ParserKind::Delimited]);
}

#[test]
fn test_recognizers_done() {
    assert!(recognize_log("a, b", &FO_Z).is_done());
    assert!(recognize_delimited("plain", &FO_Z).is_done());
    assert!(recognize_delimited("a, b", &FO_Z).is_found());
}

#[test]
fn test_ParsingError_display() {
    let err = ParsingError::new(3, 14, "bad");
    assert_eq!(err.to_string(), "line 3 column 14: bad");
    assert_eq!(err.message(), "bad");
}

#[test_case("host x", 5, 5; "ascii")]
#[test_case("\u{e9} x", 3, 2; "one high byte")]
#[test_case("\u{e9}\u{ff}", 4, 2; "end of line")]
#[test_case("ab", 9, 2; "past end of line")]
fn test_ParsingError_into_char_column(
    text: &str,
    column: LineIndex,
    expect: LineIndex,
) {
    let err = ParsingError::new(1, column, "bad").into_char_column(text);
    assert_eq!(err.column(), expect);
    assert_eq!(err.line_number(), 1);
    assert_eq!(err.message(), "bad");
}
