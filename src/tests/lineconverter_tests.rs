// src/tests/lineconverter_tests.rs

//! tests for `src/readers/lineconverter.rs`

#![allow(non_snake_case)]

use crate::common::LineNumber;
use crate::data::event::Event;
use crate::readers::lineconverter::{ConverterError, LineConverter, END_OF_STREAM};
use crate::tests::common::{count_end_of_stream, line_of};

use ::more_asserts::assert_le;
use ::test_case::test_case;

/// Feed each of `data` then the end of the stream, draining after each.
fn convert(data: &[u8]) -> Vec<Event> {
    let mut converter = LineConverter::new();
    let mut events: Vec<Event> = Vec::new();
    for byte in data.iter() {
        converter.process(*byte as i32).unwrap();
        events.extend(converter.drain());
    }
    converter.process(END_OF_STREAM).unwrap();
    events.extend(converter.drain());
    assert!(converter.is_closed());

    events
}

/// The `(line number, text)` of each `Line` event.
fn lines(events: &[Event]) -> Vec<(LineNumber, String)> {
    events
        .iter()
        .filter_map(line_of)
        .map(|(ln, text)| (ln, text.to_string()))
        .collect()
}

#[test]
fn test_convert_hello() {
    let events = convert(b"hello\n");
    assert_eq!(events.len(), 2, "{:?}", events);
    assert_eq!(line_of(&events[0]), Some((1, "hello")));
    assert!(events[1].is_end_of_stream());
}

#[test]
fn test_convert_empty() {
    let events = convert(b"");
    assert_eq!(events.len(), 1, "{:?}", events);
    assert!(events[0].is_end_of_stream());
}

#[test]
fn test_convert_h_no_newline() {
    let events = convert(b"h");
    assert_eq!(events.len(), 2, "{:?}", events);
    assert_eq!(line_of(&events[0]), Some((1, "h")));
    assert!(events[1].is_end_of_stream());
}

#[test]
fn test_convert_empty_lines() {
    let events = convert(b"\n\n");
    assert_eq!(lines(&events), vec![(1, String::new()), (2, String::new())]);
    assert_eq!(count_end_of_stream(&events), 1);
}

#[test]
fn test_convert_crlf() {
    let events = convert(b"a\r\nb\r\n");
    assert_eq!(lines(&events), vec![(1, String::from("a")), (2, String::from("b"))]);
}

#[test]
fn test_convert_bare_cr_swallowed() {
    let events = convert(b"a\rb\n");
    assert_eq!(lines(&events), vec![(1, String::from("ab"))]);
}

#[test]
fn test_convert_latin1() {
    let events = convert(&[b'c', 0xE9, b'\n']);
    assert_eq!(lines(&events), vec![(1, String::from("cé"))]);
}

#[test]
fn test_drain_after_each_byte() {
    let mut converter = LineConverter::new();
    converter.process_u8(b'a').unwrap();
    assert_eq!(converter.drain().count(), 0);
    converter.process_u8(b'\n').unwrap();
    let events: Vec<Event> = converter.drain().collect();
    assert_eq!(events.len(), 1);
    assert_eq!(converter.drain().count(), 0, "drain is not restartable");
    assert_eq!(converter.line_number(), 2);
    assert_eq!(converter.count_bytes(), 2);
    assert_eq!(converter.count_lines(), 1);
}

#[test_case(b"" ; "empty")]
#[test_case(b"\n" ; "newline")]
#[test_case(b"abc" ; "no newline")]
#[test_case(b"abc\n" ; "newline terminated")]
#[test_case(b"a\n\nb\n\n" ; "blank lines")]
#[test_case(b"a\r\nb\rc\n" ; "carriage returns")]
#[test_case(b"one two\nthree\tfour\nfive" ; "mixed")]
fn test_convert_reconstructs(data: &[u8]) {
    let events = convert(data);
    assert_eq!(count_end_of_stream(&events), 1);
    assert!(events.last().unwrap().is_end_of_stream(), "EndOfStream must be last");

    let texts: Vec<String> = lines(&events)
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    let joined: String = texts.join("\n");
    let expect: String = String::from_utf8(data.to_vec())
        .unwrap()
        .replace('\r', "");
    let expect: &str = expect.strip_suffix('\n').unwrap_or(expect.as_str());
    assert_eq!(joined, expect);

    // line numbers are consecutive from 1
    for (i, (ln, _)) in lines(&events).iter().enumerate() {
        assert_eq!(*ln, i as LineNumber + 1);
    }
    assert_le!(texts.len(), data.len() + 1);
}

#[test]
fn test_process_after_closed() {
    let mut converter = LineConverter::new();
    converter.process(END_OF_STREAM).unwrap();
    assert_eq!(converter.process(b'a' as i32), Err(ConverterError::Closed));
    assert_eq!(converter.process(END_OF_STREAM), Err(ConverterError::Closed));
    assert_eq!(converter.process_u8(b'\n'), Err(ConverterError::Closed));
}

#[test_case(256)]
#[test_case(-2)]
#[test_case(i32::MAX)]
fn test_process_out_of_range(value: i32) {
    let mut converter = LineConverter::new();
    assert_eq!(converter.process(value), Err(ConverterError::OutOfRange(value)));
    assert!(!converter.is_closed());
    assert_eq!(converter.count_bytes(), 0);
}

#[test]
fn test_default_line_number() {
    let converter = LineConverter::default();
    assert_eq!(converter.line_number(), 1);
}
