// src/tests/common_tests.rs

//! tests for `src/common.rs` and `src/debug/printers.rs`

#![allow(non_snake_case)]

use crate::common::ResultS3;
use crate::debug::printers::{char_to_char_noraw, excerpt, str_to_String_noraw};

use ::test_case::test_case;

type ResultS3_test = ResultS3<usize, String>;

#[test]
fn test_ResultS3_Found() {
    let r: ResultS3_test = ResultS3::Found(3);
    assert!(r.is_ok());
    assert!(r.is_found());
    assert!(!r.is_done());
    assert!(!r.is_err());
    assert_eq!(r.to_string(), "ResultS3::Found");
    assert_eq!(r.ok(), Some(3));
}

#[test]
fn test_ResultS3_Done() {
    let r: ResultS3_test = ResultS3::Done;
    assert!(r.is_ok());
    assert!(r.is_done());
    assert!(!r.is_found());
    assert_eq!(r.ok(), None);
}

#[test]
fn test_ResultS3_Err() {
    let r: ResultS3_test = ResultS3::Err(String::from("bad"));
    assert!(r.is_err());
    assert!(!r.is_ok());
    assert_eq!(r.to_string(), "ResultS3::Err(bad)");
    assert_eq!(r.err(), Some(String::from("bad")));
}

#[test_case('\n', '␊')]
#[test_case('\r', '␍')]
#[test_case('\t', '␉')]
#[test_case('a', 'a')]
fn test_char_to_char_noraw(
    c: char,
    expect: char,
) {
    assert_eq!(char_to_char_noraw(c), expect);
}

#[test]
fn test_str_to_String_noraw() {
    assert_eq!(str_to_String_noraw("a\r\nb"), "a␍␊b");
}

#[test_case("abcdef", 2, 3, "cde…")]
#[test_case("abcdef", 0, 6, "abcdef")]
#[test_case("ab\n", 0, 10, "ab␊")]
#[test_case("ab", 5, 10, ""; "past the end")]
fn test_excerpt(
    text: &str,
    at: usize,
    max: usize,
    expect: &str,
) {
    assert_eq!(excerpt(text, at, max), expect);
}
