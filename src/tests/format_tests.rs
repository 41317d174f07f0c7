// src/tests/format_tests.rs

//! tests for `src/data/format.rs`

#![allow(non_snake_case)]

use crate::common::ResultS3;
use crate::data::format::{
    DelimitedFormat,
    Directive,
    Enclosure,
    Field,
    FieldType,
    FormatElement,
    LogFormat,
    Placeholder,
};
use crate::data::property::PropertyType;
use crate::tests::common::FORMAT_COMBINED;

use ::test_case::test_case;

/// The placeholder of `element`; panics otherwise.
fn placeholder_of(element: &FormatElement) -> &Placeholder {
    match element {
        FormatElement::Placeholder(p) => p,
        _ => panic!("expected a Placeholder, found {:?}", element),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogFormat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_LogFormat_bracketed_timestamp() {
    let logformat = LogFormat::compile("[%t] %h").unwrap();
    let elements = logformat.elements();
    assert_eq!(elements.len(), 4, "{:?}", elements);
    assert_eq!(elements[0], FormatElement::OpeningEnclosure(Enclosure::Bracket));
    assert_eq!(placeholder_of(&elements[1]).directive(), Directive::Timestamp);
    assert_eq!(elements[2], FormatElement::ClosingEnclosure(Enclosure::Bracket));
    assert_eq!(placeholder_of(&elements[3]).directive(), Directive::RemoteHost);
    assert!(!logformat.is_separated(1));
    assert!(!logformat.is_separated(2));
    assert!(logformat.is_separated(3));
}

#[test]
fn test_LogFormat_bare_timestamp_wrapped() {
    let logformat = LogFormat::compile("%h %t").unwrap();
    let elements = logformat.elements();
    assert_eq!(elements.len(), 4, "{:?}", elements);
    assert_eq!(placeholder_of(&elements[0]).directive(), Directive::RemoteHost);
    assert_eq!(elements[1], FormatElement::OpeningEnclosure(Enclosure::Bracket));
    assert_eq!(placeholder_of(&elements[2]).directive(), Directive::Timestamp);
    assert_eq!(elements[3], FormatElement::ClosingEnclosure(Enclosure::Bracket));
    // the separator moves to the inserted bracket
    assert!(logformat.is_separated(1));
    assert!(!logformat.is_separated(2));
    assert!(!logformat.is_separated(3));
}

#[test]
fn test_LogFormat_pattern_timestamp_not_wrapped() {
    let logformat = LogFormat::compile("%{%Y-%m-%d %H:%M:%S}t %h").unwrap();
    assert_eq!(logformat.len(), 2);
    let p = placeholder_of(&logformat.elements()[0]);
    assert!(p.is_timestamp());
    assert!(!p.is_bare_timestamp());
    assert_eq!(p.argument(), Some("%Y-%m-%d %H:%M:%S"));
}

#[test]
fn test_LogFormat_combined() {
    let logformat = LogFormat::compile(FORMAT_COMBINED).unwrap();
    let names: Vec<String> = logformat
        .placeholders()
        .map(|p| p.property_name())
        .collect();
    assert_eq!(
        names,
        vec![
            "remoteHost",
            "remoteLogname",
            "remoteUser",
            "timestamp",
            "firstRequestLine",
            "finalStatus",
            "bytesSent",
            "Referer",
            "User-Agent",
        ]
    );
    assert_eq!(logformat.spec(), FORMAT_COMBINED);
    // 9 placeholders, 2 inserted brackets, 3 pairs of quotes
    assert_eq!(logformat.len(), 9 + 2 + 6);
}

#[test]
fn test_LogFormat_literals() {
    let logformat = LogFormat::compile("%h - %u 100%% done").unwrap();
    let elements = logformat.elements();
    assert_eq!(elements[1], FormatElement::Literal(String::from("-")));
    assert_eq!(elements[3], FormatElement::Literal(String::from("100%")));
    assert_eq!(elements[4], FormatElement::Literal(String::from("done")));
}

#[test_case("%s", Directive::Status, PropertyType::Integer)]
#[test_case("%>s", Directive::FinalStatus, PropertyType::Integer)]
#[test_case("%<s", Directive::Status, PropertyType::Integer)]
#[test_case("%b", Directive::BytesSent, PropertyType::Long)]
#[test_case("%D", Directive::TimeTakenMicros, PropertyType::Long)]
#[test_case("%T", Directive::TimeTakenSeconds, PropertyType::Integer)]
#[test_case("%q", Directive::QueryString, PropertyType::Map)]
#[test_case("%{Cookie}i", Directive::RequestHeader, PropertyType::Map)]
#[test_case("%{Set-Cookie}o", Directive::ResponseHeader, PropertyType::Map)]
#[test_case("%{Referer}i", Directive::RequestHeader, PropertyType::String)]
#[test_case("%{session}C", Directive::Cookie, PropertyType::String)]
#[test_case("%{HOME}e", Directive::Environment, PropertyType::String)]
fn test_Placeholder_directive_type(
    spec: &str,
    directive: Directive,
    property_type: PropertyType,
) {
    let logformat = LogFormat::compile(spec).unwrap();
    let p = placeholder_of(&logformat.elements()[0]);
    assert_eq!(p.directive(), directive);
    assert_eq!(p.property_type(), property_type);
    assert_eq!(p.token(), spec);
}

#[test_case(r#"%h "%r"#, r#"%h "%r"#; "unbalanced double quote")]
#[test_case(r#"%h '%u"#, r#"%h '%u"#; "unbalanced single quote")]
#[test_case("[%h", "[%h"; "unbalanced open bracket")]
#[test_case("%h]", "]"; "unbalanced close bracket")]
#[test_case("%h %Z", "%Z"; "unknown placeholder")]
#[test_case("%h %h", "%h"; "duplicate")]
#[test_case("%h %{Referer", "%{Referer"; "unterminated argument")]
#[test_case("%h %i", "%i"; "missing argument")]
#[test_case("%h %", "%"; "incomplete")]
fn test_LogFormat_compile_error(
    spec: &str,
    fragment: &str,
) {
    let err = LogFormat::compile(spec).unwrap_err();
    assert_eq!(err.fragment(), fragment, "{}", err);
}

#[test]
fn test_LogFormat_recognize() {
    assert!(LogFormat::recognize("%h %u").is_found());
    assert!(LogFormat::recognize("a, b, c").is_done());
    assert!(LogFormat::recognize("100%% literal").is_done(), "no placeholders");
    match LogFormat::recognize("%h %Z") {
        ResultS3::Err(err) => assert_eq!(err.fragment(), "%Z"),
        _ => panic!("expected Err"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DelimitedFormat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case("a, b, c", Some(','))]
#[test_case("a; b, c", Some(';'))]
#[test_case("a|b", Some('|'))]
#[test_case("a\tb", Some('\t'))]
#[test_case("t(time:yyyy, MM), b;", Some(','))]
#[test_case("t(time:yyyy,MM)", None; "only within parentheses")]
#[test_case("abc", None)]
fn test_DelimitedFormat_find_delimiter(
    spec: &str,
    expect: Option<char>,
) {
    assert_eq!(DelimitedFormat::find_delimiter(spec), expect);
}

#[test]
fn test_DelimitedFormat_fields() {
    let format = match DelimitedFormat::recognize("a, b, c") {
        ResultS3::Found(val) => val,
        _ => panic!("expected Found"),
    };
    assert_eq!(format.delimiter(), ',');
    let names: Vec<&str> = format
        .fields()
        .iter()
        .map(|f| f.name())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(format.timestamp_index(), None);
}

#[test]
fn test_DelimitedFormat_types_trailing_delimiter() {
    let format = DelimitedFormat::compile("host, size(long), when(time:yyyy-MM-dd HH:mm:ss), (int),", ',').unwrap();
    let fields: &[Field] = format.fields();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0].field_type(), &FieldType::String);
    assert_eq!(fields[1].field_type(), &FieldType::Long);
    assert!(fields[2].field_type().is_time());
    assert_eq!(fields[3].name(), "CSVField04");
    assert_eq!(fields[3].field_type(), &FieldType::Int);
    assert_eq!(format.timestamp_index(), Some(2));
}

#[test_case("a(bogus), b", "bogus"; "unknown type")]
#[test_case("a(time), b", "time"; "time without pattern")]
#[test_case("a, a", "a"; "duplicate")]
#[test_case("a(int, b", "a(int, b"; "unbalanced")]
#[test_case("a(int)), b", "a(int))"; "extra close")]
fn test_DelimitedFormat_compile_error(
    spec: &str,
    fragment: &str,
) {
    let err = DelimitedFormat::compile(spec, ',').unwrap_err();
    assert_eq!(err.fragment(), fragment, "{}", err);
}

#[test]
fn test_DelimitedFormat_recognize_done() {
    assert!(DelimitedFormat::recognize("no delimiter here").is_done());
}

#[test_case("", FieldType::String)]
#[test_case("string", FieldType::String)]
#[test_case("LONG", FieldType::Long)]
#[test_case(" int ", FieldType::Int)]
#[test_case("float", FieldType::Float)]
#[test_case("double", FieldType::Double)]
fn test_FieldType_from_token(
    token: &str,
    expect: FieldType,
) {
    assert_eq!(FieldType::from_token(token).unwrap(), expect);
}

#[test]
fn test_Field_generated_name() {
    assert_eq!(Field::generated_name(0), "CSVField01");
    assert_eq!(Field::generated_name(11), "CSVField12");
}
