// tests/pipeline_tests.rs

//! Run the whole pipeline, and the `logpipe` binary, over temporary files.

#![allow(non_snake_case)]

extern crate logpipelib;

use logpipelib::data::event::Event;
use logpipelib::data::property::PropertyValue;
use logpipelib::parsers::LineParserFactory;
use logpipelib::pipeline::initiator::SourceBox;
use logpipelib::pipeline::queue::QUEUE_CAPACITY;
use logpipelib::pipeline::terminator::CollectingSink;
use logpipelib::pipeline::transforms::LineParsingTransform;
use logpipelib::pipeline::Pipeline;

use std::fs::File;
use std::io::Write;
use std::process::{Command, Output};

extern crate more_asserts;
use more_asserts::assert_ge;

extern crate tempfile;
use tempfile::NamedTempFile;

const FORMAT_COMMON: &str = r#"%h %l %u %t "%r" %>s %b"#;

const LINES_COMMON: &str = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326
10.0.0.2 - - [10/Oct/2000:13:55:37 -0700] "POST /form HTTP/1.1" 302 -
not a log line
"#;

fn create_temp_file(data: &str) -> NamedTempFile {
    let mut ntf = NamedTempFile::new().unwrap();
    ntf.write_all(data.as_bytes()).unwrap();
    ntf.flush().unwrap();

    ntf
}

fn run_file(
    format: &str,
    data: &str,
) -> Vec<Event> {
    let ntf = create_temp_file(data);
    let source: SourceBox = Box::new(File::open(ntf.path()).unwrap());
    let parser = LineParserFactory::default()
        .resolve(format)
        .unwrap()
        .unwrap();
    let sink = CollectingSink::new();
    let events = sink.events();
    let mut pipeline = Pipeline::new(
        source,
        vec![Box::new(LineParsingTransform::new(parser))],
        Box::new(sink),
        QUEUE_CAPACITY,
    );
    pipeline.run().unwrap();

    let events = events.lock().unwrap().clone();
    events
}

#[test]
fn test_pipeline_file_common() {
    let events = run_file(FORMAT_COMMON, LINES_COMMON);
    assert_eq!(events.len(), 4, "{:?}", events);
    match &events[0] {
        Event::Generic(generic) => {
            assert_eq!(generic.line_number(), Some(1));
            assert_eq!(generic.property("finalStatus").unwrap().value(), Some(&PropertyValue::Integer(200)));
            assert_eq!(generic.timestamp(), Some(971211336000));
        }
        event => panic!("expected a Generic event, found {}", event),
    }
    match &events[1] {
        Event::Generic(generic) => {
            assert!(generic.property("remoteUser").unwrap().is_null());
            assert!(generic.property("bytesSent").unwrap().is_null());
            assert_eq!(generic.timestamp(), Some(971211337000));
        }
        event => panic!("expected a Generic event, found {}", event),
    }
    assert!(events[2].is_fault(), "{}", events[2]);
    assert_eq!(events[2].line_number(), Some(3));
    assert!(events[3].is_end_of_stream());
}

#[test]
fn test_pipeline_file_delimited_crlf() {
    let events = run_file("host, size(long), when(time:yyyy-MM-dd HH:mm:ss)", "h1, 10, 2000-01-02 03:04:05\r\nh2, 11, \r\n");
    assert_eq!(events.len(), 3, "{:?}", events);
    match (&events[0], &events[1]) {
        (Event::Generic(g1), Event::Generic(g2)) => {
            assert_eq!(g1.property("size").unwrap().value(), Some(&PropertyValue::Long(10)));
            assert_eq!(g1.timestamp(), Some(946782245000));
            assert_eq!(g2.property("host").unwrap().value(), Some(&PropertyValue::String(String::from("h2"))));
            assert_eq!(g2.timestamp(), None);
        }
        events => panic!("expected two Generic events, found {:?}", events),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// logpipe binary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn run_logpipe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logpipe"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_logpipe_file() {
    let ntf = create_temp_file(LINES_COMMON);
    let path: &str = ntf.path().to_str().unwrap();
    let output = run_logpipe(&["--color", "never", "--summary", "-f", FORMAT_COMMON, path]);
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "{:?}", lines);
    assert!(lines[0].starts_with("remoteHost=127.0.0.1\tremoteLogname=\tremoteUser=frank\t"), "{:?}", lines[0]);
    assert!(lines[2].starts_with("FAULT: line 3"), "{:?}", lines[2]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("events parsed   : 2"), "{}", stderr);
}

#[test]
fn test_logpipe_unknown_format() {
    let ntf = create_temp_file(LINES_COMMON);
    let path: &str = ntf.path().to_str().unwrap();
    let output = run_logpipe(&["-f", "plain text", path]);
    assert_eq!(output.status.code(), Some(1));
    assert_ge!(output.stderr.len(), 1);
}

#[test]
fn test_logpipe_malformed_format() {
    let output = run_logpipe(&["-f", "%h %Z", "-"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("%Z"), "{}", stderr);
}

#[test]
fn test_logpipe_missing_file() {
    let output = run_logpipe(&["-f", FORMAT_COMMON, "/nonexistent/logpipe/file.log"]);
    assert_eq!(output.status.code(), Some(1));
}
