// src/tests/common.rs

//! Common test helpers, constants, and sample data.

#![allow(non_upper_case_globals)]

use crate::common::{EpochMillis, LineNumber};
use crate::data::datetime::{utc_offset, FixedOffset};
use crate::data::event::{Event, GenericEvent};
use crate::data::property::PropertyValue;
use crate::pipeline::initiator::SourceBox;

use std::io::Cursor;

use ::lazy_static::lazy_static;

/// The Apache "combined" log format.
pub const FORMAT_COMBINED: &str = r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-Agent}i""#;

/// A line matching [`FORMAT_COMBINED`].
pub const LINE_COMBINED: &str = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;

/// Epoch milliseconds of `10/Oct/2000:13:55:36 -0700`.
pub const LINE_COMBINED_MILLIS: EpochMillis = 971211336000;

/// Epoch milliseconds of `2000-01-02 03:04:05` at UTC.
pub const MILLIS_20000102_030405: EpochMillis = 946782245000;

/// A Chrome on Windows user-agent.
pub const UA_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A Safari on iPhone user-agent.
pub const UA_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

lazy_static! {
    /// UTC
    pub static ref FO_Z: FixedOffset = utc_offset();
    /// +01:00
    pub static ref FO_P1: FixedOffset = FixedOffset::east_opt(3600).unwrap();
    /// -07:00
    pub static ref FO_M7: FixedOffset = FixedOffset::west_opt(7 * 3600).unwrap();
}

/// A byte source over `data`.
pub fn source_from(data: &[u8]) -> SourceBox {
    Box::new(Cursor::new(data.to_vec()))
}

/// The line number and text of a `Line` event.
pub fn line_of(event: &Event) -> Option<(LineNumber, &str)> {
    match event {
        Event::Line(line) => Some((line.line_number(), line.text())),
        _ => None,
    }
}

/// The `Generic` event within `event`; panics otherwise.
pub fn generic_of(event: &Event) -> &GenericEvent {
    match event {
        Event::Generic(generic) => generic,
        _ => panic!("expected a Generic event, found {}", event),
    }
}

/// The value of property `name` of `generic`; panics if there is no such
/// property.
pub fn value_of<'a>(
    generic: &'a GenericEvent,
    name: &str,
) -> Option<&'a PropertyValue> {
    match generic.property(name) {
        Some(property) => property.value(),
        None => panic!("no property {:?} in {:?}", name, generic),
    }
}

/// Count of `EndOfStream` in `events`.
pub fn count_end_of_stream(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| e.is_end_of_stream())
        .count()
}
