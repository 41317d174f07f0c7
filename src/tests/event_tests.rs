// src/tests/event_tests.rs

//! tests for `src/data/event.rs`

#![allow(non_snake_case)]

use crate::data::event::{Event, FaultEvent, GenericEvent};
use crate::data::property::{Property, PropertyType, PropertyValue};
use crate::parsers::ParsingError;

use std::sync::Arc;

#[test]
fn test_Event_line() {
    let event = Event::line(3, "text");
    assert_eq!(event.line_number(), Some(3));
    assert!(!event.is_end_of_stream());
    assert!(!event.is_fault());
    assert_eq!(event.to_string(), r#"Line(3, "text")"#);
}

#[test]
fn test_Event_EndOfStream() {
    let event = Event::EndOfStream;
    assert!(event.is_end_of_stream());
    assert_eq!(event.line_number(), None);
}

#[test]
fn test_FaultEvent_display() {
    assert_eq!(FaultEvent::new("m").to_string(), "m");
    assert_eq!(FaultEvent::new("m").at(3, None).to_string(), "line 3: m");
    assert_eq!(FaultEvent::new("m").at(3, Some(4)).to_string(), "line 3 column 4: m");
}

#[test]
fn test_FaultEvent_cause() {
    let err = ParsingError::new(5, 6, "bad field");
    let fault = FaultEvent::new(err.message())
        .at(err.line_number(), Some(err.column()))
        .caused_by(Arc::new(err.clone()));
    assert_eq!(fault.line_number(), Some(5));
    assert_eq!(fault.column(), Some(6));
    assert_eq!(fault.message(), "bad field");
    assert_eq!(fault.cause().map(|c| c.to_string()), Some(err.to_string()));

    let event = Event::Fault(fault);
    assert!(event.is_fault());
    assert_eq!(event.line_number(), Some(5));
}

#[test]
fn test_GenericEvent_add_property_unique() {
    let mut generic = GenericEvent::new(Some(1));
    assert!(generic.add_property(Property::string("a", "1")));
    assert!(!generic.add_property(Property::string("a", "2")), "duplicate name must be refused");
    assert_eq!(generic.count_properties(), 1);
    assert_eq!(
        generic.property("a").and_then(|p| p.value()),
        Some(&PropertyValue::String(String::from("1")))
    );
}

#[test]
fn test_GenericEvent_order() {
    let mut generic = GenericEvent::new(None);
    generic.add_property(Property::string("c", "1"));
    generic.add_property(Property::null("a", PropertyType::Long));
    generic.add_property(Property::string("b", "2"));
    let names: Vec<&str> = generic
        .properties()
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(names, vec!["c", "a", "b"], "insertion order");
    let sorted: Vec<String> = generic
        .properties_sorted()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(sorted, vec!["a", "b", "c"]);
    // the event itself is unchanged
    assert_eq!(generic.properties()[0].name(), "c");
}

#[test]
fn test_GenericEvent_timestamp() {
    let mut generic = GenericEvent::new(Some(2));
    assert_eq!(generic.timestamp(), None);
    generic.set_timestamp(1234);
    assert_eq!(generic.timestamp(), Some(1234));
    assert_eq!(Event::Generic(generic).line_number(), Some(2));
}
