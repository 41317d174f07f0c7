// src/tests/printers_tests.rs

//! tests for `src/printer/printers.rs`

#![allow(non_snake_case)]

use crate::data::event::{Event, FaultEvent, GenericEvent};
use crate::data::property::{Property, PropertyType};
use crate::pipeline::terminator::EventSink;
use crate::printer::printers::PrinterEvent;

use ::termcolor::Buffer;
use ::test_case::test_case;

fn new_PrinterEvent() -> PrinterEvent<Buffer> {
    PrinterEvent::new(Buffer::no_color(), false)
}

fn output(printer: PrinterEvent<Buffer>) -> String {
    String::from_utf8(printer.into_inner().as_slice().to_vec()).unwrap()
}

fn generic_ab() -> Event {
    let mut generic = GenericEvent::new(Some(1));
    generic.add_property(Property::string("a", "1"));
    generic.add_property(Property::null("b", PropertyType::Long));

    Event::Generic(generic)
}

#[test_case(Event::line(1, "x"), "x\n"; "line")]
#[test_case(generic_ab(), "a=1\tb=\n"; "generic")]
#[test_case(Event::Generic(GenericEvent::new(None)), "\n"; "generic empty")]
#[test_case(Event::Fault(FaultEvent::new("m").at(3, Some(4))), "FAULT: line 3 column 4: m\n"; "fault")]
#[test_case(Event::fault("m"), "FAULT: m\n"; "fault without location")]
#[test_case(Event::EndOfStream, ""; "end of stream")]
fn test_print_event(
    event: Event,
    expect: &str,
) {
    let mut printer = new_PrinterEvent();
    printer.print_event(&event).unwrap();
    printer.flush().unwrap();
    assert_eq!(output(printer), expect);
}

#[test]
fn test_print_color() {
    let mut printer = PrinterEvent::new(Buffer::ansi(), true);
    printer.print_event(&generic_ab()).unwrap();
    printer.flush().unwrap();
    let out: String = output(printer);
    assert!(out.contains("\x1b["), "{:?}", out);
    assert!(out.contains("a="), "{:?}", out);
}

#[test]
fn test_EventSink_summary() {
    let mut printer = new_PrinterEvent();
    let summaryp = printer.summary();
    for event in [
        Event::line(1, "x"),
        generic_ab(),
        Event::fault("m"),
        Event::EndOfStream,
    ] {
        printer.write_event(event).unwrap();
    }
    printer.finish().unwrap();
    let summary = summaryp.lock().unwrap();
    assert_eq!(summary.count_lines, 1);
    assert_eq!(summary.count_generic, 1);
    assert_eq!(summary.count_faults, 1);
    assert_eq!(summary.count_end_of_stream, 1);
    assert_eq!(summary.count_properties, 2);
    assert_eq!(summary.count_line_events(), 3);
}
