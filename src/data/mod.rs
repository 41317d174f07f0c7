// src/data/mod.rs

//! The `data` module is specialized data containers for
//! [`Event`]s, [`Property`]s, and compiled formats.
//!
//! ## Definitions of data
//!
//! ### Event
//!
//! An "event" is the unit of data passed between pipeline stages. It is
//! one of
//!
//! * a "line" of text read from a byte stream
//! * the "end of stream" sentinel
//! * a "fault", a per-line failure carried as data
//! * a "generic" event, a parsed line holding named [`Property`]s
//!
//! ### Format
//!
//! A "format" is a compiled user specification describing the shape of a
//! line. It is either a [`LogFormat`] for httpd-like lines or a
//! [`DelimitedFormat`] for CSV-like lines.
//!
//! A format is immutable once compiled and is shared by every line parsed
//! with it.
//!
//! [`Event`]: crate::data::event::Event
//! [`Property`]: crate::data::property::Property
//! [`LogFormat`]: crate::data::format::LogFormat
//! [`DelimitedFormat`]: crate::data::format::DelimitedFormat

pub mod datetime;
pub mod event;
pub mod format;
pub mod property;
