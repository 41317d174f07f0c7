// src/printer/mod.rs

//! The `printer` module is for printing user-facing [`Event`s]
//! with various text effects (color) and for the [`Summary`] of printed
//! events.
//!
//! [`Event`s]: crate::data::event::Event
//! [`Summary`]: crate::printer::summary::Summary

pub mod printers;
pub mod summary;
