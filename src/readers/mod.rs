// src/readers/mod.rs

//! "Readers" for _logpipelib_.
//!
//! ## Overview of readers
//!
//! * A [`LineConverter`] turns bytes, fed one at a time, into [`Line`]
//!   events and a final [`EndOfStream`] event.
//!
//! The [`Initiator`] stage drives a `LineConverter` with the bytes of its
//! source.
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`Line`]: crate::data::event::Event::Line
//! [`EndOfStream`]: crate::data::event::Event::EndOfStream
//! [`LineConverter`]: crate::readers::lineconverter::LineConverter
//! [`Initiator`]: crate::pipeline::initiator::Initiator

pub mod lineconverter;
