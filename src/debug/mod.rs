// src/debug/mod.rs

//! The `debug` module is macros and functions for printing errors,
//! warnings, and debug messages.

pub mod printers;
