// src/tests/mod.rs

//! Tests for _logpipelib_.
//!
//! Tests are placed at `src/tests/`, inside the `logpipelib`. This is a
//! reasonable trade-off of separation and access.
//!
//! Tests placed at top-level path `tests/` do not have crate-internal
//! visibility. While it is recommended to not require internal visibility for
//! testing, in practice that often makes tests difficult or impossible to
//! implement.

pub mod common;
pub mod common_tests;
pub mod event_tests;
pub mod format_tests;
pub mod lineconverter_tests;
pub mod parsers_tests;
pub mod printers_tests;
pub mod property_tests;
