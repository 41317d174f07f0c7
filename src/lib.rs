// src/lib.rs

//! _logpipelib_ turns a byte stream of log lines into typed events and
//! passes them through a concurrent pipeline of stages.
//!
//! A user format specification, either an httpd `LogFormat` string like
//! `%h %l %u %t "%r" %>s %b` or a delimited list of fields like
//! `host, size(long), when(time:yyyy-MM-dd HH:mm:ss)`, selects a
//! [`LineParser`]. The pipeline reads bytes, splits them into lines,
//! parses each line into a `Generic` event or a `Fault` event, and hands
//! each event to a sink.
//!
//! The _logpipe_ binary is a thin command-line driver of this library.
//!
//! [`LineParser`]: crate::parsers::LineParser

pub mod common;
pub mod data;
pub mod debug;
pub mod parsers;
pub mod pipeline;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;
