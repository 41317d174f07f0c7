// src/bin/logpipe.rs

//! Driver program _logpipe_ drives the [_logpipelib_].
//!
//! Reads a log file (or stdin), parses each line with the format given by
//! `--format`, and prints each resulting event.
//!
//! [_logpipelib_]: logpipelib

#![allow(non_camel_case_types)]

use std::fs::File;
use std::process::ExitCode;

use ::anyhow::{self, Context};
use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::si_trace_print::stack::stack_offset_set;

use ::logpipelib::data::datetime::{DateTime, FixedOffset};
#[allow(unused_imports)]
use ::logpipelib::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use ::logpipelib::parsers::{LineParserFactory, LineParserP};
use ::logpipelib::pipeline::initiator::SourceBox;
use ::logpipelib::pipeline::processor::EventTransformBox;
use ::logpipelib::pipeline::queue::QUEUE_CAPACITY;
use ::logpipelib::pipeline::transforms::LineParsingTransform;
use ::logpipelib::pipeline::Pipeline;
use ::logpipelib::printer::printers::{print_summary, ColorChoice, PrinterEvent};
use ::logpipelib::printer::summary::{Summary, SummaryP};

/// Path argument meaning stdin.
const PATH_STDIN: &str = "-";

const CLI_HELP_AFTER: &str = concatcp!(
    r#"
A log-style FORMAT is an httpd LogFormat string, e.g.
  '%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-Agent}i"'

A delimited FORMAT is a list of fields separated by one of , ; | or TAB,
each field is "name", "name(type)", or "(type)", e.g.
  'host, size(long), when(time:yyyy-MM-dd HH:mm:ss),'
Types are string (default), int, long, float, double, time:PATTERN.

Lines that do not match FORMAT are printed as "FAULT: …".

---

Version: "#,
    env!("CARGO_PKG_VERSION"),
    r#"
MSRV: "#,
    env!("CARGO_PKG_RUST_VERSION"),
    r#"
License: "#,
    env!("CARGO_PKG_LICENSE"),
    r#"
"#
);

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    name = "logpipe",
    version = env!("CARGO_PKG_VERSION"),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path of a log file. Pass "-" or nothing to read STDIN.
    #[clap(required = false, verbatim_doc_comment)]
    path: Option<String>,

    /// Format specification of each line, log-style or delimited.
    #[clap(short = 'f', long = "format", required = true, verbatim_doc_comment)]
    format: String,

    /// Default timezone offset for timestamps without a timezone.
    /// Example values, "+12", "-0800", "+02:00".
    /// To pass a value with leading "-" use "=" notation, e.g. "-t=-0800".
    #[clap(
        short = 't',
        long = "tz-offset",
        verbatim_doc_comment,
        value_parser = cli_process_tz_offset,
        default_value = "+00:00",
    )]
    tz_offset: FixedOffset,

    /// Capacity, in events, of each queue between pipeline stages.
    #[clap(
        long = "queue-capacity",
        verbatim_doc_comment,
        value_parser = cli_parse_queue_capacity,
        default_value_t = QUEUE_CAPACITY,
    )]
    queue_capacity: usize,

    /// Choose to print to terminal using colors.
    #[clap(
        required = false,
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Print a summary of events to STDERR at exit.
    #[clap(short = 's', long = "summary", verbatim_doc_comment)]
    summary: bool,
}

/// `clap` argument processor for `--tz-offset`.
///
/// Transform the timezone string to a `FixedOffset` instance using a dummy
/// datetime.
fn cli_process_tz_offset(tzo: &str) -> std::result::Result<FixedOffset, String> {
    let data: String = format!("2000-01-02 03:04:05 {}", tzo);
    for pattern in [
        "%Y-%m-%d %H:%M:%S %:z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S %#z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(data.as_str(), pattern) {
            defñ!("{:?} is {:?}", tzo, dt.offset());
            return Ok(*dt.offset());
        }
    }

    Err(format!("Unable to parse a timezone offset for --tz-offset {:?}", tzo))
}

/// `clap` argument processor for `--queue-capacity`.
fn cli_parse_queue_capacity(capacity: &str) -> std::result::Result<usize, String> {
    match capacity.parse::<usize>() {
        Ok(0) => Err(String::from("--queue-capacity must be greater than 0")),
        Ok(val) => Ok(val),
        Err(err) => Err(format!("Unable to parse --queue-capacity {:?}: {}", capacity, err)),
    }
}

/// Open the byte source at `path`, or stdin.
fn open_source(path: &Option<String>) -> anyhow::Result<SourceBox> {
    match path.as_deref() {
        None | Some(PATH_STDIN) => Ok(Box::new(std::io::stdin())),
        Some(path) => {
            let file: File = File::open(path).with_context(|| format!("Unable to open {:?}", path))?;
            Ok(Box::new(file))
        }
    }
}

/// Resolve the parser, wire the pipeline, run it.
///
/// Returns the `Summary` if the user asked for it. Returns `Err` if the
/// format is malformed or matches no known parser.
fn run(args: CLI_Args) -> anyhow::Result<Option<Summary>> {
    defn!();
    let factory: LineParserFactory = LineParserFactory::new(args.tz_offset);
    let parser: LineParserP = match factory.resolve(args.format.as_str())? {
        Some(val) => val,
        None => {
            anyhow::bail!("No known parser for format {:?}", args.format);
        }
    };
    defo!("parser {:?}", parser.kind());

    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };
    let printer = PrinterEvent::stdout(color_choice);
    let summaryp: SummaryP = printer.summary();

    let source: SourceBox = open_source(&args.path)?;
    let transforms: Vec<EventTransformBox> = vec![Box::new(LineParsingTransform::new(parser))];
    let mut pipeline = Pipeline::new(source, transforms, Box::new(printer), args.queue_capacity);
    pipeline
        .run()
        .context("pipeline failed")?;

    let summary: Summary = match summaryp.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    defx!();

    Ok(args.summary.then_some(summary))
}

/// Process the user-passed command-line arguments.
/// Determine a process return code.
pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let args: CLI_Args = CLI_Args::parse();
    defo!("args {:?}", args);

    let exitcode: ExitCode = match run(args) {
        Ok(summary) => {
            if let Some(summary) = summary {
                print_summary(&summary);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            e_err!("{:#}", err);
            ExitCode::FAILURE
        }
    };
    defx!("exitcode {:?}", exitcode);

    exitcode
}
