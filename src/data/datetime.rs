// src/data/datetime.rs
// …

//! Functions to translate user date patterns to [`chrono`] strftime
//! patterns and to parse timestamps found in log lines.
//!
//! Delimited formats declare date fields with letter patterns such as
//! `yyyy-MM-dd HH:mm:ss.SSS`. Log-style formats use the httpd `%t`
//! timestamp `[10/Oct/2000:13:55:36 -0700]` or a `%{strftime}t` pattern.
//!
//! [`chrono`]: https://docs.rs/chrono/latest/chrono/

use crate::common::EpochMillis;
use crate::debug::printers::str_to_String_noraw;

#[doc(hidden)]
pub use ::chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// types and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A chrono strftime pattern, e.g. `"%Y-%m-%d"`.
#[allow(non_camel_case_types)]
pub type DateTimePattern_str = str;

/// The datetime type used for `Date` properties.
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// Pattern of the httpd `%t` timestamp, without the enclosing brackets.
pub const HTTPD_TIMESTAMP_PATTERN: &DateTimePattern_str = "%d/%b/%Y:%H:%M:%S %z";

/// The UTC offset, default for patterns without a timezone.
pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DatePattern
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A compiled date pattern: the chrono strftime pattern and what it
/// contains.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatePattern {
    /// The pattern as given by the user.
    source: String,
    /// The chrono strftime translation.
    strftime: String,
    /// Pattern has a timezone specifier.
    has_tz: bool,
    /// Pattern has an hour specifier.
    has_time: bool,
}

impl DatePattern {
    /// Compile a letter pattern like `yyyy-MM-dd HH:mm:ss` by translating it
    /// to a chrono strftime pattern.
    ///
    /// Recognized letters:
    ///
    /// | letters | meaning                  | strftime |
    /// |---------|--------------------------|----------|
    /// | `yyyy`  | year                     | `%Y`     |
    /// | `yy`    | two digit year           | `%y`     |
    /// | `MMM`   | abbreviated month name   | `%b`     |
    /// | `MM`    | month                    | `%m`     |
    /// | `dd`    | day of month             | `%d`     |
    /// | `EEE`   | abbreviated weekday name | `%a`     |
    /// | `HH`    | hour 0-23                | `%H`     |
    /// | `hh`    | hour 1-12                | `%I`     |
    /// | `mm`    | minute                   | `%M`     |
    /// | `ss`    | second                   | `%S`     |
    /// | `SSS`   | milliseconds             | `%3f`    |
    /// | `a`     | AM/PM                    | `%p`     |
    /// | `Z`     | offset `-0700`           | `%z`     |
    /// | `z`, `X`| offset `-07:00`          | `%:z`    |
    ///
    /// Text within single quotes is literal, `''` is a literal single quote.
    /// Any other ASCII letter is an error.
    pub fn from_letters(pattern: &str) -> Result<DatePattern, String> {
        defn!("({:?})", pattern);
        if pattern.trim().is_empty() {
            defx!("empty pattern");
            return Err(String::from("empty date pattern"));
        }
        let chars: Vec<char> = pattern.chars().collect();
        let mut strftime: String = String::with_capacity(pattern.len() * 2);
        let mut has_tz: bool = false;
        let mut has_time: bool = false;
        let mut at: usize = 0;
        while at < chars.len() {
            let c: char = chars[at];
            // count the run of the same letter
            let mut run: usize = 1;
            while at + run < chars.len() && chars[at + run] == c {
                run += 1;
            }
            match c {
                '\'' => {
                    if run >= 2 {
                        // escaped quote(s)
                        for _ in 0..run / 2 {
                            strftime.push('\'');
                        }
                        at += run / 2 * 2;
                        continue;
                    }
                    // quoted literal text
                    at += 1;
                    let mut closed: bool = false;
                    while at < chars.len() {
                        if chars[at] == '\'' && chars.get(at + 1) == Some(&'\'') {
                            // escaped quote within quoted text
                            strftime.push('\'');
                            at += 2;
                            continue;
                        }
                        if chars[at] == '\'' {
                            closed = true;
                            at += 1;
                            break;
                        }
                        push_literal(&mut strftime, chars[at]);
                        at += 1;
                    }
                    if !closed {
                        defx!("unterminated quote");
                        return Err(format!("unterminated quoted text in date pattern {:?}", pattern));
                    }
                    continue;
                }
                'y' => strftime.push_str(if run == 2 { "%y" } else { "%Y" }),
                'M' => strftime.push_str(if run >= 3 { "%b" } else { "%m" }),
                'd' => strftime.push_str("%d"),
                'E' => strftime.push_str("%a"),
                'H' => {
                    has_time = true;
                    strftime.push_str("%H");
                }
                'h' => {
                    has_time = true;
                    strftime.push_str("%I");
                }
                'm' => strftime.push_str("%M"),
                's' => strftime.push_str("%S"),
                'S' => strftime.push_str("%3f"),
                'a' => strftime.push_str("%p"),
                'Z' => {
                    has_tz = true;
                    strftime.push_str("%z");
                }
                'z' | 'X' => {
                    has_tz = true;
                    strftime.push_str("%:z");
                }
                c if c.is_ascii_alphabetic() => {
                    defx!("unknown letter {:?}", c);
                    return Err(format!("unknown letter {:?} in date pattern {:?}", c, pattern));
                }
                _ => {
                    for _ in 0..run {
                        push_literal(&mut strftime, c);
                    }
                }
            }
            at += run;
        }
        defx!("strftime {:?} has_tz {} has_time {}", strftime, has_tz, has_time);

        Ok(DatePattern {
            source: pattern.to_string(),
            strftime,
            has_tz,
            has_time,
        })
    }

    /// Wrap a chrono strftime pattern as-is, e.g. from `%{…}t`.
    pub fn from_strftime(pattern: &DateTimePattern_str) -> DatePattern {
        DatePattern {
            source: pattern.to_string(),
            strftime: pattern.to_string(),
            has_tz: pattern.contains("%z") || pattern.contains("%:z") || pattern.contains("%#z"),
            has_time: pattern.contains("%H")
                || pattern.contains("%I")
                || pattern.contains("%T")
                || pattern.contains("%R")
                || pattern.contains("%s"),
        }
    }

    /// The httpd `%t` timestamp pattern.
    pub fn httpd() -> DatePattern {
        DatePattern::from_strftime(HTTPD_TIMESTAMP_PATTERN)
    }

    #[inline(always)]
    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    #[inline(always)]
    pub fn strftime(&self) -> &DateTimePattern_str {
        self.strftime.as_str()
    }

    #[inline(always)]
    pub const fn has_tz(&self) -> bool {
        self.has_tz
    }

    /// Count of space characters in the pattern; a timestamp matching the
    /// pattern spans this many spaces.
    pub fn count_spaces(&self) -> usize {
        self.strftime
            .chars()
            .filter(|c| *c == ' ')
            .count()
    }

    /// Parse `data` with this pattern. Patterns without a timezone use
    /// `tz_offset`. Patterns without a time of day are midnight.
    pub fn parse(
        &self,
        data: &str,
        tz_offset: &FixedOffset,
    ) -> Result<DateTimeL, String> {
        datetime_parse_from_str(data, self, tz_offset)
    }
}

/// Push `c` as literal strftime text.
fn push_literal(
    strftime: &mut String,
    c: char,
) {
    if c == '%' {
        strftime.push_str("%%");
    } else {
        strftime.push(c);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse `data` as a datetime using `pattern`.
///
/// If `pattern.has_tz` then create a `DateTime` directly.
/// Else create a `NaiveDateTime` (or `NaiveDate` when the pattern has no
/// time of day) then convert that to a `DateTime` at `tz_offset`.
pub fn datetime_parse_from_str(
    data: &str,
    pattern: &DatePattern,
    tz_offset: &FixedOffset,
) -> Result<DateTimeL, String> {
    defn!("(pattern {:?}, tz_offset {:?}, data {:?})", pattern.strftime(), tz_offset, str_to_String_noraw(data));

    if pattern.has_tz {
        return match DateTime::parse_from_str(data, pattern.strftime()) {
            Ok(val) => {
                defx!("return Ok({:?})", val);
                Ok(val)
            }
            Err(err) => {
                defx!("DateTime::parse_from_str failed {}", err);
                Err(format!("{:?} does not match date pattern {:?}: {}", data, pattern.source(), err))
            }
        };
    }

    // no timezone in `pattern` so first create a `NaiveDateTime`
    let dt_naive: NaiveDateTime = if pattern.has_time {
        match NaiveDateTime::parse_from_str(data, pattern.strftime()) {
            Ok(val) => val,
            Err(err) => {
                defx!("NaiveDateTime::parse_from_str failed {}", err);
                return Err(format!("{:?} does not match date pattern {:?}: {}", data, pattern.source(), err));
            }
        }
    } else {
        match NaiveDate::parse_from_str(data, pattern.strftime()) {
            Ok(val) => match val.and_hms_opt(0, 0, 0) {
                Some(val) => val,
                None => {
                    defx!("and_hms_opt failed");
                    return Err(format!("{:?} is not a valid date", data));
                }
            },
            Err(err) => {
                defx!("NaiveDate::parse_from_str failed {}", err);
                return Err(format!("{:?} does not match date pattern {:?}: {}", data, pattern.source(), err));
            }
        }
    };
    defo!("dt_naive {:?}", dt_naive);
    // second convert the `NaiveDateTime` instance to `DateTime<FixedOffset>` instance
    match tz_offset
        .from_local_datetime(&dt_naive)
        .earliest()
    {
        Some(val) => {
            defx!("return Ok({:?})", val);
            Ok(val)
        }
        None => {
            defx!("from_local_datetime failed");
            Err(format!("{:?} cannot be placed at offset {}", data, tz_offset))
        }
    }
}

/// Epoch milliseconds of `dt`.
#[inline(always)]
pub fn datetime_to_millis(dt: &DateTimeL) -> EpochMillis {
    dt.timestamp_millis()
}
