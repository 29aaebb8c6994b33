// Flexible date/time parsing
//
// Task names and CLI time arguments share one permissive grammar: the input
// is scanned against an ordered list of patterns, most specific first, and
// the first regex that matches anywhere in the string wins. Unmatched
// remainders are ignored, so callers may pass descriptive text with an
// embedded date. All timestamps are naive local time.

use crate::error::{Result, TaskError};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;

/// Pattern families, in descending order of specificity. Order matters:
/// later, looser patterns would otherwise shadow the specific ones.
#[derive(Debug, Clone, Copy)]
enum Family {
    /// `YYYY-MM-DD HH:MM` (separators `-`/`/`/`.` in the date, `:`/`.` in the time)
    DateTime4,
    /// `YY-MM-DD HH:MM`; the year is the current century string + YY
    DateTime2,
    /// `MM-DD HH:MM`; the current year is prefixed
    MonthDayTime,
    /// `YYYY-MM-DD`; time defaults to the current wall clock
    Date4,
    /// `YY-MM-DD`
    Date2,
    /// `MM-DD`
    MonthDay,
    /// `HH:MM`; date defaults to today
    Time,
    /// `H:MM` single-digit hour
    TimeShort,
}

fn patterns() -> &'static Vec<(Regex, Family)> {
    static PATTERNS: OnceLock<Vec<(Regex, Family)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let table: &[(&str, Family)] = &[
            (
                r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2}) (\d{1,2})[:.](\d{2})",
                Family::DateTime4,
            ),
            (
                r"(\d{2})[-/.](\d{1,2})[-/.](\d{1,2}) (\d{1,2})[:.](\d{2})",
                Family::DateTime2,
            ),
            (
                r"(\d{1,2})[-/](\d{1,2}) (\d{1,2})[:.](\d{2})",
                Family::MonthDayTime,
            ),
            (r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})", Family::Date4),
            (r"(\d{2})[-/.](\d{1,2})[-/.](\d{1,2})", Family::Date2),
            (r"(\d{1,2})[-/](\d{1,2})", Family::MonthDay),
            (r"(\d{2})[:.](\d{2})", Family::Time),
            (r"(\d)[:.](\d{2})", Family::TimeShort),
        ];
        table
            .iter()
            .map(|(pat, family)| (Regex::new(pat).unwrap(), *family))
            .collect()
    })
}

/// Parse a loosely-formatted date/time string into an absolute timestamp,
/// anchored at the current local time for partial specifications.
pub fn parse_time(text: &str) -> Result<NaiveDateTime> {
    parse_time_at(text, Local::now().naive_local())
}

/// Same as [`parse_time`] but with an explicit "now" anchor.
pub fn parse_time_at(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let text = text.trim();
    let fail = || TaskError::TimeFormat(text.to_string());

    for (regex, family) in patterns() {
        let Some(caps) = regex.captures(text) else {
            continue;
        };
        let num = |i: usize| -> u32 {
            // The capture groups are all-digit by construction.
            caps[i].parse().unwrap_or(0)
        };

        let (year, month, day, hour, minute) = match family {
            Family::DateTime4 => (num(1) as i32, num(2), num(3), num(4), num(5)),
            Family::DateTime2 => (
                prefix_century(num(1) as i32, now),
                num(2),
                num(3),
                num(4),
                num(5),
            ),
            Family::MonthDayTime => (now.year(), num(1), num(2), num(3), num(4)),
            Family::Date4 => (num(1) as i32, num(2), num(3), now.hour(), now.minute()),
            Family::Date2 => (
                prefix_century(num(1) as i32, now),
                num(2),
                num(3),
                now.hour(),
                now.minute(),
            ),
            Family::MonthDay => (now.year(), num(1), num(2), now.hour(), now.minute()),
            Family::Time => (now.year(), now.month(), now.day(), num(1), num(2)),
            Family::TimeShort => (now.year(), now.month(), now.day(), num(1), num(2)),
        };

        return NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| fail());
    }

    Err(fail())
}

/// Interpret a two-digit year by prefixing the current century string
/// (`22` in 2026 becomes `2022`), not by calendar arithmetic.
fn prefix_century(two_digit: i32, now: NaiveDateTime) -> i32 {
    (now.year() / 100) * 100 + two_digit
}

/// Drop seconds and below; the durable formats are minute precision.
pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date()
        .and_hms_opt(dt.hour(), dt.minute(), 0)
        .expect("hour and minute taken from a valid timestamp")
}
