//! Date interpretation for export timestamps.
//!
//! Export dates are two or three numeric groups whose order depends on the producer's
//! locale (`13/5/23`, `5/13/23`, `05.06.2023`). The order is resolved heuristically:
//!
//! 1. First number above 12 → it is the day, the second is the month
//! 2. Otherwise second number above 12 → it is the day, the first is the month
//! 3. Otherwise (both ≤ 12) → day-first
//!
//! Rule 3 is a guess. `5/6/23` from a US-locale export really is May 6th, but is read as
//! 5 June. That is the documented behaviour and is kept as-is.
//!
//! Raw timestamps stay untouched on [`MessageRecord`](crate::models::MessageRecord);
//! [`normalize_timestamp`] is the projection used by filters and display code.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Month names, indexed by zero-based month
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[?\s*(\d{1,4})[/.\-](\d{1,2})(?:[/.\-](\d{1,4}))?")
        .expect("date pattern is valid")
});

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([AaPp])\.?\s?[Mm]\.?)?")
        .expect("time pattern is valid")
});

/// Day and zero-based month index resolved from two leading date numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMonth {
    pub day: u32,
    pub month_index: u32,
}

/// Resolve which of two leading date numbers is the day and which the month.
///
/// A month token of 0 yields `u32::MAX` as index, which is out of range like any other
/// invalid month and falls back to the raw token when displayed.
pub fn resolve_day_month(a: u32, b: u32) -> DayMonth {
    let (day, month) = if a > 12 {
        (a, b)
    } else if b > 12 {
        (b, a)
    } else {
        (a, b)
    };
    DayMonth { day, month_index: month.wrapping_sub(1) }
}

/// A calendar date read from a raw export date string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretedDate {
    pub day: u32,
    pub month_index: u32,
    /// Numeric month token as written, echoed when the index is out of range
    pub month_token: String,
    pub year: i32,
}

impl InterpretedDate {
    pub fn month_name(&self) -> Cow<'_, str> {
        match MONTH_NAMES.get(self.month_index as usize) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Borrowed(self.month_token.as_str()),
        }
    }

    /// Human-readable form, e.g. `13 May 2023`
    pub fn label(&self) -> String {
        format!("{} {} {}", self.day, self.month_name(), self.year)
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month_index.checked_add(1)?, self.day)
    }
}

/// Widen a year token: two digits are in the 2000s
fn widen_year(token: &str) -> Option<i32> {
    let value: i32 = token.parse().ok()?;
    if token.len() <= 2 { Some(2000 + value) } else { Some(value) }
}

/// Interpret the leading date of `raw`, falling back to the current year when absent
pub fn interpret_date(raw: &str) -> Option<InterpretedDate> {
    interpret_date_with_year(raw, Local::now().year())
}

/// Interpret the leading date of `raw` with an explicit fallback year
pub fn interpret_date_with_year(raw: &str, fallback_year: i32) -> Option<InterpretedDate> {
    let captures = DATE_PATTERN.captures(raw)?;
    let first = captures.get(1)?.as_str();
    let second = captures.get(2)?.as_str();
    let third = captures.get(3).map(|m| m.as_str());

    // Four-digit lead is year-first (canonical `2023-05-13`); never ambiguous
    if first.len() == 4 {
        let day: u32 = third?.parse().ok()?;
        let month: u32 = second.parse().ok()?;
        return Some(InterpretedDate {
            day,
            month_index: month.wrapping_sub(1),
            month_token: second.to_string(),
            year: first.parse().ok()?,
        });
    }

    let a: u32 = first.parse().ok()?;
    let b: u32 = second.parse().ok()?;
    let resolved = resolve_day_month(a, b);
    let month_token = if a > 12 || b <= 12 { second } else { first };
    let year = match third {
        Some(token) => widen_year(token)?,
        None => fallback_year,
    };

    Some(InterpretedDate {
        day: resolved.day,
        month_index: resolved.month_index,
        month_token: month_token.to_string(),
        year,
    })
}

fn interpret_time(raw: &str) -> Option<NaiveTime> {
    let captures = TIME_PATTERN.captures(raw)?;
    let mut hour: u32 = captures.get(1)?.as_str().parse().ok()?;
    let minute: u32 = captures.get(2)?.as_str().parse().ok()?;
    let second: u32 = match captures.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    if let Some(meridiem) = captures.get(4) {
        if hour == 0 || hour > 12 {
            return None;
        }
        let is_pm = meridiem.as_str().eq_ignore_ascii_case("p");
        hour = match (is_pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Project a raw header timestamp onto a calendar date-time
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let date = interpret_date(raw)?.to_naive_date()?;
    // The time follows the date; search after it so `10.05.2023` is not read as a time
    let date_end = DATE_PATTERN.find(raw)?.end();
    let rest = &raw[date_end..];
    let time = if TIME_PATTERN.is_match(rest) {
        interpret_time(rest)?
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)?
    };
    Some(date.and_time(time))
}

/// Canonical `YYYY-MM-DD HH:MM:SS` form, or the raw string when it cannot be normalized
pub fn canonical_timestamp(raw: &str) -> String {
    match normalize_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}
