/// Parsing and formatting of the clock times typed into the editor.
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::types::DateRange;

/// Placeholder shown for a missing time.
pub const EMPTY_TIME: &str = "--";

static HHMM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("HH:MM pattern compiles"));

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub fn is_valid_hhmm(value: &str) -> bool {
    HHMM.is_match(value)
}

/// Turns whatever digits were typed into a clock time.
///
/// One digit is an hour. Two digits are an hour when they fit (`17`), otherwise
/// hour and tens of minutes (`99` -> 9:90 -> 09:59). Three digits are `HH:M0`
/// when the first two fit an hour, else `H:MM`. Four or more take the first
/// four as `HHMM`. Hours clamp to 23 and minutes to 59. Input without any
/// digit comes back unchanged.
pub fn validate_and_format_time(input: &str) -> String {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();
    let (hours, minutes) = match digits.as_slice() {
        [] => return input.to_string(),
        [h] => (*h, 0),
        [a, b] => {
            let value = a * 10 + b;
            if value <= 23 { (value, 0) } else { (*a, b * 10) }
        }
        [a, b, c] => {
            let first_two = a * 10 + b;
            if first_two <= 23 {
                (first_two, c * 10)
            } else {
                (*a, b * 10 + c)
            }
        }
        [a, b, c, d, ..] => (a * 10 + b, c * 10 + d),
    };
    format!("{:02}:{:02}", hours.min(23), minutes.min(59))
}

/// Maps the values the backend uses for "no time" onto [`EMPTY_TIME`].
pub fn sanitize_date_time(value: Option<&str>) -> String {
    match value {
        None => EMPTY_TIME.to_string(),
        Some("" | "Invalid DateTime") => EMPTY_TIME.to_string(),
        Some(raw) => raw.to_string(),
    }
}

/// Extracts the `HH:MM` part of a server time, which may be a bare clock time
/// or a full timestamp.
pub fn clock_text(value: Option<&str>) -> String {
    let sanitized = sanitize_date_time(value);
    if sanitized == EMPTY_TIME {
        return sanitized;
    }
    let trimmed = sanitized.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.format("%H:%M").to_string();
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return parsed.format("%H:%M").to_string();
        }
    }
    for format in ["%H:%M:%S", "%H:%M"] {
        if let Ok(parsed) = NaiveTime::parse_from_str(trimmed, format) {
            return parsed.format("%H:%M").to_string();
        }
    }
    sanitized
}

/// Normal form used to compare an edited time with the stored one.
pub fn normalize_time(value: Option<&str>) -> String {
    let clock = clock_text(value);
    if clock == EMPTY_TIME {
        return clock;
    }
    validate_and_format_time(&clock)
}

/// Reads a day label such as `Mon 3/6` (day/month). The label has no year, so
/// it is taken from the loaded range, preferring the year that places the day
/// inside it.
pub fn parse_day_label(label: &str, range: &DateRange) -> Option<NaiveDate> {
    let day_month = label.split_whitespace().last()?;
    let (day, month) = day_month.split_once('/')?;
    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;

    let candidates = (range.start.year()..=range.end.year())
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .collect::<Vec<_>>();
    candidates
        .iter()
        .copied()
        .find(|date| range.contains(*date))
        .or_else(|| candidates.first().copied())
}

pub fn to_wire_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
