use crate::error::{ContribError, Result};
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use crate::model::DATE_KEY_FORMAT;

/// True when `haystack` contains any of `needles`, ignoring case.
pub fn contains_any_ignore_case(haystack: &str, needles: &[String]) -> bool {
    if needles.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Resolve a human phrase such as `"3 days"`, `"week"` or `"workweek"` to the
/// first calendar date of the reporting window, relative to `today`.
///
/// Plain `YYYY-MM-DD` dates are accepted unchanged.
pub fn resolve_start(phrase: &str, today: NaiveDate) -> Result<NaiveDate> {
    let invalid = || ContribError::InvalidDate(format!("cannot understand '{phrase}'"));
    let input = phrase.trim().to_lowercase();

    if let Ok(date) = NaiveDate::parse_from_str(&input, DATE_KEY_FORMAT) {
        return Ok(date);
    }

    let mut parts = input.split_whitespace();
    let first = parts.next().ok_or_else(invalid)?;
    match first {
        "week" => return today.checked_sub_days(Days::new(7)).ok_or_else(invalid),
        "workweek" | "work" => return Ok(monday_of_week(today)),
        _ => {}
    }

    let quantity: u32 = first.parse().map_err(|_| invalid())?;
    let unit = parts.next().ok_or_else(invalid)?;

    if matches!(unit, "month" | "months") {
        return today.checked_sub_months(Months::new(quantity)).ok_or_else(invalid);
    }
    if !matches!(
        unit,
        "second"
            | "seconds"
            | "minute"
            | "minutes"
            | "hour"
            | "hours"
            | "day"
            | "days"
            | "week"
            | "weeks"
    ) {
        return Err(invalid());
    }

    let duration = humantime::parse_duration(&format!("{quantity}{unit}")).map_err(|_| invalid())?;
    let offset = chrono::Duration::from_std(duration).map_err(|_| invalid())?;
    let midnight: NaiveDateTime = today.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    midnight
        .checked_sub_signed(offset)
        .map(|dt| dt.date())
        .ok_or_else(invalid)
}

fn monday_of_week(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date - Days::new(back)
}
