//! Form field coercion and validation.
//!
//! Forms hold raw strings. Blank numeric input is treated as zero, matching
//! what an empty form field has always meant; anything else must parse to a
//! finite, non-negative number or the submission is rejected.

use chrono::{Duration, NaiveDate};
use regex::Regex;

use crate::error::ConsoleError;

type Result<T> = std::result::Result<T, ConsoleError>;

/// Enumerations selectable from a form field.
pub trait Labelled: Copy + 'static {
    const OPTIONS: &'static [Self];
    fn label(&self) -> &'static str;
}

pub fn required(field: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}

pub fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse a money or count field. Blank means zero.
pub fn amount(field: &str, raw: &str) -> Result<f64> {
    Ok(optional_amount(field, raw)?.unwrap_or(0.0))
}

/// Parse a required money field: blank is an error rather than zero.
pub fn required_amount(field: &str, raw: &str) -> Result<f64> {
    optional_amount(field, raw)?.ok_or_else(|| ConsoleError::validation(field, "is required"))
}

pub fn optional_amount(field: &str, raw: &str) -> Result<Option<f64>> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| ConsoleError::validation(field, format!("'{}' is not a number", raw.trim())))?;
    if !value.is_finite() {
        return Err(ConsoleError::validation(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ConsoleError::validation(field, "must not be negative"));
    }
    Ok(Some(value))
}

pub fn date(field: &str, raw: &str) -> Result<NaiveDate> {
    optional_date(field, raw)?.ok_or_else(|| ConsoleError::validation(field, "is required"))
}

/// Accepts ISO dates, US-style `m/d/Y`, RFC 3339 timestamps and spreadsheet
/// serial day numbers.
pub fn optional_date(field: &str, raw: &str) -> Result<Option<NaiveDate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(Some(d));
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(dt.date_naive()));
    }
    if let Some(d) = excel_serial_date(trimmed) {
        return Ok(Some(d));
    }
    Err(ConsoleError::validation(
        field,
        format!("'{}' is not a date (expected YYYY-MM-DD)", trimmed),
    ))
}

/// Spreadsheet serial dates count days from 1899-12-30.
fn excel_serial_date(raw: &str) -> Option<NaiveDate> {
    let serial: f64 = raw.parse().ok()?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

pub fn email(field: &str, raw: &str) -> Result<String> {
    let value = required(field, raw)?;
    check_email(field, value)
}

pub fn optional_email(field: &str, raw: &str) -> Result<Option<String>> {
    optional(raw).map(|v| check_email(field, v)).transpose()
}

fn check_email(field: &str, value: String) -> Result<String> {
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|e| ConsoleError::Config(format!("email pattern: {}", e)))?;
    if !re.is_match(&value) {
        return Err(ConsoleError::validation(field, format!("'{}' is not an email address", value)));
    }
    Ok(value.to_lowercase())
}

/// Pick an option by label, ignoring case, spaces and underscores.
/// Blank input yields `default`.
pub fn choice<T: Labelled>(field: &str, raw: &str, default: T) -> Result<T> {
    let key = choice_key(raw);
    if key.is_empty() {
        return Ok(default);
    }
    T::OPTIONS
        .iter()
        .copied()
        .find(|opt| choice_key(opt.label()) == key)
        .ok_or_else(|| {
            let allowed: Vec<&str> = T::OPTIONS.iter().map(|o| o.label()).collect();
            ConsoleError::validation(
                field,
                format!("'{}' is not one of: {}", raw.trim(), allowed.join(", ")),
            )
        })
}

fn choice_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Reject an end date before a start date.
pub fn date_order(field: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            return Err(ConsoleError::validation(field, "must not be before the start date"));
        }
    }
    Ok(())
}

/// Split a comma or semicolon separated list field.
pub fn list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
