use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ParserError;

pub const DEFAULT_FILENAME_PREFIX: &str = "rgd_";

/// Two-digit years always land in 2000-2099.
pub const CENTURY_BASE: i32 = 2000;

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    build_pattern(DEFAULT_FILENAME_PREFIX).expect("default file name pattern must compile")
});

fn build_pattern(prefix: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i){}(\d{{6}})(?:\D|$)", regex::escape(prefix)))
}

/// Resolves the base date encoded in a `rgd_DDMMYY.<ext>` file name.
pub fn resolve_filename_date(filename: &str) -> Result<NaiveDate, ParserError> {
    resolve_with_pattern(filename, DEFAULT_FILENAME_PREFIX, &DEFAULT_PATTERN)
}

/// Same as [`resolve_filename_date`] for a layout that uses another literal prefix.
pub fn resolve_filename_date_with_prefix(
    filename: &str,
    prefix: &str,
) -> Result<NaiveDate, ParserError> {
    if prefix.eq_ignore_ascii_case(DEFAULT_FILENAME_PREFIX) {
        return resolve_filename_date(filename);
    }
    let pattern = build_pattern(prefix).map_err(|_| ParserError::FilenameFormat {
        filename: filename.to_string(),
        prefix: prefix.to_string(),
    })?;
    resolve_with_pattern(filename, prefix, &pattern)
}

fn resolve_with_pattern(
    filename: &str,
    prefix: &str,
    pattern: &Regex,
) -> Result<NaiveDate, ParserError> {
    let digits = pattern
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ParserError::FilenameFormat {
            filename: filename.to_string(),
            prefix: prefix.to_string(),
        })?;

    let invalid = || ParserError::InvalidDate {
        filename: filename.to_string(),
        digits: digits.to_string(),
    };

    let day: u32 = digits[0..2].parse().map_err(|_| invalid())?;
    let month: u32 = digits[2..4].parse().map_err(|_| invalid())?;
    let year: i32 = digits[4..6].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(CENTURY_BASE + year, month, day).ok_or_else(invalid)
}
