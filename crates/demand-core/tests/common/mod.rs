#![allow(dead_code)]

use calamine::{Data, Range};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use demand_parser::{HourlyReading, ParserError, RawFileBatch, RgdWorkbookParser, WorkbookParser};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at_hour(day: NaiveDate, hour: i64) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN) + Duration::hours(hour)
}

/// Hourly readings starting at `start`, one per hour.
pub fn hourly(start: NaiveDateTime, values: &[Option<f64>]) -> Vec<HourlyReading> {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| HourlyReading::new(start + Duration::hours(idx as i64), *value))
        .collect()
}

/// Text stand-in for a workbook: a `HOURS` marker line followed by
/// `hour,value` rows that land in A12:A36 / L12:L36.
pub fn day_sheet(values: &[Option<f64>]) -> Vec<u8> {
    let mut text = String::from("HOURS\n");
    for (idx, value) in values.iter().enumerate() {
        let cell = value.map(|v| v.to_string()).unwrap_or_default();
        text.push_str(&format!("{},{}\n", idx + 1, cell));
    }
    text.into_bytes()
}

pub fn constant_day(value: f64) -> Vec<u8> {
    day_sheet(&[Some(value); 24])
}

/// Builds real worksheet ranges from `day_sheet` text and runs them through
/// the workbook parser; any other bytes go to the workbook reader as-is.
pub struct TextSheetParser {
    inner: RgdWorkbookParser,
}

impl Default for TextSheetParser {
    fn default() -> Self {
        Self {
            inner: RgdWorkbookParser::default(),
        }
    }
}

impl WorkbookParser for TextSheetParser {
    fn name(&self) -> &'static str {
        "TEXT_SHEET"
    }

    fn base_date(&self, filename: &str) -> Result<NaiveDate, ParserError> {
        self.inner.base_date(filename)
    }

    fn parse(&self, filename: &str, contents: &[u8]) -> Result<RawFileBatch, ParserError> {
        match std::str::from_utf8(contents)
            .ok()
            .and_then(|text| text.strip_prefix("HOURS\n"))
        {
            Some(body) => self.inner.parse_range(filename, &sheet_from_text(body)),
            None => self.inner.parse(filename, contents),
        }
    }
}

fn sheet_from_text(body: &str) -> Range<Data> {
    let mut range = Range::new((0, 0), (35, 11));
    for (offset, line) in body.lines().enumerate() {
        let (hour, value) = line.split_once(',').unwrap_or((line, ""));
        let row = 11 + offset as u32;
        range.set_value((row, 0), Data::String(hour.to_string()));
        if !value.is_empty() {
            range.set_value((row, 11), Data::String(value.to_string()));
        }
    }
    range
}
