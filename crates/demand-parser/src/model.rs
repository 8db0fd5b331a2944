use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const VALUE_COLUMN: &str = "value";

/// One demand observation tied to a specific hour. `value` is `None` when the
/// sheet cell could not be read as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyReading {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl HourlyReading {
    pub fn new(timestamp: NaiveDateTime, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }
}

/// The readings extracted from a single workbook. Every reading is anchored to
/// `base_date`, the date encoded in `filename`.
#[derive(Debug, Clone)]
pub struct RawFileBatch {
    pub filename: String,
    pub base_date: NaiveDate,
    pub readings: Vec<HourlyReading>,
}

impl RawFileBatch {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn missing_values(&self) -> usize {
        self.readings.iter().filter(|r| r.value.is_none()).count()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        readings_to_dataframe(&self.readings)
    }
}

/// Builds a `timestamp`/`value` frame with microsecond datetimes.
pub fn readings_to_dataframe(readings: &[HourlyReading]) -> PolarsResult<DataFrame> {
    let timestamps: Vec<i64> = readings
        .iter()
        .map(|r| r.timestamp.and_utc().timestamp_micros())
        .collect();
    let values: Vec<Option<f64>> = readings.iter().map(|r| r.value).collect();

    let ts_series = Series::new(TIMESTAMP_COLUMN.into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    DataFrame::new(vec![
        ts_series.into(),
        Series::new(VALUE_COLUMN.into(), values).into(),
    ])
}
