use chrono::{Datelike, NaiveDate, NaiveDateTime};
use demand_parser::{readings_to_dataframe, HourlyReading, RawFileBatch, VALUE_COLUMN};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const DATE_COLUMN: &str = "date";

// NaiveDate::num_days_from_ce() of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// All hourly readings of an ingestion run, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    readings: Vec<HourlyReading>,
}

impl HourlySeries {
    /// Sorts by timestamp; readings sharing a timestamp keep their input order.
    pub fn new(mut readings: Vec<HourlyReading>) -> Self {
        readings.sort_by_key(|reading| reading.timestamp);
        Self { readings }
    }

    pub fn from_batches(batches: &[RawFileBatch]) -> Self {
        let readings = batches
            .iter()
            .flat_map(|batch| batch.readings.iter().copied())
            .collect();
        Self::new(readings)
    }

    pub fn readings(&self) -> &[HourlyReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn present_values(&self) -> usize {
        self.readings.iter().filter(|r| r.value.is_some()).count()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        readings_to_dataframe(&self.readings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CleanedReading {
    pub timestamp: NaiveDateTime,
    /// `None` only when the whole series had no value to interpolate from.
    pub value: Option<f64>,
    pub is_outlier: bool,
    pub is_null: bool,
}

impl CleanedReading {
    pub fn was_imputed(&self) -> bool {
        self.is_outlier || self.is_null
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedHourlySeries {
    pub rows: Vec<CleanedReading>,
}

impl CleanedHourlySeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drops the auxiliary flags, e.g. to feed the cleaned values through another pass.
    pub fn to_hourly(&self) -> HourlySeries {
        HourlySeries::new(
            self.rows
                .iter()
                .map(|row| HourlyReading::new(row.timestamp, row.value))
                .collect(),
        )
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut df = self.to_hourly().to_dataframe()?;
        let outliers: Vec<bool> = self.rows.iter().map(|row| row.is_outlier).collect();
        let nulls: Vec<bool> = self.rows.iter().map(|row| row.is_null).collect();
        let flags: [Column; 2] = [
            Series::new("is_outlier".into(), outliers).into(),
            Series::new("is_null".into(), nulls).into(),
        ];
        df.hstack_mut(&flags)?;
        Ok(df)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One value per calendar day, contiguous from the first to the last date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub points: Vec<DailyPoint>,
}

impl DailySeries {
    pub fn new(mut points: Vec<DailyPoint>) -> Self {
        points.sort_by_key(|point| point.date);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|point| point.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.date)
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |point| point.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    /// True when every consecutive pair of dates is exactly one day apart.
    pub fn is_contiguous(&self) -> bool {
        self.points
            .windows(2)
            .all(|pair| pair[0].date.succ_opt() == Some(pair[1].date))
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates = self.points.iter().map(|point| point.date).collect::<Vec<_>>();
        let values = self
            .points
            .iter()
            .map(|point| Some(point.value))
            .collect::<Vec<_>>();
        daily_dataframe(&dates, values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirtyDailyPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Daily means of the unmasked readings. Days without a single present hourly
/// value stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirtyDailySeries {
    pub points: Vec<DirtyDailyPoint>,
}

impl DirtyDailySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn missing_days(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_none()).count()
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<Option<f64>> {
        self.points
            .binary_search_by_key(&date, |point| point.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates = self.points.iter().map(|point| point.date).collect::<Vec<_>>();
        let values = self.points.iter().map(|point| point.value).collect();
        daily_dataframe(&dates, values)
    }
}

fn daily_dataframe(dates: &[NaiveDate], values: Vec<Option<f64>>) -> PolarsResult<DataFrame> {
    let days: Vec<i32> = dates
        .iter()
        .map(|date| date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    let date_series = Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;

    DataFrame::new(vec![
        date_series.into(),
        Series::new(VALUE_COLUMN.into(), values).into(),
    ])
}

/// Data-quality counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityStats {
    pub total_rows: usize,
    pub nulls_inputs: usize,
    pub outliers_detected: usize,
    pub interpolated_total: usize,
    pub missing_days_filled: usize,
}

impl QualityStats {
    pub fn as_pairs(&self) -> [(&'static str, usize); 5] {
        [
            ("total_rows", self.total_rows),
            ("nulls_inputs", self.nulls_inputs),
            ("outliers_detected", self.outliers_detected),
            ("interpolated_total", self.interpolated_total),
            ("missing_days_filled", self.missing_days_filled),
        ]
    }
}
