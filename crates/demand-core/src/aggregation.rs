use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::imputation::{fill_gaps, EdgePolicy};
use crate::series::{
    CleanedHourlySeries, DailyPoint, DailySeries, DirtyDailyPoint, DirtyDailySeries, HourlySeries,
    QualityStats,
};

/// Which day an hourly timestamp is averaged into.
///
/// `HourEnding` is the default so that one `rgd_DDMMYY` file yields exactly
/// one day, its hour-24 reading included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundary {
    /// Readings label the end of their hour: the 00:00 reading closes the previous day.
    #[default]
    HourEnding,
    /// Readings belong to the calendar date of their timestamp.
    Calendar,
}

impl DayBoundary {
    pub fn day_of(&self, timestamp: NaiveDateTime) -> NaiveDate {
        match self {
            DayBoundary::Calendar => timestamp.date(),
            DayBoundary::HourEnding => timestamp
                .checked_sub_signed(TimeDelta::nanoseconds(1))
                .map(|shifted| shifted.date())
                .unwrap_or_else(|| timestamp.date()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub day_boundary: DayBoundary,
}

#[derive(Debug, Clone)]
pub struct DailyOutcome {
    pub clean: DailySeries,
    pub dirty: DirtyDailySeries,
    pub stats: QualityStats,
}

#[derive(Default)]
struct DayAccumulator {
    sum: f64,
    count: usize,
}

impl DayAccumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Resamples the cleaned and unmasked hourly series to daily means over the
/// full date span, then interpolates days with no data at all.
pub fn aggregate_daily(
    cleaned: &CleanedHourlySeries,
    original: &HourlySeries,
    hourly_stats: QualityStats,
    config: &AggregationConfig,
) -> Result<DailyOutcome> {
    let boundary = config.day_boundary;

    let mut dirty_days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for reading in original.readings() {
        dirty_days
            .entry(boundary.day_of(reading.timestamp))
            .or_default()
            .push(reading.value);
    }

    let mut clean_days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for row in &cleaned.rows {
        clean_days
            .entry(boundary.day_of(row.timestamp))
            .or_default()
            .push(row.value);
    }

    let span_start = dirty_days.keys().chain(clean_days.keys()).min().copied();
    let span_end = dirty_days.keys().chain(clean_days.keys()).max().copied();
    let (Some(start), Some(end)) = (span_start, span_end) else {
        return Err(PipelineError::NoObservations);
    };

    let calendar = date_span(start, end);

    let dirty = DirtyDailySeries {
        points: calendar
            .iter()
            .map(|&date| DirtyDailyPoint {
                date,
                value: dirty_days.get(&date).and_then(DayAccumulator::mean),
            })
            .collect(),
    };

    let mut clean_values: Vec<Option<f64>> = calendar
        .iter()
        .map(|date| clean_days.get(date).and_then(DayAccumulator::mean))
        .collect();
    let missing_days = clean_values.iter().filter(|value| value.is_none()).count();
    fill_gaps(&mut clean_values, EdgePolicy::InteriorOnly);

    let points = calendar
        .iter()
        .zip(clean_values)
        .map(|(&date, value)| {
            value
                .map(|value| DailyPoint { date, value })
                .ok_or(PipelineError::NoObservations)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        start = %start,
        end = %end,
        days = points.len(),
        missing_days,
        "daily series aggregated"
    );

    Ok(DailyOutcome {
        clean: DailySeries::new(points),
        dirty,
        stats: QualityStats {
            missing_days_filled: missing_days,
            ..hourly_stats
        },
    })
}

fn date_span(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .collect()
}
