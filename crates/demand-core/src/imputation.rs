use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::series::{CleanedHourlySeries, CleanedReading, HourlySeries, QualityStats};

pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Readings with `|z| > z_threshold` are treated as outliers.
    pub z_threshold: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImputationOutcome {
    pub cleaned: CleanedHourlySeries,
    /// The unmasked input, kept for the dirty/clean comparison.
    pub original: HourlySeries,
    /// Hourly counters; `missing_days_filled` is left at zero.
    pub stats: QualityStats,
}

/// Population mean and standard deviation of the present values.
pub fn population_moments(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Flags z-score outliers and missing readings, masks them and fills the
/// masked positions by linear interpolation over the row order. Leading and
/// trailing gaps take the nearest known value.
pub fn detect_and_impute(series: &HourlySeries, config: &CleaningConfig) -> ImputationOutcome {
    let readings = series.readings();
    let moments = population_moments(readings.iter().filter_map(|r| r.value));

    let is_outlier: Vec<bool> = readings
        .iter()
        .map(|reading| match (reading.value, moments) {
            (Some(value), Some((mean, std))) if std > 0.0 => {
                ((value - mean) / std).abs() > config.z_threshold
            }
            _ => false,
        })
        .collect();
    let is_null: Vec<bool> = readings.iter().map(|r| r.value.is_none()).collect();

    let mut values: Vec<Option<f64>> = readings
        .iter()
        .zip(&is_outlier)
        .map(|(reading, &outlier)| if outlier { None } else { reading.value })
        .collect();
    fill_gaps(&mut values, EdgePolicy::Nearest);

    let rows: Vec<CleanedReading> = readings
        .iter()
        .zip(values)
        .zip(is_outlier.iter().zip(&is_null))
        .map(|((reading, value), (&is_outlier, &is_null))| CleanedReading {
            timestamp: reading.timestamp,
            value,
            is_outlier,
            is_null,
        })
        .collect();

    let stats = QualityStats {
        total_rows: readings.len(),
        nulls_inputs: is_null.iter().filter(|&&flag| flag).count(),
        outliers_detected: is_outlier.iter().filter(|&&flag| flag).count(),
        interpolated_total: rows.iter().filter(|row| row.was_imputed()).count(),
        missing_days_filled: 0,
    };

    if let Some((mean, std)) = moments {
        debug!(
            mean,
            std,
            outliers = stats.outliers_detected,
            nulls = stats.nulls_inputs,
            "hourly series cleaned"
        );
    }

    ImputationOutcome {
        cleaned: CleanedHourlySeries { rows },
        original: series.clone(),
        stats,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Leading/trailing gaps copy the nearest known value.
    Nearest,
    /// Only gaps with a known value on both sides are filled.
    InteriorOnly,
}

/// Linear interpolation by position. Returns how many slots were filled.
pub fn fill_gaps(values: &mut [Option<f64>], edges: EdgePolicy) -> usize {
    let known: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.map(|_| idx))
        .collect();
    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return 0;
    };

    let mut filled = 0;
    for pair in known.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if right - left < 2 {
            continue;
        }
        let (Some(start), Some(end)) = (values[left], values[right]) else {
            continue;
        };
        let span = (right - left) as f64;
        for idx in left + 1..right {
            let ratio = (idx - left) as f64 / span;
            values[idx] = Some(start + ratio * (end - start));
            filled += 1;
        }
    }

    if edges == EdgePolicy::Nearest {
        let head = values[first];
        for slot in values[..first].iter_mut() {
            *slot = head;
            filled += 1;
        }
        let tail = values[last];
        for slot in values[last + 1..].iter_mut() {
            *slot = tail;
            filled += 1;
        }
    }

    filled
}
