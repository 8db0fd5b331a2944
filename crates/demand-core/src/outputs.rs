use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use polars::io::parquet::write::{ParquetCompression, ParquetWriter};
use serde::Serialize;

use crate::error::Result;
use crate::series::{DailySeries, DirtyDailySeries};

const DAILY_HEADER: [&str; 2] = ["date", "value"];
const FORECAST_HEADER: [&str; 4] = ["date", "predicted", "lower_bound", "upper_bound"];

#[derive(Debug, Serialize)]
struct DailyRow {
    date: NaiveDate,
    value: Option<f64>,
}

/// Writes `date,value` rows; missing dirty values are left empty. The header
/// is written even when the series is empty.
pub fn write_daily_csv<W: Write>(series: &DailySeries, writer: W) -> Result<()> {
    write_rows(
        &DAILY_HEADER,
        series.points.iter().map(|point| DailyRow {
            date: point.date,
            value: Some(point.value),
        }),
        writer,
    )
}

pub fn write_dirty_csv<W: Write>(series: &DirtyDailySeries, writer: W) -> Result<()> {
    write_rows(
        &DAILY_HEADER,
        series.points.iter().map(|point| DailyRow {
            date: point.date,
            value: point.value,
        }),
        writer,
    )
}

fn write_rows<W: Write, R: Serialize>(
    header: &[&str],
    rows: impl IntoIterator<Item = R>,
    writer: W,
) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_daily_parquet(series: &DailySeries, path: &Path) -> Result<()> {
    let mut df = series.to_dataframe()?;
    let file = File::create(path)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut df)?;
    Ok(())
}

/// A projected day as exported by the forecasting stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

pub fn write_forecast_csv<W: Write>(rows: &[ForecastRow], writer: W) -> Result<()> {
    write_rows(&FORECAST_HEADER, rows, writer)
}
