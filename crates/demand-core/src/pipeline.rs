use demand_parser::{RawFileBatch, WorkbookParser};
use tracing::{info, warn};

use crate::aggregation::aggregate_daily;
use crate::config::EtlConfig;
use crate::error::{PipelineError, Result};
use crate::imputation::detect_and_impute;
use crate::ingestion::{ingest_files, FileInput, FileReport};
use crate::series::{CleanedHourlySeries, DailySeries, DirtyDailySeries, HourlySeries, QualityStats};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub clean: DailySeries,
    pub dirty: DirtyDailySeries,
    pub stats: QualityStats,
    pub cleaned_hourly: CleanedHourlySeries,
    pub reports: Vec<FileReport>,
}

/// Parses, cleans and aggregates a batch of workbooks. Per-file failures are
/// collected in `reports`; only a batch where no file parses is an error.
pub fn run_pipeline(
    inputs: &[FileInput<'_>],
    parser: &dyn WorkbookParser,
    config: &EtlConfig,
) -> Result<PipelineOutput> {
    let ingestion = ingest_files(inputs, parser);
    let failed = ingestion.failures().count();

    if ingestion.batches.is_empty() {
        warn!(attempted = inputs.len(), "no workbook in the batch could be parsed");
        return Err(PipelineError::EmptyBatch {
            reports: ingestion.reports,
        });
    }

    let mut output = process_batches(&ingestion.batches, config)?;
    output.reports = ingestion.reports;

    info!(
        files = inputs.len(),
        parsed = ingestion.batches.len(),
        failed,
        days = output.clean.len(),
        outliers = output.stats.outliers_detected,
        missing_days = output.stats.missing_days_filled,
        "pipeline finished"
    );

    Ok(output)
}

/// Runs cleaning and aggregation over already parsed batches.
pub fn process_batches(batches: &[RawFileBatch], config: &EtlConfig) -> Result<PipelineOutput> {
    let hourly = HourlySeries::from_batches(batches);
    process_hourly(&hourly, config)
}

pub fn process_hourly(hourly: &HourlySeries, config: &EtlConfig) -> Result<PipelineOutput> {
    if hourly.present_values() == 0 {
        return Err(PipelineError::NoObservations);
    }

    let imputed = detect_and_impute(hourly, &config.cleaning);
    let daily = aggregate_daily(
        &imputed.cleaned,
        &imputed.original,
        imputed.stats,
        &config.aggregation,
    )?;

    Ok(PipelineOutput {
        clean: daily.clean,
        dirty: daily.dirty,
        stats: daily.stats,
        cleaned_hourly: imputed.cleaned,
        reports: Vec::new(),
    })
}
