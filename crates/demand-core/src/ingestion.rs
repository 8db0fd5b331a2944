use std::collections::HashSet;

use blake3::Hasher;
use chrono::NaiveDate;
use demand_parser::{ErrorKind, RawFileBatch, WorkbookParser};
use serde::Serialize;
use tracing::{info, warn};

/// One uploaded workbook: its name (which carries the date) and raw bytes.
#[derive(Debug)]
pub struct FileInput<'a> {
    pub name: &'a str,
    pub contents: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Duplicate,
    Parsed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    pub hash: String,
    pub status: FileStatus,
    pub readings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct IngestionBatch {
    pub batches: Vec<RawFileBatch>,
    pub reports: Vec<FileReport>,
}

impl IngestionBatch {
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports
            .iter()
            .filter(|report| report.status == FileStatus::Failed)
    }
}

/// Parses every input independently; a failing file is reported and skipped.
///
/// A file is a duplicate only when both its day and its content match an
/// earlier input, so identical sheets uploaded under different dates are kept.
pub fn ingest_files(inputs: &[FileInput<'_>], parser: &dyn WorkbookParser) -> IngestionBatch {
    let mut batches = Vec::new();
    let mut reports = Vec::with_capacity(inputs.len());
    let mut seen = HashSet::new();

    for input in inputs {
        let hash = compute_hash(input.contents);
        let day = match parser.base_date(input.name) {
            Ok(date) => DayKey::Date(date),
            Err(_) => DayKey::Name(input.name.to_string()),
        };
        if !seen.insert((day, hash.clone())) {
            warn!(file = input.name, "skipping duplicate upload of the same day");
            reports.push(FileReport {
                name: input.name.to_string(),
                hash,
                status: FileStatus::Duplicate,
                readings: 0,
                error_kind: None,
                error: None,
            });
            continue;
        }

        match parser.parse(input.name, input.contents) {
            Ok(batch) => {
                info!(
                    file = input.name,
                    parser = parser.name(),
                    base_date = %batch.base_date,
                    readings = batch.len(),
                    "parsed workbook"
                );
                reports.push(FileReport {
                    name: input.name.to_string(),
                    hash,
                    status: FileStatus::Parsed,
                    readings: batch.len(),
                    error_kind: None,
                    error: None,
                });
                batches.push(batch);
            }
            Err(err) => {
                warn!(file = input.name, kind = %err.kind(), error = %err, "failed to parse workbook");
                reports.push(FileReport {
                    name: input.name.to_string(),
                    hash,
                    status: FileStatus::Failed,
                    readings: 0,
                    error_kind: Some(err.kind()),
                    error: Some(err.to_string()),
                });
            }
        }
    }

    IngestionBatch { batches, reports }
}

#[derive(PartialEq, Eq, Hash)]
enum DayKey {
    Date(NaiveDate),
    Name(String),
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
