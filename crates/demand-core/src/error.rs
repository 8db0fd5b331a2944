// crates/demand-core/src/error.rs

use demand_parser::{ParserError, SchemaError};
use thiserror::Error;

use crate::ingestion::FileReport;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Workbook parsing failed: {0}")]
    Parser(#[from] ParserError),

    #[error("No file in the batch could be ingested ({} attempted)", reports.len())]
    EmptyBatch { reports: Vec<FileReport> },

    #[error("Ingested readings contain no numeric demand values")]
    NoObservations,

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration could not be parsed: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Configuration is invalid: {0}")]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
