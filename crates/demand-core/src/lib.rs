pub mod aggregation;
pub mod config;
pub mod db;
pub mod error;
pub mod imputation;
pub mod ingestion;
pub mod outputs;
pub mod pipeline;
pub mod repository;
pub mod series;

pub use config::EtlConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{run_pipeline, PipelineOutput};
pub use series::{DailySeries, DirtyDailySeries, HourlySeries, QualityStats};
