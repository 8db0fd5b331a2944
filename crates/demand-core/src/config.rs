use std::fs;
use std::path::Path;

use demand_parser::{RgdWorkbookParser, SheetSchema};
use serde::{Deserialize, Serialize};

use crate::aggregation::AggregationConfig;
use crate::error::Result;
use crate::imputation::CleaningConfig;

/// Settings for one ETL run. Every section is optional in TOML; an empty
/// document yields the built-in `rgd_` layout with a 3-sigma outlier rule.
///
/// ```toml
/// [schema]
/// hour_column = "A"
/// value_column = "L"
/// first_row = 12
/// last_row = 36
///
/// [cleaning]
/// z_threshold = 3.0
///
/// [aggregation]
/// day_boundary = "hour_ending"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub schema: SheetSchema,
    pub cleaning: CleaningConfig,
    pub aggregation: AggregationConfig,
}

impl EtlConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EtlConfig = toml::from_str(raw)?;
        config.schema.layout()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn parser(&self) -> Result<RgdWorkbookParser> {
        Ok(RgdWorkbookParser::new(self.schema.clone())?)
    }
}
