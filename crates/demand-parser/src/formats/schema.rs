use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filename::DEFAULT_FILENAME_PREFIX;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid sheet schema: {0}")]
pub struct SchemaError(pub String);

/// Which worksheet of a workbook holds the demand table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(idx) => write!(f, "#{idx}"),
            SheetSelector::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Cell layout of a demand workbook. Rows are 1-indexed and inclusive, columns
/// use spreadsheet letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSchema {
    pub sheet: SheetSelector,
    pub hour_column: String,
    pub value_column: String,
    pub first_row: u32,
    pub last_row: u32,
    pub expected_rows: u32,
    pub filename_prefix: String,
}

impl Default for SheetSchema {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            hour_column: "A".to_string(),
            value_column: "L".to_string(),
            first_row: 12,
            last_row: 36,
            expected_rows: 25,
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
        }
    }
}

/// Zero-based cell coordinates derived from a validated [`SheetSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    pub hour_col: u32,
    pub value_col: u32,
    pub first_row: u32,
    pub last_row: u32,
}

impl CellLayout {
    /// A12:A36 / L12:L36.
    pub const RGD: CellLayout = CellLayout {
        hour_col: 0,
        value_col: 11,
        first_row: 11,
        last_row: 35,
    };

    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.first_row..=self.last_row
    }
}

impl SheetSchema {
    pub fn layout(&self) -> Result<CellLayout, SchemaError> {
        let hour_col = column_index(&self.hour_column).ok_or_else(|| {
            SchemaError(format!("hour column '{}' is not a column name", self.hour_column))
        })?;
        let value_col = column_index(&self.value_column).ok_or_else(|| {
            SchemaError(format!("value column '{}' is not a column name", self.value_column))
        })?;

        if self.first_row == 0 {
            return Err(SchemaError("rows are 1-indexed; first_row must be >= 1".into()));
        }
        if self.last_row < self.first_row {
            return Err(SchemaError(format!(
                "last_row {} precedes first_row {}",
                self.last_row, self.first_row
            )));
        }
        let span = self.last_row - self.first_row + 1;
        if span != self.expected_rows {
            return Err(SchemaError(format!(
                "rows {}..={} cover {span} rows but expected_rows is {}",
                self.first_row, self.last_row, self.expected_rows
            )));
        }
        if self.filename_prefix.trim().is_empty() {
            return Err(SchemaError("filename_prefix must not be empty".into()));
        }

        Ok(CellLayout {
            hour_col,
            value_col,
            first_row: self.first_row - 1,
            last_row: self.last_row - 1,
        })
    }

    pub fn hour_range_label(&self) -> String {
        format!(
            "{col}{}:{col}{}",
            self.first_row,
            self.last_row,
            col = self.hour_column.to_ascii_uppercase()
        )
    }
}

/// Converts a spreadsheet column name (`A`, `L`, `AB`) to a zero-based index.
pub fn column_index(name: &str) -> Option<u32> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 3 {
        return None;
    }
    let mut index: u32 = 0;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        index = index * 26 + digit;
    }
    Some(index - 1)
}
