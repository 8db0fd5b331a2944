use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Coarse classification used when reporting per-file failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Format,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Format => "format",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("file name '{filename}' does not match '{prefix}DDMMYY'")]
    FilenameFormat { filename: String, prefix: String },

    #[error("file name '{filename}' encodes an invalid date '{digits}'")]
    InvalidDate { filename: String, digits: String },

    #[error("{filename}: failed to read workbook: {source}")]
    Workbook {
        filename: String,
        #[source]
        source: calamine::Error,
    },

    #[error("{filename}: worksheet {sheet} not found")]
    MissingSheet { filename: String, sheet: String },

    #[error("{filename}: unexpected sheet shape: {message}")]
    SheetShape { filename: String, message: String },

    #[error("{filename}: no hour rows could be read from {range}")]
    EmptyData { filename: String, range: String },
}

impl ParserError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParserError::FilenameFormat { .. }
            | ParserError::InvalidDate { .. }
            | ParserError::SheetShape { .. }
            | ParserError::EmptyData { .. } => ErrorKind::Format,
            ParserError::Workbook { .. } | ParserError::MissingSheet { .. } => ErrorKind::Io,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            ParserError::FilenameFormat { filename, .. }
            | ParserError::InvalidDate { filename, .. }
            | ParserError::Workbook { filename, .. }
            | ParserError::MissingSheet { filename, .. }
            | ParserError::SheetShape { filename, .. }
            | ParserError::EmptyData { filename, .. } => filename,
        }
    }
}
