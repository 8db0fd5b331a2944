use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::filename::resolve_filename_date;
use crate::formats::RgdWorkbookParser;
use crate::model::RawFileBatch;

pub trait WorkbookParser {
    fn name(&self) -> &'static str;

    /// The day a file name stands for, without reading the file.
    fn base_date(&self, filename: &str) -> Result<NaiveDate, ParserError> {
        resolve_filename_date(filename)
    }

    fn parse(&self, filename: &str, contents: &[u8]) -> Result<RawFileBatch, ParserError>;
}

/// Parses a workbook with the built-in `rgd_` layout.
pub fn parse_workbook(filename: &str, contents: &[u8]) -> Result<RawFileBatch, ParserError> {
    RgdWorkbookParser::default().parse(filename, contents)
}
