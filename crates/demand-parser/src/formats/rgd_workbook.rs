use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::filename::resolve_filename_date_with_prefix;
use crate::model::{HourlyReading, RawFileBatch};
use crate::registry::WorkbookParser;

use super::schema::{CellLayout, SchemaError, SheetSchema, SheetSelector};
use super::{coerce_demand, normalize_hour, timestamp_for_hour};

/// Reads the hour/demand window of an `rgd_DDMMYY` workbook.
#[derive(Debug, Clone)]
pub struct RgdWorkbookParser {
    schema: SheetSchema,
    layout: CellLayout,
}

impl Default for RgdWorkbookParser {
    fn default() -> Self {
        Self {
            schema: SheetSchema::default(),
            layout: CellLayout::RGD,
        }
    }
}

impl RgdWorkbookParser {
    const NAME: &'static str = "RGD_WORKBOOK";

    pub fn new(schema: SheetSchema) -> Result<Self, SchemaError> {
        let layout = schema.layout()?;
        Ok(Self { schema, layout })
    }

    pub fn schema(&self) -> &SheetSchema {
        &self.schema
    }

    pub fn parse_path(&self, path: &Path) -> Result<RawFileBatch, ParserError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        // Resolve the date before touching the file so a misnamed file fails as a format error.
        resolve_filename_date_with_prefix(&filename, &self.schema.filename_prefix)?;

        let mut workbook = open_workbook_auto(path).map_err(|source| ParserError::Workbook {
            filename: filename.clone(),
            source,
        })?;
        let range = self.select_range(&filename, &mut workbook)?;
        self.parse_range(&filename, &range)
    }

    /// Extracts the batch from an already loaded worksheet range.
    pub fn parse_range(
        &self,
        filename: &str,
        range: &Range<Data>,
    ) -> Result<RawFileBatch, ParserError> {
        let base_date = resolve_filename_date_with_prefix(filename, &self.schema.filename_prefix)?;

        let Some((last_row, _)) = range.end() else {
            return Err(ParserError::SheetShape {
                filename: filename.to_string(),
                message: "worksheet is empty".to_string(),
            });
        };
        if last_row < self.layout.first_row {
            return Err(ParserError::SheetShape {
                filename: filename.to_string(),
                message: format!(
                    "worksheet ends at row {} before the first data row {}",
                    last_row + 1,
                    self.schema.first_row
                ),
            });
        }

        let empty = Data::Empty;
        let mut readings = Vec::with_capacity(self.schema.expected_rows as usize);
        for row in self.layout.rows() {
            let hour_cell = range
                .get_value((row, self.layout.hour_col))
                .unwrap_or(&empty);
            let Some(timestamp) =
                normalize_hour(hour_cell).and_then(|hour| timestamp_for_hour(base_date, hour))
            else {
                continue;
            };

            let value_cell = range
                .get_value((row, self.layout.value_col))
                .unwrap_or(&empty);
            readings.push(HourlyReading::new(timestamp, coerce_demand(value_cell)));
        }

        if readings.is_empty() {
            return Err(ParserError::EmptyData {
                filename: filename.to_string(),
                range: self.schema.hour_range_label(),
            });
        }

        Ok(RawFileBatch {
            filename: filename.to_string(),
            base_date,
            readings,
        })
    }

    fn select_range<RS: Read + Seek>(
        &self,
        filename: &str,
        workbook: &mut Sheets<RS>,
    ) -> Result<Range<Data>, ParserError> {
        let missing = || ParserError::MissingSheet {
            filename: filename.to_string(),
            sheet: self.schema.sheet.to_string(),
        };
        let read_failed = |source| ParserError::Workbook {
            filename: filename.to_string(),
            source,
        };

        match &self.schema.sheet {
            SheetSelector::Index(idx) => workbook
                .worksheet_range_at(*idx)
                .ok_or_else(missing)?
                .map_err(read_failed),
            SheetSelector::Name(name) => {
                if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
                    return Err(missing());
                }
                workbook.worksheet_range(name).map_err(read_failed)
            }
        }
    }
}

impl WorkbookParser for RgdWorkbookParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn base_date(&self, filename: &str) -> Result<NaiveDate, ParserError> {
        resolve_filename_date_with_prefix(filename, &self.schema.filename_prefix)
    }

    fn parse(&self, filename: &str, contents: &[u8]) -> Result<RawFileBatch, ParserError> {
        resolve_filename_date_with_prefix(filename, &self.schema.filename_prefix)?;

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(contents.to_vec())).map_err(
            |source| ParserError::Workbook {
                filename: filename.to_string(),
                source,
            },
        )?;
        let range = self.select_range(filename, &mut workbook)?;
        self.parse_range(filename, &range)
    }
}
