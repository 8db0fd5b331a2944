pub mod errors;
pub mod filename;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ErrorKind, ParserError};
pub use filename::{
    resolve_filename_date, resolve_filename_date_with_prefix, CENTURY_BASE,
    DEFAULT_FILENAME_PREFIX,
};
pub use formats::{RgdWorkbookParser, SchemaError, SheetSchema, SheetSelector};
pub use model::{readings_to_dataframe, HourlyReading, RawFileBatch, TIMESTAMP_COLUMN, VALUE_COLUMN};
pub use registry::{parse_workbook, WorkbookParser};
