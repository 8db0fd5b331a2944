mod common;
mod rgd_workbook;
pub mod schema;

pub use rgd_workbook::RgdWorkbookParser;
pub use schema::{column_index, CellLayout, SchemaError, SheetSchema, SheetSelector};

pub(crate) use common::{coerce_demand, normalize_hour, timestamp_for_hour};
