//! Rendering of merged library rows into spreadsheet containers.
//!
//! Every [`Format`] receives the same header and the same cells in the same
//! order ([`COLUMNS`]); only the container differs. Delimited formats carry
//! numbers as decimal text, spreadsheet formats as numeric cells.
//!
//! The legacy binary `.xls` container is not supported.

mod cell;
mod construct;
pub mod error;
mod job;
mod row;
mod write;

pub use crate::cell::{Cell, LIST_DELIMITER, MAX_CELL_CHARS};
pub use crate::job::{ExportJob, render};
pub use crate::row::{COLUMNS, ExportRow};

/// Name of the single worksheet in spreadsheet formats.
pub const SHEET_NAME: &str = "GAMES";

/// A supported export format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Format {
    /// Comma separated values (.csv)
    Csv,
    /// Tab separated values (.tsv), Excel's tab dialect
    Tsv,
    /// Office Open XML workbook (.xlsx)
    #[default]
    Xlsx,
    /// OpenDocument spreadsheet (.ods)
    Ods,
}
