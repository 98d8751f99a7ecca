use crate::error::{ErrorKind, Result};
use crate::{COLUMNS, Cell, ExportRow, Format, SHEET_NAME};
use exn::ResultExt;
use spreadsheet_ods::{Sheet, WorkBook, write_ods_buf};

pub(crate) fn write_ods(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut sheet = Sheet::new(SHEET_NAME);
    for (col, header) in (0u32..).zip(COLUMNS) {
        sheet.set_value(0, col, header);
    }
    for (index, row) in (1u32..).zip(rows) {
        for (col, cell) in (0u32..).zip(row.cells()) {
            match cell {
                Cell::Empty => {},
                Cell::Text(text) => sheet.set_value(index, col, text.as_str()),
                Cell::Number(number) => sheet.set_value(index, col, *number as f64),
            }
        }
    }
    let mut workbook = WorkBook::new_empty();
    workbook.push_sheet(sheet);
    write_ods_buf(&mut workbook, Vec::new()).or_raise(|| ErrorKind::Encoding(Format::Ods))
}
