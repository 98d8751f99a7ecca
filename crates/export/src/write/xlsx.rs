use crate::error::{ErrorKind, Result};
use crate::{COLUMNS, Cell, ExportRow, Format, SHEET_NAME};
use exn::ResultExt;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> std::result::Result<(), XlsxError> {
    match cell {
        Cell::Empty => {},
        Cell::Text(text) => {
            sheet.write_string(row, col, text)?;
        },
        Cell::Number(number) => {
            sheet.write_number(row, col, *number as f64)?;
        },
    }
    Ok(())
}

fn write_sheet(sheet: &mut Worksheet, rows: &[ExportRow]) -> std::result::Result<(), XlsxError> {
    sheet.set_name(SHEET_NAME)?;
    for (col, header) in (0u16..).zip(COLUMNS) {
        sheet.write_string(0, col, header)?;
    }
    for (index, row) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(row.cells()) {
            write_cell(sheet, index, col, cell)?;
        }
    }
    Ok(())
}

pub(crate) fn write_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), rows).or_raise(|| ErrorKind::Encoding(Format::Xlsx))?;
    workbook.save_to_buffer().or_raise(|| ErrorKind::Encoding(Format::Xlsx))
}
