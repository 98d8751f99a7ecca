use crate::ExportRow;
use crate::error::{ErrorKind, Result};
use crate::{COLUMNS, Format};
use exn::ResultExt;

pub(crate) fn write_delimited(rows: &[ExportRow], delimiter: u8, format: Format) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(Vec::new());
    writer.write_record(COLUMNS).or_raise(|| ErrorKind::Encoding(format))?;
    for row in rows {
        writer
            .write_record(row.cells().iter().map(ToString::to_string))
            .or_raise(|| ErrorKind::Encoding(format))?;
    }
    writer.into_inner().or_raise(|| ErrorKind::Encoding(format))
}
