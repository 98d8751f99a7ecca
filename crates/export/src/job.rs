use crate::error::Result;
use crate::write::{write_delimited, write_ods, write_xlsx};
use crate::{ExportRow, Format};
use sge_extract::models::AccountId;
use tracing::instrument;

/// Everything needed to produce one export file. Lives only as long as the
/// export it belongs to.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub account: AccountId,
    /// In the order the library listed the titles.
    pub rows: Vec<ExportRow>,
    pub format: Format,
}

/// Encode the job's rows in its format.
#[instrument(skip(job), fields(account = %job.account, format = %job.format, rows = job.rows.len()))]
pub fn render(job: &ExportJob) -> Result<Vec<u8>> {
    match job.format {
        Format::Csv => write_delimited(&job.rows, b',', Format::Csv),
        Format::Tsv => write_delimited(&job.rows, b'\t', Format::Tsv),
        Format::Xlsx => write_xlsx(&job.rows),
        Format::Ods => write_ods(&job.rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{COLUMNS, SHEET_NAME};
    use calamine::{Data, Ods, Reader, Xlsx, open_workbook_from_rs};
    use sge_extract::models::{Availability, OwnedTitle, Playtime, ReleaseDate, TitleId, TitleMetadata};
    use std::io::Cursor;
    use time::UtcDateTime;

    fn job(format: Format) -> ExportJob {
        let playtime = Playtime {
            total: 4312,
            linux: 12,
            mac: 0,
            windows: 4300,
        };
        let mut portal = TitleMetadata::empty(TitleId::new(620), Availability::Accessible, UtcDateTime::now());
        portal.app_type = Some("game".to_string());
        portal.developers = vec!["Valve".to_string()];
        portal.publishers = vec!["Valve".to_string(), "Electronic Arts".to_string()];
        portal.is_free = Some(false);
        portal.platforms.linux = Some(true);
        portal.supported_languages = vec!["English".to_string(), "Français".to_string()];
        portal.controller_support = Some("full".to_string());
        portal.age_gate = Some(16);
        portal.categories = vec!["Single-player".to_string()];
        portal.release_date = ReleaseDate::parse("18 Apr, 2011");
        let mut raw = TitleMetadata::empty(TitleId::new(99), Availability::Accessible, UtcDateTime::now());
        raw.release_date = ReleaseDate::parse("Coming \"soon\", maybe");
        let delisted = TitleMetadata::not_accessible(TitleId::new(7), UtcDateTime::now());

        let rows = vec![
            ExportRow::merge(&OwnedTitle::new(620, Some("Portal 2".to_string()), playtime), Some(&portal)),
            ExportRow::merge(&OwnedTitle::new(99, Some("Commas, \"quotes\" and more".to_string()), playtime), Some(&raw)),
            ExportRow::merge(&OwnedTitle::new(7, None, Playtime::default()), Some(&delisted)),
            ExportRow::merge(&OwnedTitle::new(8, Some("Simple".to_string()), playtime), None),
        ];
        ExportJob {
            account: AccountId::new(76561197960287930),
            rows,
            format,
        }
    }

    fn expected() -> Vec<Vec<String>> {
        let job = job(Format::Csv);
        let mut table = vec![COLUMNS.iter().map(ToString::to_string).collect::<Vec<_>>()];
        table.extend(job.rows.iter().map(|row| row.cells().iter().map(ToString::to_string).collect()));
        table
    }

    fn decode_delimited(bytes: &[u8], delimiter: u8) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_reader(bytes)
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    fn decode_sheet<R: Reader<Cursor<Vec<u8>>>>(mut workbook: R) -> Vec<Vec<String>> {
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Data::Empty => String::new(),
                        Data::String(s) => s.clone(),
                        Data::Float(f) => f.to_string(),
                        Data::Int(i) => i.to_string(),
                        other => panic!("unexpected cell {other:?}"),
                    })
                    .collect()
            })
            .collect()
    }

    fn decode(format: Format, bytes: Vec<u8>) -> Vec<Vec<String>> {
        match format {
            Format::Csv => decode_delimited(&bytes, b','),
            Format::Tsv => decode_delimited(&bytes, b'\t'),
            Format::Xlsx => decode_sheet(open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes)).unwrap()),
            Format::Ods => decode_sheet(open_workbook_from_rs::<Ods<_>, _>(Cursor::new(bytes)).unwrap()),
        }
    }

    #[test]
    fn test_formats_carry_identical_values() {
        let expected = expected();
        for format in Format::ALL {
            let bytes = render(&job(format)).unwrap();
            assert_eq!(decode(format, bytes), expected, "{format} export differs");
        }
    }

    #[test]
    fn test_spreadsheet_numbers_are_numeric() {
        let bytes = render(&job(Format::Xlsx)).unwrap();
        let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        assert_eq!(range.get((1, 2)), Some(&Data::Float(4312.0)));
        assert_eq!(range.get((1, 15)), Some(&Data::Float(16.0)));
        assert_eq!(range.get((1, 0)), Some(&Data::String("https://store.steampowered.com/app/620".to_string())));
    }

    #[test]
    fn test_empty_library_has_header_only() {
        let mut job = job(Format::Csv);
        job.rows.clear();
        let bytes = render(&job).unwrap();
        assert_eq!(decode(Format::Csv, bytes), vec![COLUMNS.iter().map(ToString::to_string).collect::<Vec<_>>()]);
    }
}
