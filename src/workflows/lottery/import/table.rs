use super::fields::clean_cell;
use calamine::{Data, Reader, Xlsx};
use csv::StringRecord;
use std::io::{Cursor, Read};

/// Local file header every XLSX (zip) container starts with.
const XLSX_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("failed to read spreadsheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid XLSX workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("workbook has no worksheets")]
    NoWorksheet,
}

/// Header row plus data rows of the first sheet, whatever the upload format.
#[derive(Debug)]
pub(crate) struct RawTable {
    pub(crate) headers: StringRecord,
    pub(crate) rows: Vec<StringRecord>,
}

impl RawTable {
    pub(crate) fn from_reader<R: Read>(mut reader: R) -> Result<Self, SheetError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self, SheetError> {
        if bytes.starts_with(XLSX_MAGIC) {
            Self::from_xlsx(bytes)
        } else {
            Self::from_csv(bytes)
        }
    }

    fn from_csv(bytes: &[u8]) -> Result<Self, SheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let headers = clean_headers(csv_reader.headers()?);
        let rows = csv_reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    fn from_xlsx(bytes: &[u8]) -> Result<Self, SheetError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(SheetError::NoWorksheet)??;

        let mut rows = range
            .rows()
            .map(|cells| cells.iter().map(cell_text).collect::<StringRecord>());
        let headers = rows
            .next()
            .map(|headers| clean_headers(&headers))
            .unwrap_or_default();
        Ok(Self {
            headers,
            rows: rows.collect(),
        })
    }

    /// Data rows with their spreadsheet row number. Row 1 is the header.
    pub(crate) fn numbered_rows(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, record)| (index + 2, record))
    }
}

fn clean_headers(headers: &StringRecord) -> StringRecord {
    headers.iter().map(clean_cell).collect()
}

/// True when every cell of the row is empty once invisible characters are stripped.
pub(crate) fn is_blank_row(record: &StringRecord) -> bool {
    record
        .iter()
        .all(|cell| clean_cell(cell).is_empty())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => clean_cell(text),
        // Apartments and spot numbers typed as numbers come back as floats.
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Nome").unwrap();
        sheet.write_string(0, 1, "Apartamento").unwrap();
        sheet.write_string(1, 0, "Ana Costa").unwrap();
        sheet.write_number(1, 1, 101.0).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn xlsx_cells_become_text_records() {
        let table = RawTable::from_bytes(&workbook_bytes()).expect("xlsx reads");

        assert_eq!(table.headers, StringRecord::from(vec!["Nome", "Apartamento"]));
        let rows: Vec<_> = table.numbered_rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[0].1, &StringRecord::from(vec!["Ana Costa", "101"]));
    }

    #[test]
    fn csv_row_numbers_ignore_embedded_newlines() {
        let csv = "Nome,Obs\n\"Ana\nCosta\",x\nBruno,y\n";
        let table = RawTable::from_bytes(csv.as_bytes()).expect("csv reads");

        let numbers: Vec<_> = table.numbered_rows().map(|(row, _)| row).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn truncated_zip_is_an_xlsx_error() {
        let error = RawTable::from_bytes(b"PK\x03\x04garbage").expect_err("not a workbook");
        assert!(matches!(error, SheetError::Xlsx(_)));
    }

    #[test]
    fn blank_row_detection_uses_every_cell() {
        assert!(is_blank_row(&StringRecord::from(vec!["", " ", "\u{feff}"])));
        assert!(!is_blank_row(&StringRecord::from(vec!["", "Ana;101"])));
    }
}
