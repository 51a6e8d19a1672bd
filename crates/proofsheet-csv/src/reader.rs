//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use proofsheet_core::{CellValue, Worksheet, MAX_COLS, MAX_ROWS};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read CSV file into a worksheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading csv");
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a worksheet
    ///
    /// Every record becomes a row; there is no header handling since a
    /// header row is text like any other.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.dialect.delimiter)
            .quote(options.dialect.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut worksheet = Worksheet::new(options.sheet_name.as_str());

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            if row_idx >= MAX_ROWS as usize {
                return Err(CsvError::TooLarge {
                    row: row_idx + 1,
                    column: 1,
                    message: format!("more than {} rows", MAX_ROWS),
                });
            }

            for (col, field) in record.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                if col >= MAX_COLS as usize {
                    return Err(CsvError::TooLarge {
                        row: row_idx + 1,
                        column: col + 1,
                        message: format!("more than {} columns", MAX_COLS),
                    });
                }

                let value = if options.auto_detect_types {
                    Self::detect_type(field)
                } else {
                    CellValue::string(field)
                };

                worksheet.set_cell_value_at(row_idx as u32, col as u16, value)?;
            }
        }

        Ok(worksheet)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return CellValue::Boolean(true),
            "false" => return CellValue::Boolean(false),
            _ => {}
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::string(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvDialect;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fields_stay_text_by_default() {
        let data = "Name,Price\nTeh widget,42.50\n,TRUE\n";
        let ws = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(ws.name(), "Sheet1");
        assert_eq!(ws.get_value("A1").unwrap(), CellValue::string("Name"));
        assert_eq!(ws.get_value("A2").unwrap(), CellValue::string("Teh widget"));
        assert_eq!(ws.get_value("B2").unwrap(), CellValue::string("42.50"));
        assert_eq!(ws.get_value("A3").unwrap(), CellValue::Empty);
        assert_eq!(ws.get_value("B3").unwrap(), CellValue::string("TRUE"));
    }

    #[test]
    fn test_type_detection() {
        let options = CsvReadOptions {
            auto_detect_types: true,
            ..Default::default()
        };
        let ws = CsvReader::read("1.5,false,01/02/2024,NaN".as_bytes(), &options).unwrap();

        assert_eq!(ws.get_value("A1").unwrap(), CellValue::Number(1.5));
        assert_eq!(ws.get_value("B1").unwrap(), CellValue::Boolean(false));
        assert_eq!(ws.get_value("C1").unwrap(), CellValue::string("01/02/2024"));
        assert_eq!(ws.get_value("D1").unwrap(), CellValue::string("NaN"));
    }

    #[test]
    fn test_ragged_rows_and_sheet_name() {
        let options = CsvReadOptions {
            dialect: CsvDialect::SEMICOLON,
            ..CsvReadOptions::default().with_sheet_name("inventory")
        };
        let ws = CsvReader::read("a;b;c\nd\n".as_bytes(), &options).unwrap();

        assert_eq!(ws.name(), "inventory");
        assert_eq!(ws.get_value("C1").unwrap(), CellValue::string("c"));
        assert_eq!(ws.get_value("A2").unwrap(), CellValue::string("d"));
    }
}
