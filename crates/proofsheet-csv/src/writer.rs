//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvWriteOptions;
use proofsheet_core::Worksheet;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a worksheet to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        worksheet: &Worksheet,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(worksheet, file, options)
    }

    /// Write a worksheet to a writer
    ///
    /// Output starts at A1 so cell positions are preserved; formulas are
    /// written as their cached value.
    pub fn write<W: Write>(
        worksheet: &Worksheet,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = if options.crlf {
            csv::Terminator::CRLF
        } else {
            csv::Terminator::Any(b'\n')
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.dialect.delimiter)
            .quote(options.dialect.quote)
            .terminator(terminator)
            .flexible(true)
            .from_writer(writer);

        if let Some((_, end)) = worksheet.used_bounds() {
            for row in 0..=end.row {
                let record: Vec<String> = (0..=end.col)
                    .map(|col| worksheet.get_value_at(row, col).to_string())
                    .collect();
                csv_writer.write_record(&record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CsvReadOptions, CsvReader};

    #[test]
    fn test_write_then_read() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value("B2", "has, comma").unwrap();
        ws.set_cell_value("A3", "plain").unwrap();

        let mut out = Vec::new();
        let options = CsvWriteOptions {
            crlf: false,
            ..Default::default()
        };
        CsvWriter::write(&ws, &mut out, &options).unwrap();
        assert_eq!(String::from_utf8(out.clone()).unwrap(), ",\n,\"has, comma\"\nplain,\n");

        let back = CsvReader::read(out.as_slice(), &CsvReadOptions::default()).unwrap();
        assert_eq!(back.get_value("B2").unwrap().as_text(), Some("has, comma"));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value("A1", "x").unwrap();
        CsvWriter::write_file(&ws, &path, &CsvWriteOptions::default()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\r\n");
    }
}
