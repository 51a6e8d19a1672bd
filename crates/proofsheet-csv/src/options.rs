//! How CSV text is split and joined

/// Field separator and quote byte, shared by reading and writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl CsvDialect {
    pub const COMMA: CsvDialect = CsvDialect {
        delimiter: b',',
        quote: b'"',
    };

    /// Semicolons, as spreadsheet apps write CSV in locales with a decimal comma
    pub const SEMICOLON: CsvDialect = CsvDialect {
        delimiter: b';',
        quote: b'"',
    };
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self::COMMA
    }
}

/// Records may have differing field counts; a short record simply leaves
/// the rest of its row empty.
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    pub dialect: CsvDialect,
    /// Turn numeric and TRUE/FALSE fields into numbers and booleans.
    ///
    /// Off by default, so every field keeps the exact text of the file and
    /// codes such as `007` are never reformatted.
    pub auto_detect_types: bool,
    /// Name of the single worksheet produced
    pub sheet_name: String,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            dialect: CsvDialect::COMMA,
            auto_detect_types: false,
            sheet_name: "Sheet1".into(),
        }
    }
}

impl CsvReadOptions {
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    pub dialect: CsvDialect,
    /// End records with `\r\n` (the default) rather than `\n`
    pub crlf: bool,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            dialect: CsvDialect::COMMA,
            crlf: true,
        }
    }
}
