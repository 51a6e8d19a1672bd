//! Number formats
//!
//! Dates are numbers with a date format, so keeping the format is what keeps
//! a date looking like a date in the annotated copy.

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    #[default]
    General,
    /// One of the application's predefined formats, by `numFmtId`
    BuiltIn(u32),
    /// A format code stored in the workbook, e.g. `0.0" kg"`
    Custom(String),
}

impl NumberFormat {
    /// Built-in 14, shown as `m/d/yyyy` in US locales
    pub fn date_short() -> Self {
        NumberFormat::BuiltIn(14)
    }
}
