//! Cell font
//!
//! Kept only so an annotated copy shows text exactly as the input did; the
//! checker never reads or changes it.

use std::hash::{Hash, Hasher};

use super::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    /// Typeface name as stored in the file, e.g. "Calibri"
    pub name: String,
    /// Point size; fractional sizes such as 10.5 occur
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    /// Text color; [`Color::Auto`] lets the application decide
    pub color: Color,
}

/// Excel's body font for a new workbook
impl Default for FontStyle {
    fn default() -> Self {
        Self {
            name: "Calibri".into(),
            size: 11.0,
            bold: false,
            italic: false,
            underline: Underline::None,
            strikethrough: false,
            color: Color::Auto,
        }
    }
}

// `size` is hashed by bit pattern so fonts can key the style pool
impl Hash for FontStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        (self.bold, self.italic, self.strikethrough).hash(state);
        self.underline.hash(state);
        self.color.hash(state);
    }
}

impl Eq for FontStyle {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    /// Accounting underlines run the full cell width
    SingleAccounting,
    DoubleAccounting,
}

const UNDERLINE_NAMES: [(Underline, &str); 5] = [
    (Underline::None, "none"),
    (Underline::Single, "single"),
    (Underline::Double, "double"),
    (Underline::SingleAccounting, "singleAccounting"),
    (Underline::DoubleAccounting, "doubleAccounting"),
];

impl Underline {
    /// The `val` of a SpreadsheetML `<u>` element
    pub fn ooxml_name(self) -> &'static str {
        UNDERLINE_NAMES
            .iter()
            .find(|(u, _)| *u == self)
            .map_or("single", |(_, name)| name)
    }

    /// Unknown values read as a single underline, which is what `<u/>` means
    pub fn from_ooxml_name(name: &str) -> Self {
        UNDERLINE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map_or(Underline::Single, |(u, _)| *u)
    }
}
