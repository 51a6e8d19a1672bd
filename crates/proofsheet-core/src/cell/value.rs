//! What a cell holds, as far as proofreading cares
//!
//! Only [`CellValue::String`] is ever checked. The other variants exist so
//! that numbers, booleans, error literals and formulas make it back into the
//! annotated copy exactly as they were read.

use std::fmt;
use std::sync::Arc;

/// The content of one cell
///
/// Dates have no variant of their own: they arrive as numbers with a date
/// number format on the style and leave the same way.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    /// Literal text typed into the cell
    String(SharedString),
    Error(CellError),
    /// A formula, never checked; `text` has no leading `=`
    Formula {
        text: String,
        /// The result saved by the producing application, if any
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(SharedString::new(s.into()))
    }

    /// A formula without a cached result
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The text of a literal string cell; formula results never count
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Renders what a user would see in the cell: the cached result for
/// formulas that have one, `=text` otherwise
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s.as_str()),
            CellValue::Error(e) => f.write_str(e.as_str()),
            CellValue::Formula {
                cached_value: Some(cached),
                ..
            } => cached.fmt(f),
            CellValue::Formula { text, .. } => write!(f, "={}", text),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

/// Error literals a cell can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
}

const ERROR_LITERALS: [(CellError, &str); 7] = [
    (CellError::Null, "#NULL!"),
    (CellError::Div0, "#DIV/0!"),
    (CellError::Value, "#VALUE!"),
    (CellError::Ref, "#REF!"),
    (CellError::Name, "#NAME?"),
    (CellError::Num, "#NUM!"),
    (CellError::Na, "#N/A"),
];

impl CellError {
    pub fn as_str(self) -> &'static str {
        ERROR_LITERALS
            .iter()
            .find(|(e, _)| *e == self)
            .map_or("#N/A", |(_, literal)| literal)
    }

    /// Match a literal such as `#DIV/0!`, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        ERROR_LITERALS
            .iter()
            .find(|(_, literal)| literal.eq_ignore_ascii_case(s))
            .map(|(e, _)| *e)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell text behind an `Arc`, so every cell pointing at the same
/// shared-string table entry holds one allocation
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_literal_strings_are_text() {
        assert_eq!(CellValue::from("hello").as_text(), Some("hello"));
        assert_eq!(CellValue::from(2.5).as_text(), None);

        let formula = CellValue::Formula {
            text: "UPPER(A1)".into(),
            cached_value: Some(Box::new(CellValue::string("HELLO"))),
        };
        assert_eq!(formula.as_text(), None);
        assert_eq!(formula.formula_text(), Some("UPPER(A1)"));
    }

    #[test]
    fn test_display_shows_cached_result() {
        let formula = CellValue::Formula {
            text: "UPPER(A1)".into(),
            cached_value: Some(Box::new(CellValue::string("HELLO"))),
        };
        assert_eq!(formula.to_string(), "HELLO");
        assert_eq!(CellValue::formula("A1+1").to_string(), "=A1+1");
        assert_eq!(CellValue::from(true).to_string(), "TRUE");
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
    }

    #[test]
    fn test_cell_error_literals() {
        assert_eq!(CellError::parse("#DIV/0!"), Some(CellError::Div0));
        assert_eq!(CellError::parse("#n/a"), Some(CellError::Na));
        assert_eq!(CellError::parse("invalid"), None);
        assert_eq!(CellError::Ref.to_string(), "#REF!");
    }

    #[test]
    fn test_clones_share_text() {
        let s1 = SharedString::new("hello");
        let s2 = s1.clone();
        assert!(Arc::ptr_eq(&s1.0, &s2.0));
    }
}
