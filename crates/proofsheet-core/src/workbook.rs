//! The workbook: worksheets in document order
//!
//! Scanning, reporting and the annotated copy all follow this order.

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::{FORBIDDEN_SHEET_NAME_CHARS, MAX_SHEET_NAME_LEN};

#[derive(Debug, Clone)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// A workbook holding one empty "Sheet1"
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
        }
    }

    /// A workbook with no worksheets, for readers to fill
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Exact, case-sensitive lookup, as issue indexes record names
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|ws| ws.name() == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|ws| ws.name()).collect()
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.worksheets.iter_mut()
    }

    /// Append an empty worksheet, returning its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a worksheet built elsewhere, returning its index
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.check_new_name(worksheet.name())?;
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    /// Names must be non-empty, at most 31 characters, free of the
    /// characters Excel forbids, and unique ignoring case
    fn check_new_name(&self, name: &str) -> Result<()> {
        let invalid = |why: String| Err(Error::InvalidSheetName(why));

        if name.is_empty() {
            return invalid("name is empty".into());
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return invalid(format!("{:?} is longer than {} characters", name, MAX_SHEET_NAME_LEN));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_NAME_CHARS.contains(c)) {
            return invalid(format!("{:?} contains '{}'", name, c));
        }

        let lower = name.to_lowercase();
        if self.worksheets.iter().any(|ws| ws.name().to_lowercase() == lower) {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_empty() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_names(), vec!["Sheet1"]);
        assert!(Workbook::empty().is_empty());
    }

    #[test]
    fn test_sheets_keep_insertion_order() {
        let mut wb = Workbook::new();
        assert_eq!(wb.add_worksheet_with_name("Data").unwrap(), 1);
        assert_eq!(wb.add_worksheet_with_name("Notes").unwrap(), 2);
        assert_eq!(wb.sheet_names(), vec!["Sheet1", "Data", "Notes"]);
        assert!(wb.worksheet_by_name("notes").is_none());
        assert!(wb.worksheet_by_name("Notes").is_some());
    }

    #[test]
    fn test_names_are_unique_ignoring_case() {
        let mut wb = Workbook::new();
        assert!(matches!(
            wb.add_worksheet_with_name("SHEET1"),
            Err(Error::DuplicateSheetName(_))
        ));
        assert!(wb.add_existing_worksheet(Worksheet::new("sheet1")).is_err());
    }

    #[test]
    fn test_invalid_sheet_names() {
        let mut wb = Workbook::new();
        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Sheet/1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet[1]").is_err());
        assert!(wb
            .add_worksheet_with_name(&"A".repeat(MAX_SHEET_NAME_LEN + 1))
            .is_err());
        assert!(wb.add_worksheet_with_name(&"A".repeat(MAX_SHEET_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut wb = Workbook::new();
        let copy = wb.clone();
        wb.worksheet_mut(0)
            .unwrap()
            .set_cell_value("A1", "changed")
            .unwrap();
        assert!(copy.worksheet(0).unwrap().is_empty());
    }
}
