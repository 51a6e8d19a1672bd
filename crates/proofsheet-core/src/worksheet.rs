//! One sheet of a workbook
//!
//! Methods taking `&str` accept A1 references and fail on bad ones; the
//! `_at` variants take 0-based (row, column) indices directly.

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::comment::CellComment;
use crate::error::{Error, Result};
use crate::layout::SheetLayout;
use crate::style::Style;
use crate::{MAX_COLS, MAX_ROWS};

#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    visible: bool,
    cells: CellStorage,
    layout: SheetLayout,
    /// Keyed by address, so iteration is row-major
    comments: BTreeMap<CellAddress, CellComment>,
}

impl Worksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            visible: true,
            cells: CellStorage::new(),
            layout: SheetLayout::default(),
            comments: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hidden sheets are still checked; visibility is only carried through
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn in_bounds(row: u32, col: u16) -> Result<CellAddress> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(CellAddress::new(row, col))
    }

    // --- values ---

    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(CellAddress::new(row, col))
    }

    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let at = CellAddress::parse(address)?;
        Ok(self.get_value_at(at.row, at.col))
    }

    /// The stored value, [`CellValue::Empty`] for cells never written
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cell_at(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let at = CellAddress::parse(address)?;
        self.set_cell_value_at(at.row, at.col, value)
    }

    /// Replace a value; the cell keeps its style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        let at = Self::in_bounds(row, col)?;
        self.cells.set_value(at, value.into());
        Ok(())
    }

    /// Number of stored cells, styled blanks included
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter().map(|(at, data)| (at.row, at.col, data))
    }

    /// Top-left and bottom-right corners of the stored cells
    pub fn used_bounds(&self) -> Option<(CellAddress, CellAddress)> {
        self.cells.used_bounds()
    }

    // --- styles ---

    /// Pool index of a cell's style, 0 for the default
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cell_at(row, col).map_or(0, |c| c.style_index)
    }

    pub fn style_by_index(&self, style_index: u32) -> Option<&Style> {
        self.cells.styles().get(style_index)
    }

    /// `None` when the cell has the default style
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        match self.cell_style_index_at(row, col) {
            0 => None,
            idx => self.style_by_index(idx),
        }
    }

    pub fn effective_style_at(&self, row: u32, col: u16) -> Style {
        self.cell_style_at(row, col).cloned().unwrap_or_default()
    }

    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let at = CellAddress::parse(address)?;
        self.set_cell_style_at(at.row, at.col, style)
    }

    /// Replace a style; the cell keeps its value
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        let at = Self::in_bounds(row, col)?;
        let style_index = self.cells.styles_mut().get_or_insert(style.clone());
        self.cells.set_style(at, style_index);
        Ok(())
    }

    // --- layout ---

    /// Width in characters
    pub fn column_width(&self, col: u16) -> f64 {
        self.layout.column_width(col)
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.layout.set_column_width(col, width);
    }

    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        self.layout.column_widths()
    }

    /// Height in points
    pub fn row_height(&self, row: u32) -> f64 {
        self.layout.row_height(row)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.layout.set_row_height(row, height);
    }

    pub fn custom_row_heights(&self) -> &BTreeMap<u32, f64> {
        self.layout.row_heights()
    }

    /// Merge a range of cells
    ///
    /// ```rust
    /// use proofsheet_core::{CellRange, Worksheet};
    ///
    /// let mut ws = Worksheet::new("Test");
    /// ws.merge_cells(&CellRange::parse("A1:C1").unwrap()).unwrap();
    /// assert!(ws.merge_cells(&CellRange::parse("C1:D2").unwrap()).is_err());
    /// ```
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        Self::in_bounds(range.end.row, range.end.col)?;
        self.layout.merge(*range)
    }

    pub fn merged_ranges(&self) -> &[CellRange] {
        self.layout.merged()
    }

    // --- notes ---

    /// Attach a note, replacing any note already on the cell
    ///
    /// ```rust
    /// use proofsheet_core::{CellComment, Worksheet};
    ///
    /// let mut ws = Worksheet::new("Test");
    /// ws.set_comment("A1", CellComment::new("Author", "This is a note")).unwrap();
    /// assert_eq!(ws.comment_count(), 1);
    /// ```
    pub fn set_comment(&mut self, address: &str, comment: CellComment) -> Result<()> {
        let at = CellAddress::parse(address)?;
        self.set_comment_at(at.row, at.col, comment);
        Ok(())
    }

    pub fn set_comment_at(&mut self, row: u32, col: u16, comment: CellComment) {
        self.comments.insert(CellAddress::new(row, col), comment);
    }

    pub fn comment(&self, address: &str) -> Result<Option<&CellComment>> {
        let at = CellAddress::parse(address)?;
        Ok(self.comment_at(at.row, at.col))
    }

    pub fn comment_at(&self, row: u32, col: u16) -> Option<&CellComment> {
        self.comments.get(&CellAddress::new(row, col))
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Notes in row-major order
    pub fn comments(&self) -> impl Iterator<Item = (CellAddress, &CellComment)> {
        self.comments.iter().map(|(&at, c)| (at, c))
    }

    /// Distinct note authors, first appearance first
    pub fn comment_authors(&self) -> Vec<&str> {
        let mut authors: Vec<&str> = Vec::new();
        for comment in self.comments.values() {
            if !authors.contains(&comment.author.as_str()) {
                authors.push(&comment.author);
            }
        }
        authors
    }
}
