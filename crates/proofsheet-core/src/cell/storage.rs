//! Sparse cell map
//!
//! Cells are keyed by [`CellAddress`], whose ordering is row-major, so a
//! plain `BTreeMap` walk visits them in reading order. Styles are interned
//! in a [`StylePool`] and cells refer to them by index.

use std::collections::BTreeMap;

use super::{CellAddress, CellValue};
use crate::style::StylePool;

/// A stored cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    pub value: CellValue,
    /// Index into the sheet's style pool; 0 is the default style
    pub style_index: u32,
}

impl CellData {
    fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Cells of one worksheet. A cell with no value and the default style is
/// not stored at all.
#[derive(Debug, Clone, Default)]
pub struct CellStorage {
    cells: BTreeMap<CellAddress, CellData>,
    styles: StylePool,
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, at: CellAddress) -> Option<&CellData> {
        self.cells.get(&at)
    }

    fn put(&mut self, at: CellAddress, data: CellData) {
        if data.is_blank() {
            self.cells.remove(&at);
        } else {
            self.cells.insert(at, data);
        }
    }

    /// Replace the value, keeping whatever style the cell had
    pub fn set_value(&mut self, at: CellAddress, value: CellValue) {
        let style_index = self.cells.get(&at).map_or(0, |c| c.style_index);
        self.put(at, CellData { value, style_index });
    }

    /// Replace the style, keeping the value
    pub fn set_style(&mut self, at: CellAddress, style_index: u32) {
        let value = self.cells.get(&at).map(|c| c.value.clone()).unwrap_or_default();
        self.put(at, CellData { value, style_index });
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Smallest rectangle holding every stored cell, as (top-left, bottom-right)
    pub fn used_bounds(&self) -> Option<(CellAddress, CellAddress)> {
        let first = self.cells.keys().next()?;
        let last = self.cells.keys().next_back()?;
        let (min_col, max_col) = self
            .cells
            .keys()
            .fold((u16::MAX, 0), |(lo, hi), a| (lo.min(a.col), hi.max(a.col)));
        Some((
            CellAddress::new(first.row, min_col),
            CellAddress::new(last.row, max_col),
        ))
    }

    /// Every stored cell in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellAddress, &CellData)> {
        self.cells.iter().map(|(&at, data)| (at, data))
    }

    pub fn styles(&self) -> &StylePool {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StylePool {
        &mut self.styles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: u32, col: u16) -> CellAddress {
        CellAddress::new(row, col)
    }

    #[test]
    fn test_blank_cells_are_dropped() {
        let mut storage = CellStorage::new();
        storage.set_value(at(0, 0), CellValue::Number(42.0));
        assert_eq!(storage.len(), 1);

        storage.set_value(at(0, 0), CellValue::Empty);
        assert!(storage.get(at(0, 0)).is_none());
        assert!(storage.is_empty());

        storage.set_style(at(3, 3), 2);
        storage.set_style(at(3, 3), 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_value_and_style_are_independent() {
        let mut storage = CellStorage::new();
        storage.set_style(at(2, 2), 3);
        storage.set_value(at(2, 2), CellValue::string("b"));

        let cell = storage.get(at(2, 2)).unwrap();
        assert_eq!(cell.style_index, 3);
        assert_eq!(cell.value.as_text(), Some("b"));
    }

    #[test]
    fn test_used_bounds_spans_all_rows() {
        let mut storage = CellStorage::new();
        assert!(storage.used_bounds().is_none());

        storage.set_value(at(5, 3), CellValue::Number(1.0));
        storage.set_value(at(10, 7), CellValue::Number(2.0));
        storage.set_value(at(2, 1), CellValue::Number(3.0));

        assert_eq!(storage.used_bounds(), Some((at(2, 1), at(10, 7))));
    }

    #[test]
    fn test_iteration_is_row_major() {
        let mut storage = CellStorage::new();
        storage.set_value(at(1, 0), CellValue::Number(3.0));
        storage.set_value(at(0, 1), CellValue::Number(2.0));
        storage.set_value(at(0, 0), CellValue::Number(1.0));

        let order: Vec<_> = storage.iter().map(|(a, _)| a.to_string()).collect();
        assert_eq!(order, vec!["A1", "B1", "A2"]);
    }
}
