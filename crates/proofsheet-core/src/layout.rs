//! Sheet geometry that survives the round trip: column widths, row heights
//! and merged ranges

use std::collections::BTreeMap;

use crate::cell::CellRange;
use crate::error::{Error, Result};

/// Excel's default column width, in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Excel's default row height, in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Widths and heights equal to the default within this margin are not stored
const SIZE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    column_widths: BTreeMap<u16, f64>,
    row_heights: BTreeMap<u32, f64>,
    merged: Vec<CellRange>,
}

fn set_size<K: Ord>(sizes: &mut BTreeMap<K, f64>, key: K, size: f64, default: f64) {
    if (size - default).abs() < SIZE_EPSILON {
        sizes.remove(&key);
    } else {
        sizes.insert(key, size);
    }
}

impl SheetLayout {
    pub fn column_width(&self, col: u16) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        set_size(&mut self.column_widths, col, width, DEFAULT_COLUMN_WIDTH);
    }

    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }

    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights
            .get(&row)
            .copied()
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        set_size(&mut self.row_heights, row, height, DEFAULT_ROW_HEIGHT);
    }

    pub fn row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    /// Record a merge. Single cells are ignored; overlapping an existing
    /// merge is an error.
    pub fn merge(&mut self, range: CellRange) -> Result<()> {
        if range.is_single_cell() {
            return Ok(());
        }
        if let Some(existing) = self.merged.iter().find(|m| m.overlaps(&range)) {
            return Err(Error::OverlappingMerge {
                new: range.to_string(),
                existing: existing.to_string(),
            });
        }
        self.merged.push(range);
        Ok(())
    }

    /// Merged ranges in the order they were added
    pub fn merged(&self) -> &[CellRange] {
        &self.merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes_are_not_stored() {
        let mut layout = SheetLayout::default();
        layout.set_column_width(3, 20.0);
        layout.set_row_height(0, 30.0);
        assert_eq!(layout.column_width(3), 20.0);
        assert_eq!(layout.row_height(0), 30.0);
        assert_eq!(layout.row_height(1), DEFAULT_ROW_HEIGHT);

        layout.set_column_width(3, DEFAULT_COLUMN_WIDTH);
        layout.set_row_height(0, DEFAULT_ROW_HEIGHT);
        assert!(layout.column_widths().is_empty());
        assert!(layout.row_heights().is_empty());
    }

    #[test]
    fn test_overlapping_merge_is_rejected() {
        let mut layout = SheetLayout::default();
        layout.merge(CellRange::parse("A1:B2").unwrap()).unwrap();
        layout.merge(CellRange::parse("D1").unwrap()).unwrap();
        let err = layout.merge(CellRange::parse("B2:C3").unwrap()).unwrap_err();
        assert!(matches!(err, Error::OverlappingMerge { .. }));
        assert_eq!(layout.merged().len(), 1);
    }
}
