//! Interned styles for one worksheet

use super::Style;
use ahash::AHashMap;

/// Distinct styles of a sheet, each stored once
///
/// Cells hold an index into the pool and index 0 is the default style.
/// Highlighting a thousand misspelt cells pink adds one entry per distinct
/// base style, not one per cell.
#[derive(Debug, Clone)]
pub struct StylePool {
    styles: Vec<Style>,
    index_map: AHashMap<Style, u32>,
}

impl StylePool {
    /// Create a new style pool with default style at index 0
    pub fn new() -> Self {
        let default = Style::default();
        let mut index_map = AHashMap::with_capacity(64);
        index_map.insert(default.clone(), 0);

        let mut styles = Vec::with_capacity(64);
        styles.push(default);

        Self { styles, index_map }
    }

    /// Get or create a style, returning its index
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }

        let idx = self.styles.len() as u32;
        self.index_map.insert(style.clone(), idx);
        self.styles.push(style);
        idx
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Get the number of styles, including the default
    pub fn len(&self) -> usize {
        self.styles.len()
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}
