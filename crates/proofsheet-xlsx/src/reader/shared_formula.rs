//! Shared formula expansion
//!
//! Excel stores a filled-down formula once, on the top-left cell of the
//! group (`<f t="shared" ref="B1:B9" si="0">A1*2</f>`). Every other cell of
//! the group carries only `<f t="shared" si="0"/>`. Followers are expanded
//! here into standalone formulas by moving the master's relative references
//! by the follower's offset, so the writer never needs to know about groups.

use std::collections::HashMap;

use proofsheet_core::{CellAddress, MAX_COLS, MAX_ROWS};

/// Masters seen so far in one worksheet, keyed by `si`
#[derive(Debug, Default)]
pub(crate) struct SharedFormulas {
    masters: HashMap<u32, (CellAddress, String)>,
}

impl SharedFormulas {
    pub(crate) fn register(&mut self, index: u32, anchor: CellAddress, formula: &str) {
        self.masters.insert(index, (anchor, formula.to_string()));
    }

    /// The formula text for a follower at `at`, `None` if the master is unknown
    pub(crate) fn follower(&self, index: u32, at: CellAddress) -> Option<String> {
        let (anchor, formula) = self.masters.get(&index)?;
        let rows = i64::from(at.row) - i64::from(anchor.row);
        let cols = i64::from(at.col) - i64::from(anchor.col);
        Some(shift_formula(formula, rows, cols))
    }
}

/// One side of a reference: a cell, a whole column or a whole row
#[derive(Debug, Clone, Copy, PartialEq)]
enum RefPart {
    Cell {
        col: u16,
        col_abs: bool,
        row: u32,
        row_abs: bool,
    },
    Column { col: u16, abs: bool },
    Row { row: u32, abs: bool },
}

impl RefPart {
    fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut i = 0;

        let col_abs = bytes.first() == Some(&b'$');
        if col_abs {
            i += 1;
        }
        let letters_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let letters = &text[letters_start..i];

        let row_abs = bytes.get(i) == Some(&b'$');
        if row_abs {
            i += 1;
        }
        let digits = &text[i..];
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let col = if letters.is_empty() {
            None
        } else if letters.len() <= 3 {
            Some(CellAddress::letters_to_column(letters).ok()?)
        } else {
            return None;
        };
        let row = if digits.is_empty() {
            None
        } else {
            let n: u32 = digits.parse().ok()?;
            if n == 0 || n > MAX_ROWS {
                return None;
            }
            Some(n - 1)
        };

        match (col, row) {
            (Some(col), Some(row)) => Some(RefPart::Cell {
                col,
                col_abs,
                row,
                row_abs,
            }),
            // "$A" marks the column absolute; a lone "$" before digits marks the row
            (Some(col), None) if !row_abs => Some(RefPart::Column { col, abs: col_abs }),
            (None, Some(row)) => Some(RefPart::Row {
                row,
                abs: col_abs || row_abs,
            }),
            _ => None,
        }
    }

    /// Render the part moved by (rows, cols); `None` when it falls off the sheet
    fn shifted(self, rows: i64, cols: i64) -> Option<String> {
        let move_col = |col: u16, abs: bool| -> Option<u16> {
            let col = if abs { i64::from(col) } else { i64::from(col) + cols };
            (0..i64::from(MAX_COLS)).contains(&col).then_some(col as u16)
        };
        let move_row = |row: u32, abs: bool| -> Option<u32> {
            let row = if abs { i64::from(row) } else { i64::from(row) + rows };
            (0..i64::from(MAX_ROWS)).contains(&row).then_some(row as u32)
        };
        let dollar = |abs: bool| if abs { "$" } else { "" };

        Some(match self {
            RefPart::Cell {
                col,
                col_abs,
                row,
                row_abs,
            } => format!(
                "{}{}{}{}",
                dollar(col_abs),
                CellAddress::column_to_letters(move_col(col, col_abs)?),
                dollar(row_abs),
                move_row(row, row_abs)? + 1
            ),
            RefPart::Column { col, abs } => format!(
                "{}{}",
                dollar(abs),
                CellAddress::column_to_letters(move_col(col, abs)?)
            ),
            RefPart::Row { row, abs } => format!("{}{}", dollar(abs), move_row(row, abs)? + 1),
        })
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.' || c == '\\'
}

/// Copy a delimited run (`"..."`, `'...'`, `[...]`) starting at `start`,
/// returning the index just past it. Doubled quotes stay inside the run.
fn copy_delimited(chars: &[char], start: usize, close: char, out: &mut String) -> usize {
    out.push(chars[start]);
    let mut i = start + 1;
    while i < chars.len() {
        out.push(chars[i]);
        if chars[i] == close {
            if close != ']' && chars.get(i + 1) == Some(&close) {
                out.push(close);
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

/// Move every relative reference in `formula` by (rows, cols).
///
/// Absolute parts (`$A`, `$1`) stay put. String literals, quoted sheet
/// names, function names and defined names are copied unchanged. A reference
/// pushed off the sheet becomes `#REF!`, as Excel does on fill.
pub(crate) fn shift_formula(formula: &str, rows: i64, cols: i64) -> String {
    if rows == 0 && cols == 0 {
        return formula.to_string();
    }

    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => i = copy_delimited(&chars, i, '"', &mut out),
            '\'' => i = copy_delimited(&chars, i, '\'', &mut out),
            '[' => i = copy_delimited(&chars, i, ']', &mut out),
            '#' => {
                // Error literals such as #REF! or #N/A
                while i < chars.len() && !matches!(chars[i], ',' | ')' | ' ' | ';') {
                    out.push(chars[i]);
                    i += 1;
                }
            }
            c if is_token_char(c) => {
                let start = i;
                while i < chars.len() && is_token_char(chars[i]) {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                let next = chars.get(i).copied();
                let prev = start.checked_sub(1).map(|p| chars[p]);

                // Function names and sheet qualifiers are never references
                let part = match next {
                    Some('(') | Some('!') => None,
                    _ => RefPart::parse(&token),
                };
                let in_range = next == Some(':') || prev == Some(':');

                match part {
                    Some(p @ RefPart::Cell { .. }) => {
                        out.push_str(&p.shifted(rows, cols).unwrap_or_else(|| "#REF!".into()))
                    }
                    Some(p) if in_range => {
                        out.push_str(&p.shifted(rows, cols).unwrap_or_else(|| "#REF!".into()))
                    }
                    _ => out.push_str(&token),
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shift_relative_and_absolute() {
        assert_eq!(shift_formula("A1*2", 1, 0), "A2*2");
        assert_eq!(shift_formula("$A1+A$1+$A$1", 2, 3), "$A3+D$1+$A$1");
        assert_eq!(shift_formula("SUM(B2:C3)", 0, 1), "SUM(C2:D3)");
    }

    #[test]
    fn test_shift_leaves_names_and_literals() {
        assert_eq!(shift_formula("LOG10(A1)&\"A1\"", 1, 0), "LOG10(A2)&\"A1\"");
        assert_eq!(shift_formula("'Q1 A1'!B2*Rate", 1, 0), "'Q1 A1'!B3*Rate");
        assert_eq!(shift_formula("Sheet2!A1+1.5E3", 4, 0), "Sheet2!A5+1.5E3");
        assert_eq!(shift_formula("TRUE", 1, 1), "TRUE");
    }

    #[test]
    fn test_shift_whole_columns_and_rows() {
        assert_eq!(shift_formula("SUM(A:A)", 5, 1), "SUM(B:B)");
        assert_eq!(shift_formula("SUM(2:$3)", 1, 0), "SUM(3:$3)");
    }

    #[test]
    fn test_shift_off_sheet_is_ref_error() {
        assert_eq!(shift_formula("A1", -1, 0), "#REF!");
    }

    #[test]
    fn test_follower_uses_offset_from_master() {
        let mut shared = SharedFormulas::default();
        shared.register(0, CellAddress::new(0, 1), "A1*2");
        assert_eq!(
            shared.follower(0, CellAddress::new(3, 1)).as_deref(),
            Some("A4*2")
        );
        assert_eq!(shared.follower(7, CellAddress::new(3, 1)), None);
    }
}
