//! Spreadsheet cell values and read-only grid snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A primitive cell value written to the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value)
    }
}

/// A single resolved cell write, zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
}

/// Snapshot of a sheet's values as read from the destination.
///
/// Rows may be ragged: the Sheets API trims trailing empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetGrid {
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(|c| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<S: AsRef<str>> From<Vec<Vec<S>>> for SheetGrid {
    fn from(rows: Vec<Vec<S>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(|c| c.as_ref().to_string()).collect())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_serializes_untagged() {
        let values = vec![CellValue::from("Total"), CellValue::from(142)];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"["Total",142]"#);
    }

    #[test]
    fn test_grid_ragged_lookup() {
        let grid = SheetGrid::from(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(grid.cell(0, 1), Some("b"));
        assert_eq!(grid.cell(1, 1), None);
        assert_eq!(grid.cell(5, 0), None);
    }
}
