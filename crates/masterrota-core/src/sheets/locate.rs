//! Label lookups against a sheet snapshot, and A1 reference building.

use crate::models::SheetGrid;

/// Index of the first row whose first cell equals `label`.
pub fn find_row(grid: &SheetGrid, label: &str) -> Option<usize> {
    find_row_from(grid, 0, label)
}

/// Like [`find_row`], but only considers rows at or after `start`.
pub fn find_row_from(grid: &SheetGrid, start: usize, label: &str) -> Option<usize> {
    grid.rows()
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, row)| row.first().is_some_and(|cell| cell.trim() == label))
        .map(|(index, _)| index)
}

/// Index of the first cell in `header_row` that equals `label`.
pub fn find_column<S: AsRef<str>>(header_row: &[S], label: &str) -> Option<usize> {
    header_row.iter().position(|cell| cell.as_ref().trim() == label)
}

/// Spreadsheet column letters for a zero-based index (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index;
    loop {
        name.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    name.iter().rev().map(|&b| b as char).collect()
}

/// A1 reference for zero-based row and column, e.g. (1, 1) -> "B2"
pub fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_name(col), row + 1)
}

/// Sheet name as an A1 range covering the whole sheet.
///
/// Always quoted, so names such as `Q1` or `Sheet1` are never read as cell references.
pub fn sheet_range(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// Sheet-qualified A1 range, e.g. ("Last Sunday Summary", "B2") -> "'Last Sunday Summary'!B2"
pub fn a1_range(sheet: &str, cells: &str) -> String {
    format!("{}!{}", sheet_range(sheet), cells)
}
