//! Google Sheets destination.
//!
//! This module provides:
//! - `SheetsApi`: the read / write / clear range primitives the sync needs
//! - `SheetsClient`: the Sheets v4 REST implementation
//! - `MemorySheets`: an in-memory implementation for dry runs and tests
//! - `locate`: label lookups and A1 references against a grid snapshot
//! - `writer`: planning and applying clear/update operations
//!
//! Every write names an explicit A1 range and uses literal (RAW) values.

pub mod client;
pub mod locate;
pub mod memory;
pub mod writer;

use anyhow::Result;

use crate::models::{CellValue, SheetGrid};

pub use client::{SheetsClient, SHEETS_ROOT_URL};
pub use locate::{
    a1_range, cell_ref, column_name, find_column, find_row, find_row_from, sheet_range,
};
pub use memory::MemorySheets;
pub use writer::{
    apply, plan_cell_updates, plan_dataset_sync, resolve_attendance_updates, AttendanceResolution,
    SheetWrite,
};

/// Range-level access to one spreadsheet.
#[allow(async_fn_in_trait)]
pub trait SheetsApi {
    /// Read the values in `range` as strings.
    async fn read_range(&self, range: &str) -> Result<SheetGrid>;

    /// Overwrite `range` with `values`, starting at its top-left cell.
    async fn write_range(&self, range: &str, values: &[Vec<CellValue>]) -> Result<()>;

    /// Clear all values in `range`.
    async fn clear_range(&self, range: &str) -> Result<()>;
}
