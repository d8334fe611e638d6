//! In-memory spreadsheet used for `--dry-run` and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use tracing::info;

use crate::models::{CellValue, SheetGrid};

use super::writer::SheetWrite;
use super::SheetsApi;

/// Serves fixed grids for reads and records every write instead of sending it.
#[derive(Default)]
pub struct MemorySheets {
    grids: HashMap<String, SheetGrid>,
    writes: Mutex<Vec<SheetWrite>>,
    reject_range: Option<String>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `grid` when `range` is read.
    pub fn with_grid(mut self, range: &str, grid: SheetGrid) -> Self {
        self.grids.insert(range.to_string(), grid);
        self
    }

    /// Reject any write or clear against `range`.
    pub fn rejecting(mut self, range: &str) -> Self {
        self.reject_range = Some(range.to_string());
        self
    }

    /// Writes recorded so far, in the order they were issued.
    pub fn writes(&self) -> Vec<SheetWrite> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    fn record(&self, write: SheetWrite) -> Result<()> {
        if self.reject_range.as_deref() == Some(write.range()) {
            bail!("Range {} is protected", write.range());
        }
        info!(range = write.range(), "Dry run: {}", write.describe());
        self.writes
            .lock()
            .map_err(|_| anyhow!("Recorded writes lock poisoned"))?
            .push(write);
        Ok(())
    }
}

impl SheetsApi for MemorySheets {
    async fn read_range(&self, range: &str) -> Result<SheetGrid> {
        Ok(self.grids.get(range).cloned().unwrap_or_default())
    }

    async fn write_range(&self, range: &str, values: &[Vec<CellValue>]) -> Result<()> {
        self.record(SheetWrite::Update {
            range: range.to_string(),
            values: values.to_vec(),
        })
    }

    async fn clear_range(&self, range: &str) -> Result<()> {
        self.record(SheetWrite::Clear {
            range: range.to_string(),
        })
    }
}
