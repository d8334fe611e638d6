//! Planning and applying spreadsheet writes.
//!
//! Writes are produced in two steps. Planning is pure: a dataset or a list of
//! resolved cell updates becomes an ordered list of `SheetWrite`s, and
//! attendance figures are resolved against a grid snapshot read beforehand.
//! Applying then sends those writes in order and stops at the first failure.

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::{LabelKind, RotaError};
use crate::models::{AttendanceTable, CellUpdate, CellValue, SheetGrid};

use super::locate::{a1_range, cell_ref, find_column, find_row, find_row_from};
use super::SheetsApi;

/// One operation against the destination spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetWrite {
    Clear { range: String },
    Update { range: String, values: Vec<Vec<CellValue>> },
}

impl SheetWrite {
    pub fn range(&self) -> &str {
        match self {
            SheetWrite::Clear { range } | SheetWrite::Update { range, .. } => range,
        }
    }

    /// Short human-readable summary for logs
    pub fn describe(&self) -> String {
        match self {
            SheetWrite::Clear { range } => format!("clear {}", range),
            SheetWrite::Update { range, values } if values.len() == 1 && values[0].len() == 1 => {
                format!("set {} = {}", range, values[0][0])
            }
            SheetWrite::Update { range, values } => {
                format!("update {} ({} rows)", range, values.len())
            }
        }
    }
}

/// Writes for a full-range sync. With `clear`, stale rows from an earlier,
/// longer run are removed before the new values go in.
pub fn plan_dataset_sync(range: &str, values: Vec<Vec<CellValue>>, clear: bool) -> Vec<SheetWrite> {
    let mut writes = Vec::with_capacity(2);
    if clear {
        writes.push(SheetWrite::Clear {
            range: range.to_string(),
        });
    }
    writes.push(SheetWrite::Update {
        range: range.to_string(),
        values,
    });
    writes
}

/// One single-cell update per resolved cell, keyed by sheet-qualified A1 reference.
pub fn plan_cell_updates(sheet: &str, updates: &[CellUpdate]) -> Vec<SheetWrite> {
    updates
        .iter()
        .map(|update| SheetWrite::Update {
            range: a1_range(sheet, &cell_ref(update.row, update.col)),
            values: vec![vec![update.value.clone()]],
        })
        .collect()
}

/// Attendance figures mapped onto a grid snapshot.
#[derive(Debug, Default)]
pub struct AttendanceResolution {
    pub updates: Vec<CellUpdate>,
    /// Labels that could not be found; each skipped its own update(s).
    pub missing: Vec<RotaError>,
}

/// Locate each meeting/group figure in `grid`.
///
/// The anchor row is the first row whose first cell is `anchor`. Meetings
/// are matched against the anchor row to find their column, and groups are
/// matched in the first column of the rows below the anchor to find their row.
pub fn resolve_attendance_updates(
    grid: &SheetGrid,
    anchor: &str,
    table: &AttendanceTable,
) -> AttendanceResolution {
    let mut resolution = AttendanceResolution::default();

    let Some(anchor_row) = find_row(grid, anchor) else {
        resolution.missing.push(RotaError::label_not_found(LabelKind::Anchor, anchor));
        return resolution;
    };
    // Column A of the anchor row holds the anchor label itself
    let meeting_cells = grid
        .row(anchor_row)
        .and_then(|row| row.get(1..))
        .unwrap_or_default();

    for (meeting, groups) in table.meetings() {
        let Some(col) = find_column(meeting_cells, meeting).map(|index| index + 1) else {
            resolution.missing.push(RotaError::label_not_found(LabelKind::Meeting, meeting));
            continue;
        };
        if groups.is_empty() {
            debug!(meeting = meeting, "No attendance figures to write");
            continue;
        }

        for (group, count) in groups {
            match find_row_from(grid, anchor_row + 1, group) {
                Some(row) => resolution.updates.push(CellUpdate {
                    row,
                    col,
                    value: CellValue::Number(*count),
                }),
                None => resolution
                    .missing
                    .push(RotaError::label_not_found(LabelKind::Group, group)),
            }
        }
    }

    resolution
}

/// Send writes in order. The first rejected write aborts the run.
pub async fn apply<C: SheetsApi>(client: &C, writes: &[SheetWrite]) -> Result<()> {
    for write in writes {
        debug!(range = write.range(), "Applying {}", write.describe());
        let result = match write {
            SheetWrite::Clear { range } => client.clear_range(range).await,
            SheetWrite::Update { range, values } => client.write_range(range, values).await,
        };
        if let Err(e) = result {
            warn!(range = write.range(), error = %e, "Sheet write rejected");
            return Err(RotaError::DestinationWriteFailure {
                range: write.range().to_string(),
                reason: format!("{:#}", e),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemorySheets;

    fn summary_grid() -> SheetGrid {
        SheetGrid::from(vec![
            vec!["", "Last update"],
            vec!["Date", "2018-04-22"],
            vec![],
            vec!["Attendance", "Morning Service", "Evening Service"],
            vec!["Adults"],
            vec!["Kids"],
            vec!["Total"],
        ])
    }

    #[test]
    fn test_plan_dataset_sync_clears_first() {
        let values = vec![vec![CellValue::from("Date")]];
        let writes = plan_dataset_sync("Overview", values.clone(), true);
        assert_eq!(
            writes,
            vec![
                SheetWrite::Clear { range: "Overview".to_string() },
                SheetWrite::Update { range: "Overview".to_string(), values },
            ]
        );
        assert_eq!(plan_dataset_sync("Overview", vec![], false).len(), 1);
    }

    #[test]
    fn test_plan_cell_updates_uses_a1_references() {
        let updates = vec![
            CellUpdate { row: 4, col: 1, value: CellValue::Number(98) },
            CellUpdate { row: 6, col: 27, value: CellValue::Number(140) },
        ];
        let writes = plan_cell_updates("Last Sunday Summary", &updates);
        assert_eq!(writes[0].range(), "'Last Sunday Summary'!B5");
        assert_eq!(writes[1].range(), "'Last Sunday Summary'!AB7");
        assert_eq!(writes[0].describe(), "set 'Last Sunday Summary'!B5 = 98");
    }

    #[test]
    fn test_resolve_attendance_updates() {
        let mut table = AttendanceTable::new();
        table.record("Morning Service", "Adults", 98);
        table.record("Morning Service", "Total", 142);
        table.record("Evening Service", "Kids", 4);

        let resolution = resolve_attendance_updates(&summary_grid(), "Attendance", &table);
        assert!(resolution.missing.is_empty());
        assert_eq!(
            resolution.updates,
            vec![
                CellUpdate { row: 5, col: 2, value: CellValue::Number(4) },
                CellUpdate { row: 4, col: 1, value: CellValue::Number(98) },
                CellUpdate { row: 6, col: 1, value: CellValue::Number(142) },
            ]
        );
    }

    #[test]
    fn test_missing_labels_skip_only_their_updates() {
        let mut table = AttendanceTable::new();
        table.record("Morning Service", "Adults", 98);
        table.record("Morning Service", "Youth", 12);
        table.record("Midweek", "Adults", 20);

        let resolution = resolve_attendance_updates(&summary_grid(), "Attendance", &table);
        assert_eq!(resolution.updates.len(), 1);
        assert_eq!(resolution.missing.len(), 2);
        assert!(resolution.missing.iter().all(|e| e.is_recoverable()));
        assert!(matches!(
            &resolution.missing[0],
            RotaError::LabelNotFound { kind: LabelKind::Meeting, label } if label == "Midweek"
        ));
        assert!(matches!(
            &resolution.missing[1],
            RotaError::LabelNotFound { kind: LabelKind::Group, label } if label == "Youth"
        ));
    }

    #[test]
    fn test_missing_anchor_skips_everything() {
        let mut table = AttendanceTable::new();
        table.record("Morning Service", "Adults", 98);
        let resolution = resolve_attendance_updates(&summary_grid(), "Headcount", &table);
        assert!(resolution.updates.is_empty());
        assert!(matches!(
            resolution.missing.as_slice(),
            [RotaError::LabelNotFound { kind: LabelKind::Anchor, .. }]
        ));
    }

    #[test]
    fn test_group_labels_above_anchor_are_ignored() {
        let grid = SheetGrid::from(vec![
            vec!["Adults", "notes"],
            vec!["Attendance", "Morning Service"],
            vec!["Adults"],
        ]);
        let mut table = AttendanceTable::new();
        table.record("Morning Service", "Adults", 98);
        let resolution = resolve_attendance_updates(&grid, "Attendance", &table);
        assert_eq!(resolution.updates[0].row, 2);
    }

    #[test]
    fn test_meeting_named_like_anchor_never_targets_label_column() {
        let grid = SheetGrid::from(vec![vec!["Attendance", "Attendance"], vec!["Total"]]);
        let mut table = AttendanceTable::new();
        table.record("Attendance", "Total", 142);
        let resolution = resolve_attendance_updates(&grid, "Attendance", &table);
        assert_eq!(
            resolution.updates,
            vec![CellUpdate { row: 1, col: 1, value: CellValue::Number(142) }]
        );

        // Only the label column matches: the meeting is missing, not written over column A
        let grid = SheetGrid::from(vec![vec!["Attendance", "Morning Service"], vec!["Total"]]);
        let resolution = resolve_attendance_updates(&grid, "Attendance", &table);
        assert!(resolution.updates.is_empty());
        assert!(matches!(
            resolution.missing.as_slice(),
            [RotaError::LabelNotFound { kind: LabelKind::Meeting, .. }]
        ));
    }

    #[tokio::test]
    async fn test_apply_sends_writes_in_order() {
        let sheets = MemorySheets::new();
        let writes = plan_dataset_sync("Overview", vec![vec![CellValue::from("x")]], true);
        apply(&sheets, &writes).await.unwrap();
        assert_eq!(sheets.writes(), writes);
    }

    #[tokio::test]
    async fn test_apply_stops_at_rejected_write() {
        let sheets = MemorySheets::new().rejecting("Overview");
        let mut writes = plan_dataset_sync("Overview", vec![], true);
        writes.push(SheetWrite::Clear { range: "Next".to_string() });

        let err = apply(&sheets, &writes).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RotaError>(),
            Some(RotaError::DestinationWriteFailure { range, .. }) if range == "Overview"
        ));
        assert!(sheets.writes().is_empty());
    }
}
