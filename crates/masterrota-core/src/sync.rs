//! End-to-end sync runs.
//!
//! Each run is strictly sequential: parse the downloaded report, build the
//! values, read whatever destination snapshot is needed, then write.
//!
//! - `sync_rota`: rota report -> "Overview" and "Next Sunday"
//! - `sync_attendance`: attendance report -> "Last Sunday Summary"

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::attendance;
use crate::config::SheetRanges;
use crate::models::{AttendanceTable, CellValue, RosterDataset};
use crate::roster::{self, RoleConfig, TARGET_WEEKDAY};
use crate::sheets::{
    a1_range, apply, plan_cell_updates, plan_dataset_sync, resolve_attendance_updates,
    sheet_range, SheetWrite, SheetsApi,
};
use crate::utils::{nice_date, timestamp};

/// Title cell of the "Next Sunday" sheet
const NEXT_TITLE: &str = "Next Sunday";

/// Fixed cells of the summary sheet
const SUMMARY_TIMESTAMP_CELL: &str = "B2";
const SUMMARY_DATE_CELL: &str = "B3";

/// What a rota sync produced.
#[derive(Debug, Clone)]
pub struct RotaSyncReport {
    pub dataset: RosterDataset,
    /// Rows written to the "Next Sunday" sheet, if a date was available
    pub next_rows: Option<Vec<Vec<String>>>,
}

/// What an attendance sync wrote and skipped.
#[derive(Debug, Clone, Default)]
pub struct AttendanceSyncReport {
    pub table: AttendanceTable,
    pub cells_written: usize,
    pub labels_missing: usize,
}

/// The most recent target weekday on or before `today`.
pub fn last_sunday(today: NaiveDate) -> NaiveDate {
    let back = (7 + today.weekday().num_days_from_monday() as i64
        - TARGET_WEEKDAY.num_days_from_monday() as i64)
        % 7;
    today - Duration::days(back)
}

fn last_update(now: NaiveDateTime) -> String {
    format!("Last update: {}", timestamp(now))
}

/// Values for the overview sheet: a timestamp row, the headers, then one row per date.
pub fn overview_values(dataset: &RosterDataset, now: NaiveDateTime) -> Vec<Vec<CellValue>> {
    let mut values = vec![
        vec![CellValue::from(""), CellValue::from(last_update(now))],
        dataset.headers().into_iter().map(CellValue::from).collect(),
    ];
    values.extend(
        dataset
            .string_rows()
            .into_iter()
            .map(|row| row.into_iter().map(CellValue::from).collect()),
    );
    values
}

/// Rows for the "Next Sunday" sheet: title, date, then `team | people` for each filled team.
pub fn next_sunday_rows(
    dataset: &RosterDataset,
    today: NaiveDate,
    now: NaiveDateTime,
) -> Option<Vec<Vec<String>>> {
    let row = dataset.next_on_or_after(today)?;
    let mut rows = vec![
        vec![NEXT_TITLE.to_string(), last_update(now)],
        vec![nice_date(row.date), String::new()],
    ];
    rows.extend(
        dataset
            .filled_teams(row)
            .into_iter()
            .map(|(team, people)| vec![team.to_string(), people.to_string()]),
    );
    Some(rows)
}

/// Parse a rota report and rewrite the overview and next-Sunday sheets.
pub async fn sync_rota<C: SheetsApi>(
    client: &C,
    report_html: &str,
    roles: &RoleConfig,
    ranges: &SheetRanges,
    now: NaiveDateTime,
) -> Result<RotaSyncReport> {
    let parsed = roster::parse(report_html)?;
    let dataset = parsed.to_dataset(roles);
    info!(
        dates = dataset.len(),
        teams = dataset.team_names.len(),
        "Built rota overview"
    );

    info!(range = %ranges.overview, "Updating overview sheet");
    let overview = plan_dataset_sync(
        &sheet_range(&ranges.overview),
        overview_values(&dataset, now),
        true,
    );
    apply(client, &overview).await?;

    let next_rows = next_sunday_rows(&dataset, now.date(), now);
    match &next_rows {
        Some(rows) => {
            info!(range = %ranges.next, "Updating next Sunday sheet");
            let values: Vec<Vec<CellValue>> = rows
                .iter()
                .map(|row| row.iter().map(|cell| CellValue::from(cell.as_str())).collect())
                .collect();
            apply(client, &plan_dataset_sync(&sheet_range(&ranges.next), values, true)).await?;
        }
        None => warn!(range = %ranges.next, "No Sunday rotas found; leaving sheet unchanged"),
    }

    Ok(RotaSyncReport { dataset, next_rows })
}

/// Parse an attendance report and patch the figures into the summary sheet.
///
/// Labels missing from the sheet are logged and skipped; the timestamp and
/// date cells are written regardless.
pub async fn sync_attendance<C: SheetsApi>(
    client: &C,
    report_html: &str,
    date: NaiveDate,
    ranges: &SheetRanges,
    now: NaiveDateTime,
) -> Result<AttendanceSyncReport> {
    let table = attendance::parse(report_html)?;
    for (meeting, groups) in table.meetings() {
        if groups.is_empty() {
            info!(meeting = meeting, "No attendance figures");
        } else {
            info!(meeting = meeting, groups = groups.len(), "Attendance figures found");
        }
    }

    // Phase 1: resolve every figure against a fresh snapshot
    let grid = client.read_range(&sheet_range(&ranges.summary)).await?;
    let resolution = resolve_attendance_updates(&grid, &ranges.attendance_anchor, &table);
    for missing in &resolution.missing {
        warn!(error = %missing, "Skipping attendance update");
    }

    // Phase 2: write
    let mut writes = vec![
        SheetWrite::Update {
            range: a1_range(&ranges.summary, SUMMARY_TIMESTAMP_CELL),
            values: vec![vec![CellValue::from(timestamp(now))]],
        },
        SheetWrite::Update {
            range: a1_range(&ranges.summary, SUMMARY_DATE_CELL),
            values: vec![vec![CellValue::from(nice_date(date))]],
        },
    ];
    writes.extend(plan_cell_updates(&ranges.summary, &resolution.updates));
    apply(client, &writes).await?;

    Ok(AttendanceSyncReport {
        cells_written: resolution.updates.len(),
        labels_missing: resolution.missing.len(),
        table,
    })
}
