//! Domain models for rota assignments and the aggregated overview table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format for the `Date` column of the overview table.
pub const DATASET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Header of the first overview column.
pub const DATE_HEADER: &str = "Date";

/// One person serving in one role on one team for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub date: NaiveDate,
    pub team: String,
    pub person: String,
    pub role: String,
}

impl AssignmentRecord {
    pub fn new(date: NaiveDate, team: &str, person: &str, role: &str) -> Self {
        Self {
            date,
            team: team.to_string(),
            person: person.to_string(),
            role: role.to_string(),
        }
    }
}

/// How a role matched the configured keyword lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleClassification {
    pub is_leader: bool,
    pub is_excluded: bool,
}

/// Output of the rota report parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRoster {
    /// Every retained date heading, in document order (may contain dates with no teams).
    pub dates: Vec<NaiveDate>,
    /// Assignments in document order.
    pub records: Vec<AssignmentRecord>,
    /// Distinct team labels, sorted.
    pub team_names: Vec<String>,
}

/// One row of the overview: a date and one display string per team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub date: NaiveDate,
    pub cells: Vec<String>,
}

impl RosterRow {
    pub fn date_display(&self) -> String {
        self.date.format(DATASET_DATE_FORMAT).to_string()
    }
}

/// The rectangular per-date, per-team table written to the overview sheet.
///
/// Every row holds exactly one cell per entry of `team_names`, in the same
/// order. Teams without anyone serving on a date hold an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDataset {
    pub team_names: Vec<String>,
    pub rows: Vec<RosterRow>,
}

impl RosterDataset {
    /// `Date` followed by the team names.
    pub fn headers(&self) -> Vec<String> {
        std::iter::once(DATE_HEADER.to_string())
            .chain(self.team_names.iter().cloned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows rendered as plain strings, date first.
    pub fn string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                std::iter::once(row.date_display())
                    .chain(row.cells.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// The first row dated on or after `today`, or the latest row when every
    /// date has already passed.
    pub fn next_on_or_after(&self, today: NaiveDate) -> Option<&RosterRow> {
        self.rows
            .iter()
            .find(|row| row.date >= today)
            .or_else(|| self.rows.last())
    }

    /// `(team, value)` pairs for a row, skipping teams with nobody listed.
    pub fn filled_teams<'a>(&'a self, row: &'a RosterRow) -> Vec<(&'a str, &'a str)> {
        self.team_names
            .iter()
            .zip(row.cells.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(team, value)| (team.as_str(), value.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> RosterDataset {
        RosterDataset {
            team_names: vec!["Tech".to_string(), "Worship".to_string()],
            rows: vec![
                RosterRow {
                    date: date(2018, 4, 22),
                    cells: vec!["".to_string(), "Alice".to_string()],
                },
                RosterRow {
                    date: date(2018, 4, 29),
                    cells: vec!["Carol".to_string(), "Dave".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_headers_start_with_date() {
        assert_eq!(dataset().headers(), vec!["Date", "Tech", "Worship"]);
    }

    #[test]
    fn test_string_rows_format_dates() {
        let rows = dataset().string_rows();
        assert_eq!(rows[0], vec!["2018-04-22", "", "Alice"]);
        assert_eq!(rows[1], vec!["2018-04-29", "Carol", "Dave"]);
    }

    #[test]
    fn test_next_on_or_after() {
        let data = dataset();
        assert_eq!(data.next_on_or_after(date(2018, 4, 20)).unwrap().date, date(2018, 4, 22));
        assert_eq!(data.next_on_or_after(date(2018, 4, 22)).unwrap().date, date(2018, 4, 22));
        assert_eq!(data.next_on_or_after(date(2018, 4, 23)).unwrap().date, date(2018, 4, 29));
        // Everything in the past falls back to the latest row
        assert_eq!(data.next_on_or_after(date(2019, 1, 1)).unwrap().date, date(2018, 4, 29));
        assert!(RosterDataset::default().next_on_or_after(date(2018, 1, 1)).is_none());
    }

    #[test]
    fn test_filled_teams_skips_empty() {
        let data = dataset();
        assert_eq!(data.filled_teams(&data.rows[0]), vec![("Worship", "Alice")]);
        assert_eq!(data.filled_teams(&data.rows[1]).len(), 2);
    }
}
