use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{AssignmentRecord, ParsedRoster, RoleClassification, RosterDataset, RosterRow};

use super::classify::RoleConfig;

/// Build the overview table from assignment records.
///
/// Rows follow ascending date; cells follow `team_names`.
pub fn aggregate(
    records: &[AssignmentRecord],
    team_names: &[String],
    roles: &RoleConfig,
) -> RosterDataset {
    build(std::iter::empty(), records, team_names, roles)
}

impl ParsedRoster {
    /// Aggregate the parsed report. Unlike [`aggregate`], dates whose heading
    /// had no team blocks still get an (empty) row.
    pub fn to_dataset(&self, roles: &RoleConfig) -> RosterDataset {
        build(self.dates.iter().copied(), &self.records, &self.team_names, roles)
    }
}

fn build(
    dates: impl Iterator<Item = NaiveDate>,
    records: &[AssignmentRecord],
    team_names: &[String],
    roles: &RoleConfig,
) -> RosterDataset {
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<&str, Vec<&AssignmentRecord>>> =
        dates.map(|date| (date, BTreeMap::new())).collect();
    for record in records {
        by_date
            .entry(record.date)
            .or_default()
            .entry(record.team.as_str())
            .or_default()
            .push(record);
    }

    let rows = by_date
        .into_iter()
        .map(|(date, teams)| RosterRow {
            date,
            cells: team_names
                .iter()
                .map(|team| {
                    teams
                        .get(team.as_str())
                        .map(|members| render_team(members, roles))
                        .unwrap_or_default()
                })
                .collect(),
        })
        .collect();

    RosterDataset {
        team_names: team_names.to_vec(),
        rows,
    }
}

/// Render one team's cell for one date.
///
/// Leaders are shown alone when there are any; otherwise everyone is shown.
/// Excluded roles are then dropped from whichever set was chosen, so an
/// excluded member still counts towards falling back to everyone.
pub fn render_team(members: &[&AssignmentRecord], roles: &RoleConfig) -> String {
    let mut classified: Vec<(&AssignmentRecord, RoleClassification)> = members
        .iter()
        .map(|member| (*member, roles.classify(&member.role)))
        .collect();
    // Stable: equal roles keep document order
    classified.sort_by(|a, b| a.0.role.cmp(&b.0.role));

    let has_leader = classified.iter().any(|(_, class)| class.is_leader);

    classified
        .iter()
        .filter(|(_, class)| !has_leader || class.is_leader)
        .filter(|(_, class)| !class.is_excluded)
        .map(|(member, class)| display_name(member, class))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_name(member: &AssignmentRecord, class: &RoleClassification) -> String {
    if class.is_leader || member.role.is_empty() {
        member.person.clone()
    } else {
        format!("{} ({})", member.person, member.role)
    }
}
