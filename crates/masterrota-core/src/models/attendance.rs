//! Attendance headcounts per meeting and group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Group label -> headcount for one meeting.
pub type GroupCounts = BTreeMap<String, i64>;

/// Meeting name -> group counts.
///
/// Keys are unique at both levels. Figures that were not recorded are absent
/// rather than stored as zero, and a meeting with no figures keeps an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceTable {
    meetings: BTreeMap<String, GroupCounts>,
}

impl AttendanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a meeting, keeping any figures already recorded for it.
    pub fn add_meeting(&mut self, meeting: &str) -> &mut GroupCounts {
        self.meetings.entry(meeting.to_string()).or_default()
    }

    /// Record a headcount, replacing and returning an earlier figure for the same group.
    pub fn record(&mut self, meeting: &str, group: &str, count: i64) -> Option<i64> {
        self.add_meeting(meeting).insert(group.to_string(), count)
    }

    pub fn meeting(&self, meeting: &str) -> Option<&GroupCounts> {
        self.meetings.get(meeting)
    }

    pub fn count(&self, meeting: &str, group: &str) -> Option<i64> {
        self.meetings.get(meeting).and_then(|groups| groups.get(group)).copied()
    }

    pub fn meetings(&self) -> impl Iterator<Item = (&str, &GroupCounts)> {
        self.meetings.iter().map(|(name, groups)| (name.as_str(), groups))
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.meetings.len()
    }
}

impl From<BTreeMap<String, GroupCounts>> for AttendanceTable {
    fn from(meetings: BTreeMap<String, GroupCounts>) -> Self {
        Self { meetings }
    }
}
