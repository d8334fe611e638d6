use serde::{Deserialize, Serialize};

use crate::models::RoleClassification;

/// Keyword lists that decide which roles are shown on the overview.
///
/// Built once from configuration and passed by reference; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Substrings marking a leadership role (case-insensitive).
    pub lead_roles: Vec<String>,
    /// Whole role names that are never displayed (case-insensitive).
    pub excluded_roles: Vec<String>,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            lead_roles: vec!["leader".to_string(), "preacher".to_string()],
            excluded_roles: vec!["reserve".to_string()],
        }
    }
}

impl RoleConfig {
    pub fn new(lead_roles: Vec<String>, excluded_roles: Vec<String>) -> Self {
        Self {
            lead_roles,
            excluded_roles,
        }
    }

    pub fn classify(&self, role: &str) -> RoleClassification {
        classify(role, &self.lead_roles, &self.excluded_roles)
    }
}

/// Classify a role against the leader and excluded keyword lists.
///
/// A role is a leader when it contains any lead keyword, and excluded when it
/// equals an excluded keyword outright. Both comparisons ignore case.
pub fn classify<S: AsRef<str>>(
    role: &str,
    lead_keywords: &[S],
    excluded_keywords: &[S],
) -> RoleClassification {
    let role = role.to_lowercase();
    if role.is_empty() {
        return RoleClassification::default();
    }

    let is_leader = lead_keywords.iter().any(|keyword| {
        let keyword = keyword.as_ref().to_lowercase();
        !keyword.is_empty() && role.contains(&keyword)
    });
    let is_excluded = excluded_keywords
        .iter()
        .any(|keyword| keyword.as_ref().to_lowercase() == role);

    RoleClassification {
        is_leader,
        is_excluded,
    }
}
