//! Rota extraction and aggregation.
//!
//! This module turns the ChurchSuite rota overview report into the table
//! written to the "Overview" sheet:
//!
//! - `parse`: HTML report -> `ParsedRoster` (Sunday assignments only)
//! - `classify`: leader / excluded role keywords (`RoleConfig`)
//! - `aggregate`: records -> `RosterDataset`, one display string per team per date

pub mod aggregate;
pub mod classify;
pub mod parse;

pub use aggregate::{aggregate, render_team};
pub use classify::{classify, RoleConfig};
pub use parse::{parse, parse_report_date, TARGET_WEEKDAY};
