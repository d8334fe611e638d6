//! Data models for rota and attendance data.
//!
//! This module contains the structures passed between the parsers, the
//! aggregator and the Google Sheets sync layer:
//!
//! - `AssignmentRecord`, `ParsedRoster`: raw rota assignments from ChurchSuite
//! - `RoleClassification`: leader/excluded tags for a role
//! - `RosterDataset`, `RosterRow`: the per-date, per-team overview table
//! - `AttendanceTable`: headcounts per meeting and group
//! - `SheetGrid`, `CellValue`, `CellUpdate`: destination spreadsheet values

pub mod attendance;
pub mod roster;
pub mod sheet;

pub use attendance::{AttendanceTable, GroupCounts};
pub use roster::{AssignmentRecord, ParsedRoster, RoleClassification, RosterDataset, RosterRow};
pub use sheet::{CellUpdate, CellValue, SheetGrid};
