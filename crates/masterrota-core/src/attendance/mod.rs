//! Attendance extraction from the ChurchSuite attendance "date view" report.

pub mod parse;

pub use parse::{parse, parse_figure};
