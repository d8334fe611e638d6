//! masterrota core library.
//!
//! Scrapes ChurchSuite rota and attendance reports and syncs them into a
//! Google Sheets spreadsheet:
//!
//! - `api`: ChurchSuite login and report downloads
//! - `roster`: rota report parsing, role classification and aggregation
//! - `attendance`: attendance report parsing
//! - `sheets`: Sheets client, label lookups and write planning
//! - `sync`: the end-to-end rota and attendance runs
//! - `config`, `auth`: configuration file and keychain credentials

pub mod api;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod roster;
pub mod sheets;
pub mod sync;
pub mod utils;

pub use error::{LabelKind, RotaError};
