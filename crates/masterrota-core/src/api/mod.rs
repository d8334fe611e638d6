//! HTTP client module for the ChurchSuite admin site.
//!
//! This module provides the `ChurchSuiteClient` for logging in to a
//! ChurchSuite account and downloading the HTML reports the sync parses:
//! the rota overview and the attendance date view.
//!
//! ChurchSuite uses a cookie session established by a form login, so the
//! client keeps a cookie store for its whole lifetime.

pub mod client;
pub mod error;

pub use client::{ChurchSuiteClient, ReportWindow, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
