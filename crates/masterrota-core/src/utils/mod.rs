//! Utility functions for text formatting and HTML extraction.

pub mod format;
pub mod html;

// Re-export commonly used functions at module level
pub use format::{collapse_whitespace, nice_date, render_table, timestamp};
pub use html::{element_text, selector, select_text};
