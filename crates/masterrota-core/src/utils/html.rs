use anyhow::{anyhow, Result};
use scraper::{ElementRef, Selector};

use super::format::collapse_whitespace;

/// Compile a CSS selector
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid CSS selector {:?}: {}", css, e))
}

/// All text under an element, whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant matching `selector`, if there is one
pub fn select_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).next().map(element_text)
}
