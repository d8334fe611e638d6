//! Parser for the ChurchSuite "rotas overview" HTML report.
//!
//! The report is laid out as a `section.report` holding one `.row` per date.
//! Each row starts with an `h2.report_break` date heading followed by
//! `div.rota-date` team blocks; each team block lists its members as
//! `li.profile-initial` entries carrying a `.profile-name` and `.roles`.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::RotaError;
use crate::models::{AssignmentRecord, ParsedRoster};
use crate::utils::{collapse_whitespace, element_text, select_text, selector};

/// Only dates falling on this weekday are kept.
pub const TARGET_WEEKDAY: Weekday = Weekday::Sun;

/// Formats tried, in order, against a full date heading.
const HEADING_FORMATS: &[&str] = &[
    "%A %d %B %Y",
    "%a %d %b %Y",
    "%A %B %d %Y",
    "%d %B %Y",
    "%B %d %Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%d/%m/%Y",
];

struct RotaSelectors {
    report: Selector,
    date_break: Selector,
    rota: Selector,
    team: Selector,
    member: Selector,
    name: Selector,
    role: Selector,
}

impl RotaSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            report: selector("section.report")?,
            date_break: selector(".row h2.report_break")?,
            rota: selector("div.rota-date")?,
            team: selector("span.date-team")?,
            member: selector("ul.date-members li.profile-initial")?,
            name: selector(".profile-name")?,
            role: selector(".roles")?,
        })
    }
}

/// Parse a rota overview report into assignment records.
///
/// Dates that are not Sundays are dropped. Any missing structural element
/// fails the whole parse with `RotaError::MalformedDocument`.
pub fn parse(document: &str) -> Result<ParsedRoster> {
    let selectors = RotaSelectors::new()?;
    let html = Html::parse_document(document);

    let report = html
        .select(&selectors.report)
        .next()
        .ok_or_else(|| RotaError::malformed("report", "no section.report element"))?;

    let mut parsed = ParsedRoster::default();
    let mut team_names = BTreeSet::new();

    for heading in report.select(&selectors.date_break) {
        let date_text = element_text(heading);
        let date = parse_report_date(&date_text).ok_or_else(|| {
            RotaError::malformed(
                format!("date {:?}", date_text),
                "unrecognised date heading",
            )
        })?;

        if date.weekday() != TARGET_WEEKDAY {
            debug!(date = %date, "Skipping non-Sunday date");
            continue;
        }

        let container = heading
            .parent()
            .and_then(ElementRef::wrap)
            .ok_or_else(|| {
                RotaError::malformed(format!("date {}", date), "heading has no parent row")
            })?;

        parsed.dates.push(date);
        for rota in container.select(&selectors.rota) {
            let team = select_text(rota, &selectors.team).ok_or_else(|| {
                RotaError::malformed(format!("date {}", date), "team block without span.date-team")
            })?;
            team_names.insert(team.clone());

            for member in rota.select(&selectors.member) {
                let scope = || format!("date {}, team {}", date, team);
                let person = select_text(member, &selectors.name)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| RotaError::malformed(scope(), "member without a name"))?;
                let role = select_text(member, &selectors.role)
                    .ok_or_else(|| RotaError::malformed(scope(), "member without a role element"))?;

                parsed.records.push(AssignmentRecord {
                    date,
                    team: team.clone(),
                    person,
                    role,
                });
            }
        }
    }

    parsed.team_names = team_names.into_iter().collect();
    debug!(
        dates = parsed.dates.len(),
        records = parsed.records.len(),
        teams = parsed.team_names.len(),
        "Parsed rota report"
    );
    Ok(parsed)
}

/// Parse a report date heading such as "Sunday 22nd April 2018".
///
/// Ordinal suffixes, commas and a trailing time of day ("10:30am") are
/// ignored. If the heading carries a weekday that disagrees with the date the
/// full match fails, and the date is then read without the weekday. Headings
/// without a year are rejected.
pub fn parse_report_date(text: &str) -> Option<NaiveDate> {
    let cleaned = collapse_whitespace(&text.replace(',', " "));
    let mut tokens: Vec<String> = cleaned.split(' ').map(strip_ordinal).collect();
    while tokens.len() > 1 && tokens.last().is_some_and(|token| is_time_token(token)) {
        tokens.pop();
    }
    let normalized = tokens.join(" ");

    if let Some(date) = try_formats(&normalized) {
        return Some(date);
    }

    // Drop a leading weekday name and retry
    match tokens.split_first() {
        Some((first, rest)) if !rest.is_empty() && first.chars().all(|c| c.is_alphabetic()) => {
            try_formats(&rest.join(" "))
        }
        _ => None,
    }
}

fn try_formats(text: &str) -> Option<NaiveDate> {
    HEADING_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// "10:30", "10:30am", "10am", "am", "at": pieces of a time of day after the date
fn is_time_token(token: &str) -> bool {
    let lower = token.to_lowercase();
    if matches!(lower.as_str(), "am" | "pm" | "at") {
        return true;
    }
    let meridiem = lower.strip_suffix("am").or_else(|| lower.strip_suffix("pm"));
    let (clock, has_meridiem) = match meridiem {
        Some(clock) => (clock, true),
        None => (lower.as_str(), false),
    };
    !clock.is_empty()
        && clock.chars().all(|c| c.is_ascii_digit() || c == ':' || c == '.')
        && (has_meridiem || clock.contains(':'))
}

/// "22nd" -> "22"; anything else is returned unchanged
fn strip_ordinal(token: &str) -> String {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    let suffix = &token[digits.len()..];
    if !digits.is_empty() && matches!(suffix.to_lowercase().as_str(), "st" | "nd" | "rd" | "th") {
        digits
    } else {
        token.to_string()
    }
}
