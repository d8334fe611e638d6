//! Parser for the attendance report.
//!
//! Each meeting is a `div.week-category` with an `h3` heading and a table of
//! group rows. A row counts as data when it has a `td.attendance` cell; the
//! group label comes from a `.group` cell when present, otherwise from the
//! first non-figure cell. An unlabelled row is the meeting's aggregate figure.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::RotaError;
use crate::models::AttendanceTable;
use crate::utils::{element_text, select_text, selector};

/// Label used for an aggregate row with no label cell of its own.
pub const TOTAL_LABEL: &str = "Total";

const FIGURE_CLASS: &str = "attendance";

struct AttendanceSelectors {
    meeting: Selector,
    heading: Selector,
    row: Selector,
    figure: Selector,
    group: Selector,
    cell: Selector,
}

impl AttendanceSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            meeting: selector("div.week-category")?,
            heading: selector("h3")?,
            row: selector("tr")?,
            figure: selector("td.attendance")?,
            group: selector(".group")?,
            cell: selector("th, td")?,
        })
    }
}

/// Parse the attendance report into meeting -> group -> count.
///
/// Figures that are not integers are left out. Meetings without any figures
/// are kept with an empty group map.
pub fn parse(document: &str) -> Result<AttendanceTable> {
    let selectors = AttendanceSelectors::new()?;
    let html = Html::parse_document(document);
    let mut table = AttendanceTable::new();

    for section in html.select(&selectors.meeting) {
        let Some(meeting) =
            select_text(section, &selectors.heading).filter(|m| !m.is_empty())
        else {
            warn!("Skipping attendance section without a heading");
            continue;
        };
        table.add_meeting(&meeting);

        for row in section.select(&selectors.row) {
            let Some(figure) = row.select(&selectors.figure).next() else {
                continue;
            };
            let group = group_label(row, &selectors);
            let text = element_text(figure);

            match parse_figure(&text) {
                Some(count) => {
                    if let Some(previous) = table.record(&meeting, &group, count) {
                        warn!(
                            meeting = %meeting,
                            group = %group,
                            previous,
                            count,
                            "Attendance group listed twice; keeping the later figure"
                        );
                    }
                }
                None => {
                    let skipped = RotaError::UnparseableFigure {
                        meeting: meeting.clone(),
                        group,
                        text,
                    };
                    debug!(error = %skipped, "Attendance figure not recorded");
                }
            }
        }

        if table.meeting(&meeting).is_some_and(|groups| groups.is_empty()) {
            debug!(meeting = %meeting, "No attendance figures for meeting");
        }
    }

    Ok(table)
}

/// The `.group` cell, else the first non-empty cell that is not a figure.
/// Blank cells such as icon columns are passed over.
fn group_label(row: ElementRef<'_>, selectors: &AttendanceSelectors) -> String {
    select_text(row, &selectors.group)
        .filter(|label| !label.is_empty())
        .or_else(|| {
            row.select(&selectors.cell)
                .filter(|cell| !cell.value().classes().any(|class| class == FIGURE_CLASS))
                .map(element_text)
                .find(|label| !label.is_empty())
        })
        .unwrap_or_else(|| TOTAL_LABEL.to_string())
}

/// Parse a headcount, allowing thousands separators. Empty or non-numeric text yields `None`.
pub fn parse_figure(text: &str) -> Option<i64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(meeting: &str, rows: &str) -> String {
        format!(
            r#"<div class="week-category"><h3>{}</h3><table><tbody>{}</tbody></table></div>"#,
            meeting, rows
        )
    }

    fn row(group: &str, figure: &str) -> String {
        format!(r#"<tr><td>{}</td><td class="attendance">{}</td></tr>"#, group, figure)
    }

    fn page(sections: &[String]) -> String {
        format!("<html><body>{}</body></html>", sections.concat())
    }

    #[test]
    fn test_non_numeric_group_is_omitted() {
        let html = page(&[section(
            "Morning Service",
            &format!("{}{}", row("Total", "142"), row("Visitors", "n/a")),
        )]);

        let table = parse(&html).unwrap();
        let mut expected = AttendanceTable::new();
        expected.record("Morning Service", "Total", 142);
        assert_eq!(table, expected);
    }

    #[test]
    fn test_meeting_without_figures_is_kept_empty() {
        let html = page(&[
            section("Morning Service", &row("Adults", "98")),
            section("Evening Service", &row("Adults", "")),
        ]);

        let table = parse(&html).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.count("Morning Service", "Adults"), Some(98));
        assert!(table.meeting("Evening Service").unwrap().is_empty());
    }

    #[test]
    fn test_group_class_and_unlabelled_total() {
        let rows = r#"
            <tr><th>Group</th><th>Attendance</th></tr>
            <tr><td class="icon"></td><td class="group">Kids Church</td><td class="attendance"> 31 </td></tr>
            <tr class="total"><td class="attendance">1,204</td></tr>
        "#;
        let table = parse(&page(&[section("Morning Service", rows)])).unwrap();
        assert_eq!(table.count("Morning Service", "Kids Church"), Some(31));
        assert_eq!(table.count("Morning Service", "Total"), Some(1204));
        // Header row has no td.attendance and is ignored
        assert_eq!(table.meeting("Morning Service").unwrap().len(), 2);
    }

    #[test]
    fn test_blank_icon_cell_does_not_shadow_group() {
        let rows = r#"
            <tr><th>Total</th><td class="attendance">142</td></tr>
            <tr><td class="icon"></td><td>Kids</td><td class="attendance">31</td></tr>
        "#;
        let table = parse(&page(&[section("Morning Service", rows)])).unwrap();
        assert_eq!(table.count("Morning Service", "Total"), Some(142));
        assert_eq!(table.count("Morning Service", "Kids"), Some(31));
    }

    #[test]
    fn test_repeated_group_keeps_later_figure() {
        let html = page(&[section(
            "Morning Service",
            &format!("{}{}", row("Adults", "90"), row("Adults", "98")),
        )]);
        let table = parse(&html).unwrap();
        assert_eq!(table.count("Morning Service", "Adults"), Some(98));
        assert_eq!(table.meeting("Morning Service").unwrap().len(), 1);
    }

    #[test]
    fn test_section_without_heading_is_skipped() {
        let html = page(&[
            r#"<div class="week-category"><table><tr><td>Adults</td><td class="attendance">5</td></tr></table></div>"#.to_string(),
            section("Morning Service", &row("Adults", "98")),
        ]);
        let table = parse(&html).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("<html></html>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_figure() {
        assert_eq!(parse_figure("142"), Some(142));
        assert_eq!(parse_figure(" 1,204 "), Some(1204));
        assert_eq!(parse_figure("n/a"), None);
        assert_eq!(parse_figure(""), None);
        assert_eq!(parse_figure("12.5"), None);
    }
}
