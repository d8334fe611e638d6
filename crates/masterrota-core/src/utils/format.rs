use chrono::{NaiveDate, NaiveDateTime};

/// Collapse runs of whitespace (including newlines from HTML) to single spaces
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format the "Last update" stamp written to each sheet
pub fn timestamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M").to_string()
}

/// Format a date for display, e.g. "Sunday 6 May 2018"
pub fn nice_date(date: NaiveDate) -> String {
    date.format("%A %-d %b %Y").to_string()
}

/// Render rows as a boxed ASCII table. The first row is treated as a header.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|r| r.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let cell = row.get(col).map(|c| c.as_str()).unwrap_or("");
                let pad = width - cell.chars().count();
                format!(" {}{} ", cell, " ".repeat(pad))
            })
            .collect();
        out.push_str(&format!("|{}|\n", cells.join("|")));
        if i == 0 {
            out.push_str(&border);
            out.push('\n');
        }
    }
    if rows.len() > 1 {
        out.push_str(&border);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Alice\n   Smith "), "Alice Smith");
        assert_eq!(collapse_whitespace("\t\n"), "");
    }

    #[test]
    fn test_nice_date_drops_leading_zero() {
        let date = NaiveDate::from_ymd_opt(2018, 5, 6).unwrap();
        assert_eq!(nice_date(date), "Sunday 6 May 2018");
        let date = NaiveDate::from_ymd_opt(2018, 4, 22).unwrap();
        assert_eq!(nice_date(date), "Sunday 22 Apr 2018");
    }

    #[test]
    fn test_timestamp() {
        let now = NaiveDate::from_ymd_opt(2018, 4, 22)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(timestamp(now), "2018-04-22 09:05");
    }

    #[test]
    fn test_render_table() {
        let rows = vec![
            vec!["Next Sunday".to_string(), "Last update".to_string()],
            vec!["Worship".to_string(), "Alice".to_string()],
        ];
        let expected = "\
+-------------+-------------+
| Next Sunday | Last update |
+-------------+-------------+
| Worship     | Alice       |
+-------------+-------------+
";
        assert_eq!(render_table(&rows), expected);
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(render_table(&[]), "");
    }
}
