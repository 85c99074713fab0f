use std::fmt::Write;

use crate::aliases::AliasTally;
use crate::buckets::BucketReport;

pub const DEFAULT_USAGE_TITLE: &str = "Reagent API Usage Report";

/// One `count alias` line per alias, most frequent first.
pub fn render_alias_report(tally: &AliasTally) -> String {
    let mut out = String::new();
    for (alias, count) in tally.sorted() {
        let _ = writeln!(out, "{count:<5} {alias}");
    }
    out
}

/// Framed table of bucket totals; unknown totals print as `Error`.
pub fn render_bucket_report(report: &BucketReport, title: &str) -> String {
    let header = format!("--- {title} ---");
    let mut out = String::new();
    let _ = writeln!(out, "{header}");
    for (name, total) in report.sorted() {
        let total = total.map_or_else(|| "Error".to_string(), |t| t.to_string());
        let _ = writeln!(out, "{name:<25} {total}");
    }
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultItem;

    #[test]
    fn alias_lines_are_padded_and_sorted() {
        let items = vec![ResultItem::from_fragments([
            "[reagent.core :as rc] [reagent.core :as r] [reagent.core :as r]",
        ])];
        let tally = crate::count_aliases(&items, "[reagent.core").unwrap();
        assert_eq!(
            render_alias_report(&tally),
            "2     [reagent.core :as r]\n1     [reagent.core :as rc]\n"
        );
    }

    #[test]
    fn empty_tally_prints_nothing() {
        assert_eq!(render_alias_report(&AliasTally::new()), "");
    }

    #[test]
    fn bucket_table_marks_unknown_totals() {
        let report = BucketReport {
            entries: vec![
                ("wrap".to_string(), None),
                ("render".to_string(), Some(1234)),
            ],
        };
        let rendered = render_bucket_report(&report, "Usage");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "--- Usage ---");
        assert_eq!(lines[1], format!("{:<25} 1234", "render"));
        assert_eq!(lines[2], format!("{:<25} Error", "wrap"));
        assert_eq!(lines[3], "-------------");
    }
}
