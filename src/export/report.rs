//! Printable summary of one history window, laid out as A4 pages of text.
//!
//! Layout follows the printed summary: a title block on the first page, one
//! block per entry, a page break once the cursor passes the bottom threshold
//! and a footer on every page. Positions are in millimetres.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::entries_in_window;
use crate::metrics::MetricCatalog;
use crate::models::LogEntry;
use crate::window::{window_label, Granularity};

pub const REPORT_TITLE: &str = "Symptom Log Summary";
pub const REPORT_FOOTER: &str = "Living with Endo";
pub const EMPTY_REPORT_LINE: &str = "No entries in this period.";

const PAGE_HEIGHT_MM: u32 = 297;
const MARGIN_MM: u32 = 15;
const BREAK_AFTER_MM: u32 = PAGE_HEIGHT_MM - 30;
const FIRST_BODY_LINE_MM: u32 = 45;
const DATE_LINE_MM: u32 = 6;
const TEXT_LINE_MM: u32 = 5;
const ENTRY_GAP_MM: u32 = 4;
/// Characters per line at body size across the printable width.
pub const WRAP_COLUMNS: usize = 90;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPage {
    pub lines: Vec<String>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub subtitle: String,
    pub pages: Vec<ReportPage>,
}

impl Report {
    /// Plain text, pages separated by a form feed.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            if i == 0 {
                out.push_str(&self.title);
                out.push('\n');
                out.push_str(&self.subtitle);
                out.push_str("\n\n");
            } else {
                out.push('\u{000C}');
            }
            for line in &page.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&page.footer);
            out.push('\n');
        }
        out
    }
}

/// Greedy word wrap that keeps the spacing between words on a
/// line. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut pending_spaces = 0;
        for word in paragraph.split(' ') {
            if word.is_empty() {
                pending_spaces += 1;
                continue;
            }
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            let mut separator = if current.is_empty() { 0 } else { pending_spaces + 1 };
            if current.chars().count() + separator + chars.len() > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                separator = 0;
            }
            current.extend(std::iter::repeat(' ').take(separator));
            current.extend(chars);
            pending_spaces = 0;
        }
        lines.push(current);
    }
    lines
}

struct PageCursor {
    pages: Vec<ReportPage>,
    y: u32,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            pages: vec![ReportPage {
                lines: Vec::new(),
                footer: REPORT_FOOTER.to_string(),
            }],
            y: FIRST_BODY_LINE_MM,
        }
    }

    fn break_if_full(&mut self) {
        if self.y > BREAK_AFTER_MM {
            self.pages.push(ReportPage {
                lines: Vec::new(),
                footer: REPORT_FOOTER.to_string(),
            });
            self.y = MARGIN_MM;
        }
    }

    fn write(&mut self, line: String, advance: u32) {
        self.break_if_full();
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
        self.y += advance;
    }

    fn gap(&mut self, advance: u32) {
        self.y += advance;
    }
}

/// Builds the report for the window containing `reference`.
pub fn build_report(
    entries: &[LogEntry],
    granularity: Granularity,
    reference: NaiveDate,
    catalog: &MetricCatalog,
) -> Report {
    let mut cursor = PageCursor::new();
    let in_window = entries_in_window(entries, granularity, reference);

    if in_window.is_empty() {
        cursor.write(EMPTY_REPORT_LINE.to_string(), TEXT_LINE_MM);
    }

    for entry in in_window {
        cursor.write(entry.log_date.format("%Y-%m-%d").to_string(), DATE_LINE_MM);

        let readings: Vec<String> = catalog
            .specs()
            .iter()
            .filter_map(|s| {
                let value = entry.scores.get(s.metric);
                (value > 0).then(|| format!("{}: {}/10", s.label, value))
            })
            .collect();
        if !readings.is_empty() {
            for line in wrap(&readings.join("  \u{00B7}  "), WRAP_COLUMNS) {
                cursor.write(line, TEXT_LINE_MM);
            }
        }

        if let Some(phase) = entry.cycle_phase.as_ref().filter(|p| !p.is_empty()) {
            cursor.write(format!("Cycle: {}", phase.label()), TEXT_LINE_MM);
        }

        if let Some(notes) = entry.notes.as_deref().filter(|n| !n.is_empty()) {
            for line in wrap(&format!("Notes: {notes}"), WRAP_COLUMNS) {
                cursor.write(line, TEXT_LINE_MM);
            }
        }

        cursor.gap(ENTRY_GAP_MM);
    }

    Report {
        title: REPORT_TITLE.to_string(),
        subtitle: window_label(reference, granularity),
        pages: cursor.pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle_phase::{CyclePhases, PhaseTag};
    use crate::metrics::Metric;
    use crate::models::Scores;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("aa bb cc", 5), ["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), ["abc", "def", "gh"]);
        assert_eq!(wrap("", 10), [""]);
        assert_eq!(wrap("a  \u{00B7}  b", 20), ["a  \u{00B7}  b"]);
    }

    #[test]
    fn empty_window_has_placeholder_line() {
        let catalog = MetricCatalog::standard();
        let report = build_report(&[], Granularity::Month, d(2025, 2, 1), &catalog);
        assert_eq!(report.subtitle, "February 2025");
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].lines, [EMPTY_REPORT_LINE]);
        assert_eq!(report.pages[0].footer, REPORT_FOOTER);
    }

    #[test]
    fn entry_block_lists_nonzero_scores_phase_and_notes() {
        let catalog = MetricCatalog::standard();
        let mut entry = LogEntry::new(
            d(2025, 2, 3),
            Scores::default()
                .with(Metric::Headache, 4)
                .with(Metric::Bloating, 2),
        );
        entry.cycle_phase = Some(CyclePhases::single(PhaseTag::Menstrual));
        entry.notes = Some("rested".to_string());

        let report = build_report(&[entry], Granularity::Week, d(2025, 2, 3), &catalog);
        assert_eq!(
            report.pages[0].lines,
            [
                "2025-02-03",
                "Headache: 4/10  \u{00B7}  Bloating: 2/10",
                "Cycle: Menstrual phase",
                "Notes: rested",
            ]
        );
        let text = report.render();
        assert!(text.starts_with("Symptom Log Summary\nFeb 3 \u{2013} Feb 9\n\n2025-02-03\n"));
        assert!(text.ends_with("Living with Endo\n"));
    }

    #[test]
    fn long_windows_paginate() {
        let catalog = MetricCatalog::standard();
        let start = d(2025, 1, 1);
        let entries: Vec<LogEntry> = (0..31)
            .map(|i| {
                LogEntry::new(
                    start + Duration::days(i),
                    Scores::default().with(Metric::Fatigue, 5),
                )
            })
            .collect();
        let report = build_report(&entries, Granularity::Month, start, &catalog);
        // each entry advances 6 + 5 + 4 = 15mm; the first page starts at 45mm
        // and breaks once past 267mm, later pages start at 15mm.
        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.pages[0].lines.len(), 15 * 2);
        assert_eq!(report.pages[1].lines.len(), 16 * 2);
        assert!(report.render().contains('\u{000C}'));
    }
}
