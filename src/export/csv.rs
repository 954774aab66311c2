//! Spreadsheet export of a user's logs and the matching import.
//!
//! Header: `Date,<metric labels in declared order>,Cycle Phase,Notes`.
//! Notes are always quoted; the phase column is quoted only when its
//! rendering contains a comma or quote.

use chrono::NaiveDate;

use crate::cycle_phase::CyclePhases;
use crate::export::ExportError;
use crate::metrics::MetricCatalog;
use crate::models::{LogEntry, Scores, MAX_SCORE};

pub const CSV_FILE_NAME: &str = "symptom-logs.csv";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn quote_if_needed(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quote(field)
    } else {
        field.to_string()
    }
}

pub fn header(catalog: &MetricCatalog) -> Vec<String> {
    let mut columns = vec!["Date".to_string()];
    columns.extend(catalog.specs().iter().map(|s| s.label.clone()));
    columns.push("Cycle Phase".to_string());
    columns.push("Notes".to_string());
    columns
}

/// Renders every entry, oldest first.
pub fn to_csv(entries: &[LogEntry], catalog: &MetricCatalog) -> String {
    let mut sorted: Vec<&LogEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.log_date);

    let header = header(catalog)
        .iter()
        .map(|h| quote_if_needed(h))
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = vec![header];
    for entry in sorted {
        let mut fields = vec![entry.log_date.format("%Y-%m-%d").to_string()];
        fields.extend(
            catalog
                .specs()
                .iter()
                .map(|s| entry.scores.get(s.metric).to_string()),
        );
        fields.push(
            entry
                .cycle_phase
                .as_ref()
                .map(|p| quote_if_needed(&p.label()))
                .unwrap_or_default(),
        );
        fields.push(entry.notes.as_deref().map(quote).unwrap_or_default());
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Reads back a file produced by [`to_csv`]. Rows get fresh ids.
pub fn parse_csv(input: &str, catalog: &MetricCatalog) -> Result<Vec<LogEntry>, ExportError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let expected = header(catalog);
    let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if found != expected {
        return Err(ExportError::Header(found.join(",")));
    }

    let metric_count = catalog.specs().len();
    let mut entries = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2;

        let raw_date = record.get(0).unwrap_or_default();
        let log_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
            ExportError::Field {
                row,
                column: "Date".to_string(),
                value: raw_date.to_string(),
            }
        })?;

        let mut scores = Scores::default();
        for (offset, spec) in catalog.specs().iter().enumerate() {
            let raw = record.get(offset + 1).unwrap_or_default().trim();
            // blank cells are unlogged readings
            let parsed = if raw.is_empty() { Ok(0) } else { raw.parse::<i64>() };
            let value = parsed
                .ok()
                .filter(|v| (0..=i64::from(MAX_SCORE)).contains(v))
                .ok_or_else(|| ExportError::Field {
                    row,
                    column: spec.label.clone(),
                    value: raw.to_string(),
                })?;
            scores.set(spec.metric, value);
        }

        let phase = record.get(metric_count + 1).unwrap_or_default();
        let notes = record.get(metric_count + 2).unwrap_or_default();

        let mut entry = LogEntry::new(log_date, scores);
        if !phase.is_empty() {
            entry.cycle_phase = Some(CyclePhases::from_labels(phase));
        }
        if !notes.is_empty() {
            entry.notes = Some(notes.to_string());
        }
        entries.push(entry);
    }
    Ok(entries)
}
