//! Turns a user's daily logs into chart buckets for one history window.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::metrics::MetricCatalog;
use crate::models::{Bucket, LogEntry};
use crate::window::{resolve_window, Granularity};

/// Rounds to one decimal place, halves rounding up (`round(x * 10) / 10`).
pub fn round10(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Entries inside the window of `reference`, oldest first.
pub fn entries_in_window<'a>(
    entries: &'a [LogEntry],
    granularity: Granularity,
    reference: NaiveDate,
) -> Vec<&'a LogEntry> {
    let window = resolve_window(reference, granularity);
    let mut filtered: Vec<&LogEntry> = entries
        .iter()
        .filter(|e| window.contains(e.log_date))
        .collect();
    filtered.sort_by_key(|e| e.log_date);
    filtered
}

/// Builds the chart rows for the window containing `reference`.
///
/// Day, week and month views get one bucket per entry with raw scores.
/// The year view gets one bucket per month that has entries, holding the
/// per-metric mean rounded to one decimal.
pub fn aggregate(
    entries: &[LogEntry],
    granularity: Granularity,
    reference: NaiveDate,
    catalog: &MetricCatalog,
) -> Vec<Bucket> {
    let in_window = entries_in_window(entries, granularity, reference);

    match granularity {
        Granularity::Day | Granularity::Week => in_window
            .into_iter()
            .map(|e| raw_bucket(e.log_date.format("%m-%d").to_string(), e, catalog))
            .collect(),
        Granularity::Month => in_window
            .into_iter()
            .map(|e| raw_bucket(e.log_date.day().to_string(), e, catalog))
            .collect(),
        Granularity::Year => monthly_means(&in_window, catalog),
    }
}

fn raw_bucket(label: String, entry: &LogEntry, catalog: &MetricCatalog) -> Bucket {
    let values = catalog
        .specs()
        .iter()
        .map(|s| (s.metric, f64::from(entry.scores.get(s.metric))))
        .collect();
    Bucket { label, values }
}

fn monthly_means(entries: &[&LogEntry], catalog: &MetricCatalog) -> Vec<Bucket> {
    // month0 -> (per-metric sums, count)
    let mut months: BTreeMap<u32, (Vec<u32>, u32)> = BTreeMap::new();
    for entry in entries {
        let (sums, count) = months
            .entry(entry.log_date.month0())
            .or_insert_with(|| (vec![0; catalog.specs().len()], 0));
        *count += 1;
        for (sum, spec) in sums.iter_mut().zip(catalog.specs()) {
            *sum += u32::from(entry.scores.get(spec.metric));
        }
    }

    months
        .into_iter()
        .map(|(month0, (sums, count))| {
            let values = catalog
                .specs()
                .iter()
                .zip(sums)
                .map(|(spec, sum)| (spec.metric, round10(f64::from(sum) / f64::from(count))))
                .collect();
            Bucket {
                label: short_month(month0).to_string(),
                values,
            }
        })
        .collect()
}

fn short_month(month0: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    MONTHS[month0 as usize % 12]
}
