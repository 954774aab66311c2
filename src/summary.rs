//! Derived statistics over rolling windows ending today: entry counts, the
//! logging streak, severity averages, top symptoms and their trend against
//! the preceding window.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::aggregate::round10;
use crate::metrics::{Metric, MetricCatalog, METRIC_COUNT};
use crate::models::LogEntry;
use crate::window::shift_days;

/// Length of the "current" and "previous" comparison windows.
pub const ROLLING_WINDOW_DAYS: i64 = 30;
/// Trend noise floor in tenths of a point (0.3): smaller changes of the
/// 30-day mean count as stable.
pub const TREND_THRESHOLD_TENTHS: i64 = 3;
pub const TOP_SYMPTOM_LIMIT: usize = 5;
/// Entries needed in the current window before top symptoms are worth showing.
pub const INSIGHT_MIN_ENTRIES: usize = 3;
const RECENT_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Worsening.
    Up,
    /// Improving.
    Down,
    Stable,
}

impl TrendDirection {
    /// Compares the means `current_sum / current_count` and
    /// `previous_sum / previous_count` in integers, so a change of exactly
    /// 0.3 is stable. An empty window has a mean of 0.
    pub fn classify(
        current_sum: u32,
        current_count: usize,
        previous_sum: u32,
        previous_count: usize,
    ) -> Self {
        let (cs, cn) = as_ratio(current_sum, current_count);
        let (ps, pn) = as_ratio(previous_sum, previous_count);
        // 10 * (cs/cn - ps/pn) against the threshold, scaled by cn * pn.
        let diff = 10 * (cs * pn - ps * cn);
        let bound = TREND_THRESHOLD_TENTHS * cn * pn;
        if diff > bound {
            TrendDirection::Up
        } else if diff < -bound {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

fn as_ratio(sum: u32, count: usize) -> (i64, i64) {
    match i64::try_from(count) {
        Ok(n) if n > 0 => (i64::from(sum), n),
        _ => (0, 1),
    }
}

/// Exact per-metric sums over one window.
struct WindowTotals {
    sums: [u32; METRIC_COUNT],
    count: usize,
}

impl WindowTotals {
    fn new(entries: &[&LogEntry]) -> Self {
        let mut sums = [0u32; METRIC_COUNT];
        for entry in entries {
            for (metric, value) in entry.scores.iter() {
                sums[metric.index()] += u32::from(value);
            }
        }
        Self {
            sums,
            count: entries.len(),
        }
    }

    fn sum(&self, metric: Metric) -> u32 {
        self.sums[metric.index()]
    }

    fn mean(&self, metric: Metric) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            f64::from(self.sum(metric)) / self.count as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomAverage {
    pub metric: Metric,
    pub label: String,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub metric: Metric,
    pub label: String,
    pub current_avg: f64,
    pub previous_avg: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub entry_count_30d: usize,
    pub streak_days: u32,
    pub avg_severity_30d: f64,
    pub last_logged: String,
    pub insights_ready: bool,
    pub top_symptoms: Vec<SymptomAverage>,
    pub trends: Vec<TrendSummary>,
}

/// Entries with `today - days < date <= today - offset_days`.
fn slice_ending(
    entries: &[LogEntry],
    today: NaiveDate,
    offset_days: i64,
    days: i64,
) -> Vec<&LogEntry> {
    let upper = shift_days(today, -offset_days);
    let lower = shift_days(upper, -days);
    entries
        .iter()
        .filter(|e| e.log_date > lower && e.log_date <= upper)
        .collect()
}

pub fn compute_summary(entries: &[LogEntry], today: NaiveDate, catalog: &MetricCatalog) -> Summary {
    let current = slice_ending(entries, today, 0, ROLLING_WINDOW_DAYS);
    let previous = slice_ending(entries, today, ROLLING_WINDOW_DAYS, ROLLING_WINDOW_DAYS);

    let current_totals = WindowTotals::new(&current);
    let previous_totals = WindowTotals::new(&previous);
    let ranked = rank_metrics(&metric_means(&current), TOP_SYMPTOM_LIMIT);

    let top_symptoms = ranked
        .iter()
        .map(|&(metric, avg)| SymptomAverage {
            metric,
            label: catalog.label(metric).to_string(),
            avg: round10(avg),
        })
        .collect();

    let trends = ranked
        .iter()
        .map(|&(metric, avg)| {
            TrendSummary {
                metric,
                label: catalog.label(metric).to_string(),
                current_avg: round10(avg),
                previous_avg: round10(previous_totals.mean(metric)),
                direction: TrendDirection::classify(
                    current_totals.sum(metric),
                    current_totals.count,
                    previous_totals.sum(metric),
                    previous_totals.count,
                ),
            }
        })
        .collect();

    Summary {
        entry_count_30d: current.len(),
        streak_days: streak_days(entries, today),
        avg_severity_30d: nonzero_mean(&current),
        last_logged: last_logged_label(entries, today),
        insights_ready: current.len() >= INSIGHT_MIN_ENTRIES,
        top_symptoms,
        trends,
    }
}

/// Consecutive logged days ending today, or ending yesterday when today has
/// no entry yet.
pub fn streak_days(entries: &[LogEntry], today: NaiveDate) -> u32 {
    let logged: HashSet<NaiveDate> = entries.iter().map(|e| e.log_date).collect();
    let mut cursor = if logged.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };
    let mut streak = 0;
    while let Some(day) = cursor.filter(|d| logged.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Mean of every non-zero reading across all metrics, one decimal. Zeros
/// mean "no symptom" and are left out of both sides of the division.
pub fn nonzero_mean(entries: &[&LogEntry]) -> f64 {
    let (sum, count) = entries
        .iter()
        .flat_map(|e| e.scores.iter())
        .filter(|&(_, v)| v > 0)
        .fold((0u32, 0u32), |(sum, count), (_, v)| (sum + u32::from(v), count + 1));
    if count == 0 {
        0.0
    } else {
        round10(f64::from(sum) / f64::from(count))
    }
}

/// Per-metric mean with zeros included. Empty input gives no means.
pub fn metric_means(entries: &[&LogEntry]) -> BTreeMap<Metric, f64> {
    if entries.is_empty() {
        return BTreeMap::new();
    }
    let totals = WindowTotals::new(entries);
    Metric::ALL.into_iter().map(|m| (m, totals.mean(m))).collect()
}

/// Highest values first, zeros dropped, at most `limit`. Ties keep the
/// declared metric order.
fn rank_metrics(values: &BTreeMap<Metric, f64>, limit: usize) -> Vec<(Metric, f64)> {
    let mut ranked: Vec<(Metric, f64)> = values
        .iter()
        .map(|(&m, &v)| (m, v))
        .filter(|&(_, v)| v > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// "Today", "1 day ago", "N days ago", or "—" with no entries.
pub fn last_logged_label(entries: &[LogEntry], today: NaiveDate) -> String {
    let Some(last) = entries.iter().map(|e| e.log_date).max() else {
        return "\u{2014}".to_string();
    };
    match (today - last).num_days() {
        diff if diff <= 0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        diff => format!("{diff} days ago"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthOverview {
    pub total_entries: usize,
    pub first_log_date: Option<NaiveDate>,
    pub last_log_date: Option<NaiveDate>,
    pub top_symptoms: Vec<SymptomAverage>,
}

/// All-time totals for the profile page.
pub fn health_overview(entries: &[LogEntry], catalog: &MetricCatalog) -> HealthOverview {
    let all: Vec<&LogEntry> = entries.iter().collect();
    let top_symptoms = rank_metrics(&metric_means(&all), TOP_SYMPTOM_LIMIT)
        .into_iter()
        .map(|(metric, avg)| SymptomAverage {
            metric,
            label: catalog.label(metric).to_string(),
            avg,
        })
        .collect();

    HealthOverview {
        total_entries: entries.len(),
        first_log_date: entries.iter().map(|e| e.log_date).min(),
        last_log_date: entries.iter().map(|e| e.log_date).max(),
        top_symptoms,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesLine {
    pub metric: Metric,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
    pub date: NaiveDate,
    pub label: String,
    pub values: BTreeMap<Metric, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentChart {
    pub lines: Vec<SeriesLine>,
    pub rows: Vec<DayRow>,
}

fn last_seven_days(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..RECENT_DAYS).rev().map(move |back| shift_days(today, -back))
}

/// The five most active metrics of the past week, one row per day.
pub fn recent_chart(entries: &[LogEntry], today: NaiveDate, catalog: &MetricCatalog) -> RecentChart {
    let recent = slice_ending(entries, today, 0, RECENT_DAYS);
    if recent.is_empty() {
        return RecentChart {
            lines: Vec::new(),
            rows: Vec::new(),
        };
    }

    let totals: BTreeMap<Metric, f64> = Metric::ALL
        .into_iter()
        .map(|m| {
            let total: u32 = recent.iter().map(|e| u32::from(e.scores.get(m))).sum();
            (m, f64::from(total))
        })
        .collect();
    let top: Vec<Metric> = rank_metrics(&totals, TOP_SYMPTOM_LIMIT)
        .into_iter()
        .map(|(m, _)| m)
        .collect();

    let lines = top
        .iter()
        .enumerate()
        .map(|(rank, &metric)| SeriesLine {
            metric,
            label: catalog.label(metric).to_string(),
            color: catalog.rank_color(rank).to_string(),
        })
        .collect();

    let by_date: HashMap<NaiveDate, &LogEntry> = recent.iter().map(|e| (e.log_date, *e)).collect();
    let rows = last_seven_days(today)
        .map(|date| {
            let entry = by_date.get(&date);
            let values = top
                .iter()
                .map(|&m| (m, entry.map_or(0.0, |e| f64::from(e.scores.get(m)))))
                .collect();
            DayRow {
                date,
                label: date.format("%a").to_string(),
                values,
            }
        })
        .collect();

    RecentChart { lines, rows }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripDay {
    pub date: NaiveDate,
    pub label: String,
    pub avg: f64,
    pub has_data: bool,
}

/// Severity of each of the last seven days, for the overview strip.
pub fn weekly_strip(entries: &[LogEntry], today: NaiveDate) -> Vec<StripDay> {
    let by_date: HashMap<NaiveDate, &LogEntry> = entries.iter().map(|e| (e.log_date, e)).collect();
    last_seven_days(today)
        .map(|date| {
            let entry = by_date.get(&date).copied();
            StripDay {
                date,
                label: date.format("%a").to_string(),
                avg: entry.map_or(0.0, |e| nonzero_mean(&[e])),
                has_data: entry.is_some(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scores;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn entry(date: NaiveDate, scores: &[(Metric, i64)]) -> LogEntry {
        let scores = scores
            .iter()
            .fold(Scores::default(), |s, &(m, v)| s.with(m, v));
        LogEntry::new(date, scores)
    }

    fn days_before(today: NaiveDate, n: i64) -> NaiveDate {
        today - Duration::days(n)
    }

    #[test]
    fn entry_only_31_days_ago_gives_empty_summary() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1);
        let entries = vec![entry(days_before(today, 31), &[(Metric::Headache, 6)])];
        let summary = compute_summary(&entries, today, &catalog);
        assert_eq!(summary.entry_count_30d, 0);
        assert_eq!(summary.streak_days, 0);
        assert_eq!(summary.avg_severity_30d, 0.0);
        assert!(summary.top_symptoms.is_empty());
        assert!(summary.trends.is_empty());
        assert_eq!(summary.last_logged, "31 days ago");
    }

    #[test]
    fn no_entries_is_not_an_error() {
        let catalog = MetricCatalog::standard();
        let summary = compute_summary(&[], d(2025, 6, 1), &catalog);
        assert_eq!(summary.entry_count_30d, 0);
        assert_eq!(summary.last_logged, "\u{2014}");
        assert!(!summary.insights_ready);
    }

    #[test]
    fn window_bounds_are_exclusive_below_inclusive_above() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1);
        let entries = vec![
            entry(days_before(today, 30), &[]),
            entry(days_before(today, 29), &[]),
            entry(today, &[]),
            entry(today + Duration::days(1), &[]),
        ];
        assert_eq!(compute_summary(&entries, today, &catalog).entry_count_30d, 2);
    }

    #[test]
    fn streak_counts_from_today_or_yesterday() {
        let today = d(2025, 6, 10);
        let run = |offsets: &[i64]| -> u32 {
            let entries: Vec<_> = offsets
                .iter()
                .map(|&o| entry(days_before(today, o), &[]))
                .collect();
            streak_days(&entries, today)
        };
        assert_eq!(run(&[0, 1, 2, 4]), 3);
        assert_eq!(run(&[1, 2, 3]), 3);
        assert_eq!(run(&[2, 3, 4]), 0);
        assert_eq!(run(&[]), 0);
        assert_eq!(run(&[0]), 1);
        let long: Vec<i64> = (0..45).collect();
        assert_eq!(run(&long), 45);
    }

    #[test]
    fn severity_average_skips_zero_readings() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1);
        let entries = vec![
            entry(today, &[(Metric::Headache, 4), (Metric::Bloating, 8)]),
            entry(days_before(today, 1), &[(Metric::Fatigue, 3)]),
        ];
        // (4 + 8 + 3) / 3 = 5.0
        assert_eq!(compute_summary(&entries, today, &catalog).avg_severity_30d, 5.0);
    }

    #[test]
    fn top_symptoms_rank_by_mean_with_zeros_and_cap() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1);
        let entries = vec![
            entry(
                today,
                &[
                    (Metric::Headache, 8),
                    (Metric::Bloating, 6),
                    (Metric::Nausea, 5),
                    (Metric::Stress, 4),
                    (Metric::Sleep, 3),
                    (Metric::Coffee, 2),
                ],
            ),
            entry(days_before(today, 1), &[(Metric::Bloating, 6)]),
        ];
        let summary = compute_summary(&entries, today, &catalog);
        let metrics: Vec<_> = summary.top_symptoms.iter().map(|s| s.metric).collect();
        assert_eq!(
            metrics,
            [
                Metric::Bloating,
                Metric::Headache,
                Metric::Nausea,
                Metric::Stress,
                Metric::Sleep
            ]
        );
        assert_eq!(summary.top_symptoms[0].avg, 6.0);
        assert_eq!(summary.top_symptoms[1].avg, 4.0);
        assert_eq!(summary.top_symptoms[0].label, "Bloating");
        assert_eq!(summary.trends.len(), 5);
    }

    #[test]
    fn calendar_edges_do_not_panic() {
        let catalog = MetricCatalog::standard();
        let entries = vec![
            entry(NaiveDate::MIN, &[(Metric::Headache, 3)]),
            entry(NaiveDate::MAX, &[(Metric::Headache, 3)]),
        ];
        assert_eq!(streak_days(&entries, NaiveDate::MIN), 1);
        assert_eq!(compute_summary(&entries, NaiveDate::MIN, &catalog).streak_days, 1);
        let summary = compute_summary(&entries, NaiveDate::MAX, &catalog);
        assert_eq!((summary.entry_count_30d, summary.streak_days), (1, 1));
        assert_eq!(weekly_strip(&entries, NaiveDate::MAX).len(), 7);
        assert_eq!(recent_chart(&entries, NaiveDate::MAX, &catalog).rows.len(), 7);
    }

    #[test]
    fn trend_threshold_boundaries_are_stable() {
        // (sum, count) pairs: 3.3 vs 3.0, 2.0 vs 2.3, 0.3 vs empty, 0.0 vs 0.3
        assert_eq!(TrendDirection::classify(33, 10, 30, 10), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(20, 10, 23, 10), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(3, 10, 0, 0), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(0, 10, 3, 10), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(331, 100, 300, 100), TrendDirection::Up);
        assert_eq!(TrendDirection::classify(300, 100, 331, 100), TrendDirection::Down);
    }

    #[test]
    fn computed_means_exactly_point_three_apart_are_stable() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1);
        // current: ten days summing to 11 (mean 1.1)
        let mut entries: Vec<LogEntry> = (0..10)
            .map(|i| entry(days_before(today, i), &[(Metric::Headache, if i == 0 { 2 } else { 1 })]))
            .collect();
        // previous: ten days summing to 8 (mean 0.8)
        entries.extend((30..40).map(|i| {
            entry(days_before(today, i), &[(Metric::Headache, if i < 38 { 1 } else { 0 })])
        }));

        let summary = compute_summary(&entries, today, &catalog);
        let trend = &summary.trends[0];
        assert_eq!(trend.metric, Metric::Headache);
        assert_eq!(trend.current_avg, 1.1);
        assert_eq!(trend.previous_avg, 0.8);
        assert_eq!(trend.direction, TrendDirection::Stable);

        // one more point in the current window tips it over
        entries[1] = entry(days_before(today, 1), &[(Metric::Headache, 2)]);
        let summary = compute_summary(&entries, today, &catalog);
        assert_eq!(summary.trends[0].direction, TrendDirection::Up);
    }

    #[test]
    fn trends_compare_against_previous_window() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1);
        let entries = vec![
            entry(today, &[(Metric::Headache, 6), (Metric::PelvicPain, 2), (Metric::Mood, 5)]),
            entry(
                days_before(today, 40),
                &[(Metric::Headache, 2), (Metric::PelvicPain, 5), (Metric::Mood, 5)],
            ),
            // previous window upper bound is inclusive
            entry(
                days_before(today, 30),
                &[(Metric::Headache, 2), (Metric::PelvicPain, 5), (Metric::Mood, 5)],
            ),
            // outside both windows
            entry(days_before(today, 60), &[(Metric::Headache, 10)]),
        ];
        let summary = compute_summary(&entries, today, &catalog);
        let trend = |m: Metric| summary.trends.iter().find(|t| t.metric == m).unwrap();
        assert_eq!(trend(Metric::Headache).direction, TrendDirection::Up);
        assert_eq!(trend(Metric::Headache).previous_avg, 2.0);
        assert_eq!(trend(Metric::PelvicPain).direction, TrendDirection::Down);
        assert_eq!(trend(Metric::Mood).direction, TrendDirection::Stable);
    }

    #[test]
    fn empty_previous_window_counts_as_zero() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1);
        let entries = vec![entry(today, &[(Metric::Headache, 1)])];
        let summary = compute_summary(&entries, today, &catalog);
        assert_eq!(summary.trends[0].previous_avg, 0.0);
        assert_eq!(summary.trends[0].direction, TrendDirection::Up);
    }

    #[test]
    fn last_logged_labels() {
        let today = d(2025, 6, 1);
        assert_eq!(last_logged_label(&[entry(today, &[])], today), "Today");
        assert_eq!(last_logged_label(&[entry(days_before(today, 1), &[])], today), "1 day ago");
        assert_eq!(last_logged_label(&[entry(days_before(today, 4), &[])], today), "4 days ago");
    }

    #[test]
    fn overview_uses_all_time_means() {
        let catalog = MetricCatalog::standard();
        let entries = vec![
            entry(d(2024, 1, 1), &[(Metric::Nausea, 3)]),
            entry(d(2025, 1, 1), &[(Metric::Nausea, 4), (Metric::Diet, 1)]),
        ];
        let overview = health_overview(&entries, &catalog);
        assert_eq!(overview.total_entries, 2);
        assert_eq!(overview.first_log_date, Some(d(2024, 1, 1)));
        assert_eq!(overview.last_log_date, Some(d(2025, 1, 1)));
        assert_eq!(overview.top_symptoms[0].metric, Metric::Nausea);
        assert_eq!(overview.top_symptoms[0].avg, 3.5);
        assert_eq!(overview.top_symptoms[1].avg, 0.5);
    }

    #[test]
    fn recent_chart_fills_missing_days_with_zero() {
        let catalog = MetricCatalog::standard();
        let today = d(2025, 6, 1); // Sunday
        let entries = vec![
            entry(today, &[(Metric::Headache, 5)]),
            entry(days_before(today, 2), &[(Metric::Headache, 1), (Metric::Stress, 9)]),
            entry(days_before(today, 7), &[(Metric::Sleep, 9)]),
        ];
        let chart = recent_chart(&entries, today, &catalog);
        let metrics: Vec<_> = chart.lines.iter().map(|l| l.metric).collect();
        assert_eq!(metrics, [Metric::Stress, Metric::Headache]);
        assert_eq!(chart.lines[0].color, "#4e79a7");
        assert_eq!(chart.rows.len(), 7);
        assert_eq!(chart.rows[0].label, "Mon");
        assert_eq!(chart.rows[6].label, "Sun");
        assert_eq!(chart.rows[6].values[&Metric::Headache], 5.0);
        assert_eq!(chart.rows[5].values[&Metric::Headache], 0.0);
        assert_eq!(chart.rows[4].values[&Metric::Stress], 9.0);
    }

    #[test]
    fn weekly_strip_marks_days_without_data() {
        let today = d(2025, 6, 1);
        let entries = vec![entry(today, &[(Metric::Headache, 5), (Metric::Bloating, 2)])];
        let strip = weekly_strip(&entries, today);
        assert_eq!(strip.len(), 7);
        assert!(strip[6].has_data);
        assert_eq!(strip[6].avg, 3.5);
        assert!(!strip[0].has_data);
        assert_eq!(strip[0].avg, 0.0);
    }
}
