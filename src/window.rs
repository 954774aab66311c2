//! Calendar windows for the history view: which dates a day/week/month/year
//! view covers, how it is titled, and where the previous/next arrows go.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Display window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "D", alias = "day")]
    Day,
    #[serde(rename = "W", alias = "week")]
    Week,
    #[serde(rename = "M", alias = "month")]
    Month,
    #[serde(rename = "Y", alias = "year")]
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// `date` moved by `days`, clamped to the representable calendar.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    shift_days(date, -i64::from(date.day0()))
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next) => shift_days(next, -1),
        None => NaiveDate::MAX,
    }
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    shift_days(date, -i64::from(date.ordinal0()))
}

fn last_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Monday of the ISO week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    shift_days(date, -i64::from(date.weekday().num_days_from_monday()))
}

pub fn resolve_window(reference: NaiveDate, granularity: Granularity) -> Window {
    match granularity {
        Granularity::Day => Window {
            start: reference,
            end: reference,
        },
        Granularity::Week => {
            let start = start_of_week(reference);
            Window {
                start,
                end: shift_days(start, 6),
            }
        }
        Granularity::Month => Window {
            start: first_of_month(reference),
            end: last_of_month(reference),
        },
        Granularity::Year => Window {
            start: first_of_year(reference),
            end: last_of_year(reference),
        },
    }
}

/// Title of the window: `2025-01-06`, `Jan 6 – Jan 12`, `January 2025`, `2025`.
pub fn window_label(reference: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => reference.format("%Y-%m-%d").to_string(),
        Granularity::Week => {
            let window = resolve_window(reference, granularity);
            format!(
                "{} \u{2013} {}",
                window.start.format("%b %-d"),
                window.end.format("%b %-d")
            )
        }
        Granularity::Month => reference.format("%B %Y").to_string(),
        Granularity::Year => reference.year().to_string(),
    }
}

/// Reference date of the adjacent window. Month and year steps land on the
/// first of the month.
pub fn navigate(reference: NaiveDate, granularity: Granularity, direction: Direction) -> NaiveDate {
    let sign = direction.sign();
    match granularity {
        Granularity::Day => shift_days(reference, sign),
        Granularity::Week => shift_days(reference, 7 * sign),
        Granularity::Month | Granularity::Year => {
            let months = Months::new(if granularity == Granularity::Month { 1 } else { 12 });
            let first = first_of_month(reference);
            let moved = match direction {
                Direction::Previous => first.checked_sub_months(months),
                Direction::Next => first.checked_add_months(months),
            };
            moved.unwrap_or(first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_window_is_the_reference() {
        let w = resolve_window(d(2025, 3, 9), Granularity::Day);
        assert_eq!((w.start, w.end), (d(2025, 3, 9), d(2025, 3, 9)));
        assert_eq!(window_label(d(2025, 3, 9), Granularity::Day), "2025-03-09");
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-03-09 is a Sunday; its ISO week starts on Monday 03-03.
        let w = resolve_window(d(2025, 3, 9), Granularity::Week);
        assert_eq!((w.start, w.end), (d(2025, 3, 3), d(2025, 3, 9)));

        let w = resolve_window(d(2025, 3, 3), Granularity::Week);
        assert_eq!((w.start, w.end), (d(2025, 3, 3), d(2025, 3, 9)));

        // crosses a year boundary
        let w = resolve_window(d(2025, 1, 1), Granularity::Week);
        assert_eq!((w.start, w.end), (d(2024, 12, 30), d(2025, 1, 5)));
    }

    #[test]
    fn week_label_uses_short_dates() {
        assert_eq!(
            window_label(d(2025, 1, 8), Granularity::Week),
            "Jan 6 \u{2013} Jan 12"
        );
    }

    #[test]
    fn month_window_handles_leap_february() {
        let w = resolve_window(d(2024, 2, 14), Granularity::Month);
        assert_eq!((w.start, w.end), (d(2024, 2, 1), d(2024, 2, 29)));
        let w = resolve_window(d(2025, 12, 31), Granularity::Month);
        assert_eq!((w.start, w.end), (d(2025, 12, 1), d(2025, 12, 31)));
        assert_eq!(window_label(d(2024, 2, 14), Granularity::Month), "February 2024");
    }

    #[test]
    fn year_window_spans_calendar_year() {
        let w = resolve_window(d(2025, 6, 1), Granularity::Year);
        assert_eq!((w.start, w.end), (d(2025, 1, 1), d(2025, 12, 31)));
        assert_eq!(window_label(d(2025, 6, 1), Granularity::Year), "2025");
        assert!(w.contains(d(2025, 12, 31)));
        assert!(!w.contains(d(2026, 1, 1)));
    }

    #[test]
    fn navigate_steps() {
        let r = d(2025, 3, 31);
        assert_eq!(navigate(r, Granularity::Day, Direction::Next), d(2025, 4, 1));
        assert_eq!(navigate(r, Granularity::Week, Direction::Previous), d(2025, 3, 24));
        assert_eq!(navigate(r, Granularity::Month, Direction::Previous), d(2025, 2, 1));
        assert_eq!(navigate(r, Granularity::Month, Direction::Next), d(2025, 4, 1));
        assert_eq!(navigate(r, Granularity::Year, Direction::Next), d(2026, 3, 1));
        assert_eq!(navigate(d(2024, 2, 29), Granularity::Year, Direction::Previous), d(2023, 2, 1));
    }

    #[test]
    fn granularity_accepts_letters_and_words() {
        let g: Granularity = serde_json::from_str("\"Y\"").unwrap();
        assert_eq!(g, Granularity::Year);
        let g: Granularity = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(g, Granularity::Week);
    }

    #[test]
    fn calendar_edges_clamp_instead_of_overflowing() {
        let max = NaiveDate::MAX;
        let min = NaiveDate::MIN;
        assert_eq!(navigate(max, Granularity::Day, Direction::Next), max);
        assert_eq!(navigate(max, Granularity::Week, Direction::Next), max);
        assert_eq!(navigate(min, Granularity::Day, Direction::Previous), min);
        assert_eq!(navigate(min, Granularity::Week, Direction::Previous), min);
        assert_eq!(resolve_window(max, Granularity::Week).end, max);
        assert_eq!(resolve_window(max, Granularity::Month).end, max);
        assert_eq!(resolve_window(max, Granularity::Year).end, max);
        assert_eq!(resolve_window(min, Granularity::Week).start, min);
        assert_eq!(shift_days(d(2025, 3, 9), -8), d(2025, 3, 1));
    }

    #[test]
    fn direction_reads_lowercase_words() {
        let dir: Direction = serde_json::from_str("\"previous\"").unwrap();
        assert_eq!(dir, Direction::Previous);
    }
}
