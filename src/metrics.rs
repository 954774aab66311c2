//! The closed set of tracked metrics and the lookup tables that describe them.
//!
//! Labels, chart groups and palettes live in a [`MetricCatalog`] value that is
//! handed to the aggregation, summary and export functions, so none of them
//! depend on module-level state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of metrics in the closed set.
pub const METRIC_COUNT: usize = 23;

/// One 0–10 score recorded on every daily log.
///
/// Declaration order is the canonical column order (CSV, charts, storage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LegPain,
    LowerBackPain,
    ChestPain,
    ShoulderPain,
    Headache,
    PelvicPain,
    BowelUrinationPain,
    IntercoursePain,
    Bloating,
    Nausea,
    Diarrhea,
    Constipation,
    Fatigue,
    Inflammation,
    Mood,
    Stress,
    Inactivity,
    Overexertion,
    Coffee,
    Alcohol,
    Smoking,
    Diet,
    Sleep,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::LegPain,
        Metric::LowerBackPain,
        Metric::ChestPain,
        Metric::ShoulderPain,
        Metric::Headache,
        Metric::PelvicPain,
        Metric::BowelUrinationPain,
        Metric::IntercoursePain,
        Metric::Bloating,
        Metric::Nausea,
        Metric::Diarrhea,
        Metric::Constipation,
        Metric::Fatigue,
        Metric::Inflammation,
        Metric::Mood,
        Metric::Stress,
        Metric::Inactivity,
        Metric::Overexertion,
        Metric::Coffee,
        Metric::Alcohol,
        Metric::Smoking,
        Metric::Diet,
        Metric::Sleep,
    ];

    /// Position in the declared order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Storage column / JSON field name.
    pub fn key(self) -> &'static str {
        match self {
            Metric::LegPain => "leg_pain",
            Metric::LowerBackPain => "lower_back_pain",
            Metric::ChestPain => "chest_pain",
            Metric::ShoulderPain => "shoulder_pain",
            Metric::Headache => "headache",
            Metric::PelvicPain => "pelvic_pain",
            Metric::BowelUrinationPain => "bowel_urination_pain",
            Metric::IntercoursePain => "intercourse_pain",
            Metric::Bloating => "bloating",
            Metric::Nausea => "nausea",
            Metric::Diarrhea => "diarrhea",
            Metric::Constipation => "constipation",
            Metric::Fatigue => "fatigue",
            Metric::Inflammation => "inflammation",
            Metric::Mood => "mood",
            Metric::Stress => "stress",
            Metric::Inactivity => "inactivity",
            Metric::Overexertion => "overexertion",
            Metric::Coffee => "coffee",
            Metric::Alcohol => "alcohol",
            Metric::Smoking => "smoking",
            Metric::Diet => "diet",
            Metric::Sleep => "sleep",
        }
    }

    pub fn group(self) -> MetricGroup {
        match self.index() {
            0..=7 => MetricGroup::Pain,
            8..=14 => MetricGroup::Symptoms,
            _ => MetricGroup::Lifestyle,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == wanted)
            .ok_or_else(|| format!("unknown metric: {wanted}"))
    }
}

/// Chart grouping used by the history heatmap and bar charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetricGroup {
    Pain,
    Symptoms,
    Lifestyle,
}

impl MetricGroup {
    pub fn label(self) -> &'static str {
        match self {
            MetricGroup::Pain => "Pain",
            MetricGroup::Symptoms => "Symptoms",
            MetricGroup::Lifestyle => "Lifestyle",
        }
    }
}

/// Display metadata for a single metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSpec {
    pub metric: Metric,
    /// Full label, used for CSV headers and reports ("Lower Back Pain").
    pub label: String,
    /// Legend label inside a chart group ("Lower back").
    pub short_label: String,
    pub color: String,
}

/// Lookup tables for metric labels and colors.
#[derive(Debug, Clone, Serialize)]
pub struct MetricCatalog {
    specs: Vec<MetricSpec>,
    heat_colors: Vec<String>,
}

const SERIES_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

const HEAT_PALETTE: [&str; 11] = [
    "rgba(214, 208, 200, 0.12)",
    "#c7e3be",
    "#a1d29a",
    "#7bbf6e",
    "#f0dc6e",
    "#f0b84a",
    "#eb9a3e",
    "#e67c3a",
    "#dc5840",
    "#c43a31",
    "#a61c00",
];

impl MetricCatalog {
    /// The catalog the application ships with.
    pub fn standard() -> Self {
        let labels: [(&str, &str); METRIC_COUNT] = [
            ("Leg Pain", "Leg"),
            ("Lower Back Pain", "Lower back"),
            ("Chest Pain", "Chest"),
            ("Shoulder Pain", "Shoulder"),
            ("Headache", "Headache"),
            ("Pelvic Pain", "Pelvic"),
            ("Bowel/Urination Pain", "Bowel/urination"),
            ("Intercourse Pain", "Intercourse"),
            ("Bloating", "Bloating"),
            ("Nausea", "Nausea"),
            ("Diarrhea", "Diarrhea"),
            ("Constipation", "Constipation"),
            ("Fatigue", "Fatigue"),
            ("Inflammation", "Inflammation"),
            ("Mood", "Mood"),
            ("Stress", "Stress"),
            ("Inactivity", "Inactivity"),
            ("Overexertion", "Overexertion"),
            ("Coffee", "Coffee"),
            ("Alcohol", "Alcohol"),
            ("Smoking", "Smoking"),
            ("Diet", "Diet"),
            ("Sleep", "Sleep"),
        ];

        let mut position_in_group = 0;
        let mut previous_group = None;
        let specs = Metric::ALL
            .into_iter()
            .zip(labels)
            .map(|(metric, (label, short_label))| {
                if previous_group != Some(metric.group()) {
                    previous_group = Some(metric.group());
                    position_in_group = 0;
                }
                let color = SERIES_PALETTE[position_in_group % SERIES_PALETTE.len()];
                position_in_group += 1;
                MetricSpec {
                    metric,
                    label: label.to_string(),
                    short_label: short_label.to_string(),
                    color: color.to_string(),
                }
            })
            .collect();

        Self {
            specs,
            heat_colors: HEAT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn spec(&self, metric: Metric) -> &MetricSpec {
        &self.specs[metric.index()]
    }

    pub fn label(&self, metric: Metric) -> &str {
        &self.spec(metric).label
    }

    pub fn specs(&self) -> &[MetricSpec] {
        &self.specs
    }

    /// Metrics of one chart group, in declared order.
    pub fn group(&self, group: MetricGroup) -> impl Iterator<Item = &MetricSpec> {
        self.specs.iter().filter(move |s| s.metric.group() == group)
    }

    /// Ranked-series color (top symptom #1, #2, ...).
    pub fn rank_color(&self, rank: usize) -> &'static str {
        SERIES_PALETTE[rank % SERIES_PALETTE.len()]
    }

    pub fn heat_color(&self, value: f64) -> &str {
        &self.heat_colors[heat_level(value) as usize]
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Heatmap intensity step for a (possibly averaged) score: 0 for no symptom,
/// otherwise the score rounded up, capped at 10.
pub fn heat_level(value: f64) -> u8 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.ceil().min(10.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for metric in Metric::ALL {
            assert_eq!(metric.key().parse::<Metric>().unwrap(), metric);
        }
        assert!("toothache".parse::<Metric>().is_err());
    }

    #[test]
    fn groups_partition_the_metric_set() {
        let catalog = MetricCatalog::standard();
        let pain = catalog.group(MetricGroup::Pain).count();
        let symptoms = catalog.group(MetricGroup::Symptoms).count();
        let lifestyle = catalog.group(MetricGroup::Lifestyle).count();
        assert_eq!((pain, symptoms, lifestyle), (8, 7, 8));
        assert_eq!(pain + symptoms + lifestyle, METRIC_COUNT);
    }

    #[test]
    fn palette_restarts_per_group() {
        let catalog = MetricCatalog::standard();
        assert_eq!(catalog.spec(Metric::LegPain).color, "#4e79a7");
        assert_eq!(catalog.spec(Metric::Bloating).color, "#4e79a7");
        assert_eq!(catalog.spec(Metric::Sleep).color, "#ff9da7");
        assert_eq!(catalog.label(Metric::BowelUrinationPain), "Bowel/Urination Pain");
        assert_eq!(catalog.spec(Metric::LowerBackPain).short_label, "Lower back");
    }

    #[test]
    fn heat_level_steps() {
        assert_eq!(heat_level(0.0), 0);
        assert_eq!(heat_level(0.4), 1);
        assert_eq!(heat_level(1.0), 1);
        assert_eq!(heat_level(4.5), 5);
        assert_eq!(heat_level(10.0), 10);
        assert_eq!(heat_level(12.0), 10);
        assert_eq!(heat_level(f64::NAN), 0);

        let catalog = MetricCatalog::standard();
        assert_eq!(catalog.heat_color(10.0), "#a61c00");
    }
}
