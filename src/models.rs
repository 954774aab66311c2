use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

use crate::cycle_phase::CyclePhases;
use crate::metrics::{Metric, METRIC_COUNT};

pub const MAX_SCORE: u8 = 10;

/// Coerces an incoming reading to a valid score; anything that is not an
/// integer in `0..=10` becomes 0.
pub fn coerce_score(raw: i64) -> u8 {
    if (0..=i64::from(MAX_SCORE)).contains(&raw) {
        raw as u8
    } else {
        0
    }
}

fn coerce_json(value: &serde_json::Value) -> u8 {
    match value {
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => coerce_score(i),
            (None, Some(f)) if f.fract() == 0.0 => coerce_score(f as i64),
            _ => 0,
        },
        serde_json::Value::String(s) => s.trim().parse::<i64>().map(coerce_score).unwrap_or(0),
        _ => 0,
    }
}

/// One score per metric, always in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scores([u8; METRIC_COUNT]);

impl Scores {
    pub fn get(&self, metric: Metric) -> u8 {
        self.0[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, raw: i64) {
        self.0[metric.index()] = coerce_score(raw);
    }

    pub fn with(mut self, metric: Metric, raw: i64) -> Self {
        self.set(metric, raw);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, u8)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

impl Serialize for Scores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(METRIC_COUNT))?;
        for (metric, value) in self.iter() {
            map.serialize_entry(metric.key(), &value)?;
        }
        map.end()
    }
}

struct ScoresVisitor;

impl<'de> Visitor<'de> for ScoresVisitor {
    type Value = Scores;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of metric name to score")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Scores, A::Error> {
        let mut scores = Scores::default();
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            if let Ok(metric) = key.parse::<Metric>() {
                scores.0[metric.index()] = coerce_json(&value);
            }
        }
        Ok(scores)
    }
}

impl<'de> Deserialize<'de> for Scores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// One daily log as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub log_date: NaiveDate,
    #[serde(flatten)]
    pub scores: Scores,
    #[serde(default)]
    pub cycle_phase: Option<CyclePhases>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LogEntry {
    pub fn new(log_date: NaiveDate, scores: Scores) -> Self {
        Self {
            id: Uuid::new_v4(),
            log_date,
            scores,
            cycle_phase: None,
            notes: None,
        }
    }
}

/// Body of a create/update request. Unlike stored rows, scores here are
/// checked rather than coerced, since this is the input boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    #[serde(default)]
    pub scores: BTreeMap<Metric, i64>,
    #[serde(default)]
    pub cycle_phase: Option<CyclePhases>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub log_date: NaiveDate,
    pub scores: Scores,
    pub cycle_phase: Option<CyclePhases>,
    pub notes: Option<String>,
}

impl NewEntry {
    pub fn validate(self) -> Result<ValidatedEntry, String> {
        let mut scores = Scores::default();
        for (metric, value) in &self.scores {
            if !(0..=i64::from(MAX_SCORE)).contains(value) {
                return Err(format!("{metric} must be between 0 and {MAX_SCORE}, got {value}"));
            }
            scores.set(*metric, *value);
        }
        Ok(ValidatedEntry {
            log_date: self.log_date,
            scores,
            cycle_phase: self.cycle_phase.filter(|p| !p.is_empty()),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteEntryRequest {
    pub user_id: Uuid,
    pub log_date: NaiveDate,
}

/// One chart point: a label plus a value per metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    #[serde(flatten)]
    pub values: BTreeMap<Metric, f64>,
}

impl Bucket {
    pub fn value(&self, metric: Metric) -> f64 {
        self.values.get(&metric).copied().unwrap_or(0.0)
    }
}
