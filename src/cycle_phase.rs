//! Cycle-phase tags attached to a daily log.
//!
//! Stored as a comma-joined list of tag keys, with an optional free-text
//! `other:` token last (`"menstrual,luteal,other:spotting"`). Older rows hold
//! a single tag (`"luteal"` or `"other:text"`); [`CyclePhases::parse`] reads
//! both encodings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const OTHER_PREFIX: &str = "other:";
const OTHER_LABEL: &str = "Other: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTag {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
    OnPill,
}

impl PhaseTag {
    pub const ALL: [PhaseTag; 5] = [
        PhaseTag::Menstrual,
        PhaseTag::Follicular,
        PhaseTag::Ovulation,
        PhaseTag::Luteal,
        PhaseTag::OnPill,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PhaseTag::Menstrual => "menstrual",
            PhaseTag::Follicular => "follicular",
            PhaseTag::Ovulation => "ovulation",
            PhaseTag::Luteal => "luteal",
            PhaseTag::OnPill => "on_pill",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhaseTag::Menstrual => "Menstrual phase",
            PhaseTag::Follicular => "Follicular phase",
            PhaseTag::Ovulation => "Ovulation",
            PhaseTag::Luteal => "Luteal phase",
            PhaseTag::OnPill => "On the pill",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        PhaseTag::ALL.into_iter().find(|t| t.key() == key)
    }

    fn from_label(label: &str) -> Option<Self> {
        PhaseTag::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// The set of phase tags selected for one day plus an optional free-text
/// "other" description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CyclePhases {
    pub tags: BTreeSet<PhaseTag>,
    pub other: Option<String>,
}

impl CyclePhases {
    pub fn single(tag: PhaseTag) -> Self {
        Self {
            tags: BTreeSet::from([tag]),
            other: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.other.is_none()
    }

    /// Parses the stored encoding, accepting both the legacy single-tag
    /// form and the comma-joined multi-tag form.
    ///
    /// Everything after an `other:` prefix is free text, commas included.
    /// Bare tokens that are not known tag keys are kept as free text too.
    pub fn parse(raw: &str) -> Self {
        let mut phases = CyclePhases::default();
        let mut unknown: Vec<&str> = Vec::new();
        let mut rest = raw.trim();

        while !rest.is_empty() {
            if let Some(text) = rest.strip_prefix(OTHER_PREFIX) {
                unknown.push(text.trim());
                break;
            }
            let (token, tail) = match rest.split_once(',') {
                Some((token, tail)) => (token.trim(), tail.trim_start()),
                None => (rest.trim(), ""),
            };
            match PhaseTag::from_key(token) {
                Some(tag) => {
                    phases.tags.insert(tag);
                }
                None if !token.is_empty() => unknown.push(token),
                None => {}
            }
            rest = tail;
        }

        let other = unknown.join(", ");
        if !other.is_empty() {
            phases.other = Some(other);
        }
        phases
    }

    /// Reads back the label rendering produced by [`CyclePhases::label`].
    pub fn from_labels(rendered: &str) -> Self {
        let mut phases = CyclePhases::default();
        let mut pieces = rendered.split(", ").peekable();

        while let Some(tag) = pieces.peek().and_then(|p| PhaseTag::from_label(p.trim())) {
            phases.tags.insert(tag);
            pieces.next();
        }

        let rest = pieces.collect::<Vec<_>>().join(", ");
        let rest = rest.trim();
        let other = rest.strip_prefix(OTHER_LABEL).unwrap_or(rest);
        if !other.is_empty() {
            phases.other = Some(other.to_string());
        }
        phases
    }

    /// Storage encoding; `None` when nothing is selected.
    pub fn encode(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut parts: Vec<String> = self.tags.iter().map(|t| t.key().to_string()).collect();
        if let Some(other) = &self.other {
            parts.push(format!("{OTHER_PREFIX}{other}"));
        }
        Some(parts.join(","))
    }

    /// Human-readable rendering used in exports
    /// ("Menstrual phase, Other: spotting"). Free text is prefixed so it
    /// reads back as text even when it matches a tag label.
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = self.tags.iter().map(|t| t.label().to_string()).collect();
        if let Some(other) = &self.other {
            parts.push(format!("{OTHER_LABEL}{other}"));
        }
        parts.join(", ")
    }
}

impl fmt::Display for CyclePhases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for CyclePhases {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for CyclePhases {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CyclePhases::parse(&raw))
    }
}
