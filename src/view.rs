//! In-memory state behind the history screen.
//!
//! Every change of reference date or granularity starts a new fetch. Fetches
//! can resolve out of order, so each one carries a [`Ticket`] and only the
//! result of the most recent ticket is applied.
//!
//! The HTTP layer is stateless and never builds a [`HistoryView`]; it is the
//! screen model for clients that link this crate directly, driving it with
//! the same windowing and aggregation the `/history` route uses.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::metrics::{Metric, MetricCatalog};
use crate::models::{Bucket, LogEntry};
use crate::window::{navigate, window_label, Direction, Granularity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic request counter; the newest ticket wins.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}

#[derive(Debug)]
pub struct HistoryView {
    pub granularity: Granularity,
    pub reference: NaiveDate,
    entries: Vec<LogEntry>,
    loading: bool,
    error: Option<String>,
    hidden_series: BTreeSet<Metric>,
    expanded: Option<Uuid>,
    generation: RequestGeneration,
}

impl HistoryView {
    /// Starts on the week view, like the screen does.
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            granularity: Granularity::Week,
            reference,
            entries: Vec::new(),
            loading: false,
            error: None,
            hidden_series: BTreeSet::new(),
            expanded: None,
            generation: RequestGeneration::default(),
        }
    }

    /// Marks a fetch as in flight and returns its ticket.
    pub fn begin_fetch(&mut self) -> Ticket {
        self.loading = true;
        self.generation.begin()
    }

    pub fn set_granularity(&mut self, granularity: Granularity) -> Ticket {
        self.granularity = granularity;
        self.begin_fetch()
    }

    pub fn step(&mut self, direction: Direction) -> Ticket {
        self.reference = navigate(self.reference, self.granularity, direction);
        self.begin_fetch()
    }

    /// Applies a fetch result unless a newer fetch has started since.
    /// Returns whether the result was applied.
    pub fn apply_fetch(&mut self, ticket: Ticket, result: Result<Vec<LogEntry>, String>) -> bool {
        if !self.generation.is_current(ticket) {
            tracing::debug!(?ticket, "dropping stale history fetch");
            return false;
        }
        self.loading = false;
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(message) => self.error = Some(message),
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn title(&self) -> String {
        window_label(self.reference, self.granularity)
    }

    pub fn buckets(&self, catalog: &MetricCatalog) -> Vec<Bucket> {
        aggregate(&self.entries, self.granularity, self.reference, catalog)
    }

    /// Shows or hides a chart series across all charts.
    pub fn toggle_series(&mut self, metric: Metric) {
        if !self.hidden_series.remove(&metric) {
            self.hidden_series.insert(metric);
        }
    }

    pub fn is_hidden(&self, metric: Metric) -> bool {
        self.hidden_series.contains(&metric)
    }

    /// Opens an entry's detail row, closing it when it is already open.
    pub fn toggle_expanded(&mut self, id: Uuid) {
        self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
    }

    pub fn expanded(&self) -> Option<Uuid> {
        self.expanded
    }

    /// Local removal after a confirmed delete.
    pub fn remove_entry(&mut self, id: Uuid) {
        self.entries.retain(|e| e.id != id);
        if self.expanded == Some(id) {
            self.expanded = None;
        }
    }
}
