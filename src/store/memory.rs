use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntryStore, StoreError, StoreResult};
use crate::models::{LogEntry, ValidatedEntry};

/// Process-local store, used by tests and for running without Postgres.
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    users: RwLock<HashMap<Uuid, BTreeMap<NaiveDate, LogEntry>>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_entry(id: Uuid, entry: ValidatedEntry) -> LogEntry {
    LogEntry {
        id,
        log_date: entry.log_date,
        scores: entry.scores,
        cycle_phase: entry.cycle_phase,
        notes: entry.notes,
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn list(&self, user_id: Uuid) -> StoreResult<Vec<LogEntry>> {
        let users = self.users.read().await;
        Ok(users
            .get(&user_id)
            .map(|rows| rows.values().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_since(&self, user_id: Uuid, cutoff: NaiveDate) -> StoreResult<Vec<LogEntry>> {
        let users = self.users.read().await;
        Ok(users
            .get(&user_id)
            .map(|rows| rows.range(cutoff..).rev().map(|(_, e)| e.clone()).collect())
            .unwrap_or_default())
    }

    async fn get(&self, user_id: Uuid, log_date: NaiveDate) -> StoreResult<Option<LogEntry>> {
        let users = self.users.read().await;
        Ok(users
            .get(&user_id)
            .and_then(|rows| rows.get(&log_date))
            .cloned())
    }

    async fn insert(&self, user_id: Uuid, entry: ValidatedEntry) -> StoreResult<LogEntry> {
        let mut users = self.users.write().await;
        let rows = users.entry(user_id).or_default();
        if rows.contains_key(&entry.log_date) {
            return Err(StoreError::DuplicateDate(entry.log_date));
        }
        let stored = to_entry(Uuid::new_v4(), entry);
        rows.insert(stored.log_date, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user_id: Uuid, entry: ValidatedEntry) -> StoreResult<LogEntry> {
        let mut users = self.users.write().await;
        let existing = users
            .get_mut(&user_id)
            .and_then(|rows| rows.get_mut(&entry.log_date))
            .ok_or(StoreError::NotFound(entry.log_date))?;
        *existing = to_entry(existing.id, entry);
        Ok(existing.clone())
    }

    async fn delete(&self, user_id: Uuid, log_date: NaiveDate) -> StoreResult<()> {
        let mut users = self.users.write().await;
        users
            .get_mut(&user_id)
            .and_then(|rows| rows.remove(&log_date))
            .map(|_| ())
            .ok_or(StoreError::NotFound(log_date))
    }

    async fn delete_all(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut users = self.users.write().await;
        Ok(users.remove(&user_id).map_or(0, |rows| rows.len() as u64))
    }
}
