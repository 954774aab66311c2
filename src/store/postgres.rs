use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres, Row};
use uuid::Uuid;

use super::{EntryStore, StoreError, StoreResult};
use crate::cycle_phase::CyclePhases;
use crate::metrics::Metric;
use crate::models::{LogEntry, Scores, ValidatedEntry};

const UNIQUE_VIOLATION: &str = "23505";

/// `symptom_logs` table in Postgres.
#[derive(Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

struct EntryRecord {
    id: Uuid,
    log_date: NaiveDate,
    scores: Scores,
    cycle_phase: Option<String>,
    notes: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for EntryRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let mut scores = Scores::default();
        for metric in Metric::ALL {
            let raw: Option<i16> = row.try_get(metric.key())?;
            scores.set(metric, raw.map(i64::from).unwrap_or(0));
        }
        Ok(Self {
            id: row.try_get("id")?,
            log_date: row.try_get("log_date")?,
            scores,
            cycle_phase: row.try_get("cycle_phase")?,
            notes: row.try_get("notes")?,
        })
    }
}

impl EntryRecord {
    fn to_domain(self) -> LogEntry {
        LogEntry {
            id: self.id,
            log_date: self.log_date,
            scores: self.scores,
            cycle_phase: self
                .cycle_phase
                .map(|raw| CyclePhases::parse(&raw))
                .filter(|p| !p.is_empty()),
            notes: self.notes,
        }
    }
}

fn metric_columns() -> String {
    Metric::ALL.map(Metric::key).join(", ")
}

fn returning_columns() -> String {
    format!("id, log_date, {}, cycle_phase, notes", metric_columns())
}

fn list_sql() -> String {
    format!(
        "SELECT {} FROM symptom_logs WHERE user_id = $1 ORDER BY log_date DESC",
        returning_columns()
    )
}

fn list_since_sql() -> String {
    format!(
        "SELECT {} FROM symptom_logs WHERE user_id = $1 AND log_date >= $2 ORDER BY log_date DESC",
        returning_columns()
    )
}

fn get_sql() -> String {
    format!(
        "SELECT {} FROM symptom_logs WHERE user_id = $1 AND log_date = $2",
        returning_columns()
    )
}

// $1 user_id, $2 log_date, $3.. one per metric, then cycle_phase and notes.
fn insert_sql() -> String {
    let placeholders: Vec<String> = (3..3 + Metric::ALL.len() + 2)
        .map(|i| format!("${i}"))
        .collect();
    format!(
        "INSERT INTO symptom_logs (user_id, log_date, {}, cycle_phase, notes) \
         VALUES ($1, $2, {}) RETURNING {}",
        metric_columns(),
        placeholders.join(", "),
        returning_columns()
    )
}

fn update_sql() -> String {
    let mut assignments: Vec<String> = Metric::ALL
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{} = ${}", m.key(), i + 3))
        .collect();
    let next = Metric::ALL.len() + 3;
    assignments.push(format!("cycle_phase = ${next}"));
    assignments.push(format!("notes = ${}", next + 1));
    format!(
        "UPDATE symptom_logs SET {} WHERE user_id = $1 AND log_date = $2 RETURNING {}",
        assignments.join(", "),
        returning_columns()
    )
}

fn bind_entry<'q>(
    query: QueryAs<'q, Postgres, EntryRecord, PgArguments>,
    user_id: Uuid,
    entry: &ValidatedEntry,
) -> QueryAs<'q, Postgres, EntryRecord, PgArguments> {
    let mut query = query.bind(user_id).bind(entry.log_date);
    for metric in Metric::ALL {
        query = query.bind(i16::from(entry.scores.get(metric)));
    }
    query
        .bind(entry.cycle_phase.as_ref().and_then(CyclePhases::encode))
        .bind(entry.notes.clone())
}

fn map_write_error(err: sqlx::Error, log_date: NaiveDate) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        let code = db_err.code();
        if code.as_deref() == Some(UNIQUE_VIOLATION) {
            if let Some(constraint) = db_err.constraint() {
                tracing::info!("🔒 Constraint violated: {}", constraint);
            }
            return StoreError::DuplicateDate(log_date);
        }
        tracing::error!("❌ DB write failed: {} (SQLSTATE {:?})", db_err.message(), code);
    } else {
        tracing::error!("❌ Unknown DB error: {}", err);
    }
    StoreError::Database(err)
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn list(&self, user_id: Uuid) -> StoreResult<Vec<LogEntry>> {
        let sql = list_sql();
        let rows = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("❌ Failed to fetch symptom logs: {}", e);
                StoreError::Database(e)
            })?;
        Ok(rows.into_iter().map(EntryRecord::to_domain).collect())
    }

    async fn list_since(&self, user_id: Uuid, cutoff: NaiveDate) -> StoreResult<Vec<LogEntry>> {
        let sql = list_since_sql();
        let rows = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(user_id)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("❌ Failed to fetch symptom logs since {}: {}", cutoff, e);
                StoreError::Database(e)
            })?;
        Ok(rows.into_iter().map(EntryRecord::to_domain).collect())
    }

    async fn get(&self, user_id: Uuid, log_date: NaiveDate) -> StoreResult<Option<LogEntry>> {
        let sql = get_sql();
        let row = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(user_id)
            .bind(log_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(EntryRecord::to_domain))
    }

    async fn insert(&self, user_id: Uuid, entry: ValidatedEntry) -> StoreResult<LogEntry> {
        let sql = insert_sql();
        let record = bind_entry(sqlx::query_as::<_, EntryRecord>(&sql), user_id, &entry)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, entry.log_date))?;
        Ok(record.to_domain())
    }

    async fn update(&self, user_id: Uuid, entry: ValidatedEntry) -> StoreResult<LogEntry> {
        let sql = update_sql();
        let record = bind_entry(sqlx::query_as::<_, EntryRecord>(&sql), user_id, &entry)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, entry.log_date))?
            .ok_or(StoreError::NotFound(entry.log_date))?;
        Ok(record.to_domain())
    }

    async fn delete(&self, user_id: Uuid, log_date: NaiveDate) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM symptom_logs WHERE user_id = $1 AND log_date = $2")
            .bind(user_id)
            .bind(log_date)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(log_date));
        }
        Ok(())
    }

    async fn delete_all(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM symptom_logs WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_binds_one_placeholder_per_column() {
        let sql = insert_sql();
        assert!(sql.contains("leg_pain, lower_back_pain"));
        assert!(sql.contains("$27) RETURNING id, log_date, leg_pain"));
        assert!(!sql.contains("$28"));
    }

    #[test]
    fn update_targets_user_and_date() {
        let sql = update_sql();
        assert!(sql.starts_with("UPDATE symptom_logs SET leg_pain = $3, "));
        assert!(sql.contains("sleep = $25, cycle_phase = $26, notes = $27 WHERE user_id = $1 AND log_date = $2"));
    }
}
