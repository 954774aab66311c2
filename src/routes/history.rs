use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{today, AppState};
use crate::aggregate::aggregate;
use crate::error::AppError;
use crate::models::{Bucket, LogEntry};
use crate::window::{navigate, resolve_window, window_label, Direction, Granularity, Window};

#[derive(Deserialize)]
pub(crate) struct WindowQuery {
    pub user_id: Uuid,
    pub granularity: Option<Granularity>,
    pub reference: Option<NaiveDate>,
    /// Moves one window back or forward from `reference` before resolving.
    pub step: Option<Direction>,
}

impl WindowQuery {
    /// Week view of today unless the client says otherwise.
    pub fn resolve(&self) -> (Granularity, NaiveDate) {
        let granularity = self.granularity.unwrap_or(Granularity::Week);
        let reference = self.reference.unwrap_or_else(today);
        let reference = match self.step {
            Some(direction) => navigate(reference, granularity, direction),
            None => reference,
        };
        (granularity, reference)
    }
}

#[derive(Serialize)]
struct HistoryResponse {
    granularity: Granularity,
    reference: NaiveDate,
    label: String,
    window: Window,
    previous: NaiveDate,
    next: NaiveDate,
    buckets: Vec<Bucket>,
    entries: Vec<LogEntry>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/history", get(get_history))
        .with_state(state)
}

async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let (granularity, reference) = query.resolve();
    let window = resolve_window(reference, granularity);

    let entries: Vec<LogEntry> = state
        .store
        .list_since(query.user_id, window.start)
        .await?
        .into_iter()
        .filter(|e| window.contains(e.log_date))
        .collect();
    tracing::debug!(
        "📊 {} entries in {}..={} for {}",
        entries.len(),
        window.start,
        window.end,
        query.user_id
    );

    Ok(Json(HistoryResponse {
        granularity,
        reference,
        label: window_label(reference, granularity),
        window,
        previous: navigate(reference, granularity, Direction::Previous),
        next: navigate(reference, granularity, Direction::Next),
        buckets: aggregate(&entries, granularity, reference, &state.catalog),
        entries,
    }))
}
