use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::error::AppError;
use crate::models::{DeleteEntryRequest, LogEntry, NewEntry};

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

#[derive(Deserialize)]
struct EntryQuery {
    user_id: Uuid,
    log_date: NaiveDate,
}

#[derive(Serialize)]
struct Deleted {
    deleted: u64,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/entry",
            get(get_entry)
                .post(create_entry)
                .put(update_entry)
                .delete(delete_entry),
        )
        .route("/entries", get(list_entries).delete(delete_all_entries))
        .with_state(state)
}

async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewEntry>,
) -> Result<(StatusCode, Json<LogEntry>), AppError> {
    let user_id = payload.user_id;
    let entry = payload.validate().map_err(AppError::Validation)?;
    let created = state.store.insert(user_id, entry).await?;
    tracing::info!("📝 Logged {} for {}", created.log_date, user_id);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewEntry>,
) -> Result<Json<LogEntry>, AppError> {
    let user_id = payload.user_id;
    let entry = payload.validate().map_err(AppError::Validation)?;
    let updated = state.store.update(user_id, entry).await?;
    Ok(Json(updated))
}

async fn delete_entry(
    State(state): State<AppState>,
    Json(payload): Json<DeleteEntryRequest>,
) -> Result<StatusCode, AppError> {
    state.store.delete(payload.user_id, payload.log_date).await?;
    tracing::info!("🗑️ Deleted {} for {}", payload.log_date, payload.user_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn get_entry(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<LogEntry>, AppError> {
    state
        .store
        .get(query.user_id, query.log_date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no entry for {}", query.log_date)))
}

async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<LogEntry>>, AppError> {
    let entries = state.store.list(query.user_id).await?;
    if entries.is_empty() {
        tracing::debug!("No entries yet for {}", query.user_id);
    }
    Ok(Json(entries))
}

async fn delete_all_entries(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Deleted>, AppError> {
    let deleted = state.store.delete_all(query.user_id).await?;
    tracing::info!("🧹 Removed {} entries for {}", deleted, query.user_id);
    Ok(Json(Deleted { deleted }))
}
