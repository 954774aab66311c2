use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::history::WindowQuery;
use super::AppState;
use crate::error::AppError;
use crate::export::{build_report, parse_csv, to_csv, Report, CSV_FILE_NAME};
use crate::models::ValidatedEntry;
use crate::store::StoreError;
use crate::window::resolve_window;

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

#[derive(Debug, Default, Serialize)]
struct ImportSummary {
    imported: usize,
    skipped: usize,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/export/csv", get(export_csv))
        .route("/export/report", get(export_report))
        .route("/import/csv", post(import_csv))
        .with_state(state)
}

async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.store.list(query.user_id).await?;
    let body = to_csv(&entries, &state.catalog);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}

async fn fetch_report(state: &AppState, query: &WindowQuery) -> Result<Report, AppError> {
    let (granularity, reference) = query.resolve();
    let window = resolve_window(reference, granularity);
    let entries = state.store.list_since(query.user_id, window.start).await?;
    Ok(build_report(&entries, granularity, reference, &state.catalog))
}

async fn export_report(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = fetch_report(&state, &query).await?;
    tracing::debug!("🖨️ Report for {} has {} page(s)", query.user_id, report.pages.len());
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report.render(),
    ))
}

async fn import_csv(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    body: Bytes,
) -> Result<Json<ImportSummary>, AppError> {
    let text = std::str::from_utf8(&body)
        .map_err(|e| AppError::Validation(format!("CSV upload is not valid UTF-8: {e}")))?;
    let rows = parse_csv(text, &state.catalog)?;

    let mut summary = ImportSummary::default();
    for row in rows {
        let entry = ValidatedEntry {
            log_date: row.log_date,
            scores: row.scores,
            cycle_phase: row.cycle_phase,
            notes: row.notes,
        };
        match state.store.insert(query.user_id, entry).await {
            Ok(_) => summary.imported += 1,
            Err(StoreError::DuplicateDate(date)) => {
                tracing::debug!("Skipping {} for {}: already logged", date, query.user_id);
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!(
        "📥 Imported {} entries for {} ({} skipped)",
        summary.imported,
        query.user_id,
        summary.skipped
    );
    Ok(Json(summary))
}
