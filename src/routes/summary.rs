use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{today, AppState};
use crate::error::AppError;
use crate::summary::{
    compute_summary, health_overview, recent_chart, weekly_strip, HealthOverview, RecentChart,
    StripDay, Summary,
};

#[derive(Deserialize)]
struct SummaryQuery {
    user_id: Uuid,
    today: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

#[derive(Serialize)]
struct SummaryResponse {
    #[serde(flatten)]
    summary: Summary,
    recent: RecentChart,
    week: Vec<StripDay>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/overview", get(get_overview))
        .with_state(state)
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let today = query.today.unwrap_or_else(today);
    // The streak can reach back past the rolling windows, so load everything.
    let entries = state.store.list(query.user_id).await?;

    Ok(Json(SummaryResponse {
        summary: compute_summary(&entries, today, &state.catalog),
        recent: recent_chart(&entries, today, &state.catalog),
        week: weekly_strip(&entries, today),
    }))
}

async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<HealthOverview>, AppError> {
    let entries = state.store.list(query.user_id).await?;
    Ok(Json(health_overview(&entries, &state.catalog)))
}
