use axum::{extract::State, routing::get, Json, Router};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::metrics::MetricCatalog;
use crate::store::EntryStore;

pub mod entries;
pub mod export;
pub mod history;
pub mod summary;

/// Shared by every handler: the entry store and the metric catalog.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub catalog: Arc<MetricCatalog>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>, catalog: MetricCatalog) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().naive_utc().date()
}

async fn metric_catalog(State(state): State<AppState>) -> Json<MetricCatalog> {
    Json(state.catalog.as_ref().clone())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(entries::routes(state.clone()))
        .merge(history::routes(state.clone()))
        .merge(summary::routes(state.clone()))
        .merge(export::routes(state.clone()))
        .route("/metrics", get(metric_catalog).with_state(state))
        .route("/health", get(|| async { "✅ Backend up" }))
}
