use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use endolog_backend::config::Config;
use endolog_backend::metrics::MetricCatalog;
use endolog_backend::routes::{self, AppState};
use endolog_backend::store::PgEntryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    let store = PgEntryStore::new(pool);
    store.run_migrations().await?;
    tracing::info!("🗄️ Migrations applied");

    let state = AppState::new(Arc::new(store), MetricCatalog::standard());
    let app = routes::router(state);

    tracing::info!("🧠 Server running at {}", config.bind_address);
    axum::serve(
        tokio::net::TcpListener::bind(config.bind_address).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
