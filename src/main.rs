use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod metrics;
mod profiles;
mod state;
#[cfg(test)]
mod test_support;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "momskidz=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    let db = db::connect(&config.database_url).await?;
    db::migrate(&db).await;

    let app_state = AppState::init(config, db)?;
    tracing::info!(metrics_path = %app_state.metrics.excluded_path(), "metrics enabled");

    app::serve(app::build_app(app_state)).await
}
