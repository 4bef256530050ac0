pub mod aggregator;
pub mod handlers;
pub mod middleware;
pub mod store;

use axum::{routing::get, Router};

use crate::state::AppState;

pub use aggregator::MetricsAggregator;
pub use middleware::track_metrics;

pub fn router(metrics_path: &str) -> Router<AppState> {
    Router::new().route(metrics_path, get(handlers::get_metrics))
}
