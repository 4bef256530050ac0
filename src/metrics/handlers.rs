use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use super::{aggregator::MetricsAggregator, store::StatusClass};

#[derive(Debug, Serialize)]
pub struct BucketView {
    pub path: String,
    pub status_class: StatusClass,
    pub count: u64,
    pub total_seconds: f64,
    pub max_seconds: f64,
    pub mean_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub buckets: Vec<BucketView>,
}

/// GET on the metrics path. Not itself recorded.
#[instrument(skip(metrics))]
pub async fn get_metrics(State(metrics): State<MetricsAggregator>) -> Json<MetricsSnapshot> {
    let buckets = metrics
        .snapshot()
        .into_iter()
        .map(|(key, rec)| BucketView {
            path: key.path,
            status_class: key.status_class,
            count: rec.count,
            total_seconds: rec.total_seconds,
            max_seconds: rec.max_seconds,
            mean_seconds: rec.mean_seconds(),
        })
        .collect();
    Json(MetricsSnapshot { buckets })
}
