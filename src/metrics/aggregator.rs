use std::sync::Arc;

use tracing::trace;

use super::store::{InMemoryMetricsStore, MetricsKey, MetricsRecord, MetricsStore, StatusClass};

/// Per-route request counters and latency totals.
///
/// Cloning is cheap and every clone feeds the same store.
#[derive(Clone)]
pub struct MetricsAggregator {
    store: Arc<dyn MetricsStore>,
    excluded_path: Arc<str>,
}

impl MetricsAggregator {
    /// `excluded_path` is the metrics read endpoint; observations for it are dropped.
    pub fn new(store: Arc<dyn MetricsStore>, excluded_path: &str) -> Self {
        Self {
            store,
            excluded_path: Arc::from(excluded_path),
        }
    }

    pub fn in_memory(excluded_path: &str) -> Self {
        Self::new(Arc::new(InMemoryMetricsStore::new()), excluded_path)
    }

    pub fn excluded_path(&self) -> &str {
        &self.excluded_path
    }

    /// Adds one observation to the `(path, status class)` bucket. Never fails.
    pub fn record(&self, path: &str, status_code: u16, duration_seconds: f64) {
        if path == &*self.excluded_path {
            trace!(path, "skipping metrics endpoint observation");
            return;
        }
        let seconds = if duration_seconds.is_finite() && duration_seconds > 0.0 {
            duration_seconds
        } else {
            0.0
        };
        let key = MetricsKey {
            path: path.to_string(),
            status_class: StatusClass::of(status_code),
        };
        self.store.observe(key, seconds);
    }

    /// All buckets, ordered by path then status class.
    pub fn snapshot(&self) -> Vec<(MetricsKey, MetricsRecord)> {
        let mut buckets = self.store.snapshot();
        buckets.sort_by(|(a, _), (b, _)| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.status_class.cmp(&b.status_class))
        });
        buckets
    }

    #[cfg(test)]
    pub fn get(&self, path: &str, status_code: u16) -> Option<MetricsRecord> {
        let class = StatusClass::of(status_code);
        self.store
            .snapshot()
            .into_iter()
            .find(|(k, _)| k.path == path && k.status_class == class)
            .map(|(_, rec)| rec)
    }
}
