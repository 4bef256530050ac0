use std::fmt;

use dashmap::DashMap;
use serde::{Serialize, Serializer};

/// Hundreds digit of an HTTP status code (1xx..5xx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusClass(u8);

impl StatusClass {
    /// Codes outside `100..=599` are clamped into that range first.
    pub fn of(status: u16) -> Self {
        Self((status.clamp(100, 599) / 100) as u8)
    }

    #[cfg(test)]
    pub fn digit(self) -> u8 {
        self.0
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}xx", self.0)
    }
}

impl Serialize for StatusClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricsKey {
    pub path: String,
    pub status_class: StatusClass,
}

/// Running aggregate for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsRecord {
    pub count: u64,
    pub total_seconds: f64,
    pub max_seconds: f64,
}

impl MetricsRecord {
    fn observe(&mut self, seconds: f64) {
        self.count += 1;
        self.total_seconds += seconds;
        if seconds > self.max_seconds {
            self.max_seconds = seconds;
        }
    }

    pub fn mean_seconds(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_seconds / self.count as f64
        }
    }
}

/// Backing storage for request aggregates.
///
/// `observe` must apply the whole update for a key atomically: concurrent
/// observations of one key never lose a count.
pub trait MetricsStore: Send + Sync {
    fn observe(&self, key: MetricsKey, seconds: f64);
    fn snapshot(&self) -> Vec<(MetricsKey, MetricsRecord)>;
}

/// Process-lifetime store; buckets are created lazily and never removed.
#[derive(Debug, Default)]
pub struct InMemoryMetricsStore {
    buckets: DashMap<MetricsKey, MetricsRecord>,
}

impl InMemoryMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricsStore for InMemoryMetricsStore {
    fn observe(&self, key: MetricsKey, seconds: f64) {
        // the entry guard holds the shard lock for the whole update
        self.buckets.entry(key).or_default().observe(seconds);
    }

    fn snapshot(&self) -> Vec<(MetricsKey, MetricsRecord)> {
        self.buckets
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}
