//! Request latency per matched route, plus an all-routes total.
//! Recorded by the request middleware around every handler.

use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

/// Highest trackable latency: 100s, in microseconds.
const MAX_TRACKABLE_US: u64 = 100_000_000;

/// Route label for requests no route matched.
pub const UNMATCHED_ROUTE: &str = "unmatched";

fn new_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(1, MAX_TRACKABLE_US, 3).expect("valid histogram bounds")
}

/// p50/p95/p99 in milliseconds over `sample_count` requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub sample_count: u64,
}

impl LatencySummary {
    fn of(h: &Histogram<u64>) -> Option<Self> {
        if h.len() == 0 {
            return None;
        }
        let ms = |q: f64| h.value_at_quantile(q) as f64 / 1000.0;
        Some(Self {
            p50_ms: ms(0.5),
            p95_ms: ms(0.95),
            p99_ms: ms(0.99),
            sample_count: h.len(),
        })
    }
}

/// Shared latency stats. Middleware records, API reads.
pub struct LatencyStats {
    total: Mutex<Histogram<u64>>,
    /// matched route template (`/products/:id/insights`) → histogram
    by_route: DashMap<String, Histogram<u64>>,
}

impl LatencyStats {
    pub fn new() -> Self {
        Self {
            total: Mutex::new(new_histogram()),
            by_route: DashMap::new(),
        }
    }

    /// Sub-microsecond requests count as 1us; anything past 100s is clamped.
    pub fn record(&self, route: &str, elapsed: Duration) {
        let us = u64::try_from(elapsed.as_micros())
            .unwrap_or(u64::MAX)
            .clamp(1, MAX_TRACKABLE_US);

        if let Ok(mut h) = self.total.lock() {
            let _ = h.record(us);
        }
        let _ = self
            .by_route
            .entry(route.to_string())
            .or_insert_with(new_histogram)
            .record(us);
    }

    /// All routes together. None if no samples.
    pub fn total(&self) -> Option<LatencySummary> {
        self.total.lock().ok().and_then(|h| LatencySummary::of(&h))
    }

    /// One summary per route seen so far, ordered by route.
    pub fn by_route(&self) -> Vec<(String, LatencySummary)> {
        let mut routes: Vec<(String, LatencySummary)> = self
            .by_route
            .iter()
            .filter_map(|e| LatencySummary::of(e.value()).map(|s| (e.key().clone(), s)))
            .collect();
        routes.sort_by(|a, b| a.0.cmp(&b.0));
        routes
    }

    pub fn len(&self) -> u64 {
        self.total.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}
