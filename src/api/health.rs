//! Shared health state for the /health endpoint.
//! Updated by the upstream client and the request middleware.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared health metrics. Updated by service components, read by API.
#[derive(Default)]
pub struct HealthState {
    /// True when the last upstream call got an answer from the forecasting service.
    pub upstream_ok: AtomicBool,
    /// Nanosecond timestamp of the last successful upstream fetch (0 = none).
    pub last_upstream_ok_at_ns: AtomicU64,
    /// Requests handled since startup.
    pub requests_served: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_upstream_ok(&self, v: bool) {
        self.upstream_ok.store(v, Ordering::Relaxed);
    }

    pub fn set_last_upstream_ok_at_ns(&self, ns: u64) {
        self.last_upstream_ok_at_ns.store(ns, Ordering::Relaxed);
    }

    pub fn inc_requests_served(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn upstream_ok(&self) -> bool {
        self.upstream_ok.load(Ordering::Relaxed)
    }

    pub fn last_upstream_ok_at_ns(&self) -> u64 {
        self.last_upstream_ok_at_ns.load(Ordering::Relaxed)
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }
}
