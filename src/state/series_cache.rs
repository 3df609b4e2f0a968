use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::analytics::{analyze_series, InsightsConfig};
use crate::error::AnalyticsError;
use crate::types::{ObservationPoint, SeriesInsights};

/// Content hash of a series plus the settings it is analysed with.
/// Two calls with equal points and settings get the same key.
pub fn series_key(points: &[ObservationPoint], cfg: &InsightsConfig) -> u64 {
    let mut h = DefaultHasher::new();
    points.len().hash(&mut h);
    for p in points {
        p.date.hash(&mut h);
        p.quantity.to_bits().hash(&mut h);
        p.flag.hash(&mut h);
    }
    cfg.window.hash(&mut h);
    cfg.spike_threshold.to_bits().hash(&mut h);
    h.finish()
}

// ---------------------------------------------------------------------------
// SeriesCache
// ---------------------------------------------------------------------------

/// Memo of computed insights, owned by the caller of the analytics.
/// The analytics themselves never consult it.
pub struct SeriesCache {
    /// series_key → computed insights
    entries: DashMap<u64, Arc<SeriesInsights>>,
    max_entries: usize,
}

impl SeriesCache {
    pub fn new(max_entries: usize) -> Arc<Self> {
        Arc::new(Self {
            entries: DashMap::new(),
            max_entries,
        })
    }

    /// Cached insights for this exact series, computing and storing them on a miss.
    /// A capacity of zero disables storage.
    pub fn get_or_compute(
        &self,
        points: &[ObservationPoint],
        cfg: &InsightsConfig,
    ) -> Result<Arc<SeriesInsights>, AnalyticsError> {
        let key = series_key(points, cfg);
        if let Some(hit) = self.entries.get(&key) {
            debug!(key, "series cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let insights = Arc::new(analyze_series(points, cfg)?);
        debug!(key, points = points.len(), "series cache miss");

        if self.max_entries == 0 {
            return Ok(insights);
        }
        if self.entries.len() >= self.max_entries {
            self.evict_one();
        }
        self.entries.insert(key, Arc::clone(&insights));
        Ok(insights)
    }

    fn evict_one(&self) {
        // take the key first; removing while the iterator holds a shard lock deadlocks
        let victim = self.entries.iter().next().map(|e| *e.key());
        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
