use std::time::Duration;

use crate::error::{AppError, Result};

pub const UPSTREAM_URL: &str = "http://127.0.0.1:5000";

/// Trailing window: current point plus up to 6 preceding.
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 7;

/// Z-score above which a day's quantity counts as a spike.
pub const DEFAULT_SPIKE_Z_THRESHOLD: f64 = 2.0;

/// Days before a festival date that count as part of the festival period.
pub const FESTIVAL_LEAD_DAYS: i64 = 7;

/// Days after a festival date that count as part of the festival period.
pub const FESTIVAL_TRAIL_DAYS: i64 = 3;

/// Upper bound on memoized series insights held by the API.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Days-left thresholds for stock status.
pub mod stock_thresholds {
    /// Fewer days left than this is understock.
    pub const UNDERSTOCK_BELOW: i64 = 7;
    /// More days left than this is overstock.
    pub const OVERSTOCK_ABOVE: i64 = 60;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Base URL of the forecasting service (UPSTREAM_URL)
    pub upstream_url: String,
    /// Per-request timeout against the forecasting service (UPSTREAM_TIMEOUT_SECS)
    pub upstream_timeout: Duration,
    /// Trailing window for the moving average (MOVING_AVERAGE_WINDOW)
    pub moving_average_window: usize,
    /// Spike z-score threshold (SPIKE_Z_THRESHOLD)
    pub spike_z_threshold: f64,
    /// Memo cache capacity (CACHE_MAX_ENTRIES)
    pub cache_max_entries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let moving_average_window = match lookup("MOVING_AVERAGE_WINDOW") {
            Some(raw) => raw.trim().parse::<usize>().ok().filter(|w| *w > 0).ok_or_else(|| {
                AppError::Config("MOVING_AVERAGE_WINDOW must be a positive integer".to_string())
            })?,
            None => DEFAULT_MOVING_AVERAGE_WINDOW,
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            api_port: lookup("API_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            upstream_url: lookup("UPSTREAM_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| UPSTREAM_URL.to_string()),
            upstream_timeout: Duration::from_secs(
                lookup("UPSTREAM_TIMEOUT_SECS")
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            ),
            moving_average_window,
            spike_z_threshold: lookup("SPIKE_Z_THRESHOLD")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|t| t.is_finite())
                .unwrap_or(DEFAULT_SPIKE_Z_THRESHOLD),
            cache_max_entries: lookup("CACHE_MAX_ENTRIES")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.api_port, 3000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.upstream_url, UPSTREAM_URL);
        assert_eq!(cfg.moving_average_window, 7);
        assert_eq!(cfg.spike_z_threshold, 2.0);
        assert_eq!(cfg.cache_max_entries, 256);
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("API_PORT", "8080"),
            ("UPSTREAM_URL", "http://forecast.local:5000/"),
            ("MOVING_AVERAGE_WINDOW", "14"),
            ("SPIKE_Z_THRESHOLD", "3.5"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_port, 8080);
        assert_eq!(cfg.upstream_url, "http://forecast.local:5000");
        assert_eq!(cfg.moving_average_window, 14);
        assert_eq!(cfg.spike_z_threshold, 3.5);
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("MOVING_AVERAGE_WINDOW", "0")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("API_PORT", "seventy")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
