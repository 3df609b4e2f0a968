use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::api::health::HealthState;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{ProductDashboard, ProductId};

/// Client for the forecasting service that owns the prediction model.
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    /// `base_url` parsed once; request paths are appended segment by segment.
    base: Url,
    health: Arc<HealthState>,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, health: Arc<HealthState>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("invalid upstream URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!("upstream URL {base_url:?} cannot carry a path")));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            base,
            health,
        })
    }

    pub fn from_config(cfg: &Config, health: Arc<HealthState>) -> Result<Self> {
        Self::new(cfg.upstream_url.clone(), cfg.upstream_timeout, health)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/product-dashboard/{id}` with the id percent-encoded as a
    /// single path segment.
    pub fn dashboard_url(&self, product_id: &ProductId) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("product-dashboard")
                .push(&product_id.to_string());
        }
        url
    }

    /// Fetch one product's forecast summary and daily sales history.
    pub async fn fetch_product_dashboard(&self, product_id: &ProductId) -> Result<ProductDashboard> {
        let url = self.dashboard_url(product_id);
        debug!(%product_id, %url, "fetching product dashboard");

        let result = self.get_dashboard(url, product_id).await;
        match &result {
            Ok(dashboard) => {
                self.health.set_upstream_ok(true);
                self.health.set_last_upstream_ok_at_ns(now_ns());
                info!(
                    %product_id,
                    points = dashboard.historical_data.len(),
                    days_left = dashboard.days_left,
                    "fetched product dashboard"
                );
            }
            // the upstream answered; the product just isn't there
            Err(AppError::NotFound(_)) => self.health.set_upstream_ok(true),
            Err(e) => {
                self.health.set_upstream_ok(false);
                warn!(%product_id, "product dashboard fetch failed: {e}");
            }
        }
        result
    }

    async fn get_dashboard(&self, url: Url, product_id: &ProductId) -> Result<ProductDashboard> {
        let resp = self.client.get(url).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!("product {product_id}"))),
            s if s.is_success() => {
                let body = resp.bytes().await?;
                Ok(serde_json::from_slice::<ProductDashboard>(&body)?)
            }
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(AppError::Upstream(format!("{s}: {}", truncate(&body, 200))))
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
