use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::{apply_view, flag_festival_windows, FestivalWindow, InsightsConfig, SortMode};
use crate::api::health::HealthState;
use crate::api::latency::{LatencyStats, LatencySummary, UNMATCHED_ROUTE};
use crate::error::AppError;
use crate::fetcher::UpstreamClient;
use crate::state::SeriesCache;
use crate::types::{ObservationPoint, ProductId, ProductInsights, ResultRow, SeriesInsights, StockStatus};

#[derive(Clone)]
pub struct ApiState {
    pub upstream: Arc<UpstreamClient>,
    pub cache: Arc<SeriesCache>,
    pub latency: Arc<LatencyStats>,
    pub health: Arc<HealthState>,
    /// Defaults for requests that don't override them.
    pub insights: InsightsConfig,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .route("/results/view", post(post_results_view))
        .route("/series/insights", post(post_series_insights))
        .route("/products/:id/insights", get(get_product_insights))
        .layer(middleware::from_fn_with_state(state.clone(), track_request))
        .with_state(state)
}

/// Records latency and request counts for every route.
async fn track_request(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE.to_string(), |m| m.as_str().to_string());

    let resp = next.run(req).await;

    let elapsed = started.elapsed();
    state.latency.record(&route, elapsed);
    state.health.inc_requests_served();

    let status = resp.status();
    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), elapsed_us = elapsed.as_micros() as u64, "request failed");
    } else {
        debug!(%method, %path, status = status.as_u16(), elapsed_us = elapsed.as_micros() as u64, "request served");
    }
    resp
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub rows: Vec<ResultRow>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub sort: SortMode,
}

#[derive(Debug, Deserialize)]
pub struct SeriesRequest {
    pub points: Vec<ObservationPoint>,
    pub window: Option<usize>,
    pub spike_threshold: Option<f64>,
    /// Festival dates; points inside a festival window get flagged before analysis.
    #[serde(default)]
    pub festivals: Vec<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewResponse {
    pub total: usize,
    pub matched: usize,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub upstream_url: String,
    pub upstream_ok: bool,
    pub last_upstream_ok_at_ns: u64,
    pub requests_served: u64,
    pub cache_entries: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteLatency {
    pub route: String,
    #[serde(flatten)]
    pub latency: LatencySummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatencyResponse {
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub sample_count: u64,
    pub routes: Vec<RouteLatency>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        upstream_url: state.upstream.base_url().to_string(),
        upstream_ok: state.health.upstream_ok(),
        last_upstream_ok_at_ns: state.health.last_upstream_ok_at_ns(),
        requests_served: state.health.requests_served(),
        cache_entries: state.cache.len(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let total = state.latency.total();
    let routes = state
        .latency
        .by_route()
        .into_iter()
        .map(|(route, latency)| RouteLatency { route, latency })
        .collect();
    Json(LatencyResponse {
        p50_ms: total.as_ref().map(|t| t.p50_ms),
        p95_ms: total.as_ref().map(|t| t.p95_ms),
        p99_ms: total.as_ref().map(|t| t.p99_ms),
        sample_count: total.map_or(0, |t| t.sample_count),
        routes,
    })
}

async fn post_results_view(Json(req): Json<ViewRequest>) -> Json<ViewResponse> {
    let rows: Vec<ResultRow> = apply_view(&req.rows, &req.query, req.sort)
        .into_iter()
        .cloned()
        .collect();

    Json(ViewResponse {
        total: req.rows.len(),
        matched: rows.len(),
        rows,
    })
}

async fn post_series_insights(
    State(state): State<ApiState>,
    Json(req): Json<SeriesRequest>,
) -> Result<Json<SeriesInsights>, AppError> {
    let cfg = InsightsConfig {
        window: req.window.unwrap_or(state.insights.window),
        spike_threshold: req.spike_threshold.unwrap_or(state.insights.spike_threshold),
    };

    let points = if req.festivals.is_empty() {
        req.points
    } else {
        flag_festival_windows(&req.points, &req.festivals, FestivalWindow::default())
    };

    let insights = state.cache.get_or_compute(&points, &cfg)?;
    Ok(Json(SeriesInsights::clone(&insights)))
}

async fn get_product_insights(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ProductInsights>, AppError> {
    let product_id = ProductId::parse(&raw_id);
    let dashboard = state.upstream.fetch_product_dashboard(&product_id).await?;
    let insights = state.cache.get_or_compute(&dashboard.historical_data, &state.insights)?;

    Ok(Json(ProductInsights {
        product_id: dashboard.product_id,
        product_name: dashboard.product_name,
        category: dashboard.category,
        avg_daily_sales: dashboard.avg_daily_sales,
        days_left: dashboard.days_left,
        stock_status: StockStatus::from_days_left(dashboard.days_left),
        predicted_stockout_date: dashboard.predicted_stockout_date,
        insights: SeriesInsights::clone(&insights),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
