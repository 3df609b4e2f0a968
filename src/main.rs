use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stockout_insights::analytics::InsightsConfig;
use stockout_insights::api::health::HealthState;
use stockout_insights::api::latency::LatencyStats;
use stockout_insights::api::{router, ApiState};
use stockout_insights::config::Config;
use stockout_insights::error::Result;
use stockout_insights::fetcher::UpstreamClient;
use stockout_insights::state::SeriesCache;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let health = Arc::new(HealthState::new());
    let upstream = UpstreamClient::from_config(&cfg, Arc::clone(&health))?;
    info!(
        "Upstream forecasting service at {} (timeout {}s)",
        upstream.base_url(),
        cfg.upstream_timeout.as_secs(),
    );

    let insights = InsightsConfig {
        window: cfg.moving_average_window,
        spike_threshold: cfg.spike_z_threshold,
    };
    info!(
        window = insights.window,
        spike_threshold = insights.spike_threshold,
        cache_max_entries = cfg.cache_max_entries,
        "Series analytics configured"
    );

    let state = ApiState {
        upstream: Arc::new(upstream),
        cache: SeriesCache::new(cfg.cache_max_entries),
        latency: Arc::new(LatencyStats::new()),
        health,
        insights,
    };

    let app = router(state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
