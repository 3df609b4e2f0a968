use std::io;
use std::path::Path;

use chrono::NaiveDate;
use stockout_insights::analytics::{apply_view, SortMode};
use stockout_insights::types::{
    Lift, PredictionResponse, ProductId, ProductInsights, ResultRow, SeriesInsights, SummaryStats,
};

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read a saved prediction response: either the full `{summary, fields}`
/// body or a bare array of rows.
pub fn load_results(path: &Path) -> io::Result<(Vec<ResultRow>, Option<String>)> {
    let raw = std::fs::read(path)?;
    if let Ok(resp) = serde_json::from_slice::<PredictionResponse>(&raw) {
        return Ok((resp.fields, resp.summary));
    }
    serde_json::from_slice::<Vec<ResultRow>>(&raw)
        .map(|rows| (rows, None))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Idle,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub rows: Vec<ResultRow>,
    pub summary: Option<String>,
    pub query: String,
    pub sort: SortMode,
    pub mode: InputMode,
    /// Index into `visible_rows()`.
    pub selected: Option<usize>,
    pub detail: Option<ProductInsights>,
    pub status: ConnectionStatus,
    pub base_url: String,
}

impl AppState {
    pub fn new(rows: Vec<ResultRow>, summary: Option<String>, base_url: String) -> Self {
        let selected = if rows.is_empty() { None } else { Some(0) };
        Self {
            rows,
            summary,
            query: String::new(),
            sort: SortMode::default(),
            mode: InputMode::Browse,
            selected,
            detail: None,
            status: ConnectionStatus::Idle,
            base_url,
        }
    }

    /// Search then sort, exactly as the table shows it.
    pub fn visible_rows(&self) -> Vec<&ResultRow> {
        apply_view(&self.rows, &self.query, self.sort)
    }

    pub fn selected_row(&self) -> Option<&ResultRow> {
        let idx = self.selected?;
        self.visible_rows().get(idx).copied()
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.reset_selection();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.reset_selection();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.reset_selection();
    }

    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.toggle();
        self.reset_selection();
    }

    pub fn select_next(&mut self) {
        let max = self.visible_rows().len().saturating_sub(1);
        self.selected = match self.visible_rows().len() {
            0 => None,
            _ => Some(self.selected.map_or(0, |i| (i + 1).min(max))),
        };
    }

    pub fn select_prev(&mut self) {
        self.selected = match self.visible_rows().len() {
            0 => None,
            _ => Some(self.selected.map_or(0, |i| i.saturating_sub(1))),
        };
    }

    /// The view changed: highlight the first row and drop the insight panel,
    /// which belonged to the previously highlighted product.
    fn reset_selection(&mut self) {
        self.selected = if self.visible_rows().is_empty() { None } else { Some(0) };
        self.detail = None;
        self.status = ConnectionStatus::Idle;
    }

    /// Fetch insights for the selected row from the insights API.
    pub async fn fetch_selected(&mut self, client: &reqwest::Client) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let Some(product_id) = row.product_id.clone() else {
            self.status = ConnectionStatus::Error("row has no product id".to_string());
            return;
        };

        let Some(url) = insights_url(&self.base_url, &product_id) else {
            self.status = ConnectionStatus::Error(format!("bad API_URL {:?}", self.base_url));
            return;
        };
        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<ProductInsights>().await {
                Ok(insights) => {
                    self.detail = Some(insights);
                    self.status = ConnectionStatus::Loaded;
                }
                Err(e) => self.status = ConnectionStatus::Error(format!("parse error: {e}")),
            },
            Ok(resp) => {
                self.status = ConnectionStatus::Error(format!("{} for product {product_id}", resp.status()));
            }
            Err(e) => self.status = ConnectionStatus::Error(format!("{e}")),
        }
    }
}

/// `{base}/products/{id}/insights`, the id encoded as one path segment.
pub fn insights_url(base_url: &str, product_id: &ProductId) -> Option<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push("products")
        .push(&product_id.to_string())
        .push("insights");
    Some(url)
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_date(d: Option<NaiveDate>) -> String {
    d.map_or("—".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

pub fn format_summary(s: Option<&SummaryStats>) -> (String, String) {
    match s {
        Some(s) => (format!("{:.2}", s.mean), format!("{:.2}", s.volatility)),
        None => ("no data".to_string(), "no data".to_string()),
    }
}

pub fn format_lift(l: Option<&Lift>) -> String {
    match l {
        Some(l) if l.percent >= 0 => format!("+{}%", l.percent),
        Some(l) => format!("{}%", l.percent),
        None => "n/a".to_string(),
    }
}

/// Label/value pairs for the series half of the insight panel. The moving
/// average window is a server setting, so the label does not name a length.
pub fn series_fields(insights: &SeriesInsights) -> Vec<(&'static str, String)> {
    let (mean, volatility) = format_summary(insights.summary.as_ref());
    let latest_ma = insights
        .enriched
        .last()
        .map_or("—".to_string(), |p| format!("{:.2}", p.moving_average));
    vec![
        ("Mean sales", mean),
        ("Volatility", volatility),
        ("Latest MA", latest_ma),
        ("Festival lift", format_lift(insights.festival_lift.as_ref())),
        ("Spikes", insights.spikes.len().to_string()),
    ]
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
