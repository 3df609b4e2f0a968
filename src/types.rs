use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::stock_thresholds;

// ---------------------------------------------------------------------------
// Forecast result rows
// ---------------------------------------------------------------------------

/// Opaque product identifier. The forecasting service emits integers, but
/// spreadsheets feeding it sometimes carry text codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{n}"),
            ProductId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl ProductId {
    /// Numeric if the text is an integer, opaque text otherwise.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        raw.parse::<i64>()
            .map(ProductId::Number)
            .unwrap_or_else(|_| ProductId::Text(raw.to_string()))
    }
}

impl From<i64> for ProductId {
    fn from(n: i64) -> Self {
        ProductId::Number(n)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId::Text(s.to_string())
    }
}

/// One forecasted product. Accepts both our snake_case names and the
/// capitalised names the forecasting service's `/predict` response uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(default, alias = "Product_id")]
    pub product_id: Option<ProductId>,
    #[serde(default, alias = "Product_name")]
    pub product_name: Option<String>,
    #[serde(default, alias = "Category")]
    pub category: Option<String>,
    /// Negative means the product is already out of stock.
    #[serde(alias = "Days_left_to_stockout")]
    pub days_left: i64,
    #[serde(
        default,
        alias = "Predicted_stockout_date",
        deserialize_with = "date_format::deserialize_optional"
    )]
    pub stockout_date: Option<NaiveDate>,
}

/// Body of the forecasting service's `/predict` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub total_rows: Option<usize>,
    pub fields: Vec<ResultRow>,
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// One dated sample. Sequences are chronological; order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    #[serde(deserialize_with = "date_format::deserialize")]
    pub date: NaiveDate,
    pub quantity: f64,
    /// Special-period indicator (festival). Accepts `true`/`false` or `1`/`0`.
    #[serde(default, alias = "festival", deserialize_with = "flag_format::deserialize")]
    pub flag: bool,
}

impl ObservationPoint {
    pub fn new(date: NaiveDate, quantity: f64) -> Self {
        Self { date, quantity, flag: false }
    }

    pub fn flagged(date: NaiveDate, quantity: f64) -> Self {
        Self { date, quantity, flag: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPoint {
    #[serde(flatten)]
    pub point: ObservationPoint,
    /// Trailing mean, rounded to 2 decimals.
    pub moving_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    /// Population standard deviation.
    pub volatility: f64,
}

/// Flagged-period mean against the rest of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lift {
    pub flagged_mean: f64,
    pub unflagged_mean: f64,
    /// Whole-number percentage difference relative to the unflagged mean.
    pub percent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub index: usize,
    pub date: NaiveDate,
    pub quantity: f64,
    pub z_score: f64,
}

/// Everything derived from one series. `None` means "no data" or
/// "not applicable" for that statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInsights {
    pub enriched: Vec<EnrichedPoint>,
    pub summary: Option<SummaryStats>,
    pub festival_lift: Option<Lift>,
    pub spikes: Vec<Spike>,
}

// ---------------------------------------------------------------------------
// Stock status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    /// Under a week of stock left.
    Understock,
    Fine,
    /// More than two months of stock on hand.
    Overstock,
}

impl StockStatus {
    pub fn from_days_left(days_left: i64) -> Self {
        use stock_thresholds::*;
        if days_left < UNDERSTOCK_BELOW {
            StockStatus::Understock
        } else if days_left > OVERSTOCK_ABOVE {
            StockStatus::Overstock
        } else {
            StockStatus::Fine
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StockStatus::Understock => "Understock",
            StockStatus::Fine => "Fine",
            StockStatus::Overstock => "Overstock",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Product dashboard
// ---------------------------------------------------------------------------

/// Upstream `/product-dashboard/{id}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDashboard {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub avg_daily_sales: Option<f64>,
    pub days_left: i64,
    #[serde(default)]
    pub stock_status: Option<String>,
    #[serde(default, deserialize_with = "date_format::deserialize_optional")]
    pub predicted_stockout_date: Option<NaiveDate>,
    #[serde(default)]
    pub historical_data: Vec<ObservationPoint>,
}

/// What `/products/:id/insights` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInsights {
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub avg_daily_sales: Option<f64>,
    pub days_left: i64,
    pub stock_status: StockStatus,
    pub predicted_stockout_date: Option<NaiveDate>,
    pub insights: SeriesInsights,
}

// ---------------------------------------------------------------------------
// Lenient wire formats
// ---------------------------------------------------------------------------

/// Parse a calendar date from `YYYY-MM-DD`, a naive timestamp, RFC 3339, or
/// the RFC 2822 HTTP-date form Flask uses for datetimes.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

pub mod date_format {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised date: {raw:?}")))
    }

    /// Null, absent, and blank all mean "no date".
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_date(s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unrecognised date: {s:?}"))),
        }
    }
}

pub mod flag_format {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagRepr {
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match FlagRepr::deserialize(deserializer)? {
            FlagRepr::Bool(b) => b,
            FlagRepr::Int(n) => n != 0,
            FlagRepr::Float(x) => x != 0.0,
        })
    }
}
