use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

/// Which side of a flagged/unflagged comparison could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Flagged,
    Unflagged,
    /// Unflagged mean is zero or so close to it that the percentage overflows.
    ZeroBaseline,
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Partition::Flagged => "flagged partition is empty",
            Partition::Unflagged => "unflagged partition is empty",
            Partition::ZeroBaseline => "unflagged mean is zero or too small",
        };
        write!(f, "{s}")
    }
}

/// Local, recoverable outcomes of the series analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("no data: series is empty")]
    EmptyInput,

    #[error("comparison not applicable: {0}")]
    DegenerateComparison(Partition),

    #[error("moving-average window must be at least 1")]
    InvalidWindow,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Analytics(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Http(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), self.to_string()).into_response()
    }
}
