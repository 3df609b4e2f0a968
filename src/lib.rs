//! Stockout forecast insights: result-table views and sales-series analytics
//! over predictions produced by an external forecasting service.

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod state;
pub mod types;
