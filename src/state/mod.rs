pub mod series_cache;

pub use series_cache::SeriesCache;
