use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Sheet payload is not in the expected export format: {0}")]
    SheetFormat(String),

    #[error("Ads API error: {0}")]
    AdsApi(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FunnelError>;
