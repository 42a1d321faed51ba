//! Error types for optibill

use std::time::Duration;
use thiserror::Error;

/// Main error type for optibill
///
/// The currency and aggregation core never returns these; they come from
/// loading rate tables, preference storage, configuration and data fetches.
#[derive(Error, Debug)]
pub enum OptibillError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid rate for {currency}: {rate} (must be positive and finite)")]
    InvalidRate { currency: String, rate: f64 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data fetch failed for {resource}: {message}")]
    DataFetch { resource: String, message: String },

    #[error("Fetch cancelled: {0}")]
    Cancelled(String),

    #[error("Fetch timed out after {after:?}: {resource}")]
    Timeout { resource: String, after: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for optibill operations
pub type Result<T> = std::result::Result<T, OptibillError>;
