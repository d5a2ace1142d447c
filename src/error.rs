//! Error types for the fleet analytics engine.

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("price increase factor must be positive, got {0}")]
    InvalidPriceFactor(f64),

    #[error("volume percentile must be within 0..=1, got {0}")]
    InvalidPercentile(f64),

    #[error("service interval must be positive, got {0}")]
    InvalidServiceInterval(f64),
}

#[derive(Debug, Error)]
pub enum Error {
    /// A reference table declares a unique key that is actually duplicated.
    /// Joining against it would multiply trip rows.
    #[error("data integrity error: duplicate key '{key}' in {table}")]
    DataIntegrity { table: &'static str, key: String },

    #[error("invalid period '{0}', expected YYYY-MM")]
    InvalidPeriod(String),

    #[error("missing required column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
