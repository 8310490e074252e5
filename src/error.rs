//! Error types for the Tax Engine.
//!
//! The calculators themselves never fail for numeric input; errors only
//! arise while loading reference data (tax configurations, holiday
//! calendars), resolving which configuration applies to a date, or
//! parsing user-supplied text.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for library operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two tax configurations claim the same date.
    #[error("tax configuration {first} overlaps with {second}")]
    OverlappingConfig { first: String, second: String },

    /// A configuration's effective range is empty.
    #[error("tax configuration {version} ends before it starts")]
    InvalidRange { version: String },

    /// A precomputed NIS cap no longer matches ceiling x rate.
    #[error(
        "tax configuration {version}: {which} cap {cap:.2} does not match ceiling x rate {expected:.2}"
    )]
    InconsistentNisCap {
        version: String,
        which: &'static str,
        cap: f64,
        expected: f64,
    },

    #[error("no tax configuration in force on {0}")]
    NoConfigForDate(NaiveDate),

    #[error("date out of range: {year}-{month:02}")]
    DateOutOfRange { year: i32, month: u32 },

    #[error("invalid money amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid schedule month: {0}")]
    InvalidMonth(u32),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
