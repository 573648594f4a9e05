//! Error types for marker data retrieval.

use chrono::NaiveDate;
use thiserror::Error;

/// Failure of a single provider request.
///
/// These never abort a batch; the caller logs them and leaves the affected
/// marker in its last known state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The upstream asked us to back off (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    #[error("malformed response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Map an HTTP status to the matching error.
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            Self::RateLimited
        } else {
            Self::Status(status)
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Status(_) => "status",
            Self::RateLimited => "rate_limited",
            Self::Parse(_) => "parse",
        }
    }
}

/// Errors returned by marker operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkerError {
    /// Dates after today (Japan time) have no data yet.
    #[error("date {date} is after today ({today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MarkerError>;
