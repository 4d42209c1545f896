//! Error types for the Google provider.

use shared_types::BillingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoogleError {
    /// A backend JSON payload could not be decoded.
    #[error("Malformed {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A payload decoded but carries a value outside the known range.
    #[error("Invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// The buy flow could not be shown.
    #[error("Failed to launch buy flow: {0}")]
    LaunchFailed(String),

    /// A fixture file could not be read.
    #[error("Failed to read fixture {path}: {reason}")]
    Fixture { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GoogleError {
    pub(crate) fn json(what: &'static str, source: serde_json::Error) -> Self {
        Self::Json { what, source }
    }
}

impl From<GoogleError> for BillingError {
    fn from(err: GoogleError) -> Self {
        match err {
            GoogleError::Config(reason) => BillingError::Config(reason),
            GoogleError::Fixture { .. } | GoogleError::LaunchFailed(_) => {
                BillingError::Setup(err.to_string())
            }
            GoogleError::Json { .. } | GoogleError::InvalidField { .. } => {
                BillingError::Parse(err.to_string())
            }
        }
    }
}
