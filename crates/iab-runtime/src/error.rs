use iab_google::GoogleError;
use shared_types::BillingError;
use thiserror::Error;

/// Errors raised while assembling the runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log filter '{filter}': {reason}")]
    LogFilter { filter: String, reason: String },

    #[error("Tracing already initialised: {0}")]
    TracingInit(String),

    #[error("Google provider: {0}")]
    Google(#[from] GoogleError),

    #[error("Billing context: {0}")]
    Billing(#[from] BillingError),
}
