//! Billing context configuration.

use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::BillingError;
use std::env;
use tracing::warn;

/// Configuration for a billing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IabConfig {
    /// Name given to the thread started by `spawn_dispatch_thread`.
    pub dispatch_thread_name: String,

    /// Events buffered per tap subscriber before it lags.
    pub tap_capacity: usize,
}

impl Default for IabConfig {
    fn default() -> Self {
        Self {
            dispatch_thread_name: "iab-dispatch".to_string(),
            tap_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl IabConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `IAB_DISPATCH_THREAD`: dispatch thread name (default: iab-dispatch)
    /// - `IAB_TAP_CAPACITY`: tap buffer size (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dispatch_thread_name: env::var("IAB_DISPATCH_THREAD")
                .unwrap_or(defaults.dispatch_thread_name),

            tap_capacity: env::var("IAB_TAP_CAPACITY")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(capacity) => Some(capacity),
                    Err(_) => {
                        warn!(value = %v, "Ignoring invalid IAB_TAP_CAPACITY");
                        None
                    }
                })
                .unwrap_or(defaults.tap_capacity),
        }
    }

    pub fn validate(&self) -> Result<(), BillingError> {
        if self.dispatch_thread_name.trim().is_empty() {
            return Err(BillingError::Config("dispatch thread name is empty".into()));
        }
        if self.tap_capacity == 0 {
            return Err(BillingError::Config("tap capacity must be at least 1".into()));
        }
        Ok(())
    }
}
