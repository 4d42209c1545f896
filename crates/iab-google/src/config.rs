//! Google provider configuration.

use crate::error::GoogleError;
use std::env;
use tracing::warn;

pub const DEFAULT_REQUEST_CODE: i32 = 10001;
pub const DEFAULT_PACKAGE: &str = "com.google.play";
pub const INSTALLER_PACKAGE: &str = "com.android.vending";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    /// Request code attached to buy flows; activity results are matched on it.
    pub request_code: i32,
    /// Store package reported in provider info.
    pub package: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            request_code: DEFAULT_REQUEST_CODE,
            package: DEFAULT_PACKAGE.to_string(),
        }
    }
}

impl GoogleConfig {
    /// # Environment Variables
    ///
    /// - `IAB_GOOGLE_REQUEST_CODE`: buy flow request code (default: 10001)
    /// - `IAB_GOOGLE_PACKAGE`: store package (default: com.google.play)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            request_code: env::var("IAB_GOOGLE_REQUEST_CODE")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(code) => Some(code),
                    Err(_) => {
                        warn!(value = %v, "Ignoring invalid IAB_GOOGLE_REQUEST_CODE");
                        None
                    }
                })
                .unwrap_or(defaults.request_code),
            package: env::var("IAB_GOOGLE_PACKAGE").unwrap_or(defaults.package),
        }
    }

    pub fn validate(&self) -> Result<(), GoogleError> {
        // Negative request codes are never delivered back as activity results
        if self.request_code < 0 {
            return Err(GoogleError::Config(format!(
                "request code must not be negative, got {}",
                self.request_code
            )));
        }
        if self.package.trim().is_empty() {
            return Err(GoogleError::Config("store package is empty".into()));
        }
        Ok(())
    }
}
