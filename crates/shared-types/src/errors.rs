//! # Error Types
//!
//! Contract violations and infrastructure failures. Billing outcomes are not
//! errors; they are reported through [`crate::Status`].

use crate::requests::RequestKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// `mark_busy` called while a request is already in flight.
    #[error("Provider already busy with {pending}")]
    AlreadyBusy { pending: RequestKind },

    /// Listener registration attempted off the dispatch thread.
    #[error("{operation} must be called on the billing dispatch thread")]
    WrongThread { operation: &'static str },

    /// The helper was unregistered and accepts no further work.
    #[error("Helper {helper} has been disposed")]
    Disposed { helper: u64 },

    /// The billing context has shut down.
    #[error("Billing context closed")]
    ContextClosed,

    /// Provider setup could not be started.
    #[error("Setup error: {0}")]
    Setup(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend payload could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}
