//! # Lifecycle Events
//!
//! Events produced by the host UI layer and forwarded into the billing event
//! stream. Providers that need user interaction complete their flows from
//! [`ActivityResultEvent`]s.

use crate::interaction::UiHandle;
use serde::{Deserialize, Serialize};

/// Transition of a host UI context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleKind {
    Create,
    Attach,
    Start,
    Resume,
    Pause,
    Stop,
    Detach,
    Destroy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub kind: LifecycleKind,
    pub ui: UiHandle,
}

impl LifecycleEvent {
    pub fn new(kind: LifecycleKind, ui: UiHandle) -> Self {
        Self { kind, ui }
    }
}

/// Result code reported when the user confirmed the flow.
pub const RESULT_OK: i32 = -1;

/// Result code reported when the user dismissed the flow.
pub const RESULT_CANCELED: i32 = 0;

/// Result of a store-owned screen launched for a request code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResultEvent {
    pub ui: UiHandle,
    pub request_code: i32,
    pub result_code: i32,
    /// Extras returned by the store screen, if any.
    pub payload: Option<serde_json::Value>,
}

impl ActivityResultEvent {
    pub fn new(
        ui: UiHandle,
        request_code: i32,
        result_code: i32,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            ui,
            request_code,
            result_code,
            payload,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_OK
    }

    /// String extra stored under `key`.
    #[must_use]
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.payload.as_ref()?.get(key)?.as_str()
    }

    /// Integer extra stored under `key`.
    #[must_use]
    pub fn extra_i64(&self, key: &str) -> Option<i64> {
        self.payload.as_ref()?.get(key)?.as_i64()
    }
}
