//! # User Interaction Handles
//!
//! Some purchases cannot complete without the user confirming them in a
//! store-owned screen. Instead of holding a back-reference to the caller's UI,
//! the provider hands out an [`InteractionToken`]: a capability the caller
//! presents again, together with a still-valid [`UiHandle`], if the original
//! screen went away before the flow finished.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a caller UI context (a screen, window or activity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UiHandle(Uuid);

impl UiHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for UiHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ui:{}", self.0)
    }
}

/// Capability token for a purchase waiting on user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionToken {
    id: Uuid,
    sku: String,
    ui: UiHandle,
    request_code: i32,
    /// Provider-private data needed to relaunch the flow (e.g. a buy intent).
    provider_data: Option<String>,
}

impl InteractionToken {
    pub fn new(sku: impl Into<String>, ui: UiHandle, request_code: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            ui,
            request_code,
            provider_data: None,
        }
    }

    #[must_use]
    pub fn with_provider_data(mut self, data: impl Into<String>) -> Self {
        self.provider_data = Some(data.into());
        self
    }

    /// Same capability, bound to a different UI context.
    #[must_use]
    pub fn rebind(&self, ui: UiHandle) -> Self {
        Self {
            ui,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    #[must_use]
    pub fn ui(&self) -> UiHandle {
        self.ui
    }

    #[must_use]
    pub fn request_code(&self) -> i32 {
        self.request_code
    }

    #[must_use]
    pub fn provider_data(&self) -> Option<&str> {
        self.provider_data.as_deref()
    }

    /// Whether an activity result addressed to `ui` with `request_code`
    /// belongs to this interaction.
    #[must_use]
    pub fn matches(&self, ui: UiHandle, request_code: i32) -> bool {
        self.ui == ui && self.request_code == request_code
    }
}
