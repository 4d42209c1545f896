//! Port to the Google billing service.
//!
//! Calls are synchronous and may block; the provider is only ever invoked on
//! a backend executor, never on the dispatch thread. Response codes are raw
//! wire values so that unknown codes reach the status table untouched.

use crate::error::GoogleError;
use crate::model::ItemType;
use shared_types::UiHandle;
use std::collections::BTreeSet;

/// Result of asking for a buy intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyIntent {
    pub response_code: i32,
    /// Opaque intent used to launch the store screen.
    pub intent: Option<String>,
}

/// Result of a sku details query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsBundle {
    pub response_code: i32,
    /// JSON-encoded `DETAILS_LIST` entries.
    pub details: Option<Vec<String>>,
}

/// One page of owned purchases, as three parallel lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasesBundle {
    pub response_code: i32,
    pub items: Option<Vec<String>>,
    /// JSON-encoded purchase payloads.
    pub data: Option<Vec<String>>,
    pub signatures: Option<Vec<String>>,
    pub continuation_token: Option<String>,
}

impl PurchasesBundle {
    /// Bundle with no lists, as returned on failure.
    pub fn empty(response_code: i32) -> Self {
        Self {
            response_code,
            items: None,
            data: None,
            signatures: None,
            continuation_token: None,
        }
    }
}

pub trait GoogleBackend: Send + Sync {
    /// Raw response code of the billing support check.
    fn is_billing_supported(&self) -> i32;

    /// Returns true if a store account is signed in on the device.
    fn has_google_account(&self) -> bool;

    fn buy_intent(&self, sku: &str, item_type: ItemType) -> BuyIntent;

    /// Shows the store screen for `intent` on `ui`. The outcome arrives later
    /// as an activity result carrying `request_code`.
    fn launch_buy_flow(&self, intent: &str, ui: UiHandle, request_code: i32)
        -> Result<(), GoogleError>;

    /// Raw response code of the consume call.
    fn consume_purchase(&self, token: &str) -> i32;

    fn sku_details(&self, skus: &BTreeSet<String>) -> DetailsBundle;

    /// Owned purchases. `start_over` discards the continuation cursor.
    fn purchases(&self, start_over: bool) -> PurchasesBundle;
}
