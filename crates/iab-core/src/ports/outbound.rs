//! Outbound (Driven) ports.
//!
//! What the billing core needs from the outside world: a store provider to
//! talk to and somewhere to run its blocking calls.

use shared_types::{
    ActivityResultEvent, ConsumeResponse, InteractionToken, InventoryResponse, ProviderInfo,
    Purchase, PurchaseResponse, SkuDetailsResponse, Status, UiHandle,
};
use std::collections::BTreeSet;

/// Result of starting a purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The provider finished the purchase without user interaction.
    Completed(PurchaseResponse),
    /// A store screen was launched; the purchase completes when the matching
    /// activity result arrives.
    AwaitingUser(InteractionToken),
}

/// A store backend.
///
/// Every method is a blocking call made from a [`BackendExecutor`] worker,
/// never from the dispatch thread. Failures are reported as a [`Status`] on
/// the returned response.
pub trait BillingProvider: Send + Sync {
    /// Identity stamped on every response this provider produces.
    fn info(&self) -> ProviderInfo;

    /// Whether billing can work on this device.
    ///
    /// `Success` and `Unauthorised` both mean the provider is usable.
    fn check_availability(&self) -> Status;

    /// Whether the user is signed in to the store.
    fn is_authorised(&self) -> bool;

    /// Start buying `sku`, showing any store screens on `ui`.
    fn purchase(&self, sku: &str, ui: UiHandle) -> PurchaseOutcome;

    /// Finish a purchase from the store screen's result.
    fn complete_purchase(
        &self,
        token: &InteractionToken,
        result: &ActivityResultEvent,
    ) -> PurchaseResponse;

    /// Relaunch the store screen for an outstanding interaction on the UI the
    /// token is now bound to.
    fn resume_purchase(&self, token: &InteractionToken) -> PurchaseOutcome {
        PurchaseOutcome::AwaitingUser(token.clone())
    }

    fn consume(&self, purchase: &Purchase) -> ConsumeResponse;

    fn sku_details(&self, skus: &BTreeSet<String>) -> SkuDetailsResponse;

    /// One page of the user's purchases.
    fn inventory(&self, start_over: bool) -> InventoryResponse;
}

/// Unit of backend work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs provider calls off the dispatch thread.
pub trait BackendExecutor: Send + Sync {
    fn execute(&self, job: Job);
}
