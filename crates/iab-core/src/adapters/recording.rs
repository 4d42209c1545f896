//! In-memory provider that records every call.
//!
//! Scripted per operation so flows can be driven without a real store.

use crate::ports::{BillingProvider, PurchaseOutcome};
use parking_lot::Mutex;
use shared_types::{
    ActivityResultEvent, ConsumeResponse, InteractionToken, InventoryResponse, ProviderInfo,
    Purchase, PurchaseResponse, SkuDetails, SkuDetailsResponse, SkuType, Status, UiHandle,
};
use std::collections::BTreeSet;

/// Request code used for interactions started by [`RecordingProvider`].
pub const RECORDING_REQUEST_CODE: i32 = 4242;

/// A call made against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    CheckAvailability,
    Purchase(String),
    CompletePurchase(String),
    ResumePurchase(String),
    Consume(String),
    SkuDetails(BTreeSet<String>),
    Inventory(bool),
}

/// How `purchase` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurchaseMode {
    /// Succeed immediately.
    #[default]
    Complete,
    /// Hand back an interaction token and wait for an activity result.
    AwaitUser,
    /// Fail with the given status.
    Fail(Status),
}

struct Script {
    availability: Status,
    authorised: bool,
    purchase_mode: PurchaseMode,
    failure: Option<Status>,
    inventory: Vec<Purchase>,
    panic_on_inventory: bool,
}

pub struct RecordingProvider {
    info: ProviderInfo,
    script: Mutex<Script>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            info: ProviderInfo::new("Recording", "org.iab.recording"),
            script: Mutex::new(Script {
                availability: Status::Success,
                authorised: true,
                purchase_mode: PurchaseMode::Complete,
                failure: None,
                inventory: Vec::new(),
                panic_on_inventory: false,
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_availability(self, status: Status) -> Self {
        self.script.lock().availability = status;
        self
    }

    #[must_use]
    pub fn with_purchase_mode(self, mode: PurchaseMode) -> Self {
        self.set_purchase_mode(mode);
        self
    }

    #[must_use]
    pub fn with_inventory(self, purchases: Vec<Purchase>) -> Self {
        self.script.lock().inventory = purchases;
        self
    }

    pub fn set_purchase_mode(&self, mode: PurchaseMode) {
        self.script.lock().purchase_mode = mode;
    }

    pub fn set_authorised(&self, authorised: bool) {
        self.script.lock().authorised = authorised;
    }

    /// Make consume, sku details and inventory fail with `status`.
    pub fn fail_with(&self, status: Option<Status>) {
        self.script.lock().failure = status;
    }

    /// Make `inventory` panic, to exercise worker failure handling.
    pub fn panic_on_inventory(&self, panic: bool) {
        self.script.lock().panic_on_inventory = panic;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ProviderCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().push(call);
    }

    fn purchased(&self, sku: &str) -> Purchase {
        let mut purchase = Purchase::new(sku)
            .with_type(SkuType::Consumable)
            .with_token(format!("token-{sku}"));
        purchase.provider = Some(self.info.clone());
        purchase
    }
}

impl Default for RecordingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BillingProvider for RecordingProvider {
    fn info(&self) -> ProviderInfo {
        self.info.clone()
    }

    fn check_availability(&self) -> Status {
        self.record(ProviderCall::CheckAvailability);
        self.script.lock().availability
    }

    fn is_authorised(&self) -> bool {
        self.script.lock().authorised
    }

    fn purchase(&self, sku: &str, ui: UiHandle) -> PurchaseOutcome {
        self.record(ProviderCall::Purchase(sku.to_string()));
        let mode = self.script.lock().purchase_mode;
        match mode {
            PurchaseMode::Complete => PurchaseOutcome::Completed(PurchaseResponse::success(
                Some(self.info()),
                self.purchased(sku),
            )),
            PurchaseMode::AwaitUser => PurchaseOutcome::AwaitingUser(InteractionToken::new(
                sku,
                ui,
                RECORDING_REQUEST_CODE,
            )),
            PurchaseMode::Fail(status) => {
                PurchaseOutcome::Completed(PurchaseResponse::failure(Some(self.info()), status))
            }
        }
    }

    fn complete_purchase(
        &self,
        token: &InteractionToken,
        result: &ActivityResultEvent,
    ) -> PurchaseResponse {
        self.record(ProviderCall::CompletePurchase(token.sku().to_string()));
        if result.is_ok() {
            PurchaseResponse::success(Some(self.info()), self.purchased(token.sku()))
        } else {
            PurchaseResponse::failure(Some(self.info()), Status::UserCanceled)
        }
    }

    fn resume_purchase(&self, token: &InteractionToken) -> PurchaseOutcome {
        self.record(ProviderCall::ResumePurchase(token.sku().to_string()));
        PurchaseOutcome::AwaitingUser(token.clone())
    }

    fn consume(&self, purchase: &Purchase) -> ConsumeResponse {
        self.record(ProviderCall::Consume(purchase.sku.clone()));
        match self.script.lock().failure {
            Some(status) => ConsumeResponse::failure(Some(self.info()), status),
            None => ConsumeResponse::success(Some(self.info()), purchase.clone()),
        }
    }

    fn sku_details(&self, skus: &BTreeSet<String>) -> SkuDetailsResponse {
        self.record(ProviderCall::SkuDetails(skus.clone()));
        if let Some(status) = self.script.lock().failure {
            return SkuDetailsResponse::failure(Some(self.info()), status);
        }
        let details = skus
            .iter()
            .map(|sku| SkuDetails {
                provider: Some(self.info()),
                title: Some(sku.clone()),
                ..SkuDetails::unresolved(sku.clone())
            })
            .collect();
        SkuDetailsResponse::success(Some(self.info()), details)
    }

    fn inventory(&self, start_over: bool) -> InventoryResponse {
        self.record(ProviderCall::Inventory(start_over));
        let script = self.script.lock();
        if script.panic_on_inventory {
            drop(script);
            panic!("inventory backend crashed");
        }
        match script.failure {
            Some(status) => InventoryResponse::failure(Some(self.info()), status),
            None => InventoryResponse::success(Some(self.info()), script.inventory.clone(), false),
        }
    }
}
