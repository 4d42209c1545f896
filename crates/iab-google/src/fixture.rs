//! In-memory Google backend.
//!
//! Serves a product catalog and an owned-purchase list, either built in code
//! or loaded from a JSON fixture:
//!
//! ```json
//! {
//!   "billing_supported": 0,
//!   "has_account": true,
//!   "page_size": 20,
//!   "products": [{ "productId": "gems", "type": "inapp", "price": "$0.99" }],
//!   "owned": [{ "productId": "premium", "purchaseToken": "t-1", "purchaseState": 0 }]
//! }
//! ```

use crate::backend::{BuyIntent, DetailsBundle, GoogleBackend, PurchasesBundle};
use crate::error::GoogleError;
use crate::model::{GooglePurchase, GoogleSkuDetails, ItemType};
use crate::provider::{EXTRA_PURCHASE_DATA, EXTRA_RESPONSE_CODE, EXTRA_SIGNATURE};
use crate::resolver::MapSkuResolver;
use crate::status::GoogleResponse;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::{SkuType, UiHandle};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const DEFAULT_PAGE_SIZE: usize = 20;

/// On-disk fixture layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixtureFile {
    pub billing_supported: i32,
    pub has_account: bool,
    pub page_size: usize,
    pub products: Vec<Value>,
    pub owned: Vec<Value>,
}

impl Default for FixtureFile {
    fn default() -> Self {
        Self {
            billing_supported: GoogleResponse::Ok.code(),
            has_account: true,
            page_size: DEFAULT_PAGE_SIZE,
            products: Vec::new(),
            owned: Vec::new(),
        }
    }
}

/// A store screen the backend was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedFlow {
    pub intent: String,
    pub ui: UiHandle,
    pub request_code: i32,
}

#[derive(Debug, Clone)]
struct OwnedEntry {
    sku: String,
    token: String,
    json: String,
    signature: String,
}

#[derive(Debug)]
struct FixtureState {
    billing_supported: i32,
    has_account: bool,
    page_size: usize,
    products: BTreeMap<String, GoogleSkuDetails>,
    owned: Vec<OwnedEntry>,
    cursor: usize,
    next_token: u64,
    launch_failure: Option<String>,
    inventory_override: Option<PurchasesBundle>,
    launched: Vec<LaunchedFlow>,
}

pub struct FixtureBackend {
    state: Mutex<FixtureState>,
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureBackend {
    /// Empty catalog, billing supported, account signed in.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FixtureState {
                billing_supported: GoogleResponse::Ok.code(),
                has_account: true,
                page_size: DEFAULT_PAGE_SIZE,
                products: BTreeMap::new(),
                owned: Vec::new(),
                cursor: 0,
                next_token: 1,
                launch_failure: None,
                inventory_override: None,
                launched: Vec::new(),
            }),
        }
    }

    pub fn from_fixture(fixture: FixtureFile) -> Result<Self, GoogleError> {
        if fixture.page_size == 0 {
            return Err(GoogleError::InvalidField {
                field: "page_size",
                value: "0".into(),
            });
        }
        let backend = Self::new();
        {
            let mut state = backend.state.lock();
            state.billing_supported = fixture.billing_supported;
            state.has_account = fixture.has_account;
            state.page_size = fixture.page_size;
            for product in &fixture.products {
                let details = GoogleSkuDetails::parse(&product.to_string())?;
                state.products.insert(details.product_id.clone(), details);
            }
            for owned in &fixture.owned {
                let purchase = GooglePurchase::parse(&owned.to_string())?;
                state.owned.push(OwnedEntry {
                    signature: signature_for(&purchase.purchase_token),
                    sku: purchase.product_id,
                    token: purchase.purchase_token,
                    json: purchase.original_json,
                });
            }
        }
        Ok(backend)
    }

    pub fn from_json(json: &str) -> Result<Self, GoogleError> {
        let fixture: FixtureFile =
            serde_json::from_str(json).map_err(|e| GoogleError::json("fixture", e))?;
        Self::from_fixture(fixture)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GoogleError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| GoogleError::Fixture {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let backend = Self::from_json(&json)?;
        debug!(path = %path.display(), products = backend.product_count(), "Fixture loaded");
        Ok(backend)
    }

    // =========================================================================
    // BUILDERS
    // =========================================================================

    #[must_use]
    pub fn with_product(self, sku: &str, item_type: ItemType, price: &str) -> Self {
        let json = json!({
            "productId": sku,
            "type": item_type.code(),
            "price": price,
            "title": sku,
        })
        .to_string();
        if let Ok(details) = GoogleSkuDetails::parse(&json) {
            self.state.lock().products.insert(sku.to_owned(), details);
        }
        self
    }

    /// Adds an owned, unconsumed purchase of `sku`.
    #[must_use]
    pub fn with_owned(self, sku: &str) -> Self {
        self.grant(sku);
        self
    }

    #[must_use]
    pub fn with_billing_supported(self, response: GoogleResponse) -> Self {
        self.state.lock().billing_supported = response.code();
        self
    }

    #[must_use]
    pub fn with_account(self, signed_in: bool) -> Self {
        self.state.lock().has_account = signed_in;
        self
    }

    #[must_use]
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.state.lock().page_size = page_size.max(1);
        self
    }

    /// Every buy flow launch fails with `reason`.
    #[must_use]
    pub fn with_launch_failure(self, reason: &str) -> Self {
        self.state.lock().launch_failure = Some(reason.to_owned());
        self
    }

    /// Return `bundle` verbatim from every purchases query.
    #[must_use]
    pub fn with_inventory_override(self, bundle: PurchasesBundle) -> Self {
        self.state.lock().inventory_override = Some(bundle);
        self
    }

    // =========================================================================
    // USER SIMULATION
    // =========================================================================

    /// Simulates the user confirming a purchase of `sku` in the store screen
    /// and returns the activity result payload.
    pub fn approve(&self, sku: &str) -> Value {
        let entry = self.grant(sku);
        json!({
            EXTRA_RESPONSE_CODE: GoogleResponse::Ok.code(),
            EXTRA_PURCHASE_DATA: entry.json,
            EXTRA_SIGNATURE: entry.signature,
        })
    }

    /// Activity result payload for a user who backed out.
    pub fn cancel_payload() -> Value {
        json!({ EXTRA_RESPONSE_CODE: GoogleResponse::UserCanceled.code() })
    }

    pub fn launched(&self) -> Vec<LaunchedFlow> {
        self.state.lock().launched.clone()
    }

    pub fn owned_skus(&self) -> Vec<String> {
        self.state.lock().owned.iter().map(|e| e.sku.clone()).collect()
    }

    pub fn product_count(&self) -> usize {
        self.state.lock().products.len()
    }

    /// Resolver for the catalog: subscriptions as such, in-app products as
    /// `inapp`.
    pub fn resolver(&self, inapp: SkuType) -> MapSkuResolver {
        self.state
            .lock()
            .products
            .values()
            .fold(MapSkuResolver::new(), |resolver, product| {
                let sku_type = match product.item_type {
                    ItemType::Inapp => inapp,
                    ItemType::Subs => SkuType::Subscription,
                    ItemType::Unknown => SkuType::Unknown,
                };
                resolver.with_sku(product.product_id.clone(), sku_type)
            })
    }

    fn grant(&self, sku: &str) -> OwnedEntry {
        let mut state = self.state.lock();
        let token = format!("token-{sku}-{}", state.next_token);
        state.next_token += 1;
        let json = json!({
            "orderId": format!("GPA.fixture.{token}"),
            "productId": sku,
            "purchaseTime": now_millis(),
            "purchaseState": 0,
            "purchaseToken": token,
        })
        .to_string();
        let entry = OwnedEntry {
            sku: sku.to_owned(),
            signature: signature_for(&token),
            token,
            json,
        };
        state.owned.push(entry.clone());
        entry
    }
}

impl GoogleBackend for FixtureBackend {
    fn is_billing_supported(&self) -> i32 {
        self.state.lock().billing_supported
    }

    fn has_google_account(&self) -> bool {
        self.state.lock().has_account
    }

    fn buy_intent(&self, sku: &str, item_type: ItemType) -> BuyIntent {
        let state = self.state.lock();
        let response = match state.products.get(sku) {
            None => GoogleResponse::ItemUnavailable,
            Some(product) if product.item_type != item_type => GoogleResponse::DeveloperError,
            Some(_) if state.owned.iter().any(|e| e.sku == sku) => {
                GoogleResponse::ItemAlreadyOwned
            }
            Some(_) => GoogleResponse::Ok,
        };
        BuyIntent {
            response_code: response.code(),
            intent: (response == GoogleResponse::Ok)
                .then(|| format!("intent:{}:{sku}", item_type.code())),
        }
    }

    fn launch_buy_flow(
        &self,
        intent: &str,
        ui: UiHandle,
        request_code: i32,
    ) -> Result<(), GoogleError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.launch_failure {
            return Err(GoogleError::LaunchFailed(reason.clone()));
        }
        state.launched.push(LaunchedFlow {
            intent: intent.to_owned(),
            ui,
            request_code,
        });
        Ok(())
    }

    fn consume_purchase(&self, token: &str) -> i32 {
        let mut state = self.state.lock();
        match state.owned.iter().position(|e| e.token == token) {
            Some(index) => {
                state.owned.remove(index);
                GoogleResponse::Ok.code()
            }
            None => GoogleResponse::ItemNotOwned.code(),
        }
    }

    fn sku_details(&self, skus: &BTreeSet<String>) -> DetailsBundle {
        let state = self.state.lock();
        let details = skus
            .iter()
            .filter_map(|sku| state.products.get(sku))
            .map(|d| d.original_json.clone())
            .collect();
        DetailsBundle {
            response_code: GoogleResponse::Ok.code(),
            details: Some(details),
        }
    }

    fn purchases(&self, start_over: bool) -> PurchasesBundle {
        let mut state = self.state.lock();
        if let Some(bundle) = &state.inventory_override {
            return bundle.clone();
        }
        if start_over || state.cursor >= state.owned.len() {
            state.cursor = 0;
        }
        let start = state.cursor;
        let end = (start + state.page_size).min(state.owned.len());
        let page = &state.owned[start..end];
        let bundle = PurchasesBundle {
            response_code: GoogleResponse::Ok.code(),
            items: Some(page.iter().map(|e| e.sku.clone()).collect()),
            data: Some(page.iter().map(|e| e.json.clone()).collect()),
            signatures: Some(page.iter().map(|e| e.signature.clone()).collect()),
            continuation_token: (end < state.owned.len()).then(|| format!("page-{end}")),
        };
        state.cursor = end;
        bundle
    }
}

fn signature_for(token: &str) -> String {
    format!("fixture-sig:{token}")
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
