//! `BillingProvider` on top of a [`GoogleBackend`].

use crate::backend::GoogleBackend;
use crate::config::{GoogleConfig, INSTALLER_PACKAGE};
use crate::error::GoogleError;
use crate::model::{GooglePurchase, GoogleSkuDetails, ItemType};
use crate::resolver::{MapSkuResolver, SkuResolver};
use crate::status::{status_for, status_for_code, GoogleResponse};
use iab_core::{BillingProvider, PurchaseOutcome};
use shared_types::{
    ActivityResultEvent, ConsumeResponse, InteractionToken, InventoryResponse, ProviderInfo,
    Purchase, PurchaseResponse, SkuDetails, SkuDetailsResponse, SkuType, Status, UiHandle,
    RESULT_CANCELED,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const PROVIDER_NAME: &str = "Google";

/// Activity result extras.
pub const EXTRA_RESPONSE_CODE: &str = "RESPONSE_CODE";
pub const EXTRA_PURCHASE_DATA: &str = "INAPP_PURCHASE_DATA";
pub const EXTRA_SIGNATURE: &str = "INAPP_DATA_SIGNATURE";

pub struct GoogleBillingProviderBuilder {
    backend: Arc<dyn GoogleBackend>,
    resolver: Arc<dyn SkuResolver>,
    config: GoogleConfig,
}

impl GoogleBillingProviderBuilder {
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn SkuResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn config(mut self, config: GoogleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<GoogleBillingProvider, GoogleError> {
        self.config.validate()?;
        let info = ProviderInfo::new(PROVIDER_NAME, self.config.package.clone())
            .with_installer(INSTALLER_PACKAGE);
        Ok(GoogleBillingProvider {
            info,
            backend: self.backend,
            resolver: self.resolver,
            request_code: self.config.request_code,
        })
    }
}

pub struct GoogleBillingProvider {
    info: ProviderInfo,
    backend: Arc<dyn GoogleBackend>,
    resolver: Arc<dyn SkuResolver>,
    request_code: i32,
}

impl GoogleBillingProvider {
    /// Starts a builder with default configuration and an empty resolver.
    pub fn builder(backend: Arc<dyn GoogleBackend>) -> GoogleBillingProviderBuilder {
        GoogleBillingProviderBuilder {
            backend,
            resolver: Arc::new(MapSkuResolver::new()),
            config: GoogleConfig::default(),
        }
    }

    #[must_use]
    pub fn request_code(&self) -> i32 {
        self.request_code
    }

    fn status(&self, response: Option<GoogleResponse>) -> Status {
        status_for(response, self.is_authorised())
    }

    fn status_of(&self, code: i32) -> Status {
        status_for_code(code, self.is_authorised())
    }

    fn purchase_failure(&self, status: Status) -> PurchaseResponse {
        PurchaseResponse::failure(Some(self.info.clone()), status)
    }

    fn sku_type(&self, sku: &str, item_type: ItemType) -> SkuType {
        match item_type {
            ItemType::Inapp => self.resolver.resolve_type(sku),
            ItemType::Subs => SkuType::Subscription,
            ItemType::Unknown => SkuType::Unknown,
        }
    }

    fn new_purchase(&self, purchase: GooglePurchase, signature: &str) -> Purchase {
        let canceled = purchase.is_canceled();
        Purchase {
            sku_type: self.resolver.resolve_type(&purchase.product_id),
            sku: purchase.product_id,
            provider: Some(self.info.clone()),
            token: Some(purchase.purchase_token),
            purchase_time: purchase.purchase_time,
            canceled,
            original_json: Some(purchase.original_json),
            signature: Some(signature.to_owned()),
        }
    }

    fn new_sku_details(&self, details: GoogleSkuDetails) -> SkuDetails {
        SkuDetails {
            sku_type: self.sku_type(&details.product_id, details.item_type),
            sku: details.product_id,
            provider: Some(self.info.clone()),
            original_json: Some(details.original_json),
            price: details.price,
            title: details.title,
            description: details.description,
        }
    }

    fn launch(&self, token: InteractionToken, intent: &str) -> PurchaseOutcome {
        match self
            .backend
            .launch_buy_flow(intent, token.ui(), token.request_code())
        {
            Ok(()) => PurchaseOutcome::AwaitingUser(token),
            Err(e) => {
                error!(sku = token.sku(), error = %e, "Failed to launch buy flow");
                PurchaseOutcome::Completed(self.purchase_failure(Status::UnknownError))
            }
        }
    }
}

impl BillingProvider for GoogleBillingProvider {
    fn info(&self) -> ProviderInfo {
        self.info.clone()
    }

    fn check_availability(&self) -> Status {
        let code = self.backend.is_billing_supported();
        let status = self.status_of(code);
        debug!(code, %status, "Google billing availability");
        status
    }

    fn is_authorised(&self) -> bool {
        self.backend.has_google_account()
    }

    fn purchase(&self, sku: &str, ui: UiHandle) -> PurchaseOutcome {
        let sku_type = self.resolver.resolve_type(sku);
        let Some(item_type) = ItemType::from_sku_type(sku_type) else {
            error!(sku, "Unknown SKU type, cannot purchase");
            return PurchaseOutcome::Completed(self.purchase_failure(Status::ItemUnavailable));
        };

        let buy = self.backend.buy_intent(sku, item_type);
        let response = GoogleResponse::from_code(buy.response_code);
        let intent = match buy.intent {
            Some(intent) if response == Some(GoogleResponse::Ok) => intent,
            _ => {
                warn!(sku, code = buy.response_code, "No buy intent");
                return PurchaseOutcome::Completed(self.purchase_failure(self.status(response)));
            }
        };

        let token = InteractionToken::new(sku, ui, self.request_code).with_provider_data(&intent);
        self.launch(token, &intent)
    }

    fn complete_purchase(
        &self,
        token: &InteractionToken,
        result: &ActivityResultEvent,
    ) -> PurchaseResponse {
        let code = result.extra_i64(EXTRA_RESPONSE_CODE);
        let response = code
            .and_then(|c| i32::try_from(c).ok())
            .and_then(GoogleResponse::from_code);
        let data = result.extra_str(EXTRA_PURCHASE_DATA);
        let signature = result.extra_str(EXTRA_SIGNATURE);

        // Backing out of the store screen may carry no extras at all
        if code.is_none() && result.result_code == RESULT_CANCELED {
            return self.purchase_failure(Status::UserCanceled);
        }

        let (true, Some(GoogleResponse::Ok), Some(data), Some(signature)) =
            (result.is_ok(), response, data, signature)
        else {
            warn!(sku = token.sku(), result_code = result.result_code, "Purchase not completed");
            return self.purchase_failure(self.status(response));
        };

        match GooglePurchase::parse(data) {
            Ok(purchase) => {
                PurchaseResponse::success(Some(self.info.clone()), self.new_purchase(purchase, signature))
            }
            Err(e) => {
                error!(sku = token.sku(), error = %e, "Failed to parse purchase data");
                self.purchase_failure(Status::UnknownError)
            }
        }
    }

    fn resume_purchase(&self, token: &InteractionToken) -> PurchaseOutcome {
        match token.provider_data() {
            Some(intent) => {
                let intent = intent.to_owned();
                self.launch(token.clone(), &intent)
            }
            None => {
                error!(sku = token.sku(), "Interaction token carries no buy intent");
                PurchaseOutcome::Completed(self.purchase_failure(Status::UnknownError))
            }
        }
    }

    fn consume(&self, purchase: &Purchase) -> ConsumeResponse {
        let Some(token) = purchase.token.as_deref().filter(|t| !t.is_empty()) else {
            error!(sku = %purchase.sku, "Purchase has no token, cannot consume");
            return ConsumeResponse::failure(Some(self.info.clone()), Status::ItemUnavailable);
        };

        let code = self.backend.consume_purchase(token);
        if GoogleResponse::from_code(code) != Some(GoogleResponse::Ok) {
            warn!(sku = %purchase.sku, code, "Consume failed");
            return ConsumeResponse::failure(Some(self.info.clone()), self.status_of(code));
        }
        ConsumeResponse::success(Some(self.info.clone()), purchase.clone())
    }

    fn sku_details(&self, skus: &BTreeSet<String>) -> SkuDetailsResponse {
        let bundle = self.backend.sku_details(skus);
        if GoogleResponse::from_code(bundle.response_code) != Some(GoogleResponse::Ok) {
            return SkuDetailsResponse::failure(
                Some(self.info.clone()),
                self.status_of(bundle.response_code),
            );
        }

        let mut unresolved = skus.clone();
        let mut details = Vec::with_capacity(skus.len());
        for json in bundle.details.unwrap_or_default() {
            match GoogleSkuDetails::parse(&json) {
                Ok(parsed) => {
                    unresolved.remove(&parsed.product_id);
                    details.push(self.new_sku_details(parsed));
                }
                Err(e) => error!(error = %e, "Skipping malformed sku details"),
            }
        }
        details.extend(unresolved.into_iter().map(SkuDetails::unresolved));
        SkuDetailsResponse::success(Some(self.info.clone()), details)
    }

    fn inventory(&self, start_over: bool) -> InventoryResponse {
        let bundle = self.backend.purchases(start_over);
        if GoogleResponse::from_code(bundle.response_code) != Some(GoogleResponse::Ok) {
            return InventoryResponse::failure(
                Some(self.info.clone()),
                self.status_of(bundle.response_code),
            );
        }

        let (Some(items), Some(data), Some(signatures)) =
            (bundle.items, bundle.data, bundle.signatures)
        else {
            return InventoryResponse::success(Some(self.info.clone()), Vec::new(), false);
        };
        if items.len() < data.len() || signatures.len() < data.len() {
            error!(
                items = items.len(),
                data = data.len(),
                signatures = signatures.len(),
                "Inconsistent purchase lists"
            );
            return InventoryResponse::failure(Some(self.info.clone()), Status::UnknownError);
        }

        let purchases = data
            .iter()
            .zip(&signatures)
            .filter_map(|(json, signature)| match GooglePurchase::parse(json) {
                Ok(purchase) => Some(self.new_purchase(purchase, signature)),
                Err(e) => {
                    error!(error = %e, "Skipping malformed purchase");
                    None
                }
            })
            .collect();
        let has_more = bundle
            .continuation_token
            .is_some_and(|token| !token.is_empty());
        InventoryResponse::success(Some(self.info.clone()), purchases, has_more)
    }
}
