//! # Billing Responses
//!
//! One typed response per request kind. Fields are private so the only way
//! to build a response is through `success` / `failure`, which enforce:
//!
//! | Status | Payload |
//! |--------|---------|
//! | `Success` | present |
//! | anything else | absent |

use crate::entities::{ProviderInfo, Purchase, SkuDetails};
use crate::requests::{BillingRequest, RequestKind};
use crate::status::Status;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// `failure` must never produce a successful response.
fn failure_status(kind: RequestKind, status: Status) -> Status {
    if status.is_success() {
        warn!(%kind, "Failure response built with SUCCESS, reporting UNKNOWN_ERROR");
        Status::UnknownError
    } else {
        status
    }
}

// =============================================================================
// SETUP
// =============================================================================

/// Terminal outcome of provider setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupResponse {
    status: SetupStatus,
    provider: Option<ProviderInfo>,
}

impl SetupResponse {
    pub fn success(provider: ProviderInfo) -> Self {
        Self {
            status: SetupStatus::Success,
            provider: Some(provider),
        }
    }

    pub fn failed(provider: Option<ProviderInfo>) -> Self {
        Self {
            status: SetupStatus::Failed,
            provider,
        }
    }

    /// Builds the setup outcome from a provider availability check.
    ///
    /// An unauthorised user still counts as a successful setup: billing works
    /// once they sign in to the store.
    pub fn from_availability(provider: ProviderInfo, availability: Status) -> Self {
        match availability {
            Status::Success | Status::Unauthorised => Self::success(provider),
            _ => Self::failed(Some(provider)),
        }
    }

    #[must_use]
    pub fn status(&self) -> SetupStatus {
        self.status
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status == SetupStatus::Success
    }

    #[must_use]
    pub fn provider(&self) -> Option<&ProviderInfo> {
        self.provider.as_ref()
    }
}

// =============================================================================
// PURCHASE / CONSUME
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResponse {
    status: Status,
    provider: Option<ProviderInfo>,
    purchase: Option<Purchase>,
}

impl PurchaseResponse {
    pub fn success(provider: Option<ProviderInfo>, purchase: Purchase) -> Self {
        Self {
            status: Status::Success,
            provider,
            purchase: Some(purchase),
        }
    }

    pub fn failure(provider: Option<ProviderInfo>, status: Status) -> Self {
        Self {
            status: failure_status(RequestKind::Purchase, status),
            provider,
            purchase: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn provider(&self) -> Option<&ProviderInfo> {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn purchase(&self) -> Option<&Purchase> {
        self.purchase.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeResponse {
    status: Status,
    provider: Option<ProviderInfo>,
    purchase: Option<Purchase>,
}

impl ConsumeResponse {
    pub fn success(provider: Option<ProviderInfo>, purchase: Purchase) -> Self {
        Self {
            status: Status::Success,
            provider,
            purchase: Some(purchase),
        }
    }

    pub fn failure(provider: Option<ProviderInfo>, status: Status) -> Self {
        Self {
            status: failure_status(RequestKind::Consume, status),
            provider,
            purchase: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn provider(&self) -> Option<&ProviderInfo> {
        self.provider.as_ref()
    }

    /// The consumed purchase.
    #[must_use]
    pub fn purchase(&self) -> Option<&Purchase> {
        self.purchase.as_ref()
    }
}

// =============================================================================
// SKU DETAILS / INVENTORY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuDetailsResponse {
    status: Status,
    provider: Option<ProviderInfo>,
    details: Option<Vec<SkuDetails>>,
}

impl SkuDetailsResponse {
    pub fn success(provider: Option<ProviderInfo>, details: Vec<SkuDetails>) -> Self {
        Self {
            status: Status::Success,
            provider,
            details: Some(details),
        }
    }

    pub fn failure(provider: Option<ProviderInfo>, status: Status) -> Self {
        Self {
            status: failure_status(RequestKind::SkuDetails, status),
            provider,
            details: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn provider(&self) -> Option<&ProviderInfo> {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn details(&self) -> Option<&[SkuDetails]> {
        self.details.as_deref()
    }
}

/// One page of the user's purchases.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryPage {
    pub purchases: Vec<Purchase>,
    /// More purchases are available; request `inventory(false)` to continue.
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryResponse {
    status: Status,
    provider: Option<ProviderInfo>,
    page: Option<InventoryPage>,
}

impl InventoryResponse {
    pub fn success(provider: Option<ProviderInfo>, purchases: Vec<Purchase>, has_more: bool) -> Self {
        Self {
            status: Status::Success,
            provider,
            page: Some(InventoryPage {
                purchases,
                has_more,
            }),
        }
    }

    pub fn failure(provider: Option<ProviderInfo>, status: Status) -> Self {
        Self {
            status: failure_status(RequestKind::Inventory, status),
            provider,
            page: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn provider(&self) -> Option<&ProviderInfo> {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn page(&self) -> Option<&InventoryPage> {
        self.page.as_ref()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page.as_ref().is_some_and(|p| p.has_more)
    }
}

// =============================================================================
// TAGGED UNION
// =============================================================================

/// Any response to a non-setup billing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingResponse {
    Purchase(PurchaseResponse),
    Consume(ConsumeResponse),
    SkuDetails(SkuDetailsResponse),
    Inventory(InventoryResponse),
}

impl BillingResponse {
    /// Failure response matching the kind of `request`.
    ///
    /// Returns `None` for `Setup`, which is answered by a [`SetupResponse`].
    pub fn failure_for(
        request: &BillingRequest,
        provider: Option<ProviderInfo>,
        status: Status,
    ) -> Option<Self> {
        let response = match request.kind() {
            RequestKind::Setup => return None,
            RequestKind::Purchase => Self::Purchase(PurchaseResponse::failure(provider, status)),
            RequestKind::Consume => Self::Consume(ConsumeResponse::failure(provider, status)),
            RequestKind::SkuDetails => {
                Self::SkuDetails(SkuDetailsResponse::failure(provider, status))
            }
            RequestKind::Inventory => {
                Self::Inventory(InventoryResponse::failure(provider, status))
            }
        };
        Some(response)
    }

    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Purchase(_) => RequestKind::Purchase,
            Self::Consume(_) => RequestKind::Consume,
            Self::SkuDetails(_) => RequestKind::SkuDetails,
            Self::Inventory(_) => RequestKind::Inventory,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Purchase(r) => r.status(),
            Self::Consume(r) => r.status(),
            Self::SkuDetails(r) => r.status(),
            Self::Inventory(r) => r.status(),
        }
    }
}

impl From<PurchaseResponse> for BillingResponse {
    fn from(response: PurchaseResponse) -> Self {
        Self::Purchase(response)
    }
}

impl From<ConsumeResponse> for BillingResponse {
    fn from(response: ConsumeResponse) -> Self {
        Self::Consume(response)
    }
}

impl From<SkuDetailsResponse> for BillingResponse {
    fn from(response: SkuDetailsResponse) -> Self {
        Self::SkuDetails(response)
    }
}

impl From<InventoryResponse> for BillingResponse {
    fn from(response: InventoryResponse) -> Self {
        Self::Inventory(response)
    }
}
