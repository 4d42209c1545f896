//! # Core Billing Entities
//!
//! Provider-agnostic models of the things a store sells and the things a
//! user owns.
//!
//! ## Clusters
//!
//! - **Catalog**: `SkuDetails`, `SkuType`
//! - **Ownership**: `Purchase`
//! - **Provenance**: `ProviderInfo`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// PROVENANCE
// =============================================================================

/// Identifies the backend provider that produced an entity or response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Human readable provider name, e.g. `"Google"`.
    pub name: String,
    /// Package of the store application the provider talks to.
    pub package: String,
    /// Installer package name used to detect where the app came from.
    pub installer: Option<String>,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            installer: None,
        }
    }

    #[must_use]
    pub fn with_installer(mut self, installer: impl Into<String>) -> Self {
        self.installer = Some(installer.into());
        self
    }
}

impl fmt::Display for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.package)
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// How a SKU behaves once bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkuType {
    /// Can be bought again after it has been consumed.
    Consumable,
    /// Bought once, owned forever.
    Entitlement,
    /// Recurring purchase.
    Subscription,
    /// The provider could not tell.
    #[default]
    Unknown,
}

/// Store listing for a single SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuDetails {
    pub sku: String,
    pub sku_type: SkuType,
    pub provider: Option<ProviderInfo>,
    /// Raw backend payload this entity was built from.
    pub original_json: Option<String>,
    pub price: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SkuDetails {
    /// Details for a SKU the backend did not describe.
    ///
    /// Only the identifier is known; every other field is empty.
    pub fn unresolved(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            sku_type: SkuType::Unknown,
            provider: None,
            original_json: None,
            price: None,
            title: None,
            description: None,
        }
    }

    /// Returns true if the backend supplied nothing beyond the identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.original_json.is_none()
            && self.price.is_none()
            && self.title.is_none()
            && self.description.is_none()
    }
}

// =============================================================================
// OWNERSHIP
// =============================================================================

/// A purchase owned by the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub sku: String,
    pub sku_type: SkuType,
    pub provider: Option<ProviderInfo>,
    pub original_json: Option<String>,
    /// Backend token used to consume or verify this purchase.
    pub token: Option<String>,
    /// Milliseconds since the UNIX epoch.
    pub purchase_time: u64,
    pub canceled: bool,
    /// Store signature over `original_json`, when the backend signs purchases.
    pub signature: Option<String>,
}

impl Purchase {
    /// Minimal purchase carrying only a SKU, mostly useful for tests and for
    /// providers that do not track ownership metadata.
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            sku_type: SkuType::Unknown,
            provider: None,
            original_json: None,
            token: None,
            purchase_time: 0,
            canceled: false,
            signature: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, sku_type: SkuType) -> Self {
        self.sku_type = sku_type;
        self
    }

    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}
