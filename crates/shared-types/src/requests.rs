//! # Billing Requests
//!
//! Immutable values describing one operation against a provider. Two
//! requests are equal when they have the same kind and the same payload; the
//! scheduler relies on this to collapse redundant submissions.

use crate::entities::Purchase;
use crate::interaction::UiHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Discriminant shared by requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequestKind {
    Setup,
    Purchase,
    Consume,
    SkuDetails,
    Inventory,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Setup => "setup",
            RequestKind::Purchase => "purchase",
            RequestKind::Consume => "consume",
            RequestKind::SkuDetails => "sku_details",
            RequestKind::Inventory => "inventory",
        };
        f.write_str(name)
    }
}

/// A single operation against the active provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BillingRequest {
    /// One-time provider initialisation and availability check.
    Setup,
    /// Buy `sku`. `ui` is where the store flow should be shown; it is a
    /// delivery context and does not take part in equality.
    Purchase { sku: String, ui: UiHandle },
    /// Mark a consumable purchase as used.
    Consume { purchase: Purchase },
    /// Fetch store listings for a set of SKUs.
    SkuDetails { skus: BTreeSet<String> },
    /// Fetch the user's purchases, optionally restarting pagination.
    Inventory { start_over: bool },
}

impl BillingRequest {
    pub fn purchase(ui: UiHandle, sku: impl Into<String>) -> Self {
        Self::Purchase {
            sku: sku.into(),
            ui,
        }
    }

    pub fn consume(purchase: Purchase) -> Self {
        Self::Consume { purchase }
    }

    pub fn sku_details<I, S>(skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SkuDetails {
            skus: skus.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inventory(start_over: bool) -> Self {
        Self::Inventory { start_over }
    }

    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Setup => RequestKind::Setup,
            Self::Purchase { .. } => RequestKind::Purchase,
            Self::Consume { .. } => RequestKind::Consume,
            Self::SkuDetails { .. } => RequestKind::SkuDetails,
            Self::Inventory { .. } => RequestKind::Inventory,
        }
    }
}

impl PartialEq for BillingRequest {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Setup, Self::Setup) => true,
            (Self::Purchase { sku: a, .. }, Self::Purchase { sku: b, .. }) => a == b,
            (Self::Consume { purchase: a }, Self::Consume { purchase: b }) => a == b,
            (Self::SkuDetails { skus: a }, Self::SkuDetails { skus: b }) => a == b,
            (Self::Inventory { start_over: a }, Self::Inventory { start_over: b }) => a == b,
            _ => false,
        }
    }
}

impl Eq for BillingRequest {}

impl fmt::Display for BillingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Purchase { sku, .. } => write!(f, "purchase({sku})"),
            Self::Consume { purchase } => write!(f, "consume({})", purchase.sku),
            Self::SkuDetails { skus } => write!(f, "sku_details({} skus)", skus.len()),
            Self::Inventory { start_over } => write!(f, "inventory(start_over={start_over})"),
        }
    }
}
