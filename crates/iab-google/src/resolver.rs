//! Mapping from SKU identifiers to SKU types.
//!
//! Google only distinguishes `inapp` from `subs`; whether an in-app item is
//! consumable or an entitlement is application knowledge.

use shared_types::SkuType;
use std::collections::HashMap;

pub trait SkuResolver: Send + Sync {
    fn resolve_type(&self, sku: &str) -> SkuType;
}

/// Resolver backed by an explicit table, with a fallback for unlisted SKUs.
#[derive(Debug, Clone, Default)]
pub struct MapSkuResolver {
    types: HashMap<String, SkuType>,
    fallback: SkuType,
}

impl MapSkuResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>, sku_type: SkuType) -> Self {
        self.types.insert(sku.into(), sku_type);
        self
    }

    /// Type reported for SKUs missing from the table. `Unknown` by default.
    #[must_use]
    pub fn with_fallback(mut self, sku_type: SkuType) -> Self {
        self.fallback = sku_type;
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl SkuResolver for MapSkuResolver {
    fn resolve_type(&self, sku: &str) -> SkuType {
        self.types.get(sku).copied().unwrap_or(self.fallback)
    }
}
