//! JSON payloads returned by the Google billing service.
//!
//! Each model keeps the exact string it was decoded from so the purchase
//! signature can still be verified downstream.

use crate::error::GoogleError;
use serde::{Deserialize, Serialize};
use shared_types::SkuType;

/// Google item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "inapp")]
    Inapp,
    #[serde(rename = "subs")]
    Subs,
    #[serde(other)]
    Unknown,
}

impl ItemType {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Inapp => "inapp",
            Self::Subs => "subs",
            Self::Unknown => "unknown",
        }
    }

    /// Google category used to buy a SKU of the given type, if any.
    #[must_use]
    pub fn from_sku_type(sku_type: SkuType) -> Option<Self> {
        match sku_type {
            SkuType::Consumable | SkuType::Entitlement => Some(Self::Inapp),
            SkuType::Subscription => Some(Self::Subs),
            SkuType::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseState {
    Purchased,
    Canceled,
    Refunded,
}

impl PurchaseState {
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Purchased),
            1 => Some(Self::Canceled),
            2 => Some(Self::Refunded),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Purchased => 0,
            Self::Canceled => 1,
            Self::Refunded => 2,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPurchase {
    product_id: String,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    package_name: Option<String>,
    #[serde(default)]
    purchase_time: u64,
    #[serde(default)]
    purchase_state: i64,
    #[serde(default)]
    developer_payload: Option<String>,
    purchase_token: String,
    #[serde(default)]
    auto_renewing: bool,
}

/// One `INAPP_PURCHASE_DATA` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GooglePurchase {
    pub original_json: String,
    pub product_id: String,
    pub order_id: Option<String>,
    pub package_name: Option<String>,
    /// Milliseconds since the UNIX epoch.
    pub purchase_time: u64,
    pub purchase_state: PurchaseState,
    pub developer_payload: Option<String>,
    pub purchase_token: String,
    pub auto_renewing: bool,
}

impl GooglePurchase {
    pub fn parse(json: &str) -> Result<Self, GoogleError> {
        let raw: RawPurchase =
            serde_json::from_str(json).map_err(|e| GoogleError::json("purchase", e))?;
        let purchase_state =
            PurchaseState::from_code(raw.purchase_state).ok_or_else(|| GoogleError::InvalidField {
                field: "purchaseState",
                value: raw.purchase_state.to_string(),
            })?;
        if raw.purchase_token.is_empty() {
            return Err(GoogleError::InvalidField {
                field: "purchaseToken",
                value: String::new(),
            });
        }

        Ok(Self {
            original_json: json.to_owned(),
            product_id: raw.product_id,
            order_id: raw.order_id,
            package_name: raw.package_name,
            purchase_time: raw.purchase_time,
            purchase_state,
            developer_payload: raw.developer_payload,
            purchase_token: raw.purchase_token,
            auto_renewing: raw.auto_renewing,
        })
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.purchase_state == PurchaseState::Canceled
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkuDetails {
    product_id: String,
    #[serde(rename = "type")]
    item_type: ItemType,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    price_amount_micros: Option<i64>,
    #[serde(default)]
    price_currency_code: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// One `DETAILS_LIST` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleSkuDetails {
    pub original_json: String,
    pub product_id: String,
    pub item_type: ItemType,
    pub price: Option<String>,
    pub price_amount_micros: Option<i64>,
    pub price_currency_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl GoogleSkuDetails {
    pub fn parse(json: &str) -> Result<Self, GoogleError> {
        let raw: RawSkuDetails =
            serde_json::from_str(json).map_err(|e| GoogleError::json("sku details", e))?;
        Ok(Self {
            original_json: json.to_owned(),
            product_id: raw.product_id,
            item_type: raw.item_type,
            price: raw.price,
            price_amount_micros: raw.price_amount_micros,
            price_currency_code: raw.price_currency_code,
            title: raw.title,
            description: raw.description,
        })
    }
}
