//! # Google Play Billing Provider
//!
//! Adapts the Google billing service to the [`iab_core::BillingProvider`]
//! port.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐   BillingProvider   ┌────────────────────────┐
//! │ iab-core dispatch    │ ──────────────────→ │ GoogleBillingProvider  │
//! └──────────────────────┘                     │  status table, models  │
//!                                              └───────────┬────────────┘
//!                                                          │ GoogleBackend
//!                                              ┌───────────▼────────────┐
//!                                              │ device service/fixture │
//!                                              └────────────────────────┘
//! ```
//!
//! ## Response Mapping
//!
//! | Google | Status |
//! |--------|--------|
//! | `OK` | `Success` |
//! | `USER_CANCELED` | `UserCanceled` |
//! | `SERVICE_UNAVAILABLE` | `ServiceUnavailable` |
//! | `BILLING_UNAVAILABLE` | `BillingUnavailable`, or `Unauthorised` with no account |
//! | `ITEM_UNAVAILABLE` | `ItemUnavailable` |
//! | `ITEM_ALREADY_OWNED` | `ItemAlreadyOwned` |
//! | anything else | `UnknownError` |

pub mod backend;
pub mod config;
pub mod error;
pub mod fixture;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod status;

pub use backend::{BuyIntent, DetailsBundle, GoogleBackend, PurchasesBundle};
pub use config::GoogleConfig;
pub use error::GoogleError;
pub use fixture::{FixtureBackend, FixtureFile, LaunchedFlow};
pub use model::{GooglePurchase, GoogleSkuDetails, ItemType, PurchaseState};
pub use provider::{
    GoogleBillingProvider, GoogleBillingProviderBuilder, EXTRA_PURCHASE_DATA, EXTRA_RESPONSE_CODE,
    EXTRA_SIGNATURE, PROVIDER_NAME,
};
pub use resolver::{MapSkuResolver, SkuResolver};
pub use status::{status_for, status_for_code, GoogleResponse, STATUS_TABLE};
