//! Inbound (Driving) ports.
//!
//! The request API shared by both helper facades. Each facade decides how a
//! request is posted (scheduled or direct); the typed entry points are
//! built on top of that single method.

use shared_types::{BillingError, BillingRequest, Purchase, UiHandle};

/// Public billing request API.
///
/// All methods are fire-and-forget: outcomes arrive later as events. An
/// `Err` means the request was not accepted at all (helper disposed or
/// context closed), never that the billing operation failed.
pub trait BillingApi {
    /// Hand a request to the billing core.
    fn post_request(&self, request: BillingRequest) -> Result<(), BillingError>;

    /// Start provider setup.
    fn setup(&self) -> Result<(), BillingError> {
        self.post_request(BillingRequest::Setup)
    }

    fn purchase(&self, ui: UiHandle, sku: &str) -> Result<(), BillingError> {
        self.post_request(BillingRequest::purchase(ui, sku))
    }

    fn consume(&self, purchase: Purchase) -> Result<(), BillingError> {
        self.post_request(BillingRequest::consume(purchase))
    }

    fn sku_details<I, S>(&self, skus: I) -> Result<(), BillingError>
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post_request(BillingRequest::sku_details(skus))
    }

    fn inventory(&self, start_over: bool) -> Result<(), BillingError> {
        self.post_request(BillingRequest::inventory(start_over))
    }
}
