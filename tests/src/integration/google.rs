//! # Google Provider Flows
//!
//! The complete stack: helper, billing core, dispatcher and the Google
//! provider over an in-memory backend.

#[cfg(test)]
mod tests {
    use crate::support::{inline_context, EventLog};
    use iab_core::{AdvancedIabHelper, BillingApi, BillingContext};
    use iab_google::{
        FixtureBackend, GoogleBillingProvider, GoogleConfig, GoogleResponse, ItemType,
        MapSkuResolver, PurchasesBundle,
    };
    use shared_bus::BillingEvent;
    use shared_types::{
        ActivityResultEvent, Purchase, RequestKind, SkuType, Status, UiHandle, RESULT_CANCELED,
        RESULT_OK,
    };
    use std::sync::Arc;

    const REQUEST_CODE: i32 = 2001;

    struct Store {
        ctx: BillingContext,
        backend: Arc<FixtureBackend>,
        helper: AdvancedIabHelper,
        log: Arc<EventLog>,
    }

    fn store(backend: FixtureBackend) -> Store {
        let backend = Arc::new(backend);
        let resolver = MapSkuResolver::new()
            .with_sku("gems", SkuType::Consumable)
            .with_sku("no_ads", SkuType::Entitlement)
            .with_sku("vip", SkuType::Subscription);
        let provider = GoogleBillingProvider::builder(backend.clone())
            .resolver(Arc::new(resolver))
            .config(GoogleConfig {
                request_code: REQUEST_CODE,
                ..GoogleConfig::default()
            })
            .build()
            .unwrap();

        let ctx = inline_context(Arc::new(provider));
        let helper = ctx.handle().advanced_helper().unwrap();
        let log = EventLog::new();
        helper.add_billing_listener(log.clone()).unwrap();
        helper.register().unwrap();
        Store {
            ctx,
            backend,
            helper,
            log,
        }
    }

    fn catalog() -> FixtureBackend {
        FixtureBackend::new()
            .with_product("gems", ItemType::Inapp, "$0.99")
            .with_product("no_ads", ItemType::Inapp, "$2.99")
            .with_product("vip", ItemType::Subs, "$4.99")
    }

    fn last_billing(log: &EventLog) -> shared_types::BillingResponse {
        log.events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                BillingEvent::Billing(response) => Some(response),
                _ => None,
            })
            .expect("a billing response")
    }

    fn owned(store: &Store) -> Vec<Purchase> {
        store.helper.inventory(true).unwrap();
        store.ctx.pump();
        match last_billing(&store.log) {
            shared_types::BillingResponse::Inventory(response) => {
                response.page().map(|p| p.purchases.clone()).unwrap_or_default()
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_buy_then_consume() {
        let store = store(catalog());
        let ui = UiHandle::new();

        store.helper.purchase(ui, "gems").unwrap();
        store.ctx.pump();
        let token = store.log.tokens().pop().expect("store screen shown");
        assert_eq!(token.request_code(), REQUEST_CODE);
        assert_eq!(store.backend.launched().len(), 1);

        let payload = store.backend.approve("gems");
        store
            .ctx
            .handle()
            .lifecycle_bridge()
            .on_activity_result(ActivityResultEvent::new(ui, REQUEST_CODE, RESULT_OK, Some(payload)))
            .unwrap();
        store.ctx.pump();

        match last_billing(&store.log) {
            shared_types::BillingResponse::Purchase(response) => {
                let purchase = response.purchase().expect("purchase");
                assert_eq!(purchase.sku, "gems");
                assert_eq!(purchase.sku_type, SkuType::Consumable);
                assert!(purchase.signature.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }

        let purchases = owned(&store);
        assert_eq!(purchases.len(), 1);
        store.helper.consume(purchases[0].clone()).unwrap();
        store.ctx.pump();
        assert_eq!(
            store.log.responses().last(),
            Some(&(RequestKind::Consume, Status::Success))
        );
        assert!(owned(&store).is_empty());
    }

    #[test]
    fn test_user_backs_out() {
        let store = store(catalog());
        let ui = UiHandle::new();
        store.helper.purchase(ui, "vip").unwrap();
        store.ctx.pump();

        store
            .ctx
            .handle()
            .lifecycle_bridge()
            .on_activity_result(ActivityResultEvent::new(
                ui,
                REQUEST_CODE,
                RESULT_CANCELED,
                Some(FixtureBackend::cancel_payload()),
            ))
            .unwrap();
        store.ctx.pump();

        assert_eq!(
            store.log.responses(),
            vec![(RequestKind::Purchase, Status::UserCanceled)]
        );
        assert!(store.backend.owned_skus().is_empty());
    }

    #[test]
    fn test_owned_entitlement_cannot_be_bought_again() {
        let store = store(catalog().with_owned("no_ads"));
        store.helper.purchase(UiHandle::new(), "no_ads").unwrap();
        store.ctx.pump();

        assert_eq!(
            store.log.responses(),
            vec![(RequestKind::Purchase, Status::ItemAlreadyOwned)]
        );
        assert!(store.backend.launched().is_empty());
    }

    #[test]
    fn test_inventory_skips_malformed_purchase() {
        let good = |token: &str| {
            serde_json::json!({ "productId": "gems", "purchaseToken": token }).to_string()
        };
        let bundle = PurchasesBundle {
            response_code: GoogleResponse::Ok.code(),
            items: Some(vec!["gems".into(); 4]),
            data: Some(vec![good("a"), "not json".into(), good("b"), good("c")]),
            signatures: Some(vec!["sig".into(); 4]),
            continuation_token: None,
        };
        let store = store(FixtureBackend::new().with_inventory_override(bundle));

        let purchases = owned(&store);
        assert_eq!(store.log.responses(), vec![(RequestKind::Inventory, Status::Success)]);
        let tokens: Vec<_> = purchases.iter().filter_map(|p| p.token.clone()).collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inventory_pages() {
        let store = store(
            catalog()
                .with_page_size(2)
                .with_owned("gems")
                .with_owned("no_ads")
                .with_owned("vip"),
        );

        store.helper.inventory(true).unwrap();
        store.helper.inventory(false).unwrap();
        store.ctx.pump();

        let pages: Vec<(usize, bool)> = store
            .log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                BillingEvent::Billing(shared_types::BillingResponse::Inventory(r)) => {
                    r.page().map(|p| (p.purchases.len(), p.has_more))
                }
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![(2, true), (1, false)]);
    }

    #[test]
    fn test_no_account_still_sets_up() {
        let store = store(
            catalog()
                .with_billing_supported(GoogleResponse::BillingUnavailable)
                .with_account(false),
        );
        store.helper.sku_details(["gems", "mystery"]).unwrap();
        store.ctx.pump();

        let setups = store.log.setups();
        assert_eq!(setups.len(), 1);
        assert!(setups[0].is_successful());
        match last_billing(&store.log) {
            shared_types::BillingResponse::SkuDetails(response) => {
                let details = response.details().expect("details");
                assert_eq!(details.len(), 2);
                assert!(details.iter().any(|d| d.sku == "mystery" && d.is_empty()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_billing_fails_setup() {
        let store = store(catalog().with_billing_supported(GoogleResponse::BillingUnavailable));
        store.helper.inventory(true).unwrap();
        store.ctx.pump();

        assert!(!store.log.setups()[0].is_successful());
        assert_eq!(
            store.log.responses(),
            vec![(RequestKind::Inventory, Status::BillingUnavailable)]
        );
    }
}
