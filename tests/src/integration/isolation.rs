//! # Failure Isolation
//!
//! A panicking provider call becomes an `UnknownError` response, and a
//! panicking listener does not keep the event from other listeners.

#[cfg(test)]
mod tests {
    use crate::support::{recording_context, Deferred, EventLog};
    use iab_core::adapters::{ProviderCall, RecordingProvider};
    use iab_core::BillingApi;
    use shared_bus::OnInventoryListener;
    use shared_types::{InventoryResponse, RequestKind, Status};
    use std::sync::Arc;

    struct Exploding;

    impl OnInventoryListener for Exploding {
        fn on_inventory(&self, _response: &InventoryResponse) {
            panic!("listener bug");
        }
    }

    #[test]
    fn test_provider_panic_reports_unknown_error_and_queue_advances() {
        let env = Deferred::new(RecordingProvider::new());
        env.provider.panic_on_inventory(true);
        let helper = env.context.handle().advanced_helper().unwrap();
        let log = EventLog::new();
        helper.add_billing_listener(log.clone()).unwrap();
        helper.register().unwrap();

        helper.inventory(true).unwrap();
        helper.sku_details(["gems"]).unwrap();
        env.settle();

        assert_eq!(
            log.responses(),
            vec![
                (RequestKind::Inventory, Status::UnknownError),
                (RequestKind::SkuDetails, Status::Success),
            ]
        );

        // The context keeps working once the provider recovers
        env.provider.panic_on_inventory(false);
        helper.inventory(true).unwrap();
        env.settle();
        assert_eq!(
            log.responses().last(),
            Some(&(RequestKind::Inventory, Status::Success))
        );
        assert_eq!(env.provider.count(|c| *c == ProviderCall::Inventory(true)), 2);
    }

    #[test]
    fn test_listener_panic_does_not_block_other_helpers() {
        let (ctx, _provider) = recording_context(RecordingProvider::new());
        let handle = ctx.handle();

        let broken = handle.advanced_helper().unwrap();
        broken.add_inventory_listener(Arc::new(Exploding)).unwrap();
        broken.register().unwrap();

        let healthy = handle.advanced_helper().unwrap();
        let log = EventLog::new();
        healthy.add_billing_listener(log.clone()).unwrap();
        healthy.register().unwrap();

        broken.inventory(true).unwrap();
        healthy.inventory(false).unwrap();
        ctx.pump();

        assert_eq!(
            log.responses(),
            vec![
                (RequestKind::Inventory, Status::Success),
                (RequestKind::Inventory, Status::Success),
            ]
        );
    }
}
