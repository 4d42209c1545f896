//! # Scheduling Flows
//!
//! One request in flight at a time; later requests queue behind it, an
//! identical request is dropped, and setup runs lazily ahead of the first
//! request.

#[cfg(test)]
mod tests {
    use crate::support::{Deferred, EventLog};
    use iab_core::adapters::{ProviderCall, RecordingProvider};
    use iab_core::{BillingApi, HelperPhase};
    use shared_types::{Purchase, RequestKind, Status, UiHandle};

    fn skus(list: &[&str]) -> std::collections::BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_purchase_reaches_provider_once() {
        let env = Deferred::new(RecordingProvider::new());
        let helper = env.context.handle().advanced_helper().unwrap();
        let log = EventLog::new();
        helper.add_billing_listener(log.clone()).unwrap();
        helper.register().unwrap();

        helper.setup().unwrap();
        env.settle();

        // Same SKU from two screens: the UI is not part of request identity
        helper.purchase(UiHandle::new(), "gems").unwrap();
        helper.purchase(UiHandle::new(), "gems").unwrap();
        env.settle();

        assert_eq!(
            env.provider
                .count(|c| matches!(c, ProviderCall::Purchase(sku) if sku == "gems")),
            1
        );
        assert_eq!(log.responses(), vec![(RequestKind::Purchase, Status::Success)]);
    }

    #[test]
    fn test_equal_request_after_completion_runs_again() {
        let env = Deferred::new(RecordingProvider::new());
        let helper = env.context.handle().advanced_helper().unwrap();
        helper.register().unwrap();

        helper.inventory(true).unwrap();
        env.settle();
        helper.inventory(true).unwrap();
        env.settle();

        assert_eq!(env.provider.count(|c| *c == ProviderCall::Inventory(true)), 2);
    }

    #[test]
    fn test_requests_during_setup_run_in_order() {
        let env = Deferred::new(RecordingProvider::new());
        let helper = env.context.handle().advanced_helper().unwrap();
        let log = EventLog::new();
        helper.add_billing_listener(log.clone()).unwrap();
        helper.register().unwrap();

        helper.purchase(UiHandle::new(), "gems").unwrap();
        helper
            .consume(Purchase::new("gems").with_token("token-gems"))
            .unwrap();
        env.context.pump();

        // Setup in flight, both requests waiting
        assert_eq!(helper.phase(), HelperPhase::AwaitingSetup);
        assert_eq!(env.provider.calls(), Vec::<ProviderCall>::new());
        assert_eq!(env.executor.pending(), 1);

        env.step();
        assert_eq!(helper.phase(), HelperPhase::Dispatching);
        env.settle();

        assert_eq!(
            env.provider.calls(),
            vec![
                ProviderCall::CheckAvailability,
                ProviderCall::Purchase("gems".into()),
                ProviderCall::Consume("gems".into()),
            ]
        );
        assert_eq!(log.setups().len(), 1);
        assert_eq!(
            log.responses(),
            vec![
                (RequestKind::Purchase, Status::Success),
                (RequestKind::Consume, Status::Success),
            ]
        );
        assert_eq!(helper.phase(), HelperPhase::Ready);
    }

    #[test]
    fn test_queues_of_several_helpers_all_drain() {
        let env = Deferred::new(RecordingProvider::new());
        let handle = env.context.handle();
        let first = handle.advanced_helper().unwrap();
        let second = handle.advanced_helper().unwrap();

        first.inventory(true).unwrap();
        second.sku_details(["a", "b"]).unwrap();
        first.sku_details(["c"]).unwrap();
        env.settle();

        let calls = env.provider.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], ProviderCall::CheckAvailability);
        assert_eq!(calls[1], ProviderCall::Inventory(true));
        // The helper whose request just finished goes first
        assert_eq!(calls[2], ProviderCall::SkuDetails(skus(&["c"])));
        assert_eq!(calls[3], ProviderCall::SkuDetails(skus(&["a", "b"])));
    }

    #[test]
    fn test_unregister_drops_queue_but_in_flight_still_publishes() {
        let env = Deferred::new(RecordingProvider::new());
        let handle = env.context.handle();

        let leaving = handle.advanced_helper().unwrap();
        let leaving_log = EventLog::new();
        leaving.add_billing_listener(leaving_log.clone()).unwrap();
        leaving.register().unwrap();

        let staying = handle.advanced_helper().unwrap();
        let staying_log = EventLog::new();
        staying.add_billing_listener(staying_log.clone()).unwrap();
        staying.register().unwrap();

        staying.setup().unwrap();
        env.settle();

        leaving.inventory(true).unwrap();
        leaving.sku_details(["gems"]).unwrap();
        env.context.pump();
        assert_eq!(leaving.phase(), HelperPhase::Dispatching);

        leaving.unregister().unwrap();
        env.settle();

        assert_eq!(
            env.provider.calls(),
            vec![ProviderCall::CheckAvailability, ProviderCall::Inventory(true)]
        );
        assert_eq!(leaving_log.setups().len(), 1);
        assert!(leaving_log.responses().is_empty());
        assert_eq!(
            staying_log.responses(),
            vec![(RequestKind::Inventory, Status::Success)]
        );
        assert_eq!(leaving.phase(), HelperPhase::Disposed);
    }

    #[test]
    fn test_simple_helper_refused_while_advanced_request_in_flight() {
        let env = Deferred::new(RecordingProvider::new());
        let handle = env.context.handle();
        let advanced = handle.advanced_helper().unwrap();
        let log = EventLog::new();
        advanced.add_billing_listener(log.clone()).unwrap();
        advanced.register().unwrap();
        advanced.setup().unwrap();
        env.settle();

        advanced.inventory(true).unwrap();
        env.context.pump();
        handle.simple_helper().sku_details(["gems"]).unwrap();
        env.settle();

        assert_eq!(
            log.responses(),
            vec![
                (RequestKind::SkuDetails, Status::ServiceUnavailable),
                (RequestKind::Inventory, Status::Success),
            ]
        );
        assert_eq!(env.provider.count(|c| matches!(c, ProviderCall::SkuDetails(_))), 0);
    }
}
