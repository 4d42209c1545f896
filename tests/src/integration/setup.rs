//! # Setup Flows
//!
//! Setup runs once per context. Its response is replayed to setup listeners
//! added later, and a failed setup turns every later request into a
//! `BillingUnavailable` response without touching the provider.

#[cfg(test)]
mod tests {
    use crate::support::{recording_context, EventLog};
    use iab_core::adapters::{InlineExecutor, ProviderCall, RecordingProvider};
    use iab_core::{spawn_dispatch_thread, BillingApi, HelperPhase, IabConfig};
    use shared_types::{RequestKind, SetupStatus, Status, UiHandle};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_failed_setup_answers_queue_with_billing_unavailable() {
        let (ctx, provider) =
            recording_context(RecordingProvider::new().with_availability(Status::BillingUnavailable));
        let helper = ctx.handle().advanced_helper().unwrap();
        let log = EventLog::new();
        helper.add_billing_listener(log.clone()).unwrap();
        helper.register().unwrap();

        helper.purchase(UiHandle::new(), "gems").unwrap();
        helper.inventory(true).unwrap();
        helper.sku_details(["gems"]).unwrap();
        ctx.pump();

        let setups = log.setups();
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].status(), SetupStatus::Failed);
        assert_eq!(
            log.responses(),
            vec![
                (RequestKind::Purchase, Status::BillingUnavailable),
                (RequestKind::Inventory, Status::BillingUnavailable),
                (RequestKind::SkuDetails, Status::BillingUnavailable),
            ]
        );
        assert_eq!(provider.calls(), vec![ProviderCall::CheckAvailability]);
        assert_eq!(helper.phase(), HelperPhase::Ready);

        // Later requests fail the same way; setup is not retried
        helper.setup().unwrap();
        helper.inventory(false).unwrap();
        ctx.pump();
        assert_eq!(provider.calls(), vec![ProviderCall::CheckAvailability]);
        assert_eq!(
            log.responses().last(),
            Some(&(RequestKind::Inventory, Status::BillingUnavailable))
        );
    }

    #[test]
    fn test_unauthorised_user_still_sets_up() {
        let (ctx, _provider) =
            recording_context(RecordingProvider::new().with_availability(Status::Unauthorised));
        let handle = ctx.handle();
        handle.setup().unwrap();
        ctx.pump();

        assert!(handle.setup_response().unwrap().is_successful());
    }

    #[test]
    fn test_setup_replayed_to_late_listener_on_dispatch_thread() {
        let provider = Arc::new(RecordingProvider::new());
        let dispatch =
            spawn_dispatch_thread(IabConfig::default(), provider.clone(), Box::new(InlineExecutor))
                .unwrap();
        let handle = dispatch.handle().clone();
        handle.setup().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.setup_response().is_none() {
            assert!(Instant::now() < deadline, "setup never finished");
            thread::sleep(Duration::from_millis(5));
        }

        let (tx, rx) = mpsc::channel();
        let remote = handle.clone();
        handle
            .post(move || {
                let helper = remote.advanced_helper().unwrap();
                let log = EventLog::new();
                helper.add_setup_listener(log.clone()).unwrap();
                let _ = tx.send(log.setups());
            })
            .unwrap();

        let replayed = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(replayed.len(), 1);
        assert!(replayed[0].is_successful());
        assert_eq!(
            replayed[0].provider().map(|p| p.name.as_str()),
            Some("Recording")
        );

        dispatch.shutdown().unwrap();
        assert_eq!(provider.count(|c| *c == ProviderCall::CheckAvailability), 1);
    }

    #[test]
    fn test_second_context_sets_up_independently() {
        let (first, first_provider) = recording_context(RecordingProvider::new());
        let (second, second_provider) = recording_context(RecordingProvider::new());

        first.handle().setup().unwrap();
        first.pump();
        second.pump();

        assert!(first.handle().setup_response().is_some());
        assert!(second.handle().setup_response().is_none());
        assert_eq!(first_provider.calls().len(), 1);
        assert!(second_provider.calls().is_empty());
    }
}
