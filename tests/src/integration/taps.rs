//! # Event Taps
//!
//! Async observers of everything the dispatcher publishes, including host
//! lifecycle events that no listener interface covers.

#[cfg(test)]
mod tests {
    use iab_core::adapters::{RecordingProvider, TokioExecutor};
    use iab_core::{spawn_dispatch_thread, BillingApi, IabConfig};
    use shared_bus::{BillingEvent, EventFilter, EventTopic};
    use shared_types::{ActivityResultEvent, LifecycleKind, RequestKind, Status, UiHandle, RESULT_OK};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test(flavor = "multi_thread")]
    async fn test_lifecycle_stream_sees_bridge_events() {
        let dispatch = spawn_dispatch_thread(
            IabConfig::default(),
            Arc::new(RecordingProvider::new()),
            Box::new(TokioExecutor::current().unwrap()),
        )
        .unwrap();
        let handle = dispatch.handle().clone();
        let mut stream = handle.event_stream(EventFilter::topics(vec![EventTopic::Lifecycle]));

        let ui = UiHandle::new();
        let bridge = handle.lifecycle_bridge();
        bridge.on_lifecycle(LifecycleKind::Resume, ui).unwrap();
        bridge
            .on_activity_result(ActivityResultEvent::new(ui, 7, RESULT_OK, None))
            .unwrap();
        // Not a lifecycle event, filtered out
        handle.setup().unwrap();
        bridge.on_lifecycle(LifecycleKind::Destroy, ui).unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let event = timeout(WAIT, stream.next()).await.unwrap().unwrap();
            seen.push(event);
        }
        assert!(matches!(&seen[0], BillingEvent::Lifecycle(e) if e.kind == LifecycleKind::Resume));
        assert!(matches!(&seen[1], BillingEvent::ActivityResult(r) if r.request_code == 7));
        assert!(matches!(&seen[2], BillingEvent::Lifecycle(e) if e.kind == LifecycleKind::Destroy));

        dispatch.shutdown().unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_responses_reach_taps_from_blocking_pool() {
        let provider = Arc::new(RecordingProvider::new());
        let dispatch = spawn_dispatch_thread(
            IabConfig::default(),
            provider.clone(),
            Box::new(TokioExecutor::current().unwrap()),
        )
        .unwrap();
        let handle = dispatch.handle().clone();
        let mut responses = handle.subscribe(EventFilter::responses());

        let helper = handle.simple_helper();
        handle.setup().unwrap();
        let setup = timeout(WAIT, responses.recv()).await.unwrap().unwrap();
        assert!(matches!(setup, BillingEvent::Setup(ref s) if s.is_successful()));

        helper.sku_details(["gems", "coins"]).unwrap();
        match timeout(WAIT, responses.recv()).await.unwrap().unwrap() {
            BillingEvent::Billing(response) => {
                assert_eq!(response.kind(), RequestKind::SkuDetails);
                assert_eq!(response.status(), Status::Success);
            }
            other => panic!("unexpected {other:?}"),
        }

        dispatch.shutdown().unwrap();
        assert!(handle.is_closed());
    }
}
