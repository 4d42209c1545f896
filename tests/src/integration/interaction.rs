//! # User Interaction Flows
//!
//! A purchase that needs the store screen keeps the provider busy until the
//! matching activity result arrives. If the screen goes away, the caller
//! resumes the purchase on a new UI with the interaction token.

#[cfg(test)]
mod tests {
    use crate::support::{inline_context, recording_context, EventLog};
    use iab_core::adapters::{ProviderCall, PurchaseMode, RecordingProvider, RECORDING_REQUEST_CODE};
    use iab_core::{
        AdvancedIabHelper, BillingApi, BillingContext, BillingProvider, HelperPhase,
        LifecycleBridge, PurchaseOutcome,
    };
    use parking_lot::Mutex;
    use shared_types::{
        ActivityResultEvent, ConsumeResponse, InteractionToken, InventoryResponse, LifecycleKind,
        ProviderInfo, Purchase, PurchaseResponse, RequestKind, SkuDetailsResponse, Status,
        UiHandle, RESULT_CANCELED, RESULT_OK,
    };
    use std::collections::BTreeSet;
    use std::sync::Arc;

    struct Flow {
        ctx: BillingContext,
        provider: Arc<RecordingProvider>,
        helper: AdvancedIabHelper,
        log: Arc<EventLog>,
    }

    fn awaiting_flow() -> Flow {
        let (ctx, provider) = recording_context(
            RecordingProvider::new().with_purchase_mode(PurchaseMode::AwaitUser),
        );
        let helper = ctx.handle().advanced_helper().unwrap();
        let log = EventLog::new();
        helper.add_billing_listener(log.clone()).unwrap();
        helper.register().unwrap();
        helper.setup().unwrap();
        ctx.pump();
        Flow {
            ctx,
            provider,
            helper,
            log,
        }
    }

    fn start_purchase(flow: &Flow, ui: UiHandle) -> InteractionToken {
        flow.helper.purchase(ui, "gems").unwrap();
        flow.ctx.pump();
        flow.log.tokens().pop().expect("interaction required")
    }

    #[test]
    fn test_purchase_waits_for_activity_result() {
        let flow = awaiting_flow();
        let ui = UiHandle::new();
        let token = start_purchase(&flow, ui);
        assert_eq!(token.ui(), ui);
        assert_eq!(token.request_code(), RECORDING_REQUEST_CODE);
        assert_eq!(flow.helper.phase(), HelperPhase::Dispatching);

        // Queued behind the outstanding purchase
        flow.helper.inventory(true).unwrap();
        flow.ctx.pump();
        assert!(flow.log.responses().is_empty());

        let bridge = flow.ctx.handle().lifecycle_bridge();
        bridge
            .on_activity_result(ActivityResultEvent::new(ui, RECORDING_REQUEST_CODE, RESULT_OK, None))
            .unwrap();
        flow.ctx.pump();

        assert_eq!(
            flow.log.responses(),
            vec![
                (RequestKind::Purchase, Status::Success),
                (RequestKind::Inventory, Status::Success),
            ]
        );
        assert_eq!(flow.helper.phase(), HelperPhase::Ready);
    }

    #[test]
    fn test_canceled_activity_result() {
        let flow = awaiting_flow();
        let ui = UiHandle::new();
        start_purchase(&flow, ui);

        flow.ctx
            .handle()
            .lifecycle_bridge()
            .on_activity_result(ActivityResultEvent::new(
                ui,
                RECORDING_REQUEST_CODE,
                RESULT_CANCELED,
                None,
            ))
            .unwrap();
        flow.ctx.pump();

        assert_eq!(
            flow.log.responses(),
            vec![(RequestKind::Purchase, Status::UserCanceled)]
        );
    }

    #[test]
    fn test_resume_after_ui_destroyed() {
        let flow = awaiting_flow();
        let bridge = flow.ctx.handle().lifecycle_bridge();
        let first_ui = UiHandle::new();
        let token = start_purchase(&flow, first_ui);

        bridge.on_lifecycle(LifecycleKind::Destroy, first_ui).unwrap();
        let second_ui = UiHandle::new();
        flow.helper.resume_purchase(&token, second_ui).unwrap();
        flow.ctx.pump();

        let tokens = flow.log.tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].id(), token.id());
        assert_eq!(tokens[1].ui(), second_ui);

        // A result for the destroyed UI no longer completes anything
        bridge
            .on_activity_result(ActivityResultEvent::new(
                first_ui,
                RECORDING_REQUEST_CODE,
                RESULT_OK,
                None,
            ))
            .unwrap();
        flow.ctx.pump();
        assert!(flow.log.responses().is_empty());

        bridge
            .on_activity_result(ActivityResultEvent::new(
                second_ui,
                RECORDING_REQUEST_CODE,
                RESULT_OK,
                None,
            ))
            .unwrap();
        flow.ctx.pump();

        assert_eq!(
            flow.provider.calls(),
            vec![
                ProviderCall::CheckAvailability,
                ProviderCall::Purchase("gems".into()),
                ProviderCall::ResumePurchase("gems".into()),
                ProviderCall::CompletePurchase("gems".into()),
            ]
        );
        assert_eq!(
            flow.log.responses(),
            vec![(RequestKind::Purchase, Status::Success)]
        );
    }

    #[test]
    fn test_resume_with_stale_token_is_ignored() {
        let flow = awaiting_flow();
        let ui = UiHandle::new();
        start_purchase(&flow, ui);

        let stranger = InteractionToken::new("gems", ui, RECORDING_REQUEST_CODE);
        flow.helper.resume_purchase(&stranger, UiHandle::new()).unwrap();
        flow.ctx.pump();

        assert_eq!(
            flow.provider.count(|c| matches!(c, ProviderCall::ResumePurchase(_))),
            0
        );
        assert_eq!(flow.log.tokens().len(), 1);
    }

    #[test]
    fn test_activity_result_with_other_request_code_is_ignored() {
        let flow = awaiting_flow();
        let ui = UiHandle::new();
        start_purchase(&flow, ui);

        flow.ctx
            .handle()
            .lifecycle_bridge()
            .on_activity_result(ActivityResultEvent::new(ui, 1, RESULT_OK, None))
            .unwrap();
        flow.ctx.pump();

        assert!(flow.log.responses().is_empty());
        assert_eq!(flow.helper.phase(), HelperPhase::Dispatching);
    }

    const STORE_CODE: i32 = 7;

    /// Store whose screen reports back before `purchase` has returned.
    struct EagerStore {
        bridge: Mutex<Option<LifecycleBridge>>,
        answer_code: i32,
        result_code: i32,
    }

    impl BillingProvider for EagerStore {
        fn info(&self) -> ProviderInfo {
            ProviderInfo::new("Eager", "eager.store")
        }

        fn check_availability(&self) -> Status {
            Status::Success
        }

        fn is_authorised(&self) -> bool {
            true
        }

        fn purchase(&self, sku: &str, ui: UiHandle) -> PurchaseOutcome {
            if let Some(bridge) = self.bridge.lock().as_ref() {
                bridge
                    .on_activity_result(ActivityResultEvent::new(
                        ui,
                        self.answer_code,
                        self.result_code,
                        None,
                    ))
                    .unwrap();
            }
            PurchaseOutcome::AwaitingUser(InteractionToken::new(sku, ui, STORE_CODE))
        }

        fn complete_purchase(
            &self,
            token: &InteractionToken,
            result: &ActivityResultEvent,
        ) -> PurchaseResponse {
            if result.is_ok() {
                PurchaseResponse::success(Some(self.info()), Purchase::new(token.sku()))
            } else {
                PurchaseResponse::failure(Some(self.info()), Status::UserCanceled)
            }
        }

        fn consume(&self, _purchase: &Purchase) -> ConsumeResponse {
            ConsumeResponse::failure(Some(self.info()), Status::ItemUnavailable)
        }

        fn sku_details(&self, _skus: &BTreeSet<String>) -> SkuDetailsResponse {
            SkuDetailsResponse::success(Some(self.info()), Vec::new())
        }

        fn inventory(&self, _start_over: bool) -> InventoryResponse {
            InventoryResponse::success(Some(self.info()), Vec::new(), false)
        }
    }

    fn eager_flow(
        answer_code: i32,
        result_code: i32,
    ) -> (BillingContext, AdvancedIabHelper, Arc<EventLog>) {
        let store = Arc::new(EagerStore {
            bridge: Mutex::new(None),
            answer_code,
            result_code,
        });
        let ctx = inline_context(store.clone());
        *store.bridge.lock() = Some(ctx.handle().lifecycle_bridge());

        let helper = ctx.handle().advanced_helper().unwrap();
        let log = EventLog::new();
        helper.add_billing_listener(log.clone()).unwrap();
        helper.register().unwrap();
        (ctx, helper, log)
    }

    #[test]
    fn test_result_arriving_before_token_completes_purchase() {
        let (ctx, helper, log) = eager_flow(STORE_CODE, RESULT_CANCELED);
        helper.purchase(UiHandle::new(), "gems").unwrap();
        helper.inventory(true).unwrap();
        ctx.pump();

        assert_eq!(
            log.responses(),
            vec![
                (RequestKind::Purchase, Status::UserCanceled),
                (RequestKind::Inventory, Status::Success),
            ]
        );
        assert_eq!(helper.phase(), HelperPhase::Ready);
    }

    #[test]
    fn test_early_result_for_other_screen_keeps_purchase_waiting() {
        let (ctx, helper, log) = eager_flow(STORE_CODE + 1, RESULT_OK);
        let ui = UiHandle::new();
        helper.purchase(ui, "gems").unwrap();
        ctx.pump();
        assert!(log.responses().is_empty());
        assert_eq!(log.tokens().len(), 1);

        ctx.handle()
            .lifecycle_bridge()
            .on_activity_result(ActivityResultEvent::new(ui, STORE_CODE, RESULT_OK, None))
            .unwrap();
        ctx.pump();
        assert_eq!(
            log.responses(),
            vec![(RequestKind::Purchase, Status::Success)]
        );
    }
}
