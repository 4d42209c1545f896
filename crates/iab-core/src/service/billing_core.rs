//! The billing core: everything that runs on the dispatch thread.
//!
//! Owns the state holder, the scheduler and the event dispatcher. Every
//! mutation of those happens inside [`BillingCore::handle`], one command at a
//! time; provider calls run on the executor and come back as
//! [`Command::Deliver`].

use super::command::{Command, HelperPhase, HelperSlot, ProviderReply, SubmitMode};
use super::context::Shared;
use crate::domain::{BillingState, HelperId, RequestScheduler, Routing, CONTEXT_HELPER};
use crate::ports::{BackendExecutor, BillingProvider, PurchaseOutcome};
use shared_bus::{BillingEvent, EventDispatcher};
use shared_types::{
    ActivityResultEvent, BillingRequest, BillingResponse, InteractionToken, LifecycleEvent,
    LifecycleKind, ProviderInfo, RequestKind, SetupResponse, Status, UiHandle,
};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Whether the dispatch loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Shutdown,
}

pub(crate) struct BillingCore {
    state: BillingState,
    scheduler: RequestScheduler,
    dispatcher: EventDispatcher,
    provider: Arc<dyn BillingProvider>,
    executor: Box<dyn BackendExecutor>,
    shared: Arc<Shared>,
    /// Helper that owns the pending request.
    in_flight: Option<HelperId>,
    /// Purchase waiting for an activity result.
    awaiting: Option<InteractionToken>,
    /// Activity result that arrived while the pending purchase was still
    /// launching; matched against the token once it is delivered.
    early_result: Option<ActivityResultEvent>,
    /// Attached helpers that have not unregistered.
    slots: BTreeMap<HelperId, Arc<HelperSlot>>,
}

impl BillingCore {
    pub(crate) fn new(
        provider: Arc<dyn BillingProvider>,
        executor: Box<dyn BackendExecutor>,
        dispatcher: EventDispatcher,
        shared: Arc<Shared>,
    ) -> Self {
        Self {
            state: BillingState::new(),
            scheduler: RequestScheduler::new(),
            dispatcher,
            provider,
            executor,
            shared,
            in_flight: None,
            awaiting: None,
            early_result: None,
            slots: BTreeMap::new(),
        }
    }

    pub(crate) fn handle(&mut self, command: Command) -> Flow {
        trace!(command = command.name(), "Handling command");
        match command {
            Command::Attach { helper, slot } => {
                self.slots.insert(helper, slot);
            }
            Command::Register { helper, listeners } => {
                if self.is_disposed(helper) {
                    warn!(helper, "Register after unregister ignored");
                } else {
                    self.activate(helper);
                    self.dispatcher.register(helper, listeners);
                }
            }
            Command::Unregister { helper } => self.unregister(helper),
            Command::Submit {
                helper,
                request,
                mode,
            } => self.submit(helper, request, mode),
            Command::Deliver(reply) => self.deliver(reply),
            Command::Lifecycle(event) => self.on_lifecycle(event),
            Command::ActivityResult(result) => self.on_activity_result(result),
            Command::Resume { token, ui } => self.resume(token, ui),
            Command::Run(job) => job(),
            Command::Shutdown => {
                self.shared.closed.store(true, Ordering::SeqCst);
                info!(
                    queued = self.scheduler.total_queued(),
                    busy = self.state.is_busy(),
                    "Billing context shutting down"
                );
                return Flow::Shutdown;
            }
        }
        self.refresh_phases();
        Flow::Continue
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    pub(crate) fn helper_count(&self) -> usize {
        self.slots.len()
    }

    fn submit(&mut self, helper: HelperId, request: BillingRequest, mode: SubmitMode) {
        // Direct submissions come from simple helpers, which are never attached.
        if mode == SubmitMode::Scheduled && self.is_disposed(helper) {
            warn!(helper, %request, "Request from disposed helper ignored");
            return;
        }
        self.activate(helper);

        if matches!(request, BillingRequest::Setup) {
            if self.state.setup_response().is_some() {
                debug!(helper, "Setup already completed");
                return;
            }
            // Setup is always scheduled, even from the direct facade.
            self.submit_scheduled(helper, request);
            return;
        }

        match mode {
            SubmitMode::Scheduled => self.submit_scheduled(helper, request),
            SubmitMode::Direct => self.submit_direct(helper, request),
        }
    }

    fn submit_scheduled(&mut self, helper: HelperId, request: BillingRequest) {
        match Routing::decide(&self.state, &request) {
            Routing::LazySetup => {
                info!(helper, %request, "Provider not set up, starting setup");
                self.scheduler.schedule(helper, request);
                self.dispatch(helper, BillingRequest::Setup);
            }
            Routing::Dispatch => self.dispatch(helper, request),
            Routing::Duplicate => {
                debug!(helper, %request, "Request already in flight, dropped");
            }
            Routing::Enqueue => self.scheduler.schedule(helper, request),
        }
    }

    /// No queue and no lazy setup: run now or answer with a failure.
    fn submit_direct(&mut self, helper: HelperId, request: BillingRequest) {
        let refusal = if !self.state.is_setup_successful() {
            Some(Status::BillingUnavailable)
        } else if self.state.is_busy() {
            Some(Status::ServiceUnavailable)
        } else {
            None
        };

        let Some(status) = refusal else {
            self.dispatch(helper, request);
            return;
        };

        debug!(helper, %request, %status, "Direct request refused");
        if let Some(response) = BillingResponse::failure_for(&request, self.setup_provider(), status)
        {
            self.dispatcher.publish(&BillingEvent::Billing(response));
        }
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    fn dispatch(&mut self, helper: HelperId, request: BillingRequest) {
        if let Err(err) = self.state.mark_busy(request.clone()) {
            error!(helper, %request, %err, "Dispatch aborted");
            return;
        }
        self.in_flight = Some(helper);
        debug!(helper, %request, "Dispatching");

        if self.state.setup_response().is_some() && !self.state.is_setup_successful() {
            // Answer through the normal delivery path so the queue advances.
            let reply = failure_reply(self.setup_provider(), &request, Status::BillingUnavailable);
            self.post(Command::Deliver(reply));
            return;
        }

        let fallback = request.clone();
        self.spawn_call(fallback, move |provider| invoke(provider, request));
    }

    /// Run `call` on the executor and post its reply back.
    ///
    /// A panicking provider is answered with `UnknownError` for `fallback`.
    fn spawn_call<F>(&self, fallback: BillingRequest, call: F)
    where
        F: FnOnce(&dyn BillingProvider) -> ProviderReply + Send + 'static,
    {
        let provider = Arc::clone(&self.provider);
        let commands = self.shared.commands.clone();
        self.executor.execute(Box::new(move || {
            let reply = match catch_unwind(AssertUnwindSafe(|| call(provider.as_ref()))) {
                Ok(reply) => reply,
                Err(_) => {
                    error!(request = %fallback, "Provider call panicked");
                    failure_reply(Some(provider.info()), &fallback, Status::UnknownError)
                }
            };
            if commands.send(Command::Deliver(reply)).is_err() {
                debug!("Billing context closed before provider replied");
            }
        }));
    }

    fn post(&self, command: Command) {
        if self.shared.commands.send(command).is_err() {
            error!("Command channel closed");
        }
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    fn deliver(&mut self, reply: ProviderReply) {
        match reply {
            ProviderReply::Setup(response) => {
                if self.state.record_setup(response.clone()) {
                    *self.shared.last_setup.write() = Some(response.clone());
                    info!(
                        successful = response.is_successful(),
                        provider = ?response.provider().map(|p| p.name.as_str()),
                        "Setup finished"
                    );
                }
                self.dispatcher.publish(&BillingEvent::Setup(response));
                self.on_response_delivered();
            }
            ProviderReply::Response(response) => {
                if response.kind() == RequestKind::Purchase {
                    self.awaiting = None;
                    self.early_result = None;
                }
                debug!(kind = %response.kind(), status = %response.status(), "Response ready");
                self.dispatcher.publish(&BillingEvent::Billing(response));
                self.on_response_delivered();
            }
            ProviderReply::AwaitingUser(token) => {
                // Still busy: the purchase finishes with the activity result.
                info!(sku = token.sku(), ui = %token.ui(), "Purchase waiting for user");
                self.awaiting = Some(token.clone());
                self.dispatcher.publish(&BillingEvent::InteractionRequired(token));

                let early = self.early_result.take();
                if let Some(result) = early {
                    let token = self
                        .awaiting
                        .take_if(|t| t.matches(result.ui, result.request_code));
                    match token {
                        Some(token) => self.complete(token, result),
                        None => debug!(
                            request_code = result.request_code,
                            "Early activity result not for this purchase"
                        ),
                    }
                }
            }
        }
    }

    /// Runs after every published response: free the provider and start the
    /// next queued request.
    fn on_response_delivered(&mut self) {
        let owner = self.in_flight.take();
        self.state.mark_idle();
        if let Some((helper, request)) = self.scheduler.pop_next(owner) {
            debug!(helper, %request, "Dequeued");
            self.dispatch(helper, request);
        }
    }

    // =========================================================================
    // HOST UI
    // =========================================================================

    fn on_lifecycle(&mut self, event: LifecycleEvent) {
        if event.kind == LifecycleKind::Destroy {
            if let Some(token) = self.awaiting.as_ref().filter(|t| t.ui() == event.ui) {
                warn!(
                    sku = token.sku(),
                    ui = %event.ui,
                    "UI of a pending purchase destroyed, resume it with its token"
                );
            }
        }
        self.dispatcher.publish(&BillingEvent::Lifecycle(event));
    }

    fn on_activity_result(&mut self, result: ActivityResultEvent) {
        let token = self
            .awaiting
            .take_if(|t| t.matches(result.ui, result.request_code));
        self.dispatcher
            .publish(&BillingEvent::ActivityResult(result.clone()));

        if let Some(token) = token {
            self.complete(token, result);
        } else if self.awaiting.is_none() && self.is_launching_purchase() {
            // The store screen answered before the provider returned its token.
            debug!(request_code = result.request_code, "Holding activity result for launching purchase");
            self.early_result = Some(result);
        } else {
            debug!(request_code = result.request_code, "Activity result not for a pending purchase");
        }
    }

    fn is_launching_purchase(&self) -> bool {
        matches!(
            self.state.pending_request(),
            Some(BillingRequest::Purchase { .. })
        )
    }

    fn complete(&mut self, token: InteractionToken, result: ActivityResultEvent) {
        debug!(sku = token.sku(), result_code = result.result_code, "Completing purchase");
        let fallback = BillingRequest::purchase(token.ui(), token.sku());
        self.spawn_call(fallback, move |provider| {
            ProviderReply::Response(provider.complete_purchase(&token, &result).into())
        });
    }

    fn resume(&mut self, token: InteractionToken, ui: UiHandle) {
        let rebound = match &self.awaiting {
            Some(current) if current.id() == token.id() => current.rebind(ui),
            _ => {
                warn!(sku = token.sku(), "No pending purchase for token, resume ignored");
                return;
            }
        };
        info!(sku = rebound.sku(), %ui, "Resuming purchase");
        self.awaiting = Some(rebound.clone());
        let fallback = BillingRequest::purchase(ui, rebound.sku());
        self.spawn_call(fallback, move |provider| {
            outcome_reply(provider.resume_purchase(&rebound))
        });
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn unregister(&mut self, helper: HelperId) {
        self.dispatcher.unregister(helper);
        let dropped = self.scheduler.drop_queue(helper);
        if let Some(slot) = self.slots.remove(&helper) {
            slot.dispose();
        }
        info!(helper, dropped, attached = self.slots.len(), "Helper unregistered");
    }

    /// Attached helpers always have a slot until they unregister, so a missing
    /// slot means the helper is gone.
    fn is_disposed(&self, helper: HelperId) -> bool {
        if helper == CONTEXT_HELPER {
            return false;
        }
        self.slots.get(&helper).map_or(true, |slot| slot.is_disposed())
    }

    fn activate(&self, helper: HelperId) {
        if let Some(slot) = self.slots.get(&helper) {
            slot.activate();
        }
    }

    fn refresh_phases(&self) {
        let setup_done = self.state.setup_response().is_some();
        let dispatching = match self.state.pending_request() {
            None | Some(BillingRequest::Setup) => None,
            Some(_) => self.in_flight,
        };
        for (id, slot) in &self.slots {
            let next = if dispatching == Some(*id) {
                HelperPhase::Dispatching
            } else if setup_done {
                HelperPhase::Ready
            } else {
                HelperPhase::AwaitingSetup
            };
            if let Some(previous) = slot.advance(next) {
                trace!(helper = id, from = ?previous, to = ?next, "Helper phase changed");
            }
        }
    }

    fn setup_provider(&self) -> Option<ProviderInfo> {
        self.state
            .setup_response()
            .and_then(|setup| setup.provider().cloned())
    }
}

/// Run one request against the provider.
fn invoke(provider: &dyn BillingProvider, request: BillingRequest) -> ProviderReply {
    match request {
        BillingRequest::Setup => ProviderReply::Setup(SetupResponse::from_availability(
            provider.info(),
            provider.check_availability(),
        )),
        BillingRequest::Purchase { sku, ui } => outcome_reply(provider.purchase(&sku, ui)),
        BillingRequest::Consume { purchase } => {
            ProviderReply::Response(provider.consume(&purchase).into())
        }
        BillingRequest::SkuDetails { skus } => {
            ProviderReply::Response(provider.sku_details(&skus).into())
        }
        BillingRequest::Inventory { start_over } => {
            ProviderReply::Response(provider.inventory(start_over).into())
        }
    }
}

fn outcome_reply(outcome: PurchaseOutcome) -> ProviderReply {
    match outcome {
        PurchaseOutcome::Completed(response) => ProviderReply::Response(response.into()),
        PurchaseOutcome::AwaitingUser(token) => ProviderReply::AwaitingUser(token),
    }
}

fn failure_reply(
    provider: Option<ProviderInfo>,
    request: &BillingRequest,
    status: Status,
) -> ProviderReply {
    match BillingResponse::failure_for(request, provider.clone(), status) {
        Some(response) => ProviderReply::Response(response),
        None => ProviderReply::Setup(SetupResponse::failed(provider)),
    }
}
