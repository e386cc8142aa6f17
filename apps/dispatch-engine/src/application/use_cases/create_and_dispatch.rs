//! Create And Dispatch Use Case
//!
//! Turns a master instruction into persisted child orders and launches one
//! execution task per child. Everything up to the launch is synchronous;
//! the caller gets the plan back while the children execute.

use std::sync::Arc;
use std::time::Instant;

use crate::application::dto::{DispatchRequest, DispatchResult, MarginFailure};
use crate::application::ports::{
    EventPublisherPort, OrderStore, QuoteSourcePort, RandomSource, Topic,
};
use crate::application::services::{
    DispatchGuard, DispatchPlan, DispatchPlanner, ExecutionSimulator, SummaryAggregator,
    summary_event,
};
use crate::domain::accounts::AccountRepository;
use crate::domain::order_dispatch::{
    AccountAssigned, ChildOrder, CreateMasterCommand, MasterCreated, MasterOrder, NewChildOrder,
    OrderEvent, PlannedChild,
};
use crate::error::DispatchError;
use crate::observability::{record_child_created, record_dispatch};

/// Use case for creating a master order and dispatching its children.
pub struct CreateAndDispatchUseCase<A, S, Q, E, R>
where
    A: AccountRepository,
    S: OrderStore,
    Q: QuoteSourcePort,
    E: EventPublisherPort,
    R: RandomSource,
{
    planner: Arc<DispatchPlanner<A, Q>>,
    store: Arc<S>,
    publisher: Arc<E>,
    aggregator: Arc<SummaryAggregator<S, E>>,
    simulator: Arc<ExecutionSimulator<S, Q, E, R>>,
    guard: Arc<DispatchGuard>,
}

impl<A, S, Q, E, R> CreateAndDispatchUseCase<A, S, Q, E, R>
where
    A: AccountRepository,
    S: OrderStore + 'static,
    Q: QuoteSourcePort + 'static,
    E: EventPublisherPort + 'static,
    R: RandomSource + 'static,
{
    /// Create a new `CreateAndDispatchUseCase`.
    pub const fn new(
        planner: Arc<DispatchPlanner<A, Q>>,
        store: Arc<S>,
        publisher: Arc<E>,
        aggregator: Arc<SummaryAggregator<S, E>>,
        simulator: Arc<ExecutionSimulator<S, Q, E, R>>,
        guard: Arc<DispatchGuard>,
    ) -> Self {
        Self {
            planner,
            store,
            publisher,
            aggregator,
            simulator,
            guard,
        }
    }

    /// Validate, plan, persist and launch.
    #[tracing::instrument(skip(self, request), fields(symbol = %request.symbol, master_qty = request.master_qty))]
    pub async fn execute(&self, request: &DispatchRequest) -> Result<DispatchResult, DispatchError> {
        let started = Instant::now();
        let result = self.dispatch(request).await;
        let outcome = match &result {
            Ok(_) => "ACCEPTED",
            Err(e) => e.code().as_str(),
        };
        record_dispatch(outcome, started.elapsed().as_secs_f64());

        match &result {
            Ok(r) => tracing::info!(
                master_order_id = %r.master_order_id,
                children = r.dispatch_plan.len(),
                dispatched_qty = r.dispatched_qty,
                skipped = r.failures.len(),
                "Master order dispatched"
            ),
            Err(e) => tracing::info!(code = %e.code(), error = %e, "Dispatch refused"),
        }
        result
    }

    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResult, DispatchError> {
        // 1. Validate and plan (quote, risk, targets, presence, allocation)
        let plan = self.planner.plan(request).await?;

        // 2. Persist the master as DISPATCHING
        let mut master = MasterOrder::new(CreateMasterCommand {
            user_id: request.user_id.clone(),
            symbol: plan.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            price: request.price,
            trigger_price: request.trigger_price,
            effective_price: plan.effective_price,
            product_type: request.product_type,
            validity: request.validity,
            lot: plan.lot,
            master_qty: request.master_qty,
            allocation_mode: request.allocation_mode,
            allocation_params: request.allocation_params.clone(),
            targets: request.targets.clone(),
            allow_partial: request.allow_partial,
        });
        master.begin_dispatch(plan.requested_qty())?;
        self.store.insert_master(&master).await?;

        let mut topics = vec![Topic::Order(master.id().clone())];
        if let Some(user_id) = master.user_id() {
            topics.push(Topic::User(user_id.clone()));
        }
        self.emit(
            &topics,
            &OrderEvent::MasterCreated(MasterCreated {
                master: master.clone(),
            }),
        )
        .await;

        // 3. Margin gate, child creation and plan bookkeeping
        let master_id = master.id().clone();
        let lock = self.aggregator.acquire(&master_id).await;
        let created = match self.create_children(&mut master, &plan, request).await {
            Ok(created) => created,
            Err(e) => {
                self.fail_after_error(&mut master, &e).await;
                return Err(e);
            }
        };
        drop(lock);

        // 4. Launch at most once per (master, account)
        let (children, dispatch_plan, failures) = created;
        for child in children {
            if self.guard.try_claim(child.master_id(), child.account_id()) {
                self.simulator.launch(child);
            } else {
                tracing::debug!(
                    child_order_id = %child.id(),
                    account_id = %child.account_id(),
                    "Duplicate dispatch claim ignored"
                );
            }
        }

        Ok(DispatchResult {
            master_order_id: master_id,
            effective_price: plan.effective_price,
            requested_qty: master.summary().requested_qty,
            dispatched_qty: master.summary().dispatched_qty,
            dispatch_plan,
            failures,
        })
    }

    async fn create_children(
        &self,
        master: &mut MasterOrder,
        plan: &DispatchPlan,
        request: &DispatchRequest,
    ) -> Result<(Vec<ChildOrder>, Vec<PlannedChild>, Vec<MarginFailure>), DispatchError> {
        if !request.allow_partial
            && let Some(share) = plan.first_margin_failure()
        {
            master.fail(format!("insufficient margin on {}", share.account.id))?;
            self.store.update_master(master).await?;
            self.emit_summary(master, Vec::new(), &[]).await;
            return Err(DispatchError::MarginFail {
                master_id: master.id().clone(),
                account_id: share.account.id.clone(),
                required_margin: share.margin.required,
                capital: share.margin.capital,
            });
        }

        let mut children = Vec::with_capacity(plan.shares.len());
        let mut planned = Vec::with_capacity(plan.shares.len());
        let mut failures = Vec::new();

        for share in &plan.shares {
            if !share.margin.passes() {
                tracing::debug!(
                    account_id = %share.account.id,
                    required_margin = %share.margin.required,
                    capital = %share.margin.capital,
                    "Skipping account with insufficient margin"
                );
                failures.push(MarginFailure {
                    account_id: share.account.id.clone(),
                    qty: share.qty,
                    required_margin: share.margin.required,
                    capital: share.margin.capital,
                });
                continue;
            }

            let child = ChildOrder::new(NewChildOrder {
                master_id: master.id().clone(),
                account_id: share.account.id.clone(),
                user_id: share.account.user_id.clone(),
                broker: share.account.broker,
                symbol: plan.symbol.clone(),
                side: master.side(),
                order_type: master.order_type(),
                product_type: master.product_type(),
                qty: share.qty,
                price: master.price(),
                trigger_price: master.trigger_price(),
            })?;
            self.store.insert_child(&child).await?;
            record_child_created(child.broker().label());
            self.emit(
                &[
                    Topic::Order(master.id().clone()),
                    Topic::Account(child.account_id().clone()),
                ],
                &OrderEvent::ChildCreated(child.clone()),
            )
            .await;

            planned.push(PlannedChild {
                child_id: child.id().clone(),
                account_id: child.account_id().clone(),
                qty: child.qty(),
                required_margin: share.margin.required,
            });
            children.push(child);
        }

        if children.is_empty() {
            master.fail("no dispatchable children")?;
            self.store.update_master(master).await?;
            self.emit_summary(master, Vec::new(), &[]).await;
            return Err(DispatchError::NoDispatchableChildren {
                master_id: master.id().clone(),
            });
        }

        let dispatched_qty = children.iter().map(ChildOrder::qty).sum();
        master.record_dispatched(dispatched_qty, children.len());
        self.store.update_master(master).await?;

        self.emit_summary(master, planned.clone(), &children).await;
        for entry in &planned {
            self.emit(
                &[Topic::Account(entry.account_id.clone())],
                &OrderEvent::AccountAssigned(AccountAssigned {
                    master_id: master.id().clone(),
                    account_id: entry.account_id.clone(),
                    symbol: master.symbol().clone(),
                    side: master.side(),
                    order_type: master.order_type(),
                    my_planned_qty: entry.qty,
                    required_margin: entry.required_margin,
                }),
            )
            .await;
        }

        Ok((children, planned, failures))
    }

    /// Mark the master FAILED after an infrastructure error, best-effort.
    async fn fail_after_error(&self, master: &mut MasterOrder, error: &DispatchError) {
        if master.status().is_terminal() {
            return;
        }
        if master.fail(format!("dispatch aborted: {error}")).is_ok()
            && let Err(e) = self.store.update_master(master).await
        {
            tracing::error!(master_order_id = %master.id(), error = %e, "Failed to mark master failed");
        }
    }

    async fn emit_summary(&self, master: &MasterOrder, plan: Vec<PlannedChild>, children: &[ChildOrder]) {
        self.emit(
            &[Topic::Order(master.id().clone())],
            &summary_event(master, plan, children),
        )
        .await;
    }

    async fn emit(&self, topics: &[Topic], event: &OrderEvent) {
        if let Err(e) = self.publisher.publish_order_event(topics, event).await {
            tracing::warn!(event = event.event_name(), error = %e, "Failed to publish dispatch event");
        }
    }

    /// Launch a persisted child, honoring the at-most-once guard.
    ///
    /// Returns false when the (master, account) pair was already launched.
    pub fn relaunch(&self, child: ChildOrder) -> bool {
        if !self.guard.try_claim(child.master_id(), child.account_id()) {
            return false;
        }
        self.simulator.launch(child);
        true
    }
}
