//! Order service - 订单业务入口
//!
//! Every public operation runs inside exactly one redb write transaction:
//!
//! ```text
//! begin_write ─▶ load aggregate ─▶ state_machine check ─▶ mutate + audit ─▶ commit ─▶ notify
//! ```
//!
//! Notifications are collected during the transaction and only dispatched
//! after a successful commit.

use std::sync::Arc;

use redb::WriteTransaction;
use shared::models::{
    DiningSession, MenuItem, Order, OrderAudit, OrderCreate, OrderItem, OrderItemInput,
    OrderStatus, Scope, SessionStatus, TransitionResult,
};

use super::error::{OrderError, OrderResult};
use super::money::{self, TaxPolicy, Totals};
use super::notify::{Notification, NotificationEvent, Notifier};
use super::state_machine::{self, Actor, TransitionPayload, WorkflowPolicy};
use crate::store::{StorageResult, Store};

/// Maximum quantity per order line
pub const MAX_QUANTITY: u32 = 999;

/// Menu lookups needed by the ordering core
pub trait MenuCatalog: Send + Sync {
    fn menu_item(&self, menu_item_id: u64) -> StorageResult<Option<MenuItem>>;

    fn is_available(&self, menu_item_id: u64) -> StorageResult<bool> {
        Ok(self
            .menu_item(menu_item_id)?
            .is_some_and(|item| item.is_available))
    }
}

impl MenuCatalog for Store {
    fn menu_item(&self, menu_item_id: u64) -> StorageResult<Option<MenuItem>> {
        self.get::<MenuItem>(menu_item_id)
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderService {
    pub(crate) store: Store,
    pub(crate) catalog: Arc<dyn MenuCatalog>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) tax: TaxPolicy,
    pub(crate) policy: WorkflowPolicy,
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("tax", &self.tax)
            .field("policy", &self.policy)
            .finish()
    }
}

impl OrderService {
    pub fn new(
        store: Store,
        catalog: Arc<dyn MenuCatalog>,
        notifier: Arc<dyn Notifier>,
        tax: TaxPolicy,
        policy: WorkflowPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            notifier,
            tax,
            policy,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    pub(crate) fn dispatch(&self, events: Vec<Notification>) {
        for event in events {
            self.notifier.notify(event);
        }
    }

    // ========== Reads ==========

    pub fn get_order(&self, order_id: u64) -> OrderResult<Order> {
        self.store
            .get::<Order>(order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Transition history of an order, oldest first
    pub fn order_audit(&self, order_id: u64) -> OrderResult<Vec<OrderAudit>> {
        Ok(self.store.order_audit(order_id)?)
    }

    pub(crate) fn load_order_txn(&self, txn: &WriteTransaction, order_id: u64) -> OrderResult<Order> {
        self.store
            .get_txn::<Order>(txn, order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    pub(crate) fn load_session_txn(
        &self,
        txn: &WriteTransaction,
        session_id: u64,
    ) -> OrderResult<DiningSession> {
        self.store
            .get_txn::<DiningSession>(txn, session_id)?
            .ok_or(OrderError::SessionNotFound(session_id))
    }

    // ========== Creation ==========

    /// Resolve requested lines against the catalog, numbering them from `first_id`
    pub(crate) fn resolve_items(
        &self,
        inputs: &[OrderItemInput],
        first_id: u64,
    ) -> OrderResult<Vec<OrderItem>> {
        let mut lines = Vec::with_capacity(inputs.len());
        for (offset, input) in inputs.iter().enumerate() {
            if input.quantity == 0 || input.quantity > MAX_QUANTITY {
                return Err(OrderError::Validation(format!(
                    "quantity must be between 1 and {}, got {}",
                    MAX_QUANTITY, input.quantity
                )));
            }
            let item = self
                .catalog
                .menu_item(input.menu_item_id)?
                .ok_or(OrderError::MenuItemNotFound(input.menu_item_id))?;
            if !item.is_available {
                return Err(OrderError::MenuItemUnavailable(item.id));
            }
            lines.push(OrderItem {
                id: first_id + offset as u64,
                menu_item_id: item.id,
                name: item.name,
                quantity: input.quantity,
                unit_price: item.price,
                line_total: money::line_total(item.price, input.quantity),
                is_quick_serve: item.is_quick_serve,
            });
        }
        Ok(lines)
    }

    /// Place a new order against an open session
    pub fn create_order(&self, req: OrderCreate) -> OrderResult<Order> {
        if req.items.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }
        let items = self.resolve_items(&req.items, 1)?;

        let txn = self.store.begin_write()?;
        let mut session = self.load_session_txn(&txn, req.session_id)?;
        if session.status != SessionStatus::Open {
            return Err(OrderError::SessionNotOpen {
                id: session.id,
                status: session.status,
            });
        }
        if self.store.active_split_txn(&txn, session.id)?.is_some() {
            return Err(OrderError::SplitAlreadyActive);
        }

        let now = now_millis();
        let mut order = Order {
            id: self.store.next_id::<Order>(&txn)?,
            session_id: session.id,
            customer_id: req.customer_id,
            waiter_id: None,
            workflow_status: OrderStatus::New,
            is_quick_serve: items.iter().all(|i| i.is_quick_serve),
            items,
            subtotal: 0.0,
            tax_amount: 0.0,
            total_amount: 0.0,
            payment_method: None,
            payment_reference: None,
            justification: None,
            cancel_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        let totals = money::compute_totals(&order.items, &self.tax);
        totals.write_to_order(&mut order);
        money::apply_delta(&mut session, &totals);

        self.store.put(&txn, &order)?;
        self.store.link_order(&txn, session.id, order.id)?;
        self.store.put(&txn, &session)?;
        self.store.commit(txn)?;

        tracing::info!(
            order_id = order.id,
            session_id = session.id,
            items = order.items.len(),
            total = order.total_amount,
            quick_serve = order.is_quick_serve,
            "Order created"
        );
        self.notifier.notify(Notification::order(
            Scope::Waiter,
            NotificationEvent::OrderCreated,
            order.id,
            session.id,
        ));
        Ok(order)
    }

    /// Place an order from a staff console
    pub fn place_order(&self, req: OrderCreate, actor: &Actor) -> OrderResult<Order> {
        if !state_machine::can_place_order(actor) {
            return Err(OrderError::PermissionDenied(format!(
                "{} may not place orders",
                actor
            )));
        }
        let order = self.create_order(req)?;
        tracing::debug!(order_id = order.id, %actor, "Order placed from console");
        Ok(order)
    }

    // ========== Transitions ==========

    /// Move an order to `to` on behalf of `actor`
    pub fn transition(
        &self,
        order_id: u64,
        to: OrderStatus,
        actor: &Actor,
        payload: TransitionPayload,
    ) -> OrderResult<TransitionResult> {
        let txn = self.store.begin_write()?;
        let mut order = self.load_order_txn(&txn, order_id)?;
        let from = order.workflow_status;

        if let Err(e) = state_machine::check_transition(&order, to, actor, &payload, &self.policy) {
            tracing::warn!(order_id, %from, %to, %actor, error = %e, "Transition rejected");
            return Err(e);
        }
        // 分单进行中，取消会让各人应付金额与会话总额脱节
        if to == OrderStatus::Cancelled
            && self.store.active_split_txn(&txn, order.session_id)?.is_some()
        {
            tracing::warn!(order_id, %from, %actor, "Cancellation blocked by active split bill");
            return Err(OrderError::SplitAlreadyActive);
        }
        let landed = state_machine::landing_status(&order, to);

        let mut events = Vec::new();
        self.apply_transition_txn(&txn, &mut order, landed, actor, &payload, &mut events)?;
        let session_finalized = if landed == OrderStatus::Paid {
            self.settle_session_if_complete_txn(&txn, order.session_id, &mut events)?
        } else {
            false
        };
        self.store.commit(txn)?;

        tracing::info!(
            order_id,
            %from,
            to = %landed,
            %actor,
            version = order.version,
            session_finalized,
            "Order transitioned"
        );
        self.dispatch(events);

        Ok(TransitionResult {
            order,
            previous_status: from,
            session_finalized,
        })
    }

    /// Waiter accepts a new order into the kitchen queue
    pub fn accept_or_queue(&self, order_id: u64, waiter_id: u64) -> OrderResult<TransitionResult> {
        self.transition(
            order_id,
            OrderStatus::Queued,
            &Actor::staff(Scope::Waiter, waiter_id),
            TransitionPayload::default(),
        )
    }

    pub fn pay_order(
        &self,
        order_id: u64,
        payment_method: Option<String>,
        actor: &Actor,
        justification: Option<String>,
    ) -> OrderResult<TransitionResult> {
        let payload = TransitionPayload {
            payment_method,
            justification,
            ..Default::default()
        };
        self.transition(order_id, OrderStatus::Paid, actor, payload)
    }

    pub fn cancel_order(
        &self,
        order_id: u64,
        actor: &Actor,
        reason: Option<String>,
    ) -> OrderResult<TransitionResult> {
        let payload = TransitionPayload {
            reason,
            ..Default::default()
        };
        self.transition(order_id, OrderStatus::Cancelled, actor, payload)
    }

    /// Write a checked transition and its side effects (within transaction)
    ///
    /// Does not settle the session; callers decide when that happens.
    pub(crate) fn apply_transition_txn(
        &self,
        txn: &WriteTransaction,
        order: &mut Order,
        to: OrderStatus,
        actor: &Actor,
        payload: &TransitionPayload,
        events: &mut Vec<Notification>,
    ) -> OrderResult<()> {
        let from = order.workflow_status;
        let (order_id, session_id) = (order.id, order.session_id);

        order.workflow_status = to;
        order.version += 1;
        order.updated_at = now_millis();

        match to {
            OrderStatus::Queued => events.push(Notification::order(
                Scope::Chef,
                NotificationEvent::OrderQueued,
                order_id,
                session_id,
            )),
            OrderStatus::Ready => events.push(Notification::order(
                Scope::Waiter,
                NotificationEvent::OrderReady,
                order_id,
                session_id,
            )),
            OrderStatus::Paid => {
                order.payment_method = payload.payment_method.clone();
                order.payment_reference = payload.payment_reference.clone();
                events.push(Notification::order(
                    Scope::Cashier,
                    NotificationEvent::OrderPaid,
                    order_id,
                    session_id,
                ));
            }
            OrderStatus::Cancelled => {
                order.cancel_reason = payload.reason.clone();
                let mut session = self.load_session_txn(txn, session_id)?;
                money::apply_delta(&mut session, &Totals::of_order(order).negated());
                self.store.put(txn, &session)?;
                if matches!(
                    from,
                    OrderStatus::Queued | OrderStatus::Preparing | OrderStatus::Ready
                ) {
                    events.push(Notification::order(
                        Scope::Chef,
                        NotificationEvent::OrderCancelled,
                        order_id,
                        session_id,
                    ));
                }
            }
            _ => {}
        }

        if from == OrderStatus::New
            && let Actor::Staff {
                scope: Scope::Waiter,
                employee_id,
            } = actor
        {
            order.waiter_id.get_or_insert(*employee_id);
        }
        let justification = payload
            .justification
            .as_deref()
            .map(str::trim)
            .filter(|j| !j.is_empty())
            .map(str::to_string);
        if justification.is_some() {
            order.justification = justification.clone();
        }

        self.store.put(txn, order)?;

        let audit = OrderAudit {
            id: self.store.next_id::<OrderAudit>(txn)?,
            order_id,
            from_status: from,
            to_status: to,
            actor: actor.to_string(),
            justification,
            reason: payload.reason.clone(),
            created_at: order.updated_at,
        };
        self.store.put_audit(txn, &audit)?;
        Ok(())
    }

    /// Close the session once every live order is paid (within transaction)
    ///
    /// Deferred while a split bill is active: the split settles the session.
    pub(crate) fn settle_session_if_complete_txn(
        &self,
        txn: &WriteTransaction,
        session_id: u64,
        events: &mut Vec<Notification>,
    ) -> OrderResult<bool> {
        if self.store.active_split_txn(txn, session_id)?.is_some() {
            tracing::debug!(session_id, "Session settlement deferred to split bill");
            return Ok(false);
        }

        let orders = self.store.session_orders_txn(txn, session_id)?;
        let live: Vec<&Order> = orders
            .iter()
            .filter(|o| o.workflow_status != OrderStatus::Cancelled)
            .collect();
        if live.is_empty() || !live.iter().all(|o| o.workflow_status == OrderStatus::Paid) {
            return Ok(false);
        }

        let mut session = self.load_session_txn(txn, session_id)?;
        if !session.status.is_active() {
            return Ok(false);
        }
        let method = live.last().and_then(|o| o.payment_method.clone());
        self.close_session_txn(txn, &mut session, method, None, events)?;
        Ok(true)
    }

    /// Mark a session paid and free its table (within transaction)
    pub(crate) fn close_session_txn(
        &self,
        txn: &WriteTransaction,
        session: &mut DiningSession,
        payment_method: Option<String>,
        payment_reference: Option<String>,
        events: &mut Vec<Notification>,
    ) -> OrderResult<()> {
        session.status = SessionStatus::Paid;
        session.payment_method = payment_method;
        session.payment_reference = payment_reference;
        session.closed_at = Some(now_millis());

        if self.store.open_session_for_table_txn(txn, session.table_id)? == Some(session.id) {
            self.store.free_table(txn, session.table_id)?;
        }
        self.store.put(txn, session)?;

        tracing::info!(
            session_id = session.id,
            total = session.total_amount,
            "Dining session paid"
        );
        events.push(Notification::session(
            Scope::Cashier,
            NotificationEvent::SessionPaid,
            session.id,
        ));
        Ok(())
    }
}
