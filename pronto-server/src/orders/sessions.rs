//! 用餐会话操作
//!
//! Open / checkout / settle / move / merge. Session totals only ever change
//! through [`money::apply_delta`].

use redb::WriteTransaction;
use shared::models::{
    DiningSession, DiningTable, FinalizePaymentRequest, MergeSessionsResult, MoveTableResult,
    Order, OrderStatus, Scope, SessionStatus,
};

use super::error::{OrderError, OrderResult};
use super::money::{self, Totals};
use super::notify::Notification;
use super::service::{OrderService, now_millis};
use super::state_machine::{self, Actor, TransitionPayload};

impl OrderService {
    // ========== Tables ==========

    /// Register a dining table
    pub fn add_table(&self, table_number: &str, capacity: u32) -> OrderResult<DiningTable> {
        let table_number = table_number.trim();
        if table_number.is_empty() {
            return Err(OrderError::Validation("table_number is required".to_string()));
        }

        let txn = self.store.begin_write()?;
        if self.store.table_by_number_txn(&txn, table_number)?.is_some() {
            return Err(OrderError::Validation(format!(
                "table {} already exists",
                table_number
            )));
        }
        let table = DiningTable {
            id: self.store.next_id::<DiningTable>(&txn)?,
            table_number: table_number.to_string(),
            capacity,
            is_active: true,
        };
        self.store.put_dining_table(&txn, &table)?;
        self.store.commit(txn)?;
        Ok(table)
    }

    // ========== Reads ==========

    pub fn get_session(&self, session_id: u64) -> OrderResult<DiningSession> {
        self.store
            .get::<DiningSession>(session_id)?
            .ok_or(OrderError::SessionNotFound(session_id))
    }

    pub fn session_orders(&self, session_id: u64) -> OrderResult<Vec<Order>> {
        self.get_session(session_id)?;
        Ok(self.store.session_orders(session_id)?)
    }

    // ========== Lifecycle ==========

    /// Start service at a table
    pub fn open_session(&self, table_id: u64) -> OrderResult<DiningSession> {
        let txn = self.store.begin_write()?;
        let table = self
            .store
            .get_txn::<DiningTable>(&txn, table_id)?
            .filter(|t| t.is_active)
            .ok_or_else(|| OrderError::TableNotFound(table_id.to_string()))?;
        if self.store.open_session_for_table_txn(&txn, table.id)?.is_some() {
            return Err(OrderError::TableOccupied(table.table_number));
        }

        let session = DiningSession {
            id: self.store.next_id::<DiningSession>(&txn)?,
            table_id: table.id,
            table_number: table.table_number.clone(),
            status: SessionStatus::Open,
            subtotal: 0.0,
            tax_amount: 0.0,
            total_amount: 0.0,
            payment_method: None,
            payment_reference: None,
            merged_into: None,
            opened_at: now_millis(),
            closed_at: None,
        };
        self.store.put(&txn, &session)?;
        self.store.occupy_table(&txn, table.id, session.id)?;
        self.store.commit(txn)?;

        tracing::info!(session_id = session.id, table = %table.table_number, "Dining session opened");
        Ok(session)
    }

    /// Ask for the bill: delivered orders move to `AWAITING_PAYMENT`
    pub fn request_checkout(&self, session_id: u64, actor: &Actor) -> OrderResult<DiningSession> {
        if actor.scope() == Some(Scope::Waiter) && !self.policy.waiter_can_collect {
            return Err(OrderError::PermissionDenied(
                "waiters may not collect payment".to_string(),
            ));
        }

        let txn = self.store.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        ensure_active(&session)?;

        let mut events = Vec::new();
        let payload = TransitionPayload::default();
        for mut order in self.store.session_orders_txn(&txn, session_id)? {
            if order.workflow_status != OrderStatus::Delivered {
                continue;
            }
            let to = OrderStatus::AwaitingPayment;
            state_machine::check_transition(&order, to, actor, &payload, &self.policy)?;
            self.apply_transition_txn(&txn, &mut order, to, actor, &payload, &mut events)?;
        }

        // apply_transition_txn never touches session rows for this edge
        session.status = SessionStatus::AwaitingPayment;
        self.store.put(&txn, &session)?;
        self.store.commit(txn)?;

        tracing::info!(session_id, %actor, "Checkout requested");
        self.dispatch(events);
        Ok(session)
    }

    /// Settle every served order and close the session
    ///
    /// Each order is checked against the actor: an administrator settling a
    /// `DELIVERED` order needs a justification.
    pub fn finalize_payment(
        &self,
        session_id: u64,
        req: FinalizePaymentRequest,
        actor: &Actor,
    ) -> OrderResult<DiningSession> {
        state_machine::check_collect(actor, &self.policy)?;
        let payment_method = req
            .payment_method
            .filter(|m| !m.trim().is_empty())
            .ok_or(OrderError::PaymentMethodRequired)?;
        let mut payload = TransitionPayload::payment(payment_method);
        if let Some(reference) = req.reference {
            payload = payload.with_reference(reference);
        }
        if let Some(justification) = req.justification {
            payload = payload.with_justification(justification);
        }

        let txn = self.store.begin_write()?;
        if self.store.active_split_txn(&txn, session_id)?.is_some() {
            return Err(OrderError::SplitAlreadyActive);
        }
        let (mut session, orders) = self.settleable_orders_txn(&txn, session_id)?;
        for order in &orders {
            let to = OrderStatus::Paid;
            state_machine::check_transition(order, to, actor, &payload, &self.policy)?;
        }
        let mut events = Vec::new();
        self.settle_orders_txn(&txn, &mut session, orders, actor, &payload, &mut events)?;
        self.store.commit(txn)?;

        self.dispatch(events);
        Ok(session)
    }

    /// Active session plus its orders that still owe payment
    ///
    /// Fails while any order has not reached the table yet.
    pub(crate) fn settleable_orders_txn(
        &self,
        txn: &WriteTransaction,
        session_id: u64,
    ) -> OrderResult<(DiningSession, Vec<Order>)> {
        let session = self.load_session_txn(txn, session_id)?;
        ensure_active(&session)?;

        let orders = self.store.session_orders_txn(txn, session_id)?;
        if let Some(blocking) = orders
            .iter()
            .find(|o| o.workflow_status.is_before_delivery())
        {
            return Err(OrderError::NotSettleable {
                order_id: blocking.id,
                status: blocking.workflow_status,
            });
        }
        let orders = orders
            .into_iter()
            .filter(|o| o.workflow_status.is_settleable())
            .collect();
        Ok((session, orders))
    }

    /// Mark the given orders paid and close the session (within transaction)
    pub(crate) fn settle_orders_txn(
        &self,
        txn: &WriteTransaction,
        session: &mut DiningSession,
        orders: Vec<Order>,
        actor: &Actor,
        payload: &TransitionPayload,
        events: &mut Vec<Notification>,
    ) -> OrderResult<()> {
        let paid = orders.len();
        for mut order in orders {
            self.apply_transition_txn(txn, &mut order, OrderStatus::Paid, actor, payload, events)?;
        }

        self.close_session_txn(
            txn,
            session,
            payload.payment_method.clone(),
            payload.payment_reference.clone(),
            events,
        )?;
        tracing::info!(
            session_id = session.id,
            orders_paid = paid,
            %actor,
            "Session payment finalized"
        );
        Ok(())
    }

    // ========== Staff Operations ==========

    /// Move a session to another table
    pub fn move_session_to_table(
        &self,
        session_id: u64,
        table_number: &str,
    ) -> OrderResult<MoveTableResult> {
        let txn = self.store.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        ensure_active(&session)?;

        let target = self
            .store
            .table_by_number_txn(&txn, table_number.trim())?
            .filter(|t| t.is_active)
            .ok_or_else(|| OrderError::TableNotFound(table_number.to_string()))?;
        if target.id == session.table_id {
            return Err(OrderError::SameTable(target.table_number));
        }
        if let Some(occupant) = self.store.open_session_for_table_txn(&txn, target.id)?
            && occupant != session.id
        {
            return Err(OrderError::TableOccupied(target.table_number));
        }

        let old_table_number = std::mem::replace(&mut session.table_number, target.table_number.clone());
        if self.store.open_session_for_table_txn(&txn, session.table_id)? == Some(session.id) {
            self.store.free_table(&txn, session.table_id)?;
        }
        session.table_id = target.id;
        self.store.occupy_table(&txn, target.id, session.id)?;
        self.store.put(&txn, &session)?;
        self.store.commit(txn)?;

        tracing::info!(
            session_id,
            from = %old_table_number,
            to = %target.table_number,
            "Session moved to another table"
        );
        Ok(MoveTableResult {
            session_id,
            old_table_number,
            new_table_number: target.table_number,
        })
    }

    /// Merge sessions into the first one
    pub fn merge_sessions(&self, session_ids: &[u64]) -> OrderResult<MergeSessionsResult> {
        let mut ids: Vec<u64> = Vec::with_capacity(session_ids.len());
        for id in session_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        if ids.len() < 2 {
            return Err(OrderError::Validation(
                "at least two distinct sessions are required to merge".to_string(),
            ));
        }

        let txn = self.store.begin_write()?;
        let mut sessions = Vec::with_capacity(ids.len());
        for id in &ids {
            let session = self.load_session_txn(&txn, *id)?;
            ensure_active(&session)?;
            if self.store.active_split_txn(&txn, *id)?.is_some() {
                return Err(OrderError::SplitAlreadyActive);
            }
            sessions.push(session);
        }

        let mut sessions = sessions.into_iter();
        let Some(mut target) = sessions.next() else {
            return Err(OrderError::Validation("no sessions to merge".to_string()));
        };
        let now = now_millis();

        for mut source in sessions {
            for mut order in self.store.session_orders_txn(&txn, source.id)? {
                self.store.unlink_order(&txn, source.id, order.id)?;
                self.store.link_order(&txn, target.id, order.id)?;
                order.session_id = target.id;
                order.version += 1;
                order.updated_at = now;
                self.store.put(&txn, &order)?;
            }

            let moved = Totals {
                subtotal: money::to_decimal(source.subtotal),
                tax_amount: money::to_decimal(source.tax_amount),
                total_amount: money::to_decimal(source.total_amount),
            };
            money::apply_delta(&mut target, &moved);
            money::apply_delta(&mut source, &moved.negated());

            if self.store.open_session_for_table_txn(&txn, source.table_id)? == Some(source.id) {
                self.store.free_table(&txn, source.table_id)?;
            }
            source.status = SessionStatus::Merged;
            source.merged_into = Some(target.id);
            source.closed_at = Some(now);
            self.store.put(&txn, &source)?;
        }

        self.store.put(&txn, &target)?;
        let order_count = self.store.session_order_ids_txn(&txn, target.id)?.len();
        self.store.commit(txn)?;

        tracing::info!(
            session_id = target.id,
            merged = ?&ids[1..],
            order_count,
            total = target.total_amount,
            "Sessions merged"
        );
        Ok(MergeSessionsResult {
            session_id: target.id,
            merged_session_ids: ids[1..].to_vec(),
            order_count,
            subtotal: target.subtotal,
            tax_amount: target.tax_amount,
            total_amount: target.total_amount,
        })
    }
}

fn ensure_active(session: &DiningSession) -> OrderResult<()> {
    match session.status {
        SessionStatus::Paid => Err(OrderError::SessionAlreadyPaid(session.id)),
        status if !status.is_active() => Err(OrderError::SessionNotOpen {
            id: session.id,
            status,
        }),
        _ => Ok(()),
    }
}
