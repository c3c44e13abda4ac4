//! 改单引擎
//!
//! - Customer edits on their own `NEW`/`QUEUED` order apply immediately.
//! - Staff edits always wait for the customer's approval, and approval only
//!   applies them while the order is still `NEW`/`QUEUED`.
//! - Applying a delta recomputes the order totals and rolls the difference
//!   into the session inside the same write transaction.

use redb::WriteTransaction;
use serde::Serialize;
use shared::models::{
    InitiatorRole, ItemChanges, ModificationStatus, Order, OrderModification, Scope,
};

use super::error::{OrderError, OrderResult};
use super::money::{self, Totals};
use super::notify::{Notification, NotificationEvent};
use super::service::{OrderService, now_millis};
use super::state_machine::Actor;

/// Modification together with the order it targets
#[derive(Debug, Clone, Serialize)]
pub struct ModificationOutcome {
    pub modification: OrderModification,
    pub order: Order,
}

fn initiator_role(actor: &Actor) -> InitiatorRole {
    match actor {
        Actor::Customer { .. } => InitiatorRole::Customer,
        Actor::Staff { scope, .. } => match scope {
            Scope::Waiter => InitiatorRole::Waiter,
            Scope::Chef => InitiatorRole::Chef,
            Scope::Cashier => InitiatorRole::Cashier,
            Scope::Admin => InitiatorRole::Admin,
            Scope::System => InitiatorRole::System,
        },
    }
}

impl OrderService {
    /// Whether items may still be edited in place
    pub fn can_modify(order: &Order) -> bool {
        order.workflow_status.can_modify()
    }

    /// Propose (and possibly auto-apply) an item delta
    pub fn create_modification(
        &self,
        order_id: u64,
        changes: ItemChanges,
        initiator: &Actor,
    ) -> OrderResult<ModificationOutcome> {
        if changes.is_empty() {
            return Err(OrderError::Validation(
                "changes must add or remove at least one item".to_string(),
            ));
        }

        let txn = self.store.begin_write()?;
        let mut order = self.load_order_txn(&txn, order_id)?;
        if order.workflow_status.is_final() {
            return Err(OrderError::FinalState {
                order_id,
                status: order.workflow_status,
            });
        }

        let now = now_millis();
        let mut modification = OrderModification {
            id: 0,
            order_id,
            initiated_by_role: initiator_role(initiator),
            initiated_by_customer_id: None,
            initiated_by_employee_id: initiator.employee_id(),
            status: ModificationStatus::Pending,
            changes,
            auto_applied: false,
            reviewed_by_customer_id: None,
            reviewed_by_employee_id: None,
            created_at: now,
            reviewed_at: None,
        };

        let mut events = Vec::new();
        match initiator {
            Actor::Customer { customer_id } => {
                if order.customer_id != Some(*customer_id) {
                    return Err(OrderError::NotOrderOwner);
                }
                if !Self::can_modify(&order) {
                    return Err(OrderError::NotModifiable(order.workflow_status));
                }
                self.apply_changes_txn(&txn, &mut order, &modification.changes)?;
                modification.initiated_by_customer_id = Some(*customer_id);
                modification.status = ModificationStatus::Applied;
                modification.auto_applied = true;
                modification.reviewed_by_customer_id = Some(*customer_id);
                modification.reviewed_at = Some(now);
            }
            Actor::Staff { .. } => {
                // 提前校验，避免顾客批准时才发现菜品不存在
                self.validate_changes(&order, &modification.changes)?;
                events.push(Notification::order(
                    Scope::Waiter,
                    NotificationEvent::ModificationPending,
                    order.id,
                    order.session_id,
                ));
            }
        }

        modification.id = self.store.next_id::<OrderModification>(&txn)?;
        self.store.put_new_modification(&txn, &modification)?;
        self.store.commit(txn)?;

        tracing::info!(
            modification_id = modification.id,
            order_id,
            initiator = %initiator,
            status = ?modification.status,
            "Order modification created"
        );
        self.dispatch(events);
        Ok(ModificationOutcome {
            modification,
            order,
        })
    }

    /// Approve a pending modification and apply it
    pub fn approve_modification(
        &self,
        modification_id: u64,
        reviewer: &Actor,
    ) -> OrderResult<ModificationOutcome> {
        self.review(modification_id, reviewer, true)
    }

    /// Reject a pending modification; totals stay untouched
    pub fn reject_modification(
        &self,
        modification_id: u64,
        reviewer: &Actor,
    ) -> OrderResult<ModificationOutcome> {
        self.review(modification_id, reviewer, false)
    }

    /// Modifications proposed for an order
    pub fn list_modifications(&self, order_id: u64) -> OrderResult<Vec<OrderModification>> {
        self.get_order(order_id)?;
        Ok(self.store.order_modifications(order_id)?)
    }

    fn review(
        &self,
        modification_id: u64,
        reviewer: &Actor,
        approve: bool,
    ) -> OrderResult<ModificationOutcome> {
        let txn = self.store.begin_write()?;
        let mut modification = self
            .store
            .get_txn::<OrderModification>(&txn, modification_id)?
            .ok_or(OrderError::ModificationNotFound(modification_id))?;
        let mut order = self.load_order_txn(&txn, modification.order_id)?;

        match reviewer {
            Actor::Customer { customer_id } => {
                if order.customer_id != Some(*customer_id) {
                    return Err(OrderError::NotOrderOwner);
                }
                modification.reviewed_by_customer_id = Some(*customer_id);
            }
            Actor::Staff { scope, employee_id } => {
                if !scope.is_administrative() {
                    return Err(OrderError::PermissionDenied(
                        "only the ordering customer or an administrator may review changes"
                            .to_string(),
                    ));
                }
                modification.reviewed_by_employee_id = Some(*employee_id);
            }
        }
        if modification.status != ModificationStatus::Pending {
            return Err(OrderError::AlreadyReviewed(modification.status));
        }

        if approve {
            if order.workflow_status.is_final() {
                return Err(OrderError::FinalState {
                    order_id: order.id,
                    status: order.workflow_status,
                });
            }
            // 厨房已开工：只能取消重下
            if !Self::can_modify(&order) {
                return Err(OrderError::NotModifiable(order.workflow_status));
            }
            self.apply_changes_txn(&txn, &mut order, &modification.changes)?;
            modification.status = ModificationStatus::Applied;
        } else {
            modification.status = ModificationStatus::Rejected;
        }
        modification.reviewed_at = Some(now_millis());
        self.store.put(&txn, &modification)?;
        self.store.commit(txn)?;

        tracing::info!(
            modification_id,
            order_id = order.id,
            reviewer = %reviewer,
            status = ?modification.status,
            "Order modification reviewed"
        );
        Ok(ModificationOutcome {
            modification,
            order,
        })
    }

    /// Check a delta without writing anything
    fn validate_changes(&self, order: &Order, changes: &ItemChanges) -> OrderResult<()> {
        self.resolve_items(&changes.items_to_add, order.next_item_id())?;
        for line_id in &changes.items_to_remove {
            if !order.items.iter().any(|i| i.id == *line_id) {
                return Err(OrderError::ItemNotFound(*line_id));
            }
        }
        Ok(())
    }

    /// Apply a delta to the order and its session (within transaction)
    fn apply_changes_txn(
        &self,
        txn: &WriteTransaction,
        order: &mut Order,
        changes: &ItemChanges,
    ) -> OrderResult<()> {
        if self.store.active_split_txn(txn, order.session_id)?.is_some() {
            return Err(OrderError::SplitAlreadyActive);
        }

        let added = self.resolve_items(&changes.items_to_add, order.next_item_id())?;
        for line_id in &changes.items_to_remove {
            let pos = order
                .items
                .iter()
                .position(|i| i.id == *line_id)
                .ok_or(OrderError::ItemNotFound(*line_id))?;
            order.items.remove(pos);
        }
        order.items.extend(added);
        if order.items.is_empty() {
            return Err(OrderError::OrderEmpty);
        }

        let before = Totals::of_order(order);
        let after = money::compute_totals(&order.items, &self.tax);
        after.write_to_order(order);
        order.is_quick_serve = order.items.iter().all(|i| i.is_quick_serve);
        order.version += 1;
        order.updated_at = now_millis();
        self.store.put(txn, order)?;

        let mut session = self.load_session_txn(txn, order.session_id)?;
        money::apply_delta(&mut session, &after.delta_from(&before));
        self.store.put(txn, &session)?;
        Ok(())
    }
}
