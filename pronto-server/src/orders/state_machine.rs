//! 订单状态机
//!
//! Pure decision functions: which edges exist, who may take them and which
//! payload fields each edge requires. Persistence and side effects live in
//! [`super::OrderService`].
//!
//! ```text
//! NEW → QUEUED → PREPARING → READY → DELIVERED → AWAITING_PAYMENT → PAID
//!   └──────┴─────────┴─────────┴─────────┴──────────────┴──→ CANCELLED
//!                                        └──────────────────→ PAID
//! ```

use super::error::{OrderError, OrderResult};
use shared::models::{Order, OrderStatus, Scope, TransitionRequest};
use std::fmt;

/// Who is acting on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Guest acting from their own device
    Customer { customer_id: u64 },
    /// Staff member acting under the token's active scope
    Staff { scope: Scope, employee_id: u64 },
}

impl Actor {
    pub fn staff(scope: Scope, employee_id: u64) -> Self {
        Actor::Staff { scope, employee_id }
    }

    pub fn customer(customer_id: u64) -> Self {
        Actor::Customer { customer_id }
    }

    pub fn scope(&self) -> Option<Scope> {
        match self {
            Actor::Customer { .. } => None,
            Actor::Staff { scope, .. } => Some(*scope),
        }
    }

    pub fn is_administrative(&self) -> bool {
        self.scope().is_some_and(|s| s.is_administrative())
    }

    pub fn employee_id(&self) -> Option<u64> {
        match self {
            Actor::Staff { employee_id, .. } => Some(*employee_id),
            Actor::Customer { .. } => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Customer { customer_id } => write!(f, "customer:{}", customer_id),
            Actor::Staff { scope, employee_id } => write!(f, "{}:{}", scope, employee_id),
        }
    }
}

/// Optional fields carried with a transition
#[derive(Debug, Clone, Default)]
pub struct TransitionPayload {
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub justification: Option<String>,
    pub reason: Option<String>,
}

impl TransitionPayload {
    pub fn payment(method: impl Into<String>) -> Self {
        Self {
            payment_method: Some(method.into()),
            ..Default::default()
        }
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.payment_reference = Some(reference.into());
        self
    }
}

impl From<TransitionRequest> for TransitionPayload {
    fn from(req: TransitionRequest) -> Self {
        Self {
            payment_method: req.payment_method,
            payment_reference: req.payment_reference,
            justification: req.justification,
            reason: req.reason,
        }
    }
}

/// Deployment-level workflow switches
#[derive(Debug, Clone, Copy)]
pub struct WorkflowPolicy {
    /// Waiters may take payment
    pub waiter_can_collect: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            waiter_can_collect: true,
        }
    }
}

/// Edge table (without actor rules)
pub fn is_edge_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    if from.is_final() {
        return false;
    }
    matches!(
        (from, to),
        (New, Queued)
            | (Queued, Preparing)
            | (Preparing, Ready)
            | (Ready, Delivered)
            | (Delivered, AwaitingPayment)
            | (Delivered, Paid)
            | (AwaitingPayment, Paid)
            | (_, Cancelled)
    )
}

/// Scopes that may move an order into `to` (cancellation excluded)
fn scope_allowed(scope: Scope, to: OrderStatus, policy: &WorkflowPolicy) -> bool {
    use OrderStatus::*;

    if scope.is_administrative() {
        return true;
    }
    match to {
        Queued | Delivered => scope == Scope::Waiter,
        Preparing | Ready => scope == Scope::Chef,
        AwaitingPayment => matches!(scope, Scope::Waiter | Scope::Cashier),
        Paid => scope == Scope::Cashier || (scope == Scope::Waiter && policy.waiter_can_collect),
        New | Cancelled => false,
    }
}

/// Cancellation rules by current status
fn can_cancel(actor: &Actor, from: OrderStatus) -> bool {
    match actor {
        Actor::Customer { .. } => matches!(from, OrderStatus::New | OrderStatus::Queued),
        Actor::Staff { scope, .. } => {
            if from.is_before_delivery() {
                true
            } else {
                // 已上菜：只有管理员可以取消
                scope.is_administrative()
            }
        }
    }
}

/// Whether `actor` may take payment at all
///
/// Session settlement and split-bill shares go through this gate; single
/// orders get the same rule from [`check_transition`].
pub fn check_collect(actor: &Actor, policy: &WorkflowPolicy) -> OrderResult<()> {
    let allowed = match actor {
        Actor::Customer { .. } => false,
        Actor::Staff { scope, .. } => scope_allowed(*scope, OrderStatus::Paid, policy),
    };
    if allowed {
        Ok(())
    } else {
        Err(OrderError::RoleDenied {
            actor: actor.to_string(),
            to: OrderStatus::Paid,
        })
    }
}

/// Console order entry: waiters and administrative scopes
pub fn can_place_order(actor: &Actor) -> bool {
    match actor {
        Actor::Customer { .. } => true,
        Actor::Staff { scope, .. } => *scope == Scope::Waiter || scope.is_administrative(),
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Validate a requested transition
///
/// Check order: final status, same status, edge, ownership, actor rules,
/// then required payload fields.
pub fn check_transition(
    order: &Order,
    to: OrderStatus,
    actor: &Actor,
    payload: &TransitionPayload,
    policy: &WorkflowPolicy,
) -> OrderResult<()> {
    let from = order.workflow_status;

    if from.is_final() {
        return Err(OrderError::FinalState {
            order_id: order.id,
            status: from,
        });
    }
    if from == to {
        return Err(OrderError::AlreadyInStatus(to));
    }
    if !is_edge_allowed(from, to) {
        return Err(OrderError::InvalidTransition { from, to });
    }

    if let Actor::Customer { customer_id } = actor
        && order.customer_id != Some(*customer_id)
    {
        return Err(OrderError::NotOrderOwner);
    }

    if to == OrderStatus::Cancelled {
        if !can_cancel(actor, from) {
            return Err(OrderError::CancellationForbidden {
                actor: actor.to_string(),
                status: from,
            });
        }
        return Ok(());
    }

    let allowed = match actor {
        Actor::Customer { .. } => to == OrderStatus::AwaitingPayment,
        Actor::Staff { scope, .. } => scope_allowed(*scope, to, policy),
    };
    if !allowed {
        return Err(OrderError::RoleDenied {
            actor: actor.to_string(),
            to,
        });
    }

    if to == OrderStatus::Paid {
        if !has_text(&payload.payment_method) {
            return Err(OrderError::PaymentMethodRequired);
        }
        // 管理员越过收银流程直接结账，必须留下理由
        if from == OrderStatus::Delivered
            && actor.is_administrative()
            && !has_text(&payload.justification)
        {
            return Err(OrderError::JustificationRequired { from, to });
        }
    }

    Ok(())
}

/// Where an accepted transition actually lands
///
/// Accepting an all-quick-serve order skips the kitchen.
pub fn landing_status(order: &Order, to: OrderStatus) -> OrderStatus {
    if order.workflow_status == OrderStatus::New
        && to == OrderStatus::Queued
        && order.is_quick_serve
    {
        OrderStatus::Ready
    } else {
        to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 8] = [
        New,
        Queued,
        Preparing,
        Ready,
        Delivered,
        AwaitingPayment,
        Paid,
        Cancelled,
    ];

    fn order(status: OrderStatus) -> Order {
        Order {
            id: 1,
            session_id: 1,
            customer_id: Some(42),
            waiter_id: None,
            workflow_status: status,
            items: vec![],
            subtotal: 0.0,
            tax_amount: 0.0,
            total_amount: 0.0,
            is_quick_serve: false,
            payment_method: None,
            payment_reference: None,
            justification: None,
            cancel_reason: None,
            version: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn check(status: OrderStatus, to: OrderStatus, actor: Actor, payload: TransitionPayload) -> OrderResult<()> {
        check_transition(&order(status), to, &actor, &payload, &WorkflowPolicy::default())
    }

    fn admin() -> Actor {
        Actor::staff(Scope::Admin, 1)
    }

    #[test]
    fn test_final_states_reject_everything() {
        for from in [Paid, Cancelled] {
            for to in ALL {
                let result = check(from, to, admin(), TransitionPayload::payment("cash"));
                assert!(
                    matches!(result, Err(OrderError::FinalState { .. })),
                    "{from} -> {to} must be rejected"
                );
            }
        }
    }

    #[test]
    fn test_same_status_is_conflict() {
        let result = check(Queued, Queued, admin(), TransitionPayload::default());
        assert!(matches!(result, Err(OrderError::AlreadyInStatus(Queued))));
    }

    #[test]
    fn test_skipping_states_is_invalid() {
        let result = check(New, Delivered, admin(), TransitionPayload::default());
        assert!(matches!(result, Err(OrderError::InvalidTransition { from: New, to: Delivered })));
        let result = check(New, Paid, admin(), TransitionPayload::payment("cash"));
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn test_kitchen_transitions_need_chef() {
        let waiter = Actor::staff(Scope::Waiter, 2);
        let chef = Actor::staff(Scope::Chef, 3);
        assert!(matches!(
            check(Queued, Preparing, waiter, TransitionPayload::default()),
            Err(OrderError::RoleDenied { .. })
        ));
        assert!(check(Queued, Preparing, chef, TransitionPayload::default()).is_ok());
        assert!(check(New, Queued, waiter, TransitionPayload::default()).is_ok());
        assert!(check(New, Queued, chef, TransitionPayload::default()).is_err());
    }

    #[test]
    fn test_paid_requires_payment_method() {
        let cashier = Actor::staff(Scope::Cashier, 4);
        let result = check(AwaitingPayment, Paid, cashier, TransitionPayload::default());
        assert!(matches!(result, Err(OrderError::PaymentMethodRequired)));

        let blank = TransitionPayload {
            payment_method: Some("  ".into()),
            ..Default::default()
        };
        assert!(check(AwaitingPayment, Paid, cashier, blank).is_err());
        assert!(check(AwaitingPayment, Paid, cashier, TransitionPayload::payment("card")).is_ok());
    }

    #[test]
    fn test_admin_delivered_to_paid_requires_justification() {
        let result = check(Delivered, Paid, admin(), TransitionPayload::payment("cash"));
        assert!(matches!(result, Err(OrderError::JustificationRequired { .. })));

        let payload = TransitionPayload::payment("cash").with_justification("comped by manager");
        assert!(check(Delivered, Paid, admin(), payload).is_ok());

        // cashier settling at the table follows the normal flow
        let cashier = Actor::staff(Scope::Cashier, 4);
        assert!(check(Delivered, Paid, cashier, TransitionPayload::payment("cash")).is_ok());
    }

    #[test]
    fn test_waiter_collect_switch() {
        let waiter = Actor::staff(Scope::Waiter, 2);
        let payload = TransitionPayload::payment("cash");
        let strict = WorkflowPolicy {
            waiter_can_collect: false,
        };
        assert!(check(AwaitingPayment, Paid, waiter, payload.clone()).is_ok());
        assert!(matches!(
            check_transition(&order(AwaitingPayment), Paid, &waiter, &payload, &strict),
            Err(OrderError::RoleDenied { .. })
        ));
    }

    #[test]
    fn test_collect_gate_follows_paid_column() {
        let strict = WorkflowPolicy {
            waiter_can_collect: false,
        };
        let lax = WorkflowPolicy::default();

        assert!(check_collect(&Actor::staff(Scope::Cashier, 4), &strict).is_ok());
        assert!(check_collect(&admin(), &strict).is_ok());
        assert!(check_collect(&Actor::staff(Scope::System, 1), &strict).is_ok());
        assert!(check_collect(&Actor::staff(Scope::Waiter, 2), &lax).is_ok());
        for (actor, policy) in [
            (Actor::staff(Scope::Waiter, 2), strict),
            (Actor::staff(Scope::Chef, 3), lax),
            (Actor::customer(42), lax),
        ] {
            assert!(matches!(
                check_collect(&actor, &policy),
                Err(OrderError::RoleDenied { to: Paid, .. })
            ));
        }
    }

    #[test]
    fn test_order_entry_scopes() {
        assert!(can_place_order(&Actor::staff(Scope::Waiter, 2)));
        assert!(can_place_order(&admin()));
        assert!(can_place_order(&Actor::customer(42)));
        assert!(!can_place_order(&Actor::staff(Scope::Chef, 3)));
        assert!(!can_place_order(&Actor::staff(Scope::Cashier, 4)));
    }

    #[test]
    fn test_cancellation_rules() {
        let waiter = Actor::staff(Scope::Waiter, 2);
        let cashier = Actor::staff(Scope::Cashier, 4);
        let none = TransitionPayload::default;

        for actor in [waiter, cashier] {
            assert!(matches!(
                check(Delivered, Cancelled, actor, none()),
                Err(OrderError::CancellationForbidden { .. })
            ));
            assert!(check(Preparing, Cancelled, actor, none()).is_ok());
        }
        assert!(check(Delivered, Cancelled, admin(), none()).is_ok());
        assert!(check(AwaitingPayment, Cancelled, Actor::staff(Scope::System, 1), none()).is_ok());

        let owner = Actor::customer(42);
        assert!(check(New, Cancelled, owner, none()).is_ok());
        assert!(check(Queued, Cancelled, owner, none()).is_ok());
        assert!(matches!(
            check(Preparing, Cancelled, owner, none()),
            Err(OrderError::CancellationForbidden { .. })
        ));
    }

    #[test]
    fn test_customer_must_own_order() {
        let stranger = Actor::customer(7);
        assert!(matches!(
            check(New, Cancelled, stranger, TransitionPayload::default()),
            Err(OrderError::NotOrderOwner)
        ));
    }

    #[test]
    fn test_quick_serve_lands_on_ready() {
        let mut o = order(New);
        assert_eq!(landing_status(&o, Queued), Queued);
        o.is_quick_serve = true;
        assert_eq!(landing_status(&o, Queued), Ready);
        assert_eq!(landing_status(&o, Cancelled), Cancelled);
    }
}
