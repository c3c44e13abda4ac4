use super::*;
use crate::store::Store;
use shared::models::{
    DiningSession, FinalizePaymentRequest, MenuItem, Order, OrderCreate, OrderItemInput,
    OrderStatus, Scope,
};
use std::sync::Arc;

mod test_sessions;

const TAX_RATE: f64 = 0.16;

struct Fixture {
    service: OrderService,
    notifier: Arc<BroadcastNotifier>,
    burger: u64,
    cola: u64,
}

fn create_fixture_with_policy(policy: WorkflowPolicy) -> Fixture {
    let store = Store::open_in_memory().unwrap();
    let notifier = Arc::new(BroadcastNotifier::new(64));
    let service = OrderService::new(
        store.clone(),
        Arc::new(store),
        notifier.clone(),
        TaxPolicy::new(TAX_RATE, false),
        policy,
    );
    let burger = add_menu_item(&service, "Burger", 10.0, false);
    let cola = add_menu_item(&service, "Cola", 2.5, true);
    Fixture {
        service,
        notifier,
        burger,
        cola,
    }
}

fn create_fixture() -> Fixture {
    create_fixture_with_policy(WorkflowPolicy::default())
}

fn add_menu_item(service: &OrderService, name: &str, price: f64, quick: bool) -> u64 {
    service
        .store()
        .insert(|id| MenuItem {
            id,
            name: name.to_string(),
            price,
            is_available: true,
            is_quick_serve: quick,
        })
        .unwrap()
        .id
}

fn open_table(service: &OrderService, number: &str) -> DiningSession {
    let table = service.add_table(number, 4).unwrap();
    service.open_session(table.id).unwrap()
}

fn place_order(
    service: &OrderService,
    session_id: u64,
    customer_id: Option<u64>,
    items: &[(u64, u32)],
) -> Order {
    service
        .create_order(OrderCreate {
            session_id,
            customer_id,
            items: items
                .iter()
                .map(|(menu_item_id, quantity)| OrderItemInput {
                    menu_item_id: *menu_item_id,
                    quantity: *quantity,
                })
                .collect(),
        })
        .unwrap()
}

fn settle(method: Option<&str>, reference: Option<&str>) -> FinalizePaymentRequest {
    FinalizePaymentRequest {
        payment_method: method.map(str::to_string),
        reference: reference.map(str::to_string),
        justification: None,
    }
}

fn waiter() -> Actor {
    Actor::staff(Scope::Waiter, 10)
}

fn chef() -> Actor {
    Actor::staff(Scope::Chef, 20)
}

fn cashier() -> Actor {
    Actor::staff(Scope::Cashier, 30)
}

fn admin() -> Actor {
    Actor::staff(Scope::Admin, 40)
}

/// Walk an order along the happy path until it reaches `target`
fn drive_to(service: &OrderService, order_id: u64, target: OrderStatus) -> Order {
    let steps = [
        (OrderStatus::Queued, waiter()),
        (OrderStatus::Preparing, chef()),
        (OrderStatus::Ready, chef()),
        (OrderStatus::Delivered, waiter()),
        (OrderStatus::AwaitingPayment, cashier()),
    ];
    let mut order = service.get_order(order_id).unwrap();
    for (status, actor) in steps {
        if order.workflow_status == target {
            break;
        }
        if !state_machine::is_edge_allowed(order.workflow_status, status) {
            continue;
        }
        order = service
            .transition(order_id, status, &actor, TransitionPayload::default())
            .unwrap()
            .order;
    }
    assert_eq!(order.workflow_status, target, "could not drive order to {target}");
    order
}
