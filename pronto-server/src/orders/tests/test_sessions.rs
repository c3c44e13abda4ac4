use super::*;
use shared::models::SessionStatus;

#[test]
fn test_table_numbers_are_unique() {
    let f = create_fixture();
    f.service.add_table("T1", 4).unwrap();
    assert!(matches!(
        f.service.add_table("T1", 2),
        Err(OrderError::Validation(_))
    ));
    assert!(matches!(
        f.service.add_table("  ", 2),
        Err(OrderError::Validation(_))
    ));
}

#[test]
fn test_one_open_session_per_table() {
    let f = create_fixture();
    let table = f.service.add_table("T1", 4).unwrap();
    f.service.open_session(table.id).unwrap();

    let err = f.service.open_session(table.id).unwrap_err();
    assert!(matches!(err, OrderError::TableOccupied(ref n) if n == "T1"));
    assert!(matches!(
        f.service.open_session(999),
        Err(OrderError::TableNotFound(_))
    ));
}

#[test]
fn test_request_checkout_moves_delivered_orders() {
    let f = create_fixture();
    let session = open_table(&f.service, "T1");
    let served = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    let cooking = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    drive_to(&f.service, served.id, OrderStatus::Delivered);
    drive_to(&f.service, cooking.id, OrderStatus::Preparing);

    let session = f.service.request_checkout(session.id, &waiter()).unwrap();
    assert_eq!(session.status, SessionStatus::AwaitingPayment);
    assert_eq!(
        f.service.get_order(served.id).unwrap().workflow_status,
        OrderStatus::AwaitingPayment
    );
    assert_eq!(
        f.service.get_order(cooking.id).unwrap().workflow_status,
        OrderStatus::Preparing
    );

    // 结账中不能再点单
    let err = f
        .service
        .create_order(OrderCreate {
            session_id: session.id,
            customer_id: None,
            items: vec![OrderItemInput {
                menu_item_id: f.burger,
                quantity: 1,
            }],
        })
        .unwrap_err();
    assert!(matches!(err, OrderError::SessionNotOpen { .. }));
}

#[test]
fn test_request_checkout_respects_waiter_policy() {
    let f = create_fixture_with_policy(WorkflowPolicy {
        waiter_can_collect: false,
    });
    let session = open_table(&f.service, "T1");

    let err = f
        .service
        .request_checkout(session.id, &waiter())
        .unwrap_err();
    assert!(matches!(err, OrderError::PermissionDenied(_)));
    assert!(f.service.request_checkout(session.id, &cashier()).is_ok());
}

#[test]
fn test_finalize_pays_every_served_order() {
    let f = create_fixture();
    let table = f.service.add_table("T1", 4).unwrap();
    let session = f.service.open_session(table.id).unwrap();
    let a = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    let b = place_order(&f.service, session.id, None, &[(f.cola, 1)]);
    let c = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    drive_to(&f.service, a.id, OrderStatus::Delivered);
    drive_to(&f.service, b.id, OrderStatus::AwaitingPayment);
    f.service.cancel_order(c.id, &waiter(), None).unwrap();

    let session = f
        .service
        .finalize_payment(session.id, settle(Some("card"), Some("txn-1")), &cashier())
        .unwrap();
    assert_eq!(session.status, SessionStatus::Paid);
    assert_eq!(session.payment_method.as_deref(), Some("card"));
    assert_eq!(session.payment_reference.as_deref(), Some("txn-1"));

    for id in [a.id, b.id] {
        let order = f.service.get_order(id).unwrap();
        assert_eq!(order.workflow_status, OrderStatus::Paid);
        assert_eq!(order.payment_method.as_deref(), Some("card"));
    }
    assert_eq!(
        f.service.get_order(c.id).unwrap().workflow_status,
        OrderStatus::Cancelled
    );
    assert!(f.service.open_session(table.id).is_ok());
}

#[test]
fn test_finalize_blocked_by_kitchen_orders() {
    let f = create_fixture();
    let session = open_table(&f.service, "T1");
    let served = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    let cooking = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    drive_to(&f.service, served.id, OrderStatus::Delivered);
    drive_to(&f.service, cooking.id, OrderStatus::Queued);

    let err = f
        .service
        .finalize_payment(session.id, settle(Some("cash"), None), &cashier())
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::NotSettleable { order_id, status: OrderStatus::Queued } if order_id == cooking.id
    ));
    // 整体回滚
    assert_eq!(
        f.service.get_order(served.id).unwrap().workflow_status,
        OrderStatus::Delivered
    );
}

#[test]
fn test_finalize_twice_is_conflict() {
    let f = create_fixture();
    let session = open_table(&f.service, "T1");
    let order = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    drive_to(&f.service, order.id, OrderStatus::Delivered);

    f.service
        .finalize_payment(session.id, settle(Some("cash"), None), &cashier())
        .unwrap();
    let err = f
        .service
        .finalize_payment(session.id, settle(Some("cash"), None), &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::SessionAlreadyPaid(_)));

    assert!(matches!(
        f.service.finalize_payment(session.id, settle(None, None), &cashier()),
        Err(OrderError::PaymentMethodRequired)
    ));
}

#[test]
fn test_finalize_needs_a_collecting_role() {
    let f = create_fixture_with_policy(WorkflowPolicy {
        waiter_can_collect: false,
    });
    let session = open_table(&f.service, "T1");
    let order = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    drive_to(&f.service, order.id, OrderStatus::AwaitingPayment);

    for actor in [chef(), waiter(), Actor::customer(7)] {
        let err = f
            .service
            .finalize_payment(session.id, settle(Some("cash"), None), &actor)
            .unwrap_err();
        assert!(matches!(err, OrderError::RoleDenied { to: OrderStatus::Paid, .. }));
    }
    assert_ne!(
        f.service.get_session(session.id).unwrap().status,
        SessionStatus::Paid
    );
    assert_eq!(
        f.service.get_order(order.id).unwrap().workflow_status,
        OrderStatus::AwaitingPayment
    );

    let session = f
        .service
        .finalize_payment(session.id, settle(Some("cash"), None), &cashier())
        .unwrap();
    assert_eq!(session.status, SessionStatus::Paid);
}

#[test]
fn test_admin_finalize_of_delivered_orders_needs_justification() {
    let f = create_fixture();
    let session = open_table(&f.service, "T1");
    let order = place_order(&f.service, session.id, None, &[(f.burger, 1)]);
    drive_to(&f.service, order.id, OrderStatus::Delivered);

    let err = f
        .service
        .finalize_payment(session.id, settle(Some("cash"), None), &admin())
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::JustificationRequired {
            from: OrderStatus::Delivered,
            to: OrderStatus::Paid
        }
    ));
    assert_eq!(
        f.service.get_order(order.id).unwrap().workflow_status,
        OrderStatus::Delivered
    );

    let mut req = settle(Some("cash"), None);
    req.justification = Some("guest left in a hurry".to_string());
    let session = f
        .service
        .finalize_payment(session.id, req, &admin())
        .unwrap();
    assert_eq!(session.status, SessionStatus::Paid);
    let audit = f.service.order_audit(order.id).unwrap();
    let last = audit.last().unwrap();
    assert_eq!(last.to_status, OrderStatus::Paid);
    assert_eq!(last.justification.as_deref(), Some("guest left in a hurry"));
}

#[test]
fn test_move_session_to_free_table() {
    let f = create_fixture();
    let t1 = f.service.add_table("T1", 4).unwrap();
    let t2 = f.service.add_table("T2", 4).unwrap();
    let session = f.service.open_session(t1.id).unwrap();

    let moved = f.service.move_session_to_table(session.id, "T2").unwrap();
    assert_eq!(moved.old_table_number, "T1");
    assert_eq!(moved.new_table_number, "T2");

    let session = f.service.get_session(session.id).unwrap();
    assert_eq!(session.table_id, t2.id);
    assert_eq!(session.table_number, "T2");

    // T1 已空，T2 已占用
    assert!(f.service.open_session(t1.id).is_ok());
    assert!(matches!(
        f.service.open_session(t2.id),
        Err(OrderError::TableOccupied(_))
    ));
}

#[test]
fn test_move_session_errors() {
    let f = create_fixture();
    let session = open_table(&f.service, "T1");
    open_table(&f.service, "T2");

    assert!(matches!(
        f.service.move_session_to_table(session.id, "T2"),
        Err(OrderError::TableOccupied(_))
    ));
    assert!(matches!(
        f.service.move_session_to_table(session.id, "T1"),
        Err(OrderError::SameTable(_))
    ));
    assert!(matches!(
        f.service.move_session_to_table(session.id, "T9"),
        Err(OrderError::TableNotFound(_))
    ));
    assert!(matches!(
        f.service.move_session_to_table(999, "T2"),
        Err(OrderError::SessionNotFound(999))
    ));
}

#[test]
fn test_merge_sessions_moves_orders_and_totals() {
    let f = create_fixture();
    let t2 = f.service.add_table("T2", 4).unwrap();
    let target = open_table(&f.service, "T1");
    let source = f.service.open_session(t2.id).unwrap();
    place_order(&f.service, target.id, None, &[(f.burger, 1)]);
    let moved = place_order(&f.service, source.id, None, &[(f.burger, 2)]);

    let result = f
        .service
        .merge_sessions(&[target.id, source.id, source.id])
        .unwrap();
    assert_eq!(result.session_id, target.id);
    assert_eq!(result.merged_session_ids, vec![source.id]);
    assert_eq!(result.order_count, 2);
    assert_eq!(result.subtotal, 30.0);
    assert_eq!(result.total_amount, 34.8);

    let source = f.service.get_session(source.id).unwrap();
    assert_eq!(source.status, SessionStatus::Merged);
    assert_eq!(source.merged_into, Some(target.id));
    assert_eq!(source.total_amount, 0.0);

    let moved = f.service.get_order(moved.id).unwrap();
    assert_eq!(moved.session_id, target.id);
    assert_eq!(f.service.session_orders(target.id).unwrap().len(), 2);
    assert!(f.service.session_orders(source.id).unwrap().is_empty());

    // 源桌台释放
    assert!(f.service.open_session(t2.id).is_ok());
}

#[test]
fn test_merge_requires_two_active_sessions() {
    let f = create_fixture();
    let a = open_table(&f.service, "T1");
    let b = open_table(&f.service, "T2");

    assert!(matches!(
        f.service.merge_sessions(&[a.id]),
        Err(OrderError::Validation(_))
    ));
    assert!(matches!(
        f.service.merge_sessions(&[a.id, a.id]),
        Err(OrderError::Validation(_))
    ));
    assert!(matches!(
        f.service.merge_sessions(&[a.id, 999]),
        Err(OrderError::SessionNotFound(999))
    ));

    f.service.merge_sessions(&[a.id, b.id]).unwrap();
    assert!(matches!(
        f.service.merge_sessions(&[a.id, b.id]),
        Err(OrderError::SessionNotOpen {
            status: SessionStatus::Merged,
            ..
        })
    ));
}
