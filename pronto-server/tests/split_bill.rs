//! Split bill over HTTP: creation, per-person payment, session settlement

mod common;

use common::*;
use http::StatusCode;
use serde_json::json;

/// Open a session with one delivered burger (total 11.60)
async fn served_session(t: &TestApp, r: &Restaurant) -> (u64, u64) {
    let session_id = open_session(t, r).await;
    let order_id = place_order(t, r, session_id, json!([{"menu_item_id": r.burger.id, "quantity": 1}])).await;
    deliver(t, r, order_id).await;
    (session_id, order_id)
}

#[tokio::test]
async fn test_equal_split_settles_session_on_last_payment() {
    let t = test_app();
    let r = restaurant(&t).await;
    let (session_id, order_id) = served_session(&t, &r).await;

    let res = post(
        &t.app,
        &format!("/cashier/api/sessions/{}/split-bills", session_id),
        &r.cashier,
        json!({"split_type": "equal", "number_of_people": 2}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["split"]["status"], "active");
    let split_id = res.body["split"]["id"].as_u64().unwrap();
    let people: Vec<u64> = res.body["people"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            assert!((p["total_amount"].as_f64().unwrap() - 5.8).abs() < 1e-9);
            p["id"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(people.len(), 2);

    let pay = |person: u64| format!("/cashier/api/split-bills/people/{}/pay", person);

    let res = post(&t.app, &pay(people[0]), &r.cashier, json!({})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), 5001);

    let res = post(&t.app, &pay(people[0]), &r.cashier, json!({"payment_method": "card"})).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["split_completed"], false);
    assert_eq!(res.body["session_status"], "open");

    let res = post(&t.app, &pay(people[0]), &r.cashier, json!({"payment_method": "card"})).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), 5006);

    let res = post(&t.app, &pay(people[1]), &r.cashier, json!({"payment_method": "cash"})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["split_completed"], true);
    assert_eq!(res.body["session_status"], "paid");

    let res = post(&t.app, &pay(people[1]), &r.cashier, json!({"payment_method": "cash"})).await;
    assert_eq!(res.code(), 5004);

    let detail = get(&t.app, &format!("/api/split-bills/{}", split_id), &r.waiter).await;
    assert_eq!(detail.body["split"]["status"], "completed");

    let order = get(&t.app, &format!("/api/orders/{}", order_id), &r.waiter).await;
    assert_eq!(order.body["workflow_status"], "PAID");
    let session = get(&t.app, &format!("/api/sessions/{}", session_id), &r.waiter).await;
    assert_eq!(session.body["payment_method"], "split_bill");
}

#[tokio::test]
async fn test_active_split_freezes_the_session() {
    let t = test_app();
    let r = restaurant(&t).await;
    let (session_id, order_id) = served_session(&t, &r).await;

    let uri = format!("/cashier/api/sessions/{}/split-bills", session_id);
    let res = post(&t.app, &uri, &r.cashier, json!({"split_type": "custom", "amounts": [6.0, 5.6]})).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);

    let res = post(&t.app, &uri, &r.cashier, json!({"split_type": "equal", "number_of_people": 3})).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), 5005);

    let res = post(
        &t.app,
        "/waiter/api/orders",
        &r.waiter,
        json!({"session_id": session_id, "items": [{"menu_item_id": r.cola.id, "quantity": 1}]}),
    )
    .await;
    assert_eq!(res.code(), 5005);

    let res = post(
        &t.app,
        &format!("/cashier/api/sessions/{}/finalize", session_id),
        &r.cashier,
        json!({"payment_method": "cash"}),
    )
    .await;
    assert_eq!(res.code(), 5005);

    // 作废已上菜订单会让各人份额对不上
    let res = transition(
        &t,
        "admin",
        &r.admin,
        order_id,
        json!({"to_status": "CANCELLED", "reason": "wrong table"}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), 5005);
    let session = get(&t.app, &format!("/api/sessions/{}", session_id), &r.waiter).await;
    assert!((session.body["total_amount"].as_f64().unwrap() - 11.6).abs() < 1e-9);
}

#[tokio::test]
async fn test_split_request_validation() {
    let t = test_app();
    let r = restaurant(&t).await;
    let (session_id, _) = served_session(&t, &r).await;
    let uri = format!("/cashier/api/sessions/{}/split-bills", session_id);

    let res = post(&t.app, &uri, &r.cashier, json!({"split_type": "equal", "number_of_people": 1})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = post(&t.app, &uri, &r.cashier, json!({"split_type": "custom", "amounts": [5.0, 5.0]})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), 5007);

    for people in [51, 400] {
        let res = post(
            &t.app,
            &uri,
            &r.cashier,
            json!({"split_type": "equal", "number_of_people": people}),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{people}: {}", res.body);
    }

    let res = get(&t.app, "/cashier/api/split-bills/999", &r.cashier).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.code(), 5002);
}

#[tokio::test]
async fn test_split_waits_for_the_kitchen() {
    let t = test_app();
    let r = restaurant(&t).await;
    let (session_id, _) = served_session(&t, &r).await;
    place_order(&t, &r, session_id, json!([{"menu_item_id": r.burger.id, "quantity": 1}])).await;

    let res = post(
        &t.app,
        &format!("/cashier/api/sessions/{}/split-bills", session_id),
        &r.cashier,
        json!({"split_type": "equal", "number_of_people": 2}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), 4011);
}

#[tokio::test]
async fn test_split_shares_stay_positive_for_a_large_table() {
    let t = test_app();
    let r = restaurant(&t).await;
    let (session_id, _) = served_session(&t, &r).await;

    let res = post(
        &t.app,
        &format!("/cashier/api/sessions/{}/split-bills", session_id),
        &r.cashier,
        json!({"split_type": "equal", "number_of_people": 50}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let shares: Vec<f64> = res.body["people"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["total_amount"].as_f64().unwrap())
        .collect();
    assert_eq!(shares.len(), 50);
    assert!(shares.iter().all(|s| *s >= 0.01));
    let cents: i64 = shares.iter().map(|s| (s * 100.0).round() as i64).sum();
    assert_eq!(cents, 1160);
}

#[tokio::test]
async fn test_split_payment_needs_a_collecting_role() {
    let mut config = test_config();
    config.waiter_can_collect = false;
    let t = test_app_with(config);
    let r = restaurant(&t).await;
    let (session_id, _) = served_session(&t, &r).await;

    let res = post(
        &t.app,
        &format!("/cashier/api/sessions/{}/split-bills", session_id),
        &r.cashier,
        json!({"split_type": "equal", "number_of_people": 2}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let person = res.body["people"][0]["id"].as_u64().unwrap();

    for (console, token) in [("chef", &r.chef), ("waiter", &r.waiter)] {
        let res = post(
            &t.app,
            &format!("/{}/api/split-bills/people/{}/pay", console, person),
            token,
            json!({"payment_method": "cash"}),
        )
        .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "{console}: {}", res.body);
        assert_eq!(res.code(), 2002);
    }

    let res = post(
        &t.app,
        &format!("/cashier/api/split-bills/people/{}/pay", person),
        &r.cashier,
        json!({"payment_method": "cash"}),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}
