//! 集成测试公共工具
//!
//! 内存 redb + 完整路由，通过 `tower::ServiceExt::oneshot` 发请求。

#![allow(dead_code)]

use std::collections::BTreeSet;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use pronto_server::auth::JwtConfig;
use pronto_server::{Config, ServerState, Store};
use serde_json::{Value, json};
use shared::models::{Employee, MenuItem, Role, Scope};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-key-0123456789abcdef";

pub struct TestApp {
    pub state: ServerState,
    pub app: Router,
}

pub fn test_config() -> Config {
    Config::with_overrides("/tmp/pronto-test", 0, JwtConfig::with_secret(TEST_SECRET))
}

pub fn test_app() -> TestApp {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> TestApp {
    let store = Store::open_in_memory().unwrap();
    let state = ServerState::new(config, store);
    let app = pronto_server::api::build_app(&state);
    TestApp { state, app }
}

/// Insert an employee without hashing a password (token tests only)
pub fn seed_employee(state: &ServerState, email: &str, primary: Role, extra: &[Role]) -> Employee {
    let store = &state.store;
    let txn = store.begin_write().unwrap();
    let employee = Employee {
        id: store.next_id::<Employee>(&txn).unwrap(),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        password_hash: String::new(),
        primary_role: primary,
        additional_roles: extra.iter().copied().collect::<BTreeSet<_>>(),
        is_active: true,
    };
    store.put_employee(&txn, &employee).unwrap();
    store.commit(txn).unwrap();
    employee
}

pub fn deactivate(state: &ServerState, employee: &Employee) {
    let store = &state.store;
    let txn = store.begin_write().unwrap();
    let mut employee = employee.clone();
    employee.is_active = false;
    store.put_employee(&txn, &employee).unwrap();
    store.commit(txn).unwrap();
}

pub fn seed_menu_item(state: &ServerState, name: &str, price: f64, quick: bool) -> MenuItem {
    state
        .store
        .insert(|id| MenuItem {
            id,
            name: name.to_string(),
            price,
            is_available: true,
            is_quick_serve: quick,
        })
        .unwrap()
}

pub fn access_token(state: &ServerState, employee: &Employee, scope: Option<Scope>) -> String {
    state.get_jwt_service().issue_access(employee, scope).unwrap()
}

pub fn refresh_token(state: &ServerState, employee: &Employee) -> String {
    state.get_jwt_service().issue_refresh(employee.id).unwrap().0
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Error code of a `{code, message, details}` body
    pub fn code(&self) -> u64 {
        self.body["code"].as_u64().unwrap_or_default()
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str, token: &str) -> TestResponse {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post(app: &Router, uri: &str, token: &str, body: Value) -> TestResponse {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

/// Staff tokens for every console, plus a table ready for service
pub struct Restaurant {
    pub waiter: String,
    pub chef: String,
    pub cashier: String,
    pub admin: String,
    pub burger: MenuItem,
    pub cola: MenuItem,
    pub table_id: u64,
}

pub async fn restaurant(app: &TestApp) -> Restaurant {
    let state = &app.state;
    let waiter = seed_employee(state, "waiter@pronto.test", Role::Waiter, &[]);
    let chef = seed_employee(state, "chef@pronto.test", Role::Chef, &[]);
    let cashier = seed_employee(state, "cashier@pronto.test", Role::Cashier, &[]);
    let admin = seed_employee(state, "admin@pronto.test", Role::Admin, &[]);
    let admin_token = access_token(state, &admin, Some(Scope::Admin));

    let table = post(
        &app.app,
        "/admin/api/tables",
        &admin_token,
        json!({"table_number": "T1", "capacity": 4}),
    )
    .await;
    assert_eq!(table.status, StatusCode::CREATED, "{}", table.body);

    Restaurant {
        waiter: access_token(state, &waiter, Some(Scope::Waiter)),
        chef: access_token(state, &chef, Some(Scope::Chef)),
        cashier: access_token(state, &cashier, Some(Scope::Cashier)),
        admin: admin_token,
        burger: seed_menu_item(state, "Burger", 10.0, false),
        cola: seed_menu_item(state, "Cola", 2.5, true),
        table_id: table.body["id"].as_u64().unwrap(),
    }
}

pub async fn open_session(t: &TestApp, r: &Restaurant) -> u64 {
    let res = post(&t.app, "/waiter/api/sessions", &r.waiter, json!({"table_id": r.table_id})).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["status"], "open");
    res.body["id"].as_u64().unwrap()
}

pub async fn place_order(t: &TestApp, r: &Restaurant, session_id: u64, items: Value) -> u64 {
    let res = post(
        &t.app,
        "/waiter/api/orders",
        &r.waiter,
        json!({"session_id": session_id, "items": items}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["workflow_status"], "NEW");
    res.body["id"].as_u64().unwrap()
}

pub async fn transition(
    t: &TestApp,
    console: &str,
    token: &str,
    order_id: u64,
    body: Value,
) -> TestResponse {
    post(
        &t.app,
        &format!("/{}/api/orders/{}/transition", console, order_id),
        token,
        body,
    )
    .await
}

/// Walk an order through the kitchen and hand it to the guest
pub async fn deliver(t: &TestApp, r: &Restaurant, order_id: u64) {
    let steps = [
        ("waiter", &r.waiter, "QUEUED"),
        ("chef", &r.chef, "PREPARING"),
        ("chef", &r.chef, "READY"),
        ("waiter", &r.waiter, "DELIVERED"),
    ];
    for (console, token, to) in steps {
        let res = transition(t, console, token, order_id, json!({"to_status": to})).await;
        assert_eq!(res.status, StatusCode::OK, "{to}: {}", res.body);
        assert_eq!(res.body["order"]["workflow_status"], to);
    }
}
