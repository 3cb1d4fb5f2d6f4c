mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn list_orders_filters_by_customer_and_sorts_newest_first() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let alice = common::seed_user(&db, "Alice", "customer", true).await;
    let bob = common::seed_user(&db, "Bob", "customer", true).await;

    common::seed_order(&db, alice, "ORD-001", dec!(500)).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    common::seed_order(&db, alice, "ORD-002", dec!(600)).await;
    common::seed_order(&db, bob, "ORD-003", dec!(700)).await;

    let (status, body) =
        common::get(&app, &format!("/api/v1/orders?customer_id={}", alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let orders = body["data"]["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    // Newest first
    assert_eq!(orders[0]["order_number"], "ORD-002");
    assert_eq!(orders[1]["order_number"], "ORD-001");
    assert_eq!(body["data"]["total"], json!(2));
}

#[tokio::test]
async fn unknown_status_filter_is_rejected() {
    let state = common::test_state().await;
    let app = common::app(state);

    let (status, body) = common::get(&app, "/api/v1/orders?status=teleported").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn missing_order_returns_not_found_body() {
    let state = common::test_state().await;
    let app = common::app(state);

    let (status, body) = common::get(
        &app,
        "/api/v1/orders/00000000-0000-0000-0000-000000000000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].as_str().unwrap().contains("not found"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn orders_can_be_looked_up_by_number() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let order_id = common::seed_order(&db, customer, "ORD-042", dec!(500)).await;

    let (status, body) = common::get(&app, "/api/v1/orders/number/ORD-042").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], order_id.to_string());
    assert_eq!(body["data"]["order_number"], "ORD-042");

    let (status, body) = common::get(&app, "/api/v1/orders/number/ORD-999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn order_status_update_persists_and_bumps_version() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let order_id = common::seed_order(&db, customer, "ORD-010", dec!(400)).await;

    let (status, body) = common::put_json(
        &app,
        &format!("/api/v1/orders/{}/status", order_id),
        json!({"status": "confirmed"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["version"], json!(2));

    let (status, body) = common::get(&app, &format!("/api/v1/orders/{}", order_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
    assert!(body["data"]["items"].is_array());
}

#[tokio::test]
async fn invalid_status_update_is_rejected() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let order_id = common::seed_order(&db, customer, "ORD-011", dec!(400)).await;

    let (status, _) = common::put_json(
        &app,
        &format!("/api/v1/orders/{}/status", order_id),
        json!({"status": "lost-in-transit"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
