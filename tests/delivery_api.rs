mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn assignment_ships_the_order_and_accrues_the_shipping_price() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let courier = common::seed_user(&db, "Karim", "delivery", true).await;
    let order_id = common::seed_order(&db, customer, "ORD-100", dec!(500)).await;

    let (status, body) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({"order_id": order_id, "delivery_person_id": courier}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order_status"], "shipped");
    assert_eq!(body["data"]["accrued"], json!("500"));
    assert_eq!(body["data"]["new_pending_balance"], json!("500"));

    let (status, body) =
        common::get(&app, &format!("/api/v1/delivery/{}/balance", courier)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pending_balance"], json!("500"));
}

#[tokio::test]
async fn reassignment_is_rejected_and_never_double_accrues() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let courier = common::seed_user(&db, "Karim", "delivery", true).await;
    let other_courier = common::seed_user(&db, "Yacine", "delivery", true).await;
    let order_id = common::seed_order(&db, customer, "ORD-101", dec!(750)).await;

    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({"order_id": order_id, "delivery_person_id": courier}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same courier again
    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({"order_id": order_id, "delivery_person_id": courier}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A different courier cannot take over either
    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({"order_id": order_id, "delivery_person_id": other_courier}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = common::get(&app, &format!("/api/v1/delivery/{}/balance", courier)).await;
    assert_eq!(body["data"]["pending_balance"], json!("750"));
    let (_, body) =
        common::get(&app, &format!("/api/v1/delivery/{}/balance", other_courier)).await;
    assert_eq!(body["data"]["pending_balance"], json!("0"));
}

#[tokio::test]
async fn assignment_requires_an_active_delivery_role() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let clerk = common::seed_user(&db, "Nadia", "staff", true).await;
    let retired = common::seed_user(&db, "Omar", "delivery", false).await;

    let order_a = common::seed_order(&db, customer, "ORD-102", dec!(500)).await;
    let order_b = common::seed_order(&db, customer, "ORD-103", dec!(500)).await;

    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({"order_id": order_a, "delivery_person_id": clerk}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({"order_id": order_b, "delivery_person_id": retired}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Failed attempts leave the orders untouched
    let (_, body) = common::get(&app, &format!("/api/v1/orders/{}", order_a)).await;
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["delivery_person_id"].is_null());
}

#[tokio::test]
async fn failed_accrual_rolls_back_the_order_assignment() {
    use sea_orm::ConnectionTrait;

    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let courier = common::seed_user(&db, "Karim", "delivery", true).await;
    let order_id = common::seed_order(&db, customer, "ORD-105", dec!(500)).await;

    // Make the balance write fail after the order write has gone through
    db.execute_unprepared(
        "CREATE TRIGGER block_accrual BEFORE UPDATE OF pending_balance ON users \
         BEGIN SELECT RAISE(ABORT, 'accrual blocked'); END;",
    )
    .await
    .unwrap();

    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({"order_id": order_id, "delivery_person_id": courier}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The order write happened first inside the transaction and must
    // have been rolled back with the failed accrual
    let (_, body) = common::get(&app, &format!("/api/v1/orders/{}", order_id)).await;
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["delivery_person_id"].is_null());

    let (_, body) = common::get(&app, &format!("/api/v1/delivery/{}/balance", courier)).await;
    assert_eq!(body["data"]["pending_balance"], json!("0"));
}

#[tokio::test]
async fn assigning_a_missing_order_or_person_returns_not_found() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let customer = common::seed_user(&db, "Alice", "customer", true).await;
    let courier = common::seed_user(&db, "Karim", "delivery", true).await;
    let order_id = common::seed_order(&db, customer, "ORD-104", dec!(500)).await;

    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({
            "order_id": "00000000-0000-0000-0000-000000000000",
            "delivery_person_id": courier
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::post_json(
        &app,
        "/api/v1/delivery/assign",
        json!({
            "order_id": order_id,
            "delivery_person_id": "00000000-0000-0000-0000-000000000000"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn personnel_listing_excludes_inactive_and_other_roles() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    common::seed_user(&db, "Karim", "delivery", true).await;
    common::seed_user(&db, "Omar", "delivery", false).await;
    common::seed_user(&db, "Nadia", "staff", true).await;

    let (status, body) = common::get(&app, "/api/v1/delivery/personnel").await;
    assert_eq!(status, StatusCode::OK);
    let personnel = body["data"].as_array().unwrap();
    assert_eq!(personnel.len(), 1);
    assert_eq!(personnel[0]["name"], "Karim");
}
