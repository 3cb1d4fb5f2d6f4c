#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use shopfront_api::config::AppConfig;
use shopfront_api::entities::{
    exchange, ledger_entry, order, product, product_translation, product_variant, user,
};
use shopfront_api::events::{process_events, EventSender};
use shopfront_api::handlers::AppServices;
use shopfront_api::migrator::Migrator;
use shopfront_api::{api_v1_routes, AppState};

/// Spins up a fresh in-memory database with the full schema applied and
/// returns an application state wired exactly like the production binary.
pub async fn test_state() -> AppState {
    // One connection so every request and raw statement sees the same
    // in-memory database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None).await.expect("migrations failed");

    let config = AppConfig::new(
        "sqlite::memory:".into(),
        "127.0.0.1".into(),
        0,
        "test".into(),
    );

    let (tx, rx) = mpsc::channel(config.event_channel_capacity);
    tokio::spawn(process_events(rx));
    let event_sender = EventSender::new(tx);

    let db = Arc::new(db);
    let services = AppServices::new(db.clone(), Arc::new(event_sender.clone()), &config)
        .expect("failed to build services");

    AppState {
        db,
        config,
        event_sender,
        services,
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("invalid request"),
        )
        .await
        .expect("request failed");
    split_response(response).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "PUT", uri, body).await
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("invalid request"),
        )
        .await
        .expect("request failed");
    split_response(response).await
}

async fn split_response(
    response: axum::response::Response,
) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is not valid JSON")
    };
    (status, json)
}

pub async fn seed_user(
    db: &DatabaseConnection,
    name: &str,
    role: &str,
    is_active: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        email: Set(None),
        phone: Set(None),
        role: Set(role.to_string()),
        pending_balance: Set(Decimal::ZERO),
        is_active: Set(is_active),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("failed to seed user");
    id
}

pub async fn seed_order(
    db: &DatabaseConnection,
    customer_id: Uuid,
    order_number: &str,
    shipping_price: Decimal,
) -> Uuid {
    let id = Uuid::new_v4();
    order::ActiveModel {
        id: Set(id),
        order_number: Set(order_number.to_string()),
        customer_id: Set(customer_id),
        status: Set("pending".to_string()),
        shipping_company: Set(None),
        shipping_wilaya_id: Set(Some(16)),
        shipping_price: Set(shipping_price),
        delivery_person_id: Set(None),
        notes: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        version: Set(1),
    }
    .insert(db)
    .await
    .expect("failed to seed order");
    id
}

pub async fn seed_product(
    db: &DatabaseConnection,
    product_type: &str,
    price: Decimal,
    is_published: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    product::ActiveModel {
        id: Set(id),
        product_type: Set(product_type.to_string()),
        price: Set(price),
        image_url: Set(None),
        is_published: Set(is_published),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("failed to seed product");
    id
}

pub async fn seed_translation(
    db: &DatabaseConnection,
    product_id: Uuid,
    language: &str,
    name: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    product_translation::ActiveModel {
        id: Set(id),
        product_id: Set(product_id),
        language: Set(language.to_string()),
        name: Set(name.to_string()),
        description: Set(None),
    }
    .insert(db)
    .await
    .expect("failed to seed translation");
    id
}

pub async fn seed_variant(db: &DatabaseConnection, product_id: Uuid, color: &str) -> Uuid {
    let id = Uuid::new_v4();
    product_variant::ActiveModel {
        id: Set(id),
        product_id: Set(product_id),
        color: Set(Some(color.to_string())),
        size: Set(None),
        material: Set(None),
        price: Set(None),
        stock: Set(0),
    }
    .insert(db)
    .await
    .expect("failed to seed variant");
    id
}

pub async fn seed_ledger_entry(
    db: &DatabaseConnection,
    description: &str,
    amount: Decimal,
    direction: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    ledger_entry::ActiveModel {
        id: Set(id),
        description: Set(description.to_string()),
        amount: Set(amount),
        entry_type: Set("manual".to_string()),
        direction: Set(direction.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("failed to seed ledger entry");
    id
}

pub async fn seed_exchange(
    db: &DatabaseConnection,
    customer_id: Uuid,
    order_id: Uuid,
    status: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    exchange::ActiveModel {
        id: Set(id),
        customer_id: Set(customer_id),
        order_id: Set(order_id),
        status: Set(status.to_string()),
        reason: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("failed to seed exchange");
    id
}
