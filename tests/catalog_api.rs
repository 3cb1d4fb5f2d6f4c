mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn product_detail_carries_translations_and_variants() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let product_id = common::seed_product(&db, "shoes", dec!(3000), true).await;
    common::seed_translation(&db, product_id, "fr", "Chaussures").await;
    common::seed_translation(&db, product_id, "ar", "حذاء").await;

    let (status, body) = common::get(&app, &format!("/api/v1/products/{}", product_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product_type"], "shoes");
    assert_eq!(body["data"]["translations"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["variants"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn missing_product_returns_not_found() {
    let state = common::test_state().await;
    let app = common::app(state);

    let (status, body) = common::get(
        &app,
        "/api/v1/products/00000000-0000-0000-0000-000000000000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn listing_filters_by_type_and_published_flag() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    common::seed_product(&db, "shoes", dec!(3000), true).await;
    common::seed_product(&db, "shoes", dec!(2500), false).await;
    common::seed_product(&db, "addition", dec!(200), true).await;

    let (status, body) =
        common::get(&app, "/api/v1/products?product_type=shoes&published_only=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["products"][0]["product_type"], "shoes");

    let (_, body) = common::get(&app, "/api/v1/products").await;
    assert_eq!(body["data"]["total"], json!(3));
}

#[tokio::test]
async fn additions_endpoint_lists_only_published_addons() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    common::seed_product(&db, "addition", dec!(200), true).await;
    common::seed_product(&db, "addition", dec!(150), false).await;
    common::seed_product(&db, "shoes", dec!(3000), true).await;

    let (status, body) = common::get(&app, "/api/v1/products/additions").await;
    assert_eq!(status, StatusCode::OK);
    let additions = body["data"].as_array().unwrap();
    assert_eq!(additions.len(), 1);
    assert_eq!(additions[0]["product_type"], "addition");
}

#[tokio::test]
async fn variants_are_created_for_the_product_in_the_path() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let product_id = common::seed_product(&db, "shoes", dec!(3000), true).await;
    common::seed_variant(&db, product_id, "red").await;

    let (status, body) = common::post_json(
        &app,
        &format!("/api/v1/products/{}/variants", product_id),
        json!([
            {"color": "black", "size": "42", "stock": 10},
            {"color": "white", "size": "43", "stock": 4, "price": "3200"}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Only the variants from this request come back, not the pre-existing one.
    let variants = body["data"].as_array().unwrap();
    assert_eq!(variants.len(), 2);
    let colors: Vec<&str> = variants
        .iter()
        .map(|v| v["color"].as_str().unwrap())
        .collect();
    assert!(colors.contains(&"black"));
    assert!(colors.contains(&"white"));

    let (_, body) = common::get(&app, &format!("/api/v1/products/{}", product_id)).await;
    assert_eq!(body["data"]["variants"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn variant_creation_validates_input() {
    let state = common::test_state().await;
    let db = state.db.clone();
    let app = common::app(state);

    let product_id = common::seed_product(&db, "shoes", dec!(3000), true).await;

    let (status, _) = common::post_json(
        &app,
        &format!("/api/v1/products/{}/variants", product_id),
        json!([]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::post_json(
        &app,
        &format!("/api/v1/products/{}/variants", product_id),
        json!([{"color": "black", "stock": -3}]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::post_json(
        &app,
        "/api/v1/products/00000000-0000-0000-0000-000000000000/variants",
        json!([{"color": "black", "stock": 1}]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
