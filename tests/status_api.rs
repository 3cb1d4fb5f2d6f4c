mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn status_and_health_report_ok() {
    let state = common::test_state().await;
    let app = common::app(state);

    let (status, body) = common::get(&app, "/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["service"], "shopfront-api");

    let (status, body) = common::get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}

#[tokio::test]
async fn carrier_proxy_refuses_to_run_without_a_token() {
    let state = common::test_state().await;
    let app = common::app(state);

    let (status, body) = common::get(&app, "/api/v1/carrier/fees?wilaya_id=16").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!("Unprocessable Entity"));
    assert!(body["message"].is_string());
}
