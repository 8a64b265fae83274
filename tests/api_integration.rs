mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lotto_six::config::Config;
use lotto_six::types::LotteryType;
use lotto_six::{AppState, LotteryService, router};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{sample_draws, seed, setup_service};

fn build_test_router(service: LotteryService) -> Router {
    router(AppState {
        service: Arc::new(service),
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_invalid_type_is_rejected() {
    let app = build_test_router(setup_service(Config::default()));
    let (status, body) = get(app, "/api/data?type=INVALID").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid type");
}

#[tokio::test]
async fn test_missing_type_is_rejected() {
    let app = build_test_router(setup_service(Config::default()));
    let (status, body) = get(app, "/api/data").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid type");
}

#[tokio::test]
async fn test_empty_dashboard() {
    let app = build_test_router(setup_service(Config::default()));
    let (status, body) = get(app, "/api/data?type=MO_NEW").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["latestRecord"].is_null());
    assert!(json["latestPrediction"].is_null());
    assert_eq!(json["history"].as_array().unwrap().len(), 0);
    assert_eq!(json["predictionHistory"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_populated_dashboard() {
    let service = setup_service(Config::default());
    seed(service.connection(), &sample_draws(LotteryType::Hk, 70));
    seed(service.connection(), &sample_draws(LotteryType::MoOld, 3));
    let prediction = service.predict(LotteryType::Hk).unwrap();
    assert_eq!(prediction.target_expect, "2025101");

    let app = build_test_router(service);
    let (status, body) = get(app, "/api/data?type=hk").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["latestRecord"]["expect"], "2025100");
    assert_eq!(json["latestRecord"]["lotteryType"], "HK");
    assert_eq!(json["latestPrediction"]["targetExpect"], "2025101");
    assert_eq!(
        json["latestPrediction"]["prediction"]["numbers"].as_array().unwrap().len(),
        18
    );
    assert!(json["lastPrediction"].is_null());
    assert!(json["lastVerification"].is_null());
    assert_eq!(json["history"].as_array().unwrap().len(), 50);
    assert_eq!(json["predictionHistory"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_setup_resets_tables() {
    let service = setup_service(Config::default());
    seed(service.connection(), &sample_draws(LotteryType::Hk, 5));
    let app = build_test_router(service);

    let (status, _) = get(app.clone(), "/api/setup").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(app, "/api/data?type=HK").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["latestRecord"].is_null());
}

#[tokio::test]
async fn test_health() {
    let app = build_test_router(setup_service(Config::default()));
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
