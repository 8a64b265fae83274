mod common;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use lotto_six::api::SyncError;
use lotto_six::config::Config;
use lotto_six::database::count_records;
use lotto_six::notify::Notifier;
use lotto_six::types::LotteryType;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::common::{sample_draws, seed, setup_service};

async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Stands in for the Telegram bot API and forwards every `sendMessage` body.
async fn spawn_telegram() -> (Notifier, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route(
            "/bottoken/sendMessage",
            post(
                |State(tx): State<mpsc::UnboundedSender<Value>>, Json(body): Json<Value>| async move {
                    tx.send(body).ok();
                    Json(json!({"ok": true}))
                },
            ),
        )
        .with_state(tx);
    let base = spawn_upstream(app).await;
    let notifier = Notifier::new(
        reqwest::Client::new(),
        Some("token".to_string()),
        Some("42".to_string()),
    )
    .with_base_url(base);
    (notifier, rx)
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("notification not sent in time")
        .expect("notification channel closed")
}

async fn single_draw() -> Json<Value> {
    Json(json!({"data": [{"expect": "1001", "openCode": "1,2,3,4,5,6,7"}]}))
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let base = spawn_upstream(Router::new().route("/draws", get(single_draw))).await;
    let service = setup_service(Config {
        url_hk: Some(format!("{}/draws", base)),
        ..Config::default()
    });

    let first = service.sync(LotteryType::Hk).await.unwrap();
    assert_eq!(first.inserted, 1);
    assert_eq!(first.total, 1);
    let prediction = first.prediction.expect("new draws trigger a prediction");
    assert_eq!(prediction.target_expect, "1002");

    let second = service.sync(LotteryType::Hk).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert!(second.prediction.is_none());
    assert_eq!(count_records(&service.connection().lock(), LotteryType::Hk).unwrap(), 1);
}

#[tokio::test]
async fn test_sync_keeps_types_apart() {
    let base = spawn_upstream(Router::new().route("/draws", get(single_draw))).await;
    let service = setup_service(Config {
        url_mo_new: Some(format!("{}/draws", base)),
        ..Config::default()
    });
    seed(service.connection(), &sample_draws(LotteryType::Hk, 4));

    let outcome = service.sync(LotteryType::MoNew).await.unwrap();
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.total, 1);
    assert_eq!(count_records(&service.connection().lock(), LotteryType::Hk).unwrap(), 4);
}

#[tokio::test]
async fn test_sync_reports_upstream_status() {
    let app = Router::new().route(
        "/draws",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let base = spawn_upstream(app).await;
    let service = setup_service(Config {
        url_mo_old: Some(format!("{}/draws", base)),
        ..Config::default()
    });

    let err = service.sync(LotteryType::MoOld).await.unwrap_err();
    match err.downcast_ref::<SyncError>() {
        Some(SyncError::Status(status)) => assert_eq!(status.as_u16(), 503),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_sync_rejects_unexpected_payload() {
    let app = Router::new().route("/draws", get(|| async { Json(json!({"rows": []})) }));
    let base = spawn_upstream(app).await;
    let service = setup_service(Config {
        url_hk: Some(format!("{}/draws", base)),
        ..Config::default()
    });

    let err = service.sync(LotteryType::Hk).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<SyncError>(), Some(SyncError::Payload(_))));
}

#[tokio::test]
async fn test_sync_failure_notifies_admin() {
    let upstream = Router::new().route("/draws", get(|| async { StatusCode::BAD_GATEWAY }));
    let base = spawn_upstream(upstream).await;
    let (notifier, mut rx) = spawn_telegram().await;
    let service = setup_service(Config {
        url_hk: Some(format!("{}/draws", base)),
        ..Config::default()
    })
    .with_notifier(notifier);

    assert!(service.sync(LotteryType::Hk).await.is_err());

    let message = next_message(&mut rx).await;
    assert_eq!(message["chat_id"], "42");
    let text = message["text"].as_str().unwrap();
    assert!(text.contains("HK sync failed"), "{}", text);
    assert!(text.contains("502"), "{}", text);
}

#[tokio::test]
async fn test_new_draws_notify_prediction() {
    let upstream = Router::new().route("/draws", get(single_draw));
    let base = spawn_upstream(upstream).await;
    let (notifier, mut rx) = spawn_telegram().await;
    let service = setup_service(Config {
        url_mo_new: Some(format!("{}/draws", base)),
        ..Config::default()
    })
    .with_notifier(notifier);

    let outcome = service.sync(LotteryType::MoNew).await.unwrap();
    assert_eq!(outcome.inserted, 1);

    let message = next_message(&mut rx).await;
    let text = message["text"].as_str().unwrap();
    assert!(text.contains("MO_NEW 1002"), "{}", text);
}
