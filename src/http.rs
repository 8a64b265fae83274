use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::LotteryService;
use crate::types::LotteryType;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LotteryService>,
}

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "type")]
    pub lottery_type: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data", get(get_data))
        .route("/api/setup", get(setup))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for GET /api/data?type=HK|MO_NEW|MO_OLD
pub async fn get_data(State(state): State<AppState>, Query(query): Query<DataQuery>) -> Response {
    let Some(lottery_type) = query
        .lottery_type
        .as_deref()
        .and_then(|t| t.parse::<LotteryType>().ok())
    else {
        return (StatusCode::BAD_REQUEST, "Invalid type").into_response();
    };

    match state.service.dashboard(lottery_type) {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            tracing::error!("Failed to load {} dashboard: {:#}", lottery_type, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Handler for GET /api/setup; drops and recreates the schema.
pub async fn setup(State(state): State<AppState>) -> (StatusCode, String) {
    match state.service.reset_schema() {
        Ok(()) => (StatusCode::OK, "Database initialized".to_string()),
        Err(e) => {
            tracing::error!("Schema reset failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Setup failed: {}", e))
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
