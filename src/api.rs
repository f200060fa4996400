use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use net::ServerAddress;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tower_http::cors::CorsLayer;

use crate::{
    error::ApiError,
    history::{downsample, HistoryStore},
    monitor::{MonitorHandle, TaskControl},
};

#[derive(Clone)]
pub struct AppState {
    pub monitor: MonitorHandle,
    pub history: Arc<HistoryStore>,
    /// Poll interval in seconds, used to size history windows.
    pub interval_secs: u64,
}

/// Body every JSON endpoint answers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub code: u16,
    pub msg: String,
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        code: StatusCode::OK.as_u16(),
        msg: "200 OK".to_string(),
        data,
    })
}

#[derive(Debug, Deserialize)]
pub struct StatusRange {
    pub days: u64,
}

#[derive(Debug, Deserialize)]
pub struct TargetServer {
    pub host: String,
    pub port: u16,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/data/latest-status", get(latest_status))
        .route("/api/v1/data/status", post(status_range))
        .route("/api/v1/data/full-status-file", get(full_status_file))
        .route("/api/v1/control/set-target-server", post(set_target_server))
        .route("/api/v1/control/toggle-task", post(toggle_task))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn latest_status(State(state): State<AppState>) -> Json<Envelope<Value>> {
    let data = match state.monitor.latest().await {
        Some(snapshot) => json!({ "time": snapshot.time, "status": snapshot.status.as_ref() }),
        None => json!({ "time": 0.0, "status": {} }),
    };
    ok(data)
}

async fn status_range(
    State(state): State<AppState>,
    body: Result<Json<StatusRange>, JsonRejection>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let Json(range) = body?;
    if range.days == 0 {
        return Err(ApiError::BadRequest("days must be at least 1".to_string()));
    }

    let samples = state.history.read_all().await?;
    let window = downsample(&samples, range.days, state.interval_secs);
    let points: Vec<Value> = window
        .samples
        .iter()
        .map(|sample| {
            let mut point = Map::new();
            point.insert(sample.timestamp().to_string(), sample.online.into());
            Value::Object(point)
        })
        .collect();

    Ok(ok(json!({ "length": window.length, "status": points })))
}

async fn full_status_file(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let content = state.history.read_raw().await?;
    let file_name = state
        .history
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("player_stats.txt")
        .to_string();

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        content,
    ))
}

async fn set_target_server(
    State(state): State<AppState>,
    body: Result<Json<TargetServer>, JsonRejection>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let Json(target) = body?;
    let host = target.host.trim();
    if host.is_empty() {
        return Err(ApiError::BadRequest("host must not be empty".to_string()));
    }

    state
        .monitor
        .set_target(ServerAddress::new(host, target.port));
    let current = state.monitor.target();
    Ok(ok(json!({ "current": current })))
}

async fn toggle_task(
    State(state): State<AppState>,
    body: Result<Json<TaskControl>, JsonRejection>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let Json(control) = body?;
    state.monitor.set_control(control);
    Ok(ok(json!({ "current": state.monitor.control() })))
}
