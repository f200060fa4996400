use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{history::HistoryError, logging::McstatLogger};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Bad request - {0}")]
    BadRequest(String),
    #[error("Malformed body - {0}")]
    Body(#[from] JsonRejection),
    #[error("History unavailable - {0}")]
    History(#[from] HistoryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        McstatLogger::request_failed(status, &self);

        let data = match &self {
            ApiError::History(err) => json!({ "exception": err.to_string() }),
            _ => serde_json::Value::Null,
        };
        let msg = match &self {
            ApiError::History(_) => "An unexpected error occurred.".to_string(),
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": status.as_u16(),
            "msg": msg,
            "data": data,
        });
        (status, Json(body)).into_response()
    }
}
