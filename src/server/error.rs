//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::RiskError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl IntoResponse for ServerError {
    /// Every request failure is reported as 400 with the error text as `detail`
    fn into_response(self) -> Response {
        let detail = self.to_string();
        tracing::warn!(detail = %detail, "Prediction request failed");

        (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
