//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<welove_core::Error> for ApiError {
  fn from(err: welove_core::Error) -> Self {
    use welove_core::Error as E;
    match err {
      E::DuplicateQuote(_) | E::DuplicateProfile(_) | E::DuplicateUsername(_) => {
        ApiError::Conflict(err.to_string())
      }
      E::EmptyText => ApiError::BadRequest(err.to_string()),
      E::Store(e) => ApiError::Store(e),
      other if other.is_not_found() => ApiError::NotFound(other.to_string()),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        // Backend details stay in the log.
        tracing::error!(error = %e, "store failure while serving api request");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal store error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
