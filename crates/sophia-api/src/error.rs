//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is plain text. Backend failures are logged in full and
//! reported to the client only as a generic message.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sophia_core::{ErrorKind, ValidationError, store::StoreError};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("method {0} is not allowed here")]
  MethodNotAllowed(String),

  #[error("store unavailable")]
  Unavailable,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store failure by its [`ErrorKind`].
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.kind() {
      ErrorKind::NotFound => ApiError::NotFound(e.to_string()),
      ErrorKind::Invalid => ApiError::BadRequest(e.to_string()),
      ErrorKind::Closed => ApiError::Unavailable,
      ErrorKind::Backend => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<ValidationError> for ApiError {
  fn from(e: ValidationError) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
      ApiError::BadRequest(msg) => {
        (StatusCode::BAD_REQUEST, msg).into_response()
      }
      ApiError::MethodNotAllowed(method) => (
        StatusCode::METHOD_NOT_ALLOWED,
        format!("method {method} is not allowed here"),
      )
        .into_response(),
      ApiError::Unavailable => {
        tracing::warn!("request rejected: store is closed");
        (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
          .into_response()
      }
    }
  }
}
