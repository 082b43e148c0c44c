//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use prodcost_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// The request conflicts with existing rows (e.g. deleting a referenced
  /// unit).
  #[error("conflict: {0}")]
  Conflict(String),

  /// Well-formed input the ledger cannot accept, or a cost that cannot be
  /// computed from the recorded data.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by the domain error it carries.
  pub fn store<E: StoreError>(e: E) -> Self {
    use prodcost_core::Error as Core;

    let classified = e.core().map(|core| {
      let message = core.to_string();
      match core {
        Core::NotFound(..) => Self::NotFound(message),
        Core::IntegrityViolation(..) => Self::Conflict(message),
        Core::NoPurchaseHistory { .. }
        | Core::ZeroPurchaseQuantity(_)
        | Core::UnknownReference(_)
        | Core::Validation { .. } => Self::Unprocessable(message),
      }
    });
    classified.unwrap_or_else(|| Self::Store(Box::new(e)))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
