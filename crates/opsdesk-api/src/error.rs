//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use opsdesk_core::{Error as CoreError, ErrorKind};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing or unknown actor")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Core(e) => match e.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

/// `Ok(())` when `allowed`, otherwise a 403 naming the denied action.
pub(crate) fn ensure(allowed: bool, action: &str) -> Result<(), ApiError> {
  if allowed {
    Ok(())
  } else {
    debug!(action, "request denied");
    Err(ApiError::Forbidden(format!("not allowed to {action}")))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }

    let mut body = json!({ "error": self.to_string() });
    match &self {
      ApiError::Core(CoreError::EventConflict { titles, event_ids }) => {
        body["conflicts"] = json!(titles);
        body["event_ids"] = json!(event_ids);
      }
      ApiError::Core(CoreError::ShiftConflict { identity_id, shift_ids }) => {
        body["identity_id"] = json!(identity_id);
        body["shift_ids"] = json!(shift_ids);
      }
      _ => {}
    }
    (status, Json(body)).into_response()
  }
}
