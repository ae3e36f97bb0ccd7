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

  /// The backing tables are not provisioned yet (host mid-migration).
  #[error("unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(vigil_core::Error),
}

impl ApiError {
  /// Map a store failure to its HTTP shape. The
  /// `Into<vigil_core::Error>` bound on the store trait is what lets a
  /// generic handler recover the domain failure here.
  pub fn from_store(e: vigil_core::Error) -> Self {
    use vigil_core::Error as E;
    match e {
      E::AlreadySubscribed { .. } => Self::Conflict(e.to_string()),
      E::NotSubscribed { .. } => Self::NotFound(e.to_string()),
      E::NotProvisioned(_) => Self::Unavailable(e.to_string()),
      E::UnknownEntityKind(_)
      | E::UnknownChangeKind(_)
      | E::UnknownSubscriptionLevel(_)
      | E::UnknownDigestFrequency(_) => Self::BadRequest(e.to_string()),
      other => Self::Store(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use uuid::Uuid;
  use vigil_core::subscription::SubscriptionLevel;

  use super::*;

  #[test]
  fn domain_failures_map_to_their_http_shape() {
    let e = ApiError::from_store(vigil_core::Error::AlreadySubscribed {
      user_id:   Uuid::new_v4(),
      target_id: Uuid::new_v4(),
      level:     SubscriptionLevel::Product,
    });
    assert!(matches!(e, ApiError::Conflict(_)));

    let e = ApiError::from_store(vigil_core::Error::NotProvisioned(
      "user_change_views",
    ));
    assert!(matches!(e, ApiError::Unavailable(_)));

    let e = ApiError::from_store(vigil_core::Error::UnknownEntityKind(
      "gizmo".into(),
    ));
    assert!(matches!(e, ApiError::BadRequest(_)));
  }
}
