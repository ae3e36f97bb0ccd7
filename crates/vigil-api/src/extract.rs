//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// The acting user, resolved from the `X-User-Id` header.
///
/// Authentication itself is the host's concern; by the time a request reaches
/// this router, the host's auth layer has already verified the session and
/// stamped the header.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get("x-user-id")
      .ok_or_else(|| ApiError::BadRequest("missing X-User-Id header".into()))?
      .to_str()
      .map_err(|_| ApiError::BadRequest("malformed X-User-Id header".into()))?;

    Uuid::parse_str(raw)
      .map(UserId)
      .map_err(|_| ApiError::BadRequest(format!("invalid X-User-Id: {raw:?}")))
  }
}
