//! Handlers for `/subscriptions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subscriptions` | The acting user's targets, newest first |
//! | `POST`   | `/subscriptions` | Body: [`TargetBody`]; 201, or 409 if already subscribed |
//! | `DELETE` | `/subscriptions` | Body: [`TargetBody`]; 204, or 404 if not subscribed |
//! | `GET`    | `/subscriptions/status` | `?target_id=...&level=P\|D\|C` |
//! | `GET`    | `/subscriptions/watchers` | Same params; users directly subscribed to a target |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vigil_core::{
  store::NotificationStore,
  subscription::{Subscription, SubscriptionLevel},
};

use crate::{error::ApiError, extract::UserId};

/// A subscribable target, as accepted in bodies and query strings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TargetBody {
  pub target_id: Uuid,
  pub level:     SubscriptionLevel,
}

/// `GET /subscriptions`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
) -> Result<Json<Vec<Subscription>>, ApiError>
where
  S: NotificationStore,
{
  let subs = store
    .list_subscriptions(user)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(Json(subs))
}

/// `POST /subscriptions` — returns 201 + the (possibly pre-existing) target.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
  Json(body): Json<TargetBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NotificationStore,
{
  let sub = store
    .subscribe(user, body.target_id, body.level)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok((StatusCode::CREATED, Json(sub)))
}

/// `DELETE /subscriptions`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
  Json(body): Json<TargetBody>,
) -> Result<StatusCode, ApiError>
where
  S: NotificationStore,
{
  store
    .unsubscribe(user, body.target_id, body.level)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
  pub subscribed: bool,
}

/// `GET /subscriptions/status?target_id=<id>&level=<P|D|C>`
pub async fn status<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
  Query(params): Query<TargetBody>,
) -> Result<Json<StatusResponse>, ApiError>
where
  S: NotificationStore,
{
  let subscribed = store
    .is_subscribed(user, params.target_id, params.level)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(Json(StatusResponse { subscribed }))
}

/// `GET /subscriptions/watchers?target_id=<id>&level=<P|D|C>` — raw reach for
/// push-delivery collaborators; no inheritance expansion.
pub async fn watchers<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<TargetBody>,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: NotificationStore,
{
  let users = store
    .list_subscribed_user_ids(params.target_id, params.level)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(Json(users))
}
