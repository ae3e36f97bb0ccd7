//! Handlers for `/changes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/changes/summary` | Per-entity-kind unseen counts for the acting user |
//! | `GET`  | `/changes/:entity` | Detailed unseen changes for one entity kind, newest first |
//! | `POST` | `/changes/seen` | Body: `{"change_ids":[...]}`; idempotent; 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use vigil_core::{
  change::EntityKind,
  store::NotificationStore,
  summary::{ChangesSummary, DetailedChange},
};

use crate::{error::ApiError, extract::UserId};

/// `GET /changes/summary`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
) -> Result<Json<ChangesSummary>, ApiError>
where
  S: NotificationStore,
{
  let summary = store
    .changes_summary(user)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(Json(summary))
}

/// `GET /changes/:entity` — `:entity` is an entity-kind discriminant
/// (`product`, `domain`, `context`, `schema`, `schema_version`).
pub async fn detailed<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
  Path(entity): Path<String>,
) -> Result<Json<Vec<DetailedChange>>, ApiError>
where
  S: NotificationStore,
{
  let entity = EntityKind::parse(&entity)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  let changes = store
    .detailed_changes(user, entity)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(Json(changes))
}

#[derive(Debug, Deserialize)]
pub struct MarkSeenBody {
  pub change_ids: Vec<Uuid>,
}

/// `POST /changes/seen` — body: `{"change_ids":[...]}`.
pub async fn mark_seen<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
  Json(body): Json<MarkSeenBody>,
) -> Result<StatusCode, ApiError>
where
  S: NotificationStore,
{
  store
    .mark_seen(user, body.change_ids)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(StatusCode::NO_CONTENT)
}
