//! Handlers for `/preferences` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/preferences` | Current preferences (defaults if never set) |
//! | `PUT`  | `/preferences` | Partial update: omitted fields keep their value |

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use vigil_core::{
  preferences::{DigestFrequency, NotificationPreferences},
  store::NotificationStore,
};

use crate::{error::ApiError, extract::UserId};

/// `GET /preferences`
pub async fn get_prefs<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
) -> Result<Json<NotificationPreferences>, ApiError>
where
  S: NotificationStore,
{
  let prefs = store
    .preferences(user)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(Json(prefs))
}

/// JSON body accepted by `PUT /preferences`. All fields optional; the update
/// is an overlay on the stored (or default) preferences.
#[derive(Debug, Deserialize)]
pub struct PreferencesBody {
  pub retention_days: Option<u32>,
  pub breaking_only:  Option<bool>,
  pub email_digest:   Option<DigestFrequency>,
  pub real_time:      Option<bool>,
}

/// `PUT /preferences` — returns the stored result.
pub async fn put_prefs<S>(
  State(store): State<Arc<S>>,
  UserId(user): UserId,
  Json(body): Json<PreferencesBody>,
) -> Result<Json<NotificationPreferences>, ApiError>
where
  S: NotificationStore,
{
  let mut prefs = store
    .preferences(user)
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;

  if let Some(days) = body.retention_days {
    prefs.retention_days = days;
  }
  if let Some(breaking_only) = body.breaking_only {
    prefs.breaking_only = breaking_only;
  }
  if let Some(digest) = body.email_digest {
    prefs.email_digest = digest;
  }
  if let Some(real_time) = body.real_time {
    prefs.real_time = real_time;
  }

  store
    .set_preferences(prefs.clone())
    .await
    .map_err(|e| ApiError::from_store(e.into()))?;
  Ok(Json(prefs))
}
