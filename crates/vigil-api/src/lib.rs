//! JSON REST API for Vigil.
//!
//! Exposes an axum [`Router`] backed by any
//! [`vigil_core::store::NotificationStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility — handlers resolve the acting user from the
//! `X-User-Id` header the host's auth layer is expected to set.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/notifications", vigil_api::api_router(store.clone()))
//! ```

pub mod changes;
pub mod error;
pub mod extract;
pub mod preferences;
pub mod recorder;
pub mod subscriptions;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use vigil_core::store::NotificationStore;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: NotificationStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Changes
    .route("/changes/summary", get(changes::summary::<S>))
    .route("/changes/seen", post(changes::mark_seen::<S>))
    .route("/changes/{entity}", get(changes::detailed::<S>))
    // Subscriptions
    .route(
      "/subscriptions",
      get(subscriptions::list::<S>)
        .post(subscriptions::create::<S>)
        .delete(subscriptions::remove::<S>),
    )
    .route("/subscriptions/status", get(subscriptions::status::<S>))
    .route("/subscriptions/watchers", get(subscriptions::watchers::<S>))
    // Preferences
    .route(
      "/preferences",
      get(preferences::get_prefs::<S>).put(preferences::put_prefs::<S>),
    )
    .with_state(store)
}
