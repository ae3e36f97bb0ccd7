//! Error types for `vigil-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::subscription::SubscriptionLevel;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user {user_id} is already subscribed to {level} {target_id}")]
  AlreadySubscribed {
    user_id:   Uuid,
    target_id: Uuid,
    level:     SubscriptionLevel,
  },

  #[error("user {user_id} is not subscribed to {level} {target_id}")]
  NotSubscribed {
    user_id:   Uuid,
    target_id: Uuid,
    level:     SubscriptionLevel,
  },

  /// The named table has not been created yet (host migrations pending).
  #[error("table {0:?} is not provisioned")]
  NotProvisioned(&'static str),

  #[error("unknown entity kind: {0:?}")]
  UnknownEntityKind(String),

  #[error("unknown change kind: {0:?}")]
  UnknownChangeKind(String),

  #[error("unknown subscription level: {0:?}")]
  UnknownSubscriptionLevel(String),

  #[error("unknown digest frequency: {0:?}")]
  UnknownDigestFrequency(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Backend failure surfaced through the [`crate::store::NotificationStore`]
  /// trait boundary.
  #[error("store error: {0}")]
  Store(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
