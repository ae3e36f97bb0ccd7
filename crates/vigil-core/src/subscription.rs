//! Subscription targets and the per-user join.
//!
//! A [`Subscription`] identifies a subscribable target (one row per target no
//! matter how many users watch it); [`UserSubscription`] joins a user to it.
//! Keeping the two apart keeps inheritance lookups O(targets) rather than
//! O(users × targets).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── SubscriptionLevel ───────────────────────────────────────────────────────

/// The three subscribable levels of the hierarchy. Schema and SchemaVersion
/// are never directly subscribable — visibility at those levels is inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionLevel {
  #[serde(rename = "P")]
  Product,
  #[serde(rename = "D")]
  Domain,
  #[serde(rename = "C")]
  Context,
}

impl SubscriptionLevel {
  /// The single-letter code stored in the `level` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Product => "P",
      Self::Domain => "D",
      Self::Context => "C",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "P" => Ok(Self::Product),
      "D" => Ok(Self::Domain),
      "C" => Ok(Self::Context),
      other => Err(Error::UnknownSubscriptionLevel(other.to_owned())),
    }
  }
}

impl std::fmt::Display for SubscriptionLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// A subscribable target. Unique on (`target_id`, `level`); created lazily on
/// first subscribe and never explicitly deleted — orphaned rows are harmless
/// and get reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
  pub id:        Uuid,
  /// The Product, Domain, or Context id, per `level`.
  pub target_id: Uuid,
  pub level:     SubscriptionLevel,
}

// ─── UserSubscription ────────────────────────────────────────────────────────

/// A user's membership in a subscription. Unique on (`subscription_id`,
/// `user_id`); deleted on unsubscribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubscription {
  pub id:              Uuid,
  pub subscription_id: Uuid,
  pub user_id:         Uuid,
  pub created_at:      DateTime<Utc>,
}
