//! Change types — the fundamental unit of the Vigil change log.
//!
//! A change record is an immutable observation of a registry mutation. Records
//! are never updated; the only thing that ever removes one is retention
//! cleanup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── EntityKind ──────────────────────────────────────────────────────────────

/// The level of the registry hierarchy a change applies to.
///
/// The hierarchy is Product → Domain → Context → Schema → SchemaVersion;
/// only the top three levels are directly subscribable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Product,
  Domain,
  Context,
  Schema,
  SchemaVersion,
}

impl EntityKind {
  /// The discriminant string stored in the `entity_type` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Product => "product",
      Self::Domain => "domain",
      Self::Context => "context",
      Self::Schema => "schema",
      Self::SchemaVersion => "schema_version",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "product" => Ok(Self::Product),
      "domain" => Ok(Self::Domain),
      "context" => Ok(Self::Context),
      "schema" => Ok(Self::Schema),
      "schema_version" => Ok(Self::SchemaVersion),
      other => Err(Error::UnknownEntityKind(other.to_owned())),
    }
  }
}

impl std::fmt::Display for EntityKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── ChangeKind ──────────────────────────────────────────────────────────────

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
  Created,
  Updated,
  Deleted,
}

impl ChangeKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Updated => "updated",
      Self::Deleted => "deleted",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "created" => Ok(Self::Created),
      "updated" => Ok(Self::Updated),
      "deleted" => Ok(Self::Deleted),
      other => Err(Error::UnknownChangeKind(other.to_owned())),
    }
  }
}

impl std::fmt::Display for ChangeKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── ChangePayload ───────────────────────────────────────────────────────────

/// The structured payload of a change record.
///
/// The `before`/`after` images are the core; producers may attach arbitrary
/// enrichment fields (`schemaName`, pre-computed diff summaries, ...) which are
/// preserved verbatim through serialization round-trips via the flattened
/// extension map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangePayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub before: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub after:  Option<serde_json::Value>,
  /// Open extension fields; no fixed schema per entity kind.
  #[serde(flatten)]
  pub extra:  serde_json::Map<String, serde_json::Value>,
}

impl ChangePayload {
  /// Payload for an update: both images present.
  pub fn between(before: serde_json::Value, after: serde_json::Value) -> Self {
    Self {
      before: Some(before),
      after: Some(after),
      extra: serde_json::Map::new(),
    }
  }

  /// Payload for a creation: only the `after` image.
  pub fn created(after: serde_json::Value) -> Self {
    Self {
      before: None,
      after: Some(after),
      extra: serde_json::Map::new(),
    }
  }

  /// Payload for a deletion: only the `before` image.
  pub fn deleted(before: serde_json::Value) -> Self {
    Self {
      before: Some(before),
      after: None,
      extra: serde_json::Map::new(),
    }
  }

  /// Attach an enrichment field, preserving any existing ones.
  pub fn with_extra(
    mut self,
    key: impl Into<String>,
    value: serde_json::Value,
  ) -> Self {
    self.extra.insert(key.into(), value);
    self
  }
}

// ─── ChangeRecord ────────────────────────────────────────────────────────────

/// An immutable change-log entry. Once written, no field is ever updated;
/// retention cleanup is the only deleter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
  pub id:          Uuid,
  pub entity:      EntityKind,
  pub entity_id:   Uuid,
  /// Display name of the entity at the time of the change (denormalized so
  /// the log survives renames and deletions).
  pub entity_name: String,
  pub change:      ChangeKind,
  pub payload:     ChangePayload,
  /// `None` for system or anonymous changes.
  pub changed_by:  Option<Uuid>,
  /// Server-assigned, UTC, whole seconds; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

// ─── NewChange ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::NotificationStore::record_change`].
/// `id` and `created_at` are always set by the store; they are not accepted
/// from callers.
#[derive(Debug, Clone)]
pub struct NewChange {
  pub entity:      EntityKind,
  pub entity_id:   Uuid,
  pub entity_name: String,
  pub change:      ChangeKind,
  pub payload:     ChangePayload,
  pub changed_by:  Option<Uuid>,
}

impl NewChange {
  /// Convenience constructor for a system/anonymous change.
  pub fn new(
    entity: EntityKind,
    entity_id: Uuid,
    entity_name: impl Into<String>,
    change: ChangeKind,
    payload: ChangePayload,
  ) -> Self {
    Self {
      entity,
      entity_id,
      entity_name: entity_name.into(),
      change,
      payload,
      changed_by: None,
    }
  }

  /// Attribute the change to a user.
  pub fn by(mut self, user_id: Uuid) -> Self {
    self.changed_by = Some(user_id);
    self
  }
}
