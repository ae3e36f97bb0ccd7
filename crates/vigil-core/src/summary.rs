//! Read models for the notification views — never stored, always derived.

use serde::{Deserialize, Serialize};

use crate::change::{ChangeKind, ChangeRecord, EntityKind};

// ─── ChangeCounts ────────────────────────────────────────────────────────────

/// Unseen-change counts for one entity kind, split by what happened.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct ChangeCounts {
  pub created: u64,
  pub updated: u64,
  pub deleted: u64,
}

impl ChangeCounts {
  pub fn total(&self) -> u64 { self.created + self.updated + self.deleted }

  pub fn bump(&mut self, kind: ChangeKind, n: u64) {
    match kind {
      ChangeKind::Created => self.created += n,
      ChangeKind::Updated => self.updated += n,
      ChangeKind::Deleted => self.deleted += n,
    }
  }
}

// ─── ChangesSummary ──────────────────────────────────────────────────────────

/// Per-entity-kind counts of visible, unseen changes within the user's
/// retention window.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct ChangesSummary {
  pub products:        ChangeCounts,
  pub domains:         ChangeCounts,
  pub contexts:        ChangeCounts,
  pub schemas:         ChangeCounts,
  pub schema_versions: ChangeCounts,
  pub total_changes:   u64,
}

impl ChangesSummary {
  pub fn counts_mut(&mut self, entity: EntityKind) -> &mut ChangeCounts {
    match entity {
      EntityKind::Product => &mut self.products,
      EntityKind::Domain => &mut self.domains,
      EntityKind::Context => &mut self.contexts,
      EntityKind::Schema => &mut self.schemas,
      EntityKind::SchemaVersion => &mut self.schema_versions,
    }
  }

  /// Add `n` changes of the given kinds and keep `total_changes` in step.
  pub fn add(&mut self, entity: EntityKind, kind: ChangeKind, n: u64) {
    self.counts_mut(entity).bump(kind, n);
    self.total_changes += n;
  }
}

// ─── DetailedChange ──────────────────────────────────────────────────────────

/// One change-log entry as surfaced to a user: the record itself plus the
/// changing user's directory entry (nullable — the directory is enrichment
/// only) and the breaking-change flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedChange {
  pub record:          ChangeRecord,
  pub changed_by_name: Option<String>,
  pub changed_by_email: Option<String>,
  pub breaking:        bool,
}
