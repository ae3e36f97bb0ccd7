//! The `NotificationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `vigil-store-sqlite`).
//! Higher layers (`vigil-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  change::{ChangeRecord, EntityKind, NewChange},
  preferences::NotificationPreferences,
  subscription::{Subscription, SubscriptionLevel},
  summary::{ChangesSummary, DetailedChange},
};

/// Abstraction over a Vigil notification store backend.
///
/// The change log is append-only: nothing ever updates a record, and the only
/// deleter is retention cleanup. The backing store may be mid-migration at any
/// moment, so implementations re-probe table availability per operation and
/// degrade read paths rather than fail; the contract per operation is
/// documented on each method.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait NotificationStore: Send + Sync {
  /// Backend error. `Into<crate::Error>` lets callers recover the domain
  /// failure (AlreadySubscribed, NotProvisioned, ...) without depending on
  /// the backend crate.
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Change log ────────────────────────────────────────────────────────

  /// Append one change record with a fresh id and the current second-truncated
  /// UTC time, then opportunistically run retention cleanup (cleanup failures
  /// are logged and swallowed, never surfaced here).
  ///
  /// Soft-fails with a "not provisioned" error when the change-log table does
  /// not exist yet; callers on the write path must absorb that error so
  /// change tracking never breaks the mutation it is observing.
  fn record_change(
    &self,
    input: NewChange,
  ) -> impl Future<Output = Result<ChangeRecord, Self::Error>> + Send + '_;

  /// Delete change records older than the governing retention window —
  /// `max(30, min(retention_days across all preference rows))` days — along
  /// with their view-tracking rows. Returns the number of records purged.
  fn cleanup_old_changes(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Find-or-create the subscription row for (`target_id`, `level`) and join
  /// `user_id` to it. Errors with `AlreadySubscribed` on a duplicate pair.
  fn subscribe(
    &self,
    user_id: Uuid,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Remove the user's join row. Zero rows removed is `NotSubscribed`, not a
  /// no-op success. The target row itself is left in place for reuse.
  fn unsubscribe(
    &self,
    user_id: Uuid,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn is_subscribed(
    &self,
    user_id: Uuid,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All targets the user watches, newest subscription first.
  fn list_subscriptions(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Every user directly subscribed to the target. Raw reach only — no
  /// inheritance expansion; push-delivery collaborators fan out from this.
  fn list_subscribed_user_ids(
    &self,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Notification views ────────────────────────────────────────────────

  /// Counts of visible, unseen changes within the user's retention window,
  /// grouped by entity kind and change kind.
  ///
  /// Visibility follows the hierarchical inheritance rule: a change is
  /// counted iff the user subscribes to the entity itself or any ancestor at
  /// the Product/Domain/Context levels. When no subscription tables exist at
  /// all (bootstrap/legacy state) every change is counted; when the change
  /// log itself is missing the summary is all zeros, not an error.
  fn changes_summary(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ChangesSummary, Self::Error>> + Send + '_;

  /// The same visibility + unseen filter restricted to one entity kind,
  /// newest first, enriched with the changing user's directory entry and the
  /// breaking-change flag. Honors the user's `breaking_only` preference.
  fn detailed_changes(
    &self,
    user_id: Uuid,
    entity: EntityKind,
  ) -> impl Future<Output = Result<Vec<DetailedChange>, Self::Error>> + Send + '_;

  // ── View state ────────────────────────────────────────────────────────

  /// Idempotently mark the given changes as seen by the user. Duplicates —
  /// within the call or against existing rows — are ignored. Hard-fails when
  /// the view-tracking table is absent: a write has no degraded mode.
  fn mark_seen(
    &self,
    user_id: Uuid,
    change_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Preferences ───────────────────────────────────────────────────────

  /// The user's preferences, or the defaults when no row exists (no row is
  /// materialized by reading).
  fn preferences(
    &self,
    user_id: Uuid,
  ) -> impl Future<
    Output = Result<NotificationPreferences, Self::Error>,
  > + Send + '_;

  /// Upsert the user's preferences.
  fn set_preferences(
    &self,
    prefs: NotificationPreferences,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
