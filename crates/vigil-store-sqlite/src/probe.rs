//! Table-availability probing.
//!
//! The database evolves via host-owned migrations, and another request may be
//! mid-migration at any moment. Each logical unit of work therefore probes
//! `sqlite_master` once, right before the statements that depend on the
//! answer, and nothing is ever cached across calls.

use std::collections::HashSet;

/// Which of the tables the engine touches are present right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
  /// `entity_changes` — the change log itself.
  pub changes:         bool,
  /// `subscriptions` and `user_subscriptions`, as a pair. One without the
  /// other is useless, so it counts as absent.
  pub subscriptions:   bool,
  /// `user_change_views` — per-user seen state.
  pub views:           bool,
  /// `user_notification_preferences`.
  pub preferences:     bool,
  /// Host user directory (`users`), enrichment only.
  pub users:           bool,
  // Host hierarchy tables, consulted for ancestor resolution.
  pub domains:         bool,
  pub contexts:        bool,
  pub schemas:         bool,
  pub schema_versions: bool,
}

impl Capabilities {
  pub fn probe(conn: &rusqlite::Connection) -> rusqlite::Result<Self> {
    let mut stmt = conn
      .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let names: HashSet<String> = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<_>>()?;

    let has = |name: &str| names.contains(name);
    Ok(Self {
      changes:         has("entity_changes"),
      subscriptions:   has("subscriptions") && has("user_subscriptions"),
      views:           has("user_change_views"),
      preferences:     has("user_notification_preferences"),
      users:           has("users"),
      domains:         has("domains"),
      contexts:        has("contexts"),
      schemas:         has("schemas"),
      schema_versions: has("schema_versions"),
    })
  }

  /// A fully-provisioned database (host tables included); test fixtures and
  /// predicate assembly use this as the baseline.
  pub fn full() -> Self {
    Self {
      changes:         true,
      subscriptions:   true,
      views:           true,
      preferences:     true,
      users:           true,
      domains:         true,
      contexts:        true,
      schemas:         true,
      schema_versions: true,
    }
  }
}
