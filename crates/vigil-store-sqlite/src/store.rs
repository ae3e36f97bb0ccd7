//! [`SqliteStore`] — the SQLite implementation of [`NotificationStore`].

use std::path::Path;

use chrono::Duration;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use vigil_core::{
  change::{ChangeKind, ChangeRecord, EntityKind, NewChange},
  clock,
  preferences::{NotificationPreferences, RETENTION_FLOOR_DAYS},
  store::NotificationStore,
  subscription::{Subscription, SubscriptionLevel},
  summary::{ChangesSummary, DetailedChange},
};

use crate::{
  Error, Result,
  encode::{
    RawChange, RawDetailedChange, RawPreferences, RawSubscription, decode_uuid,
    encode_dt, encode_payload, encode_uuid,
  },
  probe::Capabilities,
  schema::SCHEMA,
  visibility,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vigil notification store backed by a single SQLite file, shared with the
/// host registry's own tables.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  ///
  /// Does NOT create any tables: provisioning belongs to the host's migration
  /// flow (or an explicit [`SqliteStore::provision`] call), and every
  /// operation tolerates whatever subset of tables exists.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Create the notification tables (idempotent). Host hierarchy tables are
  /// not touched.
  pub async fn provision(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run arbitrary DDL/DML — the escape hatch tests use to stand in for the
  /// host's migration layer.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a scalar `SELECT COUNT(*) ...` — test-only introspection.
  #[cfg(test)]
  pub(crate) async fn query_count(&self, sql: String) -> Result<i64> {
    let n = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(n)
  }

  /// The user's preferences row, or the defaults when the table or the row is
  /// absent — reading never materializes a row.
  async fn load_preferences(
    &self,
    user_id: Uuid,
  ) -> Result<NotificationPreferences> {
    let user_str = encode_uuid(user_id);

    let raw: Option<RawPreferences> = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.preferences {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT user_id, retention_days, breaking_only, email_digest, real_time
               FROM user_notification_preferences WHERE user_id = ?1",
              rusqlite::params![user_str],
              |row| {
                Ok(RawPreferences {
                  user_id:        row.get(0)?,
                  retention_days: row.get(1)?,
                  breaking_only:  row.get(2)?,
                  email_digest:   row.get(3)?,
                  real_time:      row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => raw.into_preferences(),
      None => Ok(NotificationPreferences::defaults(user_id)),
    }
  }
}

// ─── NotificationStore impl ──────────────────────────────────────────────────

impl NotificationStore for SqliteStore {
  type Error = Error;

  // ── Change log ────────────────────────────────────────────────────────────

  async fn record_change(&self, input: NewChange) -> Result<ChangeRecord> {
    let record = ChangeRecord {
      id:          Uuid::new_v4(),
      entity:      input.entity,
      entity_id:   input.entity_id,
      entity_name: input.entity_name,
      change:      input.change,
      payload:     input.payload,
      changed_by:  input.changed_by,
      created_at:  clock::utc_now(),
    };

    let id_str          = encode_uuid(record.id);
    let entity_type     = record.entity.as_str();
    let entity_id_str   = encode_uuid(record.entity_id);
    let entity_name     = record.entity_name.clone();
    let change_type     = record.change.as_str();
    let change_data     = encode_payload(&record.payload)?;
    let changed_by_str  = record.changed_by.map(encode_uuid);
    let created_at_str  = encode_dt(record.created_at);

    let provisioned: bool = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.changes {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO entity_changes (
             id, entity_type, entity_id, entity_name,
             change_type, change_data, changed_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            entity_type,
            entity_id_str,
            entity_name,
            change_type,
            change_data,
            changed_by_str,
            created_at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;

    if !provisioned {
      return Err(vigil_core::Error::NotProvisioned("entity_changes").into());
    }

    // Retention piggybacks on the write path; its failure never surfaces to
    // the caller that just appended a record.
    if let Err(e) = self.cleanup_old_changes().await {
      tracing::warn!(error = %e, "retention cleanup failed after append");
    }

    Ok(record)
  }

  async fn cleanup_old_changes(&self) -> Result<u64> {
    let now = clock::utc_now();

    let purged: u64 = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.changes {
          return Ok(0);
        }

        // The governing window is the shortest configured preference,
        // floored at 30 days — shorter preferences never force data a
        // longer-retention user still expects out of the log.
        let floor = i64::from(RETENTION_FLOOR_DAYS);
        let shortest: Option<i64> = if caps.preferences {
          conn.query_row(
            "SELECT MIN(retention_days) FROM user_notification_preferences",
            [],
            |row| row.get(0),
          )?
        } else {
          None
        };
        let window_days = shortest.unwrap_or(floor).max(floor);
        let cutoff = encode_dt(now - Duration::days(window_days));

        let tx = conn.transaction()?;
        if caps.views {
          tx.execute(
            "DELETE FROM user_change_views WHERE change_id IN
             (SELECT id FROM entity_changes WHERE created_at < ?1)",
            rusqlite::params![cutoff],
          )?;
        }
        let purged = tx.execute(
          "DELETE FROM entity_changes WHERE created_at < ?1",
          rusqlite::params![cutoff],
        )?;
        tx.commit()?;

        Ok(purged as u64)
      })
      .await?;

    Ok(purged)
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn subscribe(
    &self,
    user_id: Uuid,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> Result<Subscription> {
    let sub_id_candidate = encode_uuid(Uuid::new_v4());
    let user_sub_id      = encode_uuid(Uuid::new_v4());
    let user_str         = encode_uuid(user_id);
    let target_str       = encode_uuid(target_id);
    let level_str        = level.as_str();
    let created_at_str   = encode_dt(clock::utc_now());

    let outcome: Option<(String, bool)> = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.subscriptions {
          return Ok(None);
        }

        let tx = conn.transaction()?;

        // Find-or-create the target row; many users share one.
        let existing: Option<String> = tx
          .query_row(
            "SELECT id FROM subscriptions WHERE target_id = ?1 AND level = ?2",
            rusqlite::params![target_str, level_str],
            |row| row.get(0),
          )
          .optional()?;
        let sub_id = match existing {
          Some(id) => id,
          None => {
            tx.execute(
              "INSERT INTO subscriptions (id, target_id, level) VALUES (?1, ?2, ?3)",
              rusqlite::params![sub_id_candidate, target_str, level_str],
            )?;
            sub_id_candidate
          }
        };

        let inserted = tx.execute(
          "INSERT OR IGNORE INTO user_subscriptions
             (id, subscription_id, user_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_sub_id, sub_id, user_str, created_at_str],
        )?;
        tx.commit()?;

        Ok(Some((sub_id, inserted > 0)))
      })
      .await?;

    let Some((sub_id_str, inserted)) = outcome else {
      return Err(vigil_core::Error::NotProvisioned("subscriptions").into());
    };
    if !inserted {
      return Err(
        vigil_core::Error::AlreadySubscribed { user_id, target_id, level }
          .into(),
      );
    }

    Ok(Subscription { id: decode_uuid(&sub_id_str)?, target_id, level })
  }

  async fn unsubscribe(
    &self,
    user_id: Uuid,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> Result<()> {
    let user_str   = encode_uuid(user_id);
    let target_str = encode_uuid(target_id);
    let level_str  = level.as_str();

    let removed: Option<usize> = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.subscriptions {
          return Ok(None);
        }
        let n = conn.execute(
          "DELETE FROM user_subscriptions
           WHERE user_id = ?1 AND subscription_id IN
             (SELECT id FROM subscriptions WHERE target_id = ?2 AND level = ?3)",
          rusqlite::params![user_str, target_str, level_str],
        )?;
        Ok(Some(n))
      })
      .await?;

    match removed {
      None => Err(vigil_core::Error::NotProvisioned("subscriptions").into()),
      // Zero rows deleted is an error, not a no-op success.
      Some(0) => Err(
        vigil_core::Error::NotSubscribed { user_id, target_id, level }.into(),
      ),
      Some(_) => Ok(()),
    }
  }

  async fn is_subscribed(
    &self,
    user_id: Uuid,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> Result<bool> {
    let user_str   = encode_uuid(user_id);
    let target_str = encode_uuid(target_id);
    let level_str  = level.as_str();

    let subscribed: bool = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.subscriptions {
          return Ok(false);
        }
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM subscriptions s
               JOIN user_subscriptions us ON us.subscription_id = s.id
               WHERE us.user_id = ?1 AND s.target_id = ?2 AND s.level = ?3",
              rusqlite::params![user_str, target_str, level_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(subscribed)
  }

  async fn list_subscriptions(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<Subscription>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.subscriptions {
          return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(
          "SELECT s.id, s.target_id, s.level
           FROM subscriptions s
           JOIN user_subscriptions us ON us.subscription_id = s.id
           WHERE us.user_id = ?1
           ORDER BY us.created_at DESC, us.rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok(RawSubscription {
              id:        row.get(0)?,
              target_id: row.get(1)?,
              level:     row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn list_subscribed_user_ids(
    &self,
    target_id: Uuid,
    level: SubscriptionLevel,
  ) -> Result<Vec<Uuid>> {
    let target_str = encode_uuid(target_id);
    let level_str  = level.as_str();

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.subscriptions {
          return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(
          "SELECT us.user_id
           FROM subscriptions s
           JOIN user_subscriptions us ON us.subscription_id = s.id
           WHERE s.target_id = ?1 AND s.level = ?2
           ORDER BY us.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![target_str, level_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Notification views ────────────────────────────────────────────────────

  async fn changes_summary(&self, user_id: Uuid) -> Result<ChangesSummary> {
    let prefs = self.load_preferences(user_id).await?;
    let cutoff = encode_dt(
      clock::utc_now() - Duration::days(i64::from(prefs.retention_days)),
    );
    let user_str = encode_uuid(user_id);

    let rows: Vec<(String, String, i64)> = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.changes {
          return Ok(Vec::new());
        }

        let mut sql = String::from(
          "SELECT c.entity_type, c.change_type, COUNT(*)
           FROM entity_changes c
           WHERE c.created_at >= :cutoff",
        );
        let mut needs_user = false;
        if caps.views {
          sql.push_str(
            " AND NOT EXISTS (SELECT 1 FROM user_change_views v
               WHERE v.user_id = :user AND v.change_id = c.id)",
          );
          needs_user = true;
        }
        if let Some(visible) = visibility::predicate(&caps) {
          sql.push_str(" AND ");
          sql.push_str(&visible);
          needs_user = true;
        } else {
          tracing::debug!("subscription tables absent; summary counts all changes");
        }
        sql.push_str(" GROUP BY c.entity_type, c.change_type");

        let mut stmt = conn.prepare(&sql)?;
        let mut params: Vec<(&str, &dyn rusqlite::ToSql)> =
          vec![(":cutoff", &cutoff)];
        if needs_user {
          params.push((":user", &user_str));
        }
        let rows = stmt
          .query_map(&params[..], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut summary = ChangesSummary::default();
    for (entity_str, change_str, n) in rows {
      let entity = EntityKind::parse(&entity_str)?;
      let change = ChangeKind::parse(&change_str)?;
      summary.add(entity, change, n as u64);
    }
    Ok(summary)
  }

  async fn detailed_changes(
    &self,
    user_id: Uuid,
    entity: EntityKind,
  ) -> Result<Vec<DetailedChange>> {
    let prefs = self.load_preferences(user_id).await?;
    let cutoff = encode_dt(
      clock::utc_now() - Duration::days(i64::from(prefs.retention_days)),
    );
    let user_str   = encode_uuid(user_id);
    let entity_str = entity.as_str();

    let raws: Vec<RawDetailedChange> = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.changes {
          return Ok(Vec::new());
        }

        // The user directory is enrichment only; keep the column count fixed
        // when it is absent.
        let (select_user, join_user) = if caps.users {
          ("u.name, u.email", "LEFT JOIN users u ON u.id = c.changed_by")
        } else {
          ("NULL, NULL", "")
        };

        let mut sql = format!(
          "SELECT c.id, c.entity_type, c.entity_id, c.entity_name,
                  c.change_type, c.change_data, c.changed_by, c.created_at,
                  {select_user}
           FROM entity_changes c
           {join_user}
           WHERE c.entity_type = :entity AND c.created_at >= :cutoff",
        );
        let mut needs_user = false;
        if caps.views {
          sql.push_str(
            " AND NOT EXISTS (SELECT 1 FROM user_change_views v
               WHERE v.user_id = :user AND v.change_id = c.id)",
          );
          needs_user = true;
        }
        if let Some(visible) = visibility::predicate(&caps) {
          sql.push_str(" AND ");
          sql.push_str(&visible);
          needs_user = true;
        }
        sql.push_str(" ORDER BY c.created_at DESC, c.rowid DESC");

        let mut stmt = conn.prepare(&sql)?;
        let mut params: Vec<(&str, &dyn rusqlite::ToSql)> =
          vec![(":entity", &entity_str), (":cutoff", &cutoff)];
        if needs_user {
          params.push((":user", &user_str));
        }
        let rows = stmt
          .query_map(&params[..], |row| {
            Ok(RawDetailedChange {
              change:           RawChange {
                id:          row.get(0)?,
                entity_type: row.get(1)?,
                entity_id:   row.get(2)?,
                entity_name: row.get(3)?,
                change_type: row.get(4)?,
                change_data: row.get(5)?,
                changed_by:  row.get(6)?,
                created_at:  row.get(7)?,
              },
              changed_by_name:  row.get(8)?,
              changed_by_email: row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut changes: Vec<DetailedChange> = raws
      .into_iter()
      .map(RawDetailedChange::into_detailed)
      .collect::<Result<_>>()?;

    if prefs.breaking_only {
      changes.retain(|dc| dc.breaking);
    }
    Ok(changes)
  }

  // ── View state ────────────────────────────────────────────────────────────

  async fn mark_seen(&self, user_id: Uuid, change_ids: Vec<Uuid>) -> Result<()> {
    let user_str  = encode_uuid(user_id);
    let viewed_at = encode_dt(clock::utc_now());
    // Pre-generate a row id per change; ids for rows the unique constraint
    // suppresses are simply discarded.
    let rows: Vec<(String, String)> = change_ids
      .iter()
      .map(|c| (encode_uuid(Uuid::new_v4()), encode_uuid(*c)))
      .collect();

    let provisioned: bool = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.views {
          return Ok(false);
        }
        let tx = conn.transaction()?;
        for (view_id, change_id) in &rows {
          tx.execute(
            "INSERT OR IGNORE INTO user_change_views
               (id, user_id, change_id, viewed_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![view_id, user_str, change_id, viewed_at],
          )?;
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !provisioned {
      // A write has no degraded mode.
      return Err(vigil_core::Error::NotProvisioned("user_change_views").into());
    }
    Ok(())
  }

  // ── Preferences ───────────────────────────────────────────────────────────

  async fn preferences(&self, user_id: Uuid) -> Result<NotificationPreferences> {
    self.load_preferences(user_id).await
  }

  async fn set_preferences(
    &self,
    prefs: NotificationPreferences,
  ) -> Result<()> {
    let user_str       = encode_uuid(prefs.user_id);
    let retention_days = i64::from(prefs.retention_days);
    let breaking_only  = prefs.breaking_only;
    let email_digest   = prefs.email_digest.as_str();
    let real_time      = prefs.real_time;

    let provisioned: bool = self
      .conn
      .call(move |conn| {
        let caps = Capabilities::probe(conn)?;
        if !caps.preferences {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO user_notification_preferences
             (user_id, retention_days, breaking_only, email_digest, real_time)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(user_id) DO UPDATE SET
             retention_days = excluded.retention_days,
             breaking_only  = excluded.breaking_only,
             email_digest   = excluded.email_digest,
             real_time      = excluded.real_time",
          rusqlite::params![
            user_str,
            retention_days,
            breaking_only,
            email_digest,
            real_time,
          ],
        )?;
        Ok(true)
      })
      .await?;

    if !provisioned {
      return Err(
        vigil_core::Error::NotProvisioned("user_notification_preferences")
          .into(),
      );
    }
    Ok(())
  }
}
