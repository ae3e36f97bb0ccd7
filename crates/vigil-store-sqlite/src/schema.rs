//! SQL schema for the Vigil notification tables.
//!
//! Applied by [`crate::SqliteStore::provision`]; idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`. The registry's own tables (products, domains,
//! contexts, schemas, schema_versions, users) belong to the host's migration
//! layer and are never created here — the store only reads them, and tolerates
//! their absence.

/// Notification-table DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The change log is strictly append-only.
-- No UPDATE is ever issued against this table; the only DELETE comes from
-- retention cleanup.
CREATE TABLE IF NOT EXISTS entity_changes (
    id          TEXT PRIMARY KEY,
    entity_type TEXT NOT NULL,   -- 'product' | 'domain' | 'context' | 'schema' | 'schema_version'
    entity_id   TEXT NOT NULL,   -- logical reference into the host's tables; no FK
    entity_name TEXT NOT NULL,   -- display name at time of change
    change_type TEXT NOT NULL,   -- 'created' | 'updated' | 'deleted'
    change_data TEXT NOT NULL,   -- JSON: {before?, after?} plus enrichment fields
    changed_by  TEXT,            -- NULL for system/anonymous changes
    created_at  TEXT NOT NULL    -- ISO 8601 UTC, whole seconds; server-assigned
);

-- One row per subscribable target, however many users watch it.
CREATE TABLE IF NOT EXISTS subscriptions (
    id        TEXT PRIMARY KEY,
    target_id TEXT NOT NULL,     -- Product, Domain, or Context id per level
    level     TEXT NOT NULL,     -- 'P' | 'D' | 'C'
    UNIQUE (target_id, level)
);

CREATE TABLE IF NOT EXISTS user_subscriptions (
    id              TEXT PRIMARY KEY,
    subscription_id TEXT NOT NULL REFERENCES subscriptions(id),
    user_id         TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    UNIQUE (subscription_id, user_id)
);

CREATE TABLE IF NOT EXISTS user_change_views (
    id        TEXT PRIMARY KEY,
    user_id   TEXT NOT NULL,
    change_id TEXT NOT NULL REFERENCES entity_changes(id) ON DELETE CASCADE,
    viewed_at TEXT NOT NULL,
    UNIQUE (user_id, change_id)
);

CREATE TABLE IF NOT EXISTS user_notification_preferences (
    user_id        TEXT PRIMARY KEY,
    retention_days INTEGER NOT NULL DEFAULT 30,
    breaking_only  INTEGER NOT NULL DEFAULT 0,
    email_digest   TEXT NOT NULL DEFAULT 'never',
    real_time      INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS entity_changes_type_idx    ON entity_changes(entity_type);
CREATE INDEX IF NOT EXISTS entity_changes_created_idx ON entity_changes(created_at);
CREATE INDEX IF NOT EXISTS user_change_views_change_idx ON user_change_views(change_id);

PRAGMA user_version = 1;
";
