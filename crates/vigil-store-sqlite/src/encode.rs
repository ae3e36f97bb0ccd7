//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with whole-second precision
//! and an explicit `Z` suffix — one transform, applied everywhere, so string
//! comparison in SQL agrees with chronological order. Payloads are compact
//! JSON. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;
use vigil_core::{
  change::{ChangeKind, ChangePayload, ChangeRecord, EntityKind},
  clock,
  preferences::{DigestFrequency, NotificationPreferences},
  subscription::{Subscription, SubscriptionLevel},
  summary::DetailedChange,
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  clock::truncate(dt).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── ChangePayload ───────────────────────────────────────────────────────────

pub fn encode_payload(p: &ChangePayload) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn decode_payload(s: &str) -> Result<ChangePayload> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `entity_changes` row.
pub struct RawChange {
  pub id:          String,
  pub entity_type: String,
  pub entity_id:   String,
  pub entity_name: String,
  pub change_type: String,
  pub change_data: String,
  pub changed_by:  Option<String>,
  pub created_at:  String,
}

impl RawChange {
  pub fn into_record(self) -> Result<ChangeRecord> {
    Ok(ChangeRecord {
      id:          decode_uuid(&self.id)?,
      entity:      EntityKind::parse(&self.entity_type)?,
      entity_id:   decode_uuid(&self.entity_id)?,
      entity_name: self.entity_name,
      change:      ChangeKind::parse(&self.change_type)?,
      payload:     decode_payload(&self.change_data)?,
      changed_by:  self
        .changed_by
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// A change row left-joined with the host user directory.
pub struct RawDetailedChange {
  pub change:           RawChange,
  pub changed_by_name:  Option<String>,
  pub changed_by_email: Option<String>,
}

impl RawDetailedChange {
  pub fn into_detailed(self) -> Result<DetailedChange> {
    let record = self.change.into_record()?;
    let breaking = vigil_core::breaking::is_breaking(
      record.entity,
      &record.payload,
    );
    Ok(DetailedChange {
      record,
      changed_by_name: self.changed_by_name,
      changed_by_email: self.changed_by_email,
      breaking,
    })
  }
}

/// Raw strings read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub id:        String,
  pub target_id: String,
  pub level:     String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      id:        decode_uuid(&self.id)?,
      target_id: decode_uuid(&self.target_id)?,
      level:     SubscriptionLevel::parse(&self.level)?,
    })
  }
}

/// Raw values read directly from a `user_notification_preferences` row.
pub struct RawPreferences {
  pub user_id:        String,
  pub retention_days: i64,
  pub breaking_only:  bool,
  pub email_digest:   String,
  pub real_time:      bool,
}

impl RawPreferences {
  pub fn into_preferences(self) -> Result<NotificationPreferences> {
    let retention_days = u32::try_from(self.retention_days).map_err(|_| {
      Error::Decode(format!(
        "retention_days out of range: {}",
        self.retention_days
      ))
    })?;
    Ok(NotificationPreferences {
      user_id: decode_uuid(&self.user_id)?,
      retention_days,
      breaking_only: self.breaking_only,
      email_digest: DigestFrequency::parse(&self.email_digest)?,
      real_time: self.real_time,
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use serde_json::json;

  use super::*;

  #[test]
  fn timestamps_are_whole_second_utc_with_z_suffix() {
    let dt = Utc
      .with_ymd_and_hms(2024, 5, 17, 9, 30, 12)
      .unwrap()
      .checked_add_signed(chrono::Duration::nanoseconds(987))
      .unwrap();
    assert_eq!(encode_dt(dt), "2024-05-17T09:30:12Z");
    assert_eq!(decode_dt("2024-05-17T09:30:12Z").unwrap().timestamp(), dt.timestamp());
  }

  #[test]
  fn payload_round_trips_enrichment_fields_verbatim() {
    let payload = ChangePayload::between(json!({"a": 1}), json!({"a": 2}))
      .with_extra("schemaName", json!("orders"))
      .with_extra("removedFields", json!(["a"]));
    let encoded = encode_payload(&payload).unwrap();
    let decoded = decode_payload(&encoded).unwrap();
    assert_eq!(decoded, payload);
    assert_eq!(decoded.extra["schemaName"], json!("orders"));
  }
}
