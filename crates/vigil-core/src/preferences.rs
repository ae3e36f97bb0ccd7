//! Per-user notification preferences.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Retention floor in days. Cleanup never purges more aggressively than this,
/// whatever individual users configure.
pub const RETENTION_FLOOR_DAYS: u32 = 30;

// ─── DigestFrequency ─────────────────────────────────────────────────────────

/// How often the user wants an email digest of unseen changes. Digest
/// assembly/delivery is an external collaborator; this is configuration only.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestFrequency {
  #[default]
  Never,
  Daily,
  Weekly,
}

impl DigestFrequency {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Never => "never",
      Self::Daily => "daily",
      Self::Weekly => "weekly",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "never" => Ok(Self::Never),
      "daily" => Ok(Self::Daily),
      "weekly" => Ok(Self::Weekly),
      other => Err(Error::UnknownDigestFrequency(other.to_owned())),
    }
  }
}

// ─── NotificationPreferences ─────────────────────────────────────────────────

/// Per-user configuration. Upserted on first write; when no row exists the
/// store answers with [`NotificationPreferences::defaults`] without
/// materializing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
  pub user_id:        Uuid,
  /// How far back this user's summary/detail views reach, in days.
  pub retention_days: u32,
  /// If set, detail views only surface breaking changes.
  pub breaking_only:  bool,
  pub email_digest:   DigestFrequency,
  pub real_time:      bool,
}

impl NotificationPreferences {
  pub fn defaults(user_id: Uuid) -> Self {
    Self {
      user_id,
      retention_days: RETENTION_FLOOR_DAYS,
      breaking_only: false,
      email_digest: DigestFrequency::Never,
      real_time: true,
    }
  }
}
