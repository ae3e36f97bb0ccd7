//! Second-precision UTC clock.
//!
//! Every timestamp the engine writes (`created_at`, `viewed_at`) and every
//! retention-window comparison goes through here so the whole system agrees
//! on one invariant: no sub-second precision, ever.

use chrono::{DateTime, SubsecRound as _, Utc};

/// UTC now, truncated to whole seconds.
pub fn utc_now() -> DateTime<Utc> { Utc::now().trunc_subsecs(0) }

/// Truncate an arbitrary timestamp to the engine's precision.
pub fn truncate(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(0) }

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Timelike as _;

  use super::*;

  #[test]
  fn now_has_no_subsecond_component() {
    assert_eq!(utc_now().nanosecond(), 0);
  }

  #[test]
  fn truncate_drops_nanoseconds() {
    let dt = Utc::now().with_nanosecond(123_456_789).unwrap();
    assert_eq!(truncate(dt).nanosecond(), 0);
    assert_eq!(truncate(dt).second(), dt.second());
  }
}
