//! The write-path recording facade.
//!
//! Entity CRUD handlers call [`observe`] after every mutation. Whatever goes
//! wrong inside the notification engine — an unprovisioned change log, a
//! failed cleanup, a broken connection — is logged and absorbed here, so
//! observing a mutation can never abort the mutation itself.

use vigil_core::{
  change::{ChangeRecord, NewChange},
  store::NotificationStore,
};

/// Record a change, best-effort. Returns the stored record, or `None` if
/// recording failed (already logged; callers must not treat this as an
/// error).
pub async fn observe<S>(store: &S, input: NewChange) -> Option<ChangeRecord>
where
  S: NotificationStore,
{
  let entity = input.entity;
  let entity_id = input.entity_id;
  match store.record_change(input).await {
    Ok(record) => Some(record),
    Err(e) => {
      tracing::warn!(
        %entity,
        %entity_id,
        error = %e,
        "change not recorded; continuing without it"
      );
      None
    }
  }
}
