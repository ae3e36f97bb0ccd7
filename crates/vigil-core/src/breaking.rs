//! Breaking-change classification.
//!
//! A fixed heuristic over pre-computed diff fields, not a schema-diff engine.
//! Producers that actually diffed the schema attach `removedFields`,
//! `addedRequiredFields`, and `changedFieldTypes` to the payload's extension
//! map; the classifier just trusts them.

use serde_json::Value;

use crate::change::{ChangePayload, EntityKind};

/// Is this change breaking for downstream consumers of the schema?
///
/// Only `schema` and `schema_version` changes with both `before` and `after`
/// images can be breaking; everything else is `false`.
pub fn is_breaking(entity: EntityKind, payload: &ChangePayload) -> bool {
  if !matches!(entity, EntityKind::Schema | EntityKind::SchemaVersion) {
    return false;
  }
  // Missing either image short-circuits: a create or delete is not a
  // breaking *change* in this model.
  let (Some(before), Some(after)) = (&payload.before, &payload.after) else {
    return false;
  };

  if non_empty_list(payload, "removedFields")
    || non_empty_list(payload, "addedRequiredFields")
    || non_empty_list(payload, "changedFieldTypes")
  {
    return true;
  }

  if entity == EntityKind::SchemaVersion {
    return major_of(after) > major_of(before);
  }

  false
}

fn non_empty_list(payload: &ChangePayload, key: &str) -> bool {
  payload
    .extra
    .get(key)
    .and_then(Value::as_array)
    .is_some_and(|a| !a.is_empty())
}

/// Major component of an image's `semanticVersion`: first dot-separated
/// segment parsed as an integer, 0 when absent or unparseable.
fn major_of(image: &Value) -> u64 {
  image
    .get("semanticVersion")
    .and_then(Value::as_str)
    .and_then(|s| s.split('.').next())
    .and_then(|s| s.trim().parse().ok())
    .unwrap_or(0)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::change::ChangePayload;

  #[test]
  fn major_bump_is_breaking() {
    let payload = ChangePayload::between(
      json!({"semanticVersion": "1.2.0"}),
      json!({"semanticVersion": "2.0.0"}),
    );
    assert!(is_breaking(EntityKind::SchemaVersion, &payload));
  }

  #[test]
  fn minor_bump_is_not_breaking() {
    let payload = ChangePayload::between(
      json!({"semanticVersion": "1.2.0"}),
      json!({"semanticVersion": "1.3.0"}),
    );
    assert!(!is_breaking(EntityKind::SchemaVersion, &payload));
  }

  #[test]
  fn missing_before_short_circuits() {
    let payload = ChangePayload::created(json!({"semanticVersion": "1.3.0"}));
    assert!(!is_breaking(EntityKind::SchemaVersion, &payload));
  }

  #[test]
  fn removed_fields_is_breaking() {
    let payload = ChangePayload::between(json!({}), json!({}))
      .with_extra("removedFields", json!(["x"]));
    assert!(is_breaking(EntityKind::Schema, &payload));
  }

  #[test]
  fn empty_diff_lists_are_not_breaking() {
    let payload = ChangePayload::between(json!({}), json!({}))
      .with_extra("removedFields", json!([]))
      .with_extra("addedRequiredFields", json!([]))
      .with_extra("changedFieldTypes", json!([]));
    assert!(!is_breaking(EntityKind::Schema, &payload));
  }

  #[test]
  fn added_required_fields_is_breaking() {
    let payload = ChangePayload::between(json!({}), json!({}))
      .with_extra("addedRequiredFields", json!(["owner"]));
    assert!(is_breaking(EntityKind::Schema, &payload));
  }

  #[test]
  fn changed_field_types_is_breaking() {
    let payload = ChangePayload::between(json!({}), json!({}))
      .with_extra("changedFieldTypes", json!([{"field": "id"}]));
    assert!(is_breaking(EntityKind::SchemaVersion, &payload));
  }

  #[test]
  fn non_schema_kinds_never_break() {
    let payload = ChangePayload::between(
      json!({"semanticVersion": "1.0.0"}),
      json!({"semanticVersion": "2.0.0"}),
    )
    .with_extra("removedFields", json!(["x"]));
    assert!(!is_breaking(EntityKind::Product, &payload));
    assert!(!is_breaking(EntityKind::Domain, &payload));
    assert!(!is_breaking(EntityKind::Context, &payload));
  }

  #[test]
  fn missing_semantic_version_defaults_to_zero() {
    // No semanticVersion on either side: 0 > 0 is false.
    let payload = ChangePayload::between(json!({}), json!({}));
    assert!(!is_breaking(EntityKind::SchemaVersion, &payload));

    // Absent before-version defaults to 0, so any major >= 1 breaks.
    let payload = ChangePayload::between(
      json!({}),
      json!({"semanticVersion": "1.0.0"}),
    );
    assert!(is_breaking(EntityKind::SchemaVersion, &payload));
  }

  #[test]
  fn unparseable_version_defaults_to_zero() {
    let payload = ChangePayload::between(
      json!({"semanticVersion": "one.two"}),
      json!({"semanticVersion": "also-bad"}),
    );
    assert!(!is_breaking(EntityKind::SchemaVersion, &payload));
  }
}
