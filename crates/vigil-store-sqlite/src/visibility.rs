//! The hierarchical visibility predicate.
//!
//! A change to an entity is visible to a user iff the user holds a
//! subscription to the entity itself or to any ancestor at the three
//! subscribable levels (Product/Domain/Context) — OR semantics across levels.
//! The rule is expressed as one relational predicate over the change row
//! (aliased `c`), correlated against `subscriptions ⋈ user_subscriptions` and
//! the host's hierarchy tables, so a summary or detail query stays a single
//! statement instead of N sequential lookups.
//!
//! The caller binds the acting user as the named parameter `:user`.

use vigil_core::change::EntityKind;

use crate::probe::Capabilities;

/// Build the visibility predicate for the given table availability, or `None`
/// when the subscription tables are absent entirely — the bootstrap/legacy
/// state in which every change is visible to everyone. That fallback is a
/// deliberate product decision carried over from the original system; do not
/// quietly tighten it.
pub fn predicate(caps: &Capabilities) -> Option<String> {
  if !caps.subscriptions {
    return None;
  }

  let arms: Vec<String> = [
    arm(EntityKind::Product, product_clauses()),
    arm(EntityKind::Domain, domain_clauses(caps)),
    arm(EntityKind::Context, context_clauses(caps)),
    arm(EntityKind::Schema, schema_clauses(caps)),
    arm(EntityKind::SchemaVersion, schema_version_clauses(caps)),
  ]
  .into_iter()
  .flatten()
  .collect();

  Some(format!("({})", arms.join(" OR ")))
}

// ─── Per-entity-kind clause sets ─────────────────────────────────────────────
//
// Each function returns the subscription levels that can make a change of
// that kind visible, with the ancestor id derived by walking the hierarchy
// tables. A missing hierarchy table drops exactly the clauses that need it.

fn product_clauses() -> Vec<String> {
  // Root level: direct match only.
  vec![holds('P', "c.entity_id")]
}

fn domain_clauses(caps: &Capabilities) -> Vec<String> {
  let mut clauses = vec![holds('D', "c.entity_id")];
  if caps.domains {
    clauses.push(holds('P', &product_of_domain("c.entity_id")));
  }
  clauses
}

fn context_clauses(caps: &Capabilities) -> Vec<String> {
  let mut clauses = vec![holds('C', "c.entity_id")];
  if caps.contexts {
    let domain = domain_of_context("c.entity_id");
    clauses.push(holds('D', &domain));
    if caps.domains {
      clauses.push(holds('P', &product_of_domain(&domain)));
    }
  }
  clauses
}

fn schema_clauses(caps: &Capabilities) -> Vec<String> {
  // Not directly subscribable: every clause is inherited.
  let mut clauses = Vec::new();
  if caps.schemas {
    let context = context_of_schema("c.entity_id");
    clauses.push(holds('C', &context));
    if caps.contexts {
      let domain = domain_of_context(&context);
      clauses.push(holds('D', &domain));
      if caps.domains {
        clauses.push(holds('P', &product_of_domain(&domain)));
      }
    }
  }
  clauses
}

fn schema_version_clauses(caps: &Capabilities) -> Vec<String> {
  let mut clauses = Vec::new();
  if caps.schema_versions && caps.schemas {
    let context = context_of_schema(&schema_of_version("c.entity_id"));
    clauses.push(holds('C', &context));
    if caps.contexts {
      let domain = domain_of_context(&context);
      clauses.push(holds('D', &domain));
      if caps.domains {
        clauses.push(holds('P', &product_of_domain(&domain)));
      }
    }
  }
  clauses
}

// ─── Building blocks ─────────────────────────────────────────────────────────

/// One entity-kind arm of the predicate. An empty clause set means changes of
/// that kind are reachable by no subscription right now, so the arm is
/// omitted and those rows match nothing.
fn arm(entity: EntityKind, clauses: Vec<String>) -> Option<String> {
  if clauses.is_empty() {
    return None;
  }
  Some(format!(
    "(c.entity_type = '{}' AND ({}))",
    entity.as_str(),
    clauses.join(" OR ")
  ))
}

/// Does the acting user hold a subscription at `level` whose target is the id
/// produced by `target`?
fn holds(level: char, target: &str) -> String {
  format!(
    "EXISTS (SELECT 1 FROM subscriptions s \
     JOIN user_subscriptions us ON us.subscription_id = s.id \
     WHERE us.user_id = :user AND s.level = '{level}' \
     AND s.target_id = {target})"
  )
}

// Ancestor-id derivations, one hierarchy hop each. Composable: the child
// expression may itself be one of these.

fn product_of_domain(child: &str) -> String {
  format!("(SELECT d.product_id FROM domains d WHERE d.id = {child})")
}

fn domain_of_context(child: &str) -> String {
  format!("(SELECT x.domain_id FROM contexts x WHERE x.id = {child})")
}

fn context_of_schema(child: &str) -> String {
  format!("(SELECT sc.context_id FROM schemas sc WHERE sc.id = {child})")
}

fn schema_of_version(child: &str) -> String {
  format!("(SELECT sv.schema_id FROM schema_versions sv WHERE sv.id = {child})")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_subscription_tables_means_no_filter() {
    let caps = Capabilities {
      subscriptions: false,
      ..Capabilities::full()
    };
    assert!(predicate(&caps).is_none());
  }

  #[test]
  fn full_predicate_covers_all_five_kinds() {
    let sql = predicate(&Capabilities::full()).unwrap();
    for kind in ["product", "domain", "context", "schema", "schema_version"] {
      assert!(
        sql.contains(&format!("c.entity_type = '{kind}'")),
        "missing arm for {kind}"
      );
    }
    // 1 (product) + 2 (domain) + 3 (context) + 3 (schema) + 3 (version)
    assert_eq!(sql.matches("EXISTS").count(), 12);
  }

  #[test]
  fn missing_domains_table_drops_product_inheritance() {
    let caps = Capabilities { domains: false, ..Capabilities::full() };
    let sql = predicate(&caps).unwrap();
    // Direct P/D/C matches survive; every walk through `domains` is gone.
    assert!(!sql.contains("FROM domains"));
    assert!(sql.contains("c.entity_type = 'domain'"));
    assert_eq!(sql.matches("EXISTS").count(), 8);
  }

  #[test]
  fn missing_schemas_table_omits_schema_arms() {
    let caps = Capabilities {
      schemas: false,
      ..Capabilities::full()
    };
    let sql = predicate(&caps).unwrap();
    assert!(!sql.contains("c.entity_type = 'schema'"));
    assert!(!sql.contains("c.entity_type = 'schema_version'"));
    assert!(sql.contains("c.entity_type = 'context'"));
  }

  #[test]
  fn version_walk_goes_through_all_four_tables() {
    let sql = predicate(&Capabilities::full()).unwrap();
    for table in ["schema_versions", "schemas", "contexts", "domains"] {
      assert!(sql.contains(&format!("FROM {table}")), "missing {table} hop");
    }
  }
}
