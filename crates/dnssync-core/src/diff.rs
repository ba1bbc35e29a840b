//! Reconciliation planning
//!
//! [`diff`] computes the minimal operation lists that converge the
//! provider's actual state toward the inventory's desired state. It is pure:
//! no I/O, no logging, deterministic for a given input. The I/O that
//! gathered the two record sets happened upstream; the I/O that applies the
//! plan happens downstream.

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordSet};
use crate::scope::SafetyScope;

/// One mutation to apply against the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Upsert a record keyed by domain (covers both create and address change)
    AddOrUpdate(Record),

    /// Remove a record (addressed by its exact `"address domain"` pair)
    Delete(Record),
}

impl Operation {
    /// The record this operation targets
    pub fn record(&self) -> &Record {
        match self {
            Self::AddOrUpdate(r) | Self::Delete(r) => r,
        }
    }

    /// Short verb for logs and summaries
    pub fn verb(&self) -> &'static str {
        match self {
            Self::AddOrUpdate(_) => "add/update",
            Self::Delete(_) => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.verb(), self.record())
    }
}

/// The two operation lists produced by [`diff`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Desired records missing from actual state, or present with a
    /// different address; insertion order of the desired set
    pub to_add: Vec<Operation>,

    /// In-scope actual records whose domain is absent from desired state;
    /// insertion order of the actual set
    pub to_delete: Vec<Operation>,
}

impl ReconcilePlan {
    /// True if actual state already matches desired state
    pub fn is_converged(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }

    /// Total number of planned operations
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_delete.len()
    }

    /// True if the plan holds no operations
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute the operations that converge `actual` toward `desired`
///
/// A desired record becomes `AddOrUpdate` iff its domain is absent from
/// `actual` or present with a different address. An actual record becomes
/// `Delete` iff its domain is absent from `desired` AND inside `scope`;
/// out-of-scope records are never proposed for deletion regardless of drift.
pub fn diff(desired: &RecordSet, actual: &RecordSet, scope: &SafetyScope) -> ReconcilePlan {
    let to_add = desired
        .iter()
        .filter(|record| actual.address_of(&record.domain) != Some(record.address.as_str()))
        .map(|record| Operation::AddOrUpdate(record.clone()))
        .collect();

    let to_delete = actual
        .iter()
        .filter(|record| {
            !desired.contains_domain(&record.domain) && scope.is_managed(&record.domain)
        })
        .map(|record| Operation::Delete(record.clone()))
        .collect();

    ReconcilePlan { to_add, to_delete }
}

/// Compute deregistration operations for the current fleet's own records
///
/// Returns a `Delete` for every desired record whose domain is present in
/// `actual`, carrying the address the provider actually holds (deleting is
/// addressed by the exact stored pair). Used when tearing a deployment down.
pub fn deregister(desired: &RecordSet, actual: &RecordSet) -> Vec<Operation> {
    desired
        .iter()
        .filter_map(|record| {
            actual.address_of(&record.domain).map(|address| {
                Operation::Delete(Record {
                    domain: record.domain.clone(),
                    address: address.to_string(),
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn record(domain: &str, address: &str) -> Record {
        Record::new(domain, address).unwrap()
    }

    fn set(records: &[(&str, &str)]) -> RecordSet {
        RecordSet::from_records(records.iter().map(|(d, a)| record(d, a)))
    }

    #[test]
    fn missing_record_is_added() {
        let plan = diff(&set(&[("a.x", "1.1.1.1")]), &set(&[]), &SafetyScope::default());
        assert_eq!(plan.to_add, vec![Operation::AddOrUpdate(record("a.x", "1.1.1.1"))]);
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn changed_address_is_re_added() {
        let plan = diff(
            &set(&[("a.x", "1.1.1.1")]),
            &set(&[("a.x", "9.9.9.9")]),
            &SafetyScope::default(),
        );
        assert_eq!(plan.to_add, vec![Operation::AddOrUpdate(record("a.x", "1.1.1.1"))]);
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn stale_in_scope_record_is_deleted() {
        let plan = diff(&set(&[]), &set(&[("b.lan", "2.2.2.2")]), &SafetyScope::new([".lan"]));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_delete, vec![Operation::Delete(record("b.lan", "2.2.2.2"))]);
    }

    #[test]
    fn out_of_scope_record_is_never_deleted() {
        let plan = diff(
            &set(&[]),
            &set(&[("c.example.com", "3.3.3.3")]),
            &SafetyScope::new([".lan"]),
        );
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn identical_states_yield_empty_plan() {
        let desired = set(&[("a.lan", "1.1.1.1"), ("b.lan", "2.2.2.2")]);
        let plan = diff(&desired, &desired.clone(), &SafetyScope::default());
        assert!(plan.is_converged());
    }

    #[test]
    fn diff_is_deterministic() {
        let desired = set(&[("a.lan", "1.1.1.1"), ("b.lan", "2.2.2.2")]);
        let actual = set(&[("b.lan", "9.9.9.9"), ("stale.lan", "3.3.3.3")]);
        let scope = SafetyScope::default();
        assert_eq!(diff(&desired, &actual, &scope), diff(&desired, &actual, &scope));
    }

    #[test]
    fn output_order_follows_input_order() {
        let desired = set(&[("z.lan", "1.1.1.1"), ("a.lan", "2.2.2.2")]);
        let actual = set(&[("y.lan", "3.3.3.3"), ("b.lan", "4.4.4.4")]);
        let plan = diff(&desired, &actual, &SafetyScope::new([".lan"]));
        let add_domains: Vec<_> = plan.to_add.iter().map(|o| o.record().domain.as_str()).collect();
        let del_domains: Vec<_> = plan.to_delete.iter().map(|o| o.record().domain.as_str()).collect();
        assert_eq!(add_domains, vec!["z.lan", "a.lan"]);
        assert_eq!(del_domains, vec!["y.lan", "b.lan"]);
    }

    #[test]
    fn applying_the_plan_converges_actual_to_desired() {
        let desired = set(&[("a.lan", "1.1.1.1"), ("b.lan", "2.2.2.2")]);
        let actual = set(&[
            ("b.lan", "9.9.9.9"),
            ("stale.lan", "3.3.3.3"),
            ("keep.example.com", "4.4.4.4"),
        ]);
        let scope = SafetyScope::new([".lan"]);
        let plan = diff(&desired, &actual, &scope);

        // Replay the plan against a copy of actual.
        let mut converged = RecordSet::new();
        for r in actual.iter() {
            let deleted = plan
                .to_delete
                .iter()
                .any(|op| op.record().domain == r.domain);
            if !deleted {
                converged.insert(r.clone());
            }
        }
        for op in &plan.to_add {
            converged.insert(op.record().clone());
        }

        for r in desired.iter() {
            assert_eq!(converged.address_of(&r.domain), Some(r.address.as_str()));
        }
        // Out-of-scope record survives untouched.
        assert_eq!(converged.address_of("keep.example.com"), Some("4.4.4.4"));
        assert!(!converged.contains_domain("stale.lan"));
    }

    #[test]
    fn deregister_targets_the_stored_address() {
        let desired = set(&[("a.lan", "1.1.1.1"), ("gone.lan", "5.5.5.5")]);
        let actual = set(&[("a.lan", "9.9.9.9")]);
        let ops = deregister(&desired, &actual);
        // Only the record the provider actually holds, with its stored address.
        assert_eq!(ops, vec![Operation::Delete(record("a.lan", "9.9.9.9"))]);
    }
}
