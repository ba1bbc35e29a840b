//! Reconciliation engine
//!
//! The engine orchestrates one batch run:
//!
//! ```text
//! ┌──────────────────┐        ┌──────────────┐
//! │ InventorySource  │        │  DnsBackend  │
//! │ (desired, fatal) │        │ (actual,     │
//! └────────┬─────────┘        │  best-effort)│
//!          │                  └──────┬───────┘
//!          ▼                         ▼
//!               diff(desired, actual, scope)
//!                         │
//!                         ▼
//!            [optional selection filter]
//!                         │
//!                         ▼
//!          sequential apply, one op at a time
//!                         │
//!                         ▼
//!                     RunReport
//! ```
//!
//! ## Failure policy
//!
//! - Desired-state extraction errors propagate immediately: an empty or
//!   unreadable desired set must never be treated as "delete everything".
//! - An actual-state read failure degrades to an empty set with a warning;
//!   the run can still add records while the provider's list capability is
//!   broken.
//! - Per-operation failures are captured in the report; the batch continues.
//!   Partial completion is an expected terminal state, never rolled back.

use tracing::{info, warn};

use crate::diff::{deregister, diff, Operation, ReconcilePlan};
use crate::error::Result;
use crate::record::RecordSet;
use crate::scope::SafetyScope;
use crate::traits::{DnsBackend, InventorySource};

/// One operation that the provider rejected or that could not be delivered
#[derive(Debug)]
pub struct OperationFailure {
    /// The operation that failed
    pub operation: Operation,

    /// The classified reason
    pub reason: crate::Error,
}

/// Outcome of applying a batch of operations
#[derive(Debug, Default)]
pub struct RunReport {
    /// Operations the provider accepted
    pub succeeded: usize,

    /// Every failure, in application order; never silently swallowed
    pub failures: Vec<OperationFailure>,
}

impl RunReport {
    /// True if no operation in the batch failed
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of operations attempted
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }
}

/// Core reconciliation engine
///
/// Single-threaded and batch-oriented: one desired read, one best-effort
/// actual read, one pure diff, then a sequential apply loop. Each mutation's
/// outcome is observed before the next begins, so operations on overlapping
/// domains cannot race within a run.
pub struct ReconcileEngine {
    /// Desired-state source
    inventory: Box<dyn InventorySource>,

    /// Provider backend for reads and mutations
    backend: Box<dyn DnsBackend>,

    /// Deletion safety scope
    scope: SafetyScope,
}

impl ReconcileEngine {
    /// Create an engine over a source, a backend and a deletion scope
    pub fn new(
        inventory: Box<dyn InventorySource>,
        backend: Box<dyn DnsBackend>,
        scope: SafetyScope,
    ) -> Self {
        Self {
            inventory,
            backend,
            scope,
        }
    }

    /// Read the desired record set (fatal on failure)
    pub async fn desired_state(&self) -> Result<RecordSet> {
        let records = self.inventory.desired_records().await?;
        info!(
            source = self.inventory.source_name(),
            count = records.len(),
            "desired state extracted"
        );
        Ok(RecordSet::from_records(records))
    }

    /// Read the provider's record set, degrading to empty on failure
    ///
    /// A provider whose list capability is broken must not block additions,
    /// so the error is logged and an empty set returned. Deletions computed
    /// against a degraded set are empty too, which is the safe direction.
    pub async fn actual_state(&self) -> RecordSet {
        match self.backend.list_records().await {
            Ok(records) => {
                info!(
                    backend = self.backend.backend_name(),
                    count = records.len(),
                    "actual state retrieved"
                );
                RecordSet::from_records(records)
            }
            Err(e) => {
                warn!(
                    backend = self.backend.backend_name(),
                    error = %e,
                    "could not retrieve provider records, proceeding with an empty actual set; \
                     some provider-side records may be invisible to this run"
                );
                RecordSet::new()
            }
        }
    }

    /// Compute the convergence plan for the current desired and actual state
    pub async fn plan(&self) -> Result<ReconcilePlan> {
        let desired = self.desired_state().await?;
        let actual = self.actual_state().await;
        Ok(diff(&desired, &actual, &self.scope))
    }

    /// Compute deregistration candidates: the fleet's own records as the
    /// provider currently holds them
    pub async fn deregister_candidates(&self) -> Result<Vec<Operation>> {
        let desired = self.desired_state().await?;
        let actual = self.actual_state().await;
        Ok(deregister(&desired, &actual))
    }

    /// Apply operations sequentially, capturing per-operation outcomes
    ///
    /// One failing mutation does not abort the remaining operations;
    /// successes are never rolled back.
    pub async fn execute(&self, operations: &[Operation]) -> RunReport {
        let mut report = RunReport::default();
        for operation in operations {
            info!(%operation, "applying");
            match self.backend.apply(operation).await {
                Ok(()) => {
                    info!(%operation, "applied");
                    report.succeeded += 1;
                }
                Err(reason) => {
                    warn!(%operation, error = %reason, "operation failed, continuing batch");
                    report.failures.push(OperationFailure {
                        operation: operation.clone(),
                        reason,
                    });
                }
            }
        }
        report
    }
}
