// # dnssync-core
//
// Core library for the fleet DNS reconciliation system.
//
// ## Architecture Overview
//
// This library provides the decision logic for one-shot batch reconciliation
// of a DNS provider's custom host records against an infrastructure inventory:
//
// - **Record / RecordSet**: canonical host-record model shared by all sources
// - **SafetyScope**: the suffix fence that makes deletions safe
// - **diff / deregister**: pure planning functions producing operations
// - **InventorySource**: trait for desired-state sources (e.g. OpenTofu output)
// - **DnsBackend**: trait for the provider API (list + apply)
// - **ReconcileEngine**: orchestrates one run (plan, then sequential execute)
//
// ## Design Principles
//
// 1. **Separation of Concerns**: planning is pure, I/O lives behind traits
// 2. **Safety First**: deletions are scoped; desired-state failures are fatal
// 3. **Batch Semantics**: one failing operation never aborts the batch
// 4. **Library-First**: the binary is a thin adapter over this crate

pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod record;
pub mod scope;
pub mod select;
pub mod traits;

// Re-export core types for convenience
pub use config::SyncConfig;
pub use diff::{deregister, diff, Operation, ReconcilePlan};
pub use engine::{OperationFailure, ReconcileEngine, RunReport};
pub use error::{Error, Result};
pub use record::{Record, RecordSet};
pub use scope::SafetyScope;
pub use select::{select, Choice};
pub use traits::{DnsBackend, InventorySource, SessionCredential};
