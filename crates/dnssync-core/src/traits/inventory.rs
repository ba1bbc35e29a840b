//! Inventory source trait
//!
//! A source of desired state: the record set implied by the current
//! infrastructure inventory (e.g. OpenTofu outputs). Implementations live in
//! their own crates; the engine only sees this interface.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::Record;

/// Trait for desired-state sources
///
/// # Failure semantics
///
/// Desired-state extraction is fatal on failure, and an empty inventory is a
/// failure too: an empty desired set is indistinguishable from "delete
/// everything", which must never happen by accident. Implementations return
/// `Error::Extraction` rather than an empty list.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Extract the desired records, in inventory order
    ///
    /// Individual malformed host entries may be skipped (with a warning),
    /// but a result with no usable records is an error.
    async fn desired_records(&self) -> Result<Vec<Record>>;

    /// Source name for logging and summaries (e.g. "tofu")
    fn source_name(&self) -> &'static str;
}
