//! DNS backend trait
//!
//! The interface to the provider's record store: one authenticated read of
//! the current custom records, and one call per mutation. Implementations
//! handle the provider's wire formats; the engine owns sequencing, failure
//! aggregation and the decision of what to apply.

use async_trait::async_trait;

use crate::diff::Operation;
use crate::error::Result;
use crate::record::Record;

/// A short-lived authenticated session with the provider
///
/// Owned by exactly one reconciliation run, never persisted. The session
/// expires server-side; a failed authenticated call surfaces as an error
/// rather than triggering re-authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    /// Opaque session id (sent as a cookie)
    pub sid: String,

    /// Opaque anti-forgery token (sent as a header)
    pub csrf: String,
}

// Tokens never appear in logs.
impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("sid", &"<REDACTED>")
            .field("csrf", &"<REDACTED>")
            .finish()
    }
}

/// Trait for DNS provider backends
///
/// # Constraints
///
/// Backends are single-shot API adapters:
/// - one HTTP call per `apply` invocation, outcome classified and returned
/// - no retry or backoff (a failed operation is reported, not repeated)
/// - no caching of provider state between calls
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// List the provider's current custom records
    ///
    /// Implementations normalize whatever response shape the provider emits
    /// into canonical records. A recognized successful-but-empty response is
    /// `Ok(vec![])`; a provider that cannot be read at all is an `Err`, which
    /// the engine downgrades to an empty actual set with a warning.
    async fn list_records(&self) -> Result<Vec<Record>>;

    /// Apply one mutation and classify the provider's response
    ///
    /// `Ok(())` means the provider accepted the mutation under any of its
    /// recognized success shapes. `Err` carries the classified failure:
    /// an API-reported error, an unexpected shape, an unparseable body, or
    /// a transport failure.
    async fn apply(&self, operation: &Operation) -> Result<()>;

    /// Backend name for logging and summaries (e.g. "pihole")
    fn backend_name(&self) -> &'static str;
}
