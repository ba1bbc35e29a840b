//! Configuration types for a reconciliation run
//!
//! The binary assembles this from CLI arguments and the decrypted secrets
//! document; embedders can construct it directly.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scope::SafetyScope;

/// Configuration for one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS provider host (IP or name, no scheme)
    pub endpoint_host: String,

    /// Deletion scope suffixes; empty means the built-in default scope
    #[serde(default)]
    pub scope_suffixes: Vec<String>,

    /// Per-call HTTP timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl SyncConfig {
    /// Create a configuration for an endpoint with default scope and timeout
    pub fn new(endpoint_host: impl Into<String>) -> Self {
        Self {
            endpoint_host: endpoint_host.into(),
            scope_suffixes: Vec::new(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Replace the deletion scope suffixes
    pub fn with_scope_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.scope_suffixes = suffixes;
        self
    }

    /// The effective safety scope for this run
    pub fn scope(&self) -> SafetyScope {
        if self.scope_suffixes.is_empty() {
            SafetyScope::default()
        } else {
            SafetyScope::new(self.scope_suffixes.iter().cloned())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_host.is_empty() {
            return Err(Error::config("endpoint host cannot be empty"));
        }
        if self.endpoint_host.contains("://") {
            return Err(Error::config(
                "endpoint host must be a bare host, not a URL",
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::config("HTTP timeout must be > 0"));
        }
        if self.scope_suffixes.iter().any(|s| s.trim_matches('.').is_empty()) {
            return Err(Error::config("scope suffixes cannot be empty"));
        }
        Ok(())
    }
}

fn default_http_timeout_secs() -> u64 {
    10
}
