//! Test doubles and common utilities for engine contract tests
//!
//! Minimal mocks over the core traits: an inventory with a fixed record
//! list (or a configured failure) and a backend that records every apply
//! call and can be scripted to reject chosen domains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dnssync_core::error::{Error, Result};
use dnssync_core::traits::{DnsBackend, InventorySource};
use dnssync_core::{Operation, Record};

/// An inventory source backed by a fixed record list
pub struct FixedInventory {
    records: Vec<Record>,
    fail: bool,
}

impl FixedInventory {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            fail: false,
        }
    }

    /// An inventory whose extraction always fails
    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl InventorySource for FixedInventory {
    async fn desired_records(&self) -> Result<Vec<Record>> {
        if self.fail {
            return Err(Error::extraction("no hosts found in inventory"));
        }
        Ok(self.records.clone())
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// A scriptable DNS backend that records applied operations
pub struct ScriptedBackend {
    /// Records returned by list_records
    listed: Vec<Record>,
    /// Whether list_records fails outright
    list_fails: bool,
    /// Domains whose mutations are rejected
    reject_domains: Vec<String>,
    /// Every operation passed to apply, in order
    applied: Arc<Mutex<Vec<Operation>>>,
    /// Call counter for apply()
    apply_call_count: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new(listed: Vec<Record>) -> Self {
        Self {
            listed,
            list_fails: false,
            reject_domains: Vec::new(),
            applied: Arc::new(Mutex::new(Vec::new())),
            apply_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A backend whose list capability is broken
    pub fn with_broken_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Reject every mutation touching this domain
    pub fn rejecting(mut self, domain: &str) -> Self {
        self.reject_domains.push(domain.to_string());
        self
    }

    /// Handles for inspecting calls after the engine consumed the backend
    pub fn probes(&self) -> (Arc<Mutex<Vec<Operation>>>, Arc<AtomicUsize>) {
        (
            Arc::clone(&self.applied),
            Arc::clone(&self.apply_call_count),
        )
    }
}

#[async_trait::async_trait]
impl DnsBackend for ScriptedBackend {
    async fn list_records(&self) -> Result<Vec<Record>> {
        if self.list_fails {
            return Err(Error::transport("connection refused"));
        }
        Ok(self.listed.clone())
    }

    async fn apply(&self, operation: &Operation) -> Result<()> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        self.applied.lock().unwrap().push(operation.clone());
        if self
            .reject_domains
            .iter()
            .any(|d| d == &operation.record().domain)
        {
            return Err(Error::Api {
                key: "bad_request".to_string(),
                message: "rejected by script".to_string(),
                hint: None,
            });
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

/// Shorthand for a record literal in tests
pub fn record(domain: &str, address: &str) -> Record {
    Record::new(domain, address).unwrap()
}
