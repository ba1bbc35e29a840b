//! Canonical host-record model
//!
//! Every source of records (inventory output, provider API responses in any
//! of their shapes) is normalized into [`Record`] before the diff engine
//! sees it. A [`RecordSet`] keys records by domain: a domain maps to at most
//! one address in either desired or actual state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// One custom DNS host entry: a fully-qualified name mapped to an address literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Fully-qualified host name
    pub domain: String,

    /// IPv4/IPv6 address literal
    pub address: String,
}

impl Record {
    /// Create a record from its two components
    ///
    /// Either component being empty yields a parse error naming the entry.
    pub fn new(domain: impl Into<String>, address: impl Into<String>) -> Result<Self> {
        let domain = domain.into();
        let address = address.into();
        if domain.is_empty() || address.is_empty() {
            return Err(Error::parse(format!("{} {}", address, domain)));
        }
        Ok(Self { domain, address })
    }

    /// Parse a provider-style `"address domain"` line
    ///
    /// The line is split on the first whitespace run only, so domains
    /// containing no spaces survive intact.
    pub fn parse_host_line(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let address = parts.next().unwrap_or("").trim();
        let domain = parts.next().unwrap_or("").trim();
        if address.is_empty() || domain.is_empty() {
            return Err(Error::parse(line));
        }
        Ok(Self {
            domain: domain.to_string(),
            address: address.to_string(),
        })
    }

    /// Render the record in the provider's `"address domain"` wire form
    pub fn to_host_line(&self) -> String {
        format!("{} {}", self.address, self.domain)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.domain, self.address)
    }
}

/// An insertion-ordered mapping from domain to address
///
/// Duplicate domains follow a last-write-wins policy: the displaced record
/// is returned from [`RecordSet::insert`] and logged by
/// [`RecordSet::from_records`], never silently dropped.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    /// Records in insertion order (a replaced domain keeps its original slot)
    entries: Vec<Record>,

    /// Domain → index into `entries`
    index: HashMap<String, usize>,
}

impl RecordSet {
    /// Create an empty record set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record set from a sequence of records, warning on duplicates
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut set = Self::new();
        for record in records {
            if let Some(previous) = set.insert(record) {
                warn!(
                    domain = %previous.domain,
                    old_address = %previous.address,
                    "duplicate domain in record batch, last write wins"
                );
            }
        }
        set
    }

    /// Insert a record, returning the displaced record if the domain was present
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        match self.index.get(&record.domain) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], record)),
            None => {
                self.index.insert(record.domain.clone(), self.entries.len());
                self.entries.push(record);
                None
            }
        }
    }

    /// Look up the address mapped to a domain
    pub fn address_of(&self, domain: &str) -> Option<&str> {
        self.index
            .get(domain)
            .map(|&i| self.entries[i].address.as_str())
    }

    /// True if the set holds a record for this domain
    pub fn contains_domain(&self, domain: &str) -> bool {
        self.index.contains_key(domain)
    }

    /// Iterate records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter()
    }

    /// Number of records in the set
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}
