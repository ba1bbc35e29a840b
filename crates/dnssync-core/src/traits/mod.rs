//! Core traits for the reconciliation system
//!
//! This module defines the abstract interfaces the engine orchestrates.
//!
//! - [`InventorySource`]: produce the desired record set from infrastructure output
//! - [`DnsBackend`]: read and mutate the provider's actual record store

pub mod dns_backend;
pub mod inventory;

pub use dns_backend::{DnsBackend, SessionCredential};
pub use inventory::InventorySource;
