//! Deletion safety scope
//!
//! The reconciler must never delete DNS entries it does not recognize as
//! belonging to the managed fleet. A [`SafetyScope`] is the fence: only
//! domains ending with one of its suffixes are eligible for deletion.

use serde::{Deserialize, Serialize};

/// Default suffixes when no override is configured
pub const DEFAULT_SCOPE_SUFFIXES: &[&str] = &[".bevz.net", ".lan"];

/// An ordered set of domain suffixes bounding automatic deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyScope {
    suffixes: Vec<String>,
}

impl SafetyScope {
    /// Build a scope from suffixes, normalizing each to a leading dot
    pub fn new(suffixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let suffixes = suffixes
            .into_iter()
            .map(|s| {
                let s = s.into();
                if s.starts_with('.') {
                    s
                } else {
                    format!(".{}", s)
                }
            })
            .collect();
        Self { suffixes }
    }

    /// True if the domain falls inside the scope, i.e. may be deleted
    pub fn is_managed(&self, domain: &str) -> bool {
        self.suffixes.iter().any(|s| domain.ends_with(s.as_str()))
    }

    /// The normalized suffixes, in configuration order
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}

impl Default for SafetyScope {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_SUFFIXES.iter().copied())
    }
}
