//! Shared blocklist of user ids and phone numbers

use dashmap::DashSet;

/// Set of blocked identifiers
///
/// User ids and phone numbers are both valid keys and are checked
/// independently. Runtime writes only append; removal is an explicit
/// administrative action. Adds are idempotent under concurrent duplicates.
#[derive(Debug, Default)]
pub struct Blocklist {
    entries: DashSet<String>,
}

impl Blocklist {
    /// Create an empty blocklist
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the identifier is blocked
    pub fn is_blocked(&self, identifier: &str) -> bool {
        self.entries.contains(identifier)
    }

    /// Add an identifier; returns true if it was newly inserted
    pub fn add(&self, identifier: impl Into<String>) -> bool {
        self.entries.insert(identifier.into())
    }

    /// Remove an identifier; returns true if it was present
    pub fn remove(&self, identifier: &str) -> bool {
        self.entries.remove(identifier).is_some()
    }

    /// Number of blocked identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is blocked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
