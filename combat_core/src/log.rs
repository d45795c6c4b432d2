//! Narrated combat log
//!
//! An append-only sequence of human-readable event lines. The engine is the
//! only writer; the UI layer reads entries for display and never mutates
//! them.

use serde::{Deserialize, Serialize};

/// Append-only narrated log for one combat session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatLog {
    entries: Vec<String>,
}

impl CombatLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a narrated line
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether anything has been narrated yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
