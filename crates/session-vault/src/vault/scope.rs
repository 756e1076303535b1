//! Storage scopes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which substrate a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    /// Cleared when the browsing session ends, or on logout.
    Session,
    /// Survives restarts until removed or found expired.
    Persistent,
}

impl StorageScope {
    /// Only persistent records carry a deadline.
    pub fn supports_ttl(self) -> bool {
        matches!(self, Self::Persistent)
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Persistent => write!(f, "persistent"),
        }
    }
}
