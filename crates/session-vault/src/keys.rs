//! Well-known storage keys.
//!
//! The identity keys describe a logged-in session and are removed together
//! by the logout cascade.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Closed set of keys the store treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownKey {
    /// Logged-in user id. Its expiry ends the whole session.
    UserId,
    /// Auth token.
    Token,
    /// Authorization flags.
    Auth,
    /// Admin flag.
    Admin,
    /// Active project.
    Project,
    /// Projects visible to the user.
    ProjectList,
    /// Shared-organization context.
    CommonOrganize,
}

/// Every key removed from the persistent scope on logout.
pub const IDENTITY_KEYS: [WellKnownKey; 7] = [
    WellKnownKey::UserId,
    WellKnownKey::Token,
    WellKnownKey::Auth,
    WellKnownKey::Admin,
    WellKnownKey::Project,
    WellKnownKey::ProjectList,
    WellKnownKey::CommonOrganize,
];

impl WellKnownKey {
    /// The storage key string. Stable across releases.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserId => "userID",
            Self::Token => "token",
            Self::Auth => "auth",
            Self::Admin => "admin",
            Self::Project => "project",
            Self::ProjectList => "projectAry",
            Self::CommonOrganize => "commonOrganize",
        }
    }
}

impl AsRef<str> for WellKnownKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WellKnownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WellKnownKey {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IDENTITY_KEYS
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| VaultError::InvalidConfig(format!("not a well-known key: {s}")))
    }
}
