//! Deployment configuration.
//!
//! The operating mode is read once, when the store is built, and never
//! toggled afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Environment variable selecting the operating mode.
pub const MODE_ENV_VAR: &str = "SESSION_VAULT_MODE";

/// How keys and values reach the storage substrate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultMode {
    /// Plain keys and plain JSON, for inspectability.
    #[default]
    Development,
    /// Hashed keys and encrypted values.
    Hardened,
}

impl VaultMode {
    pub fn is_hardened(self) -> bool {
        matches!(self, Self::Hardened)
    }
}

impl FromStr for VaultMode {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "development" | "dev" => Ok(Self::Development),
            "hardened" | "production" | "prod" => Ok(Self::Hardened),
            other => Err(VaultError::InvalidConfig(format!(
                "unknown vault mode '{other}' (expected 'development' or 'hardened')"
            ))),
        }
    }
}

impl fmt::Display for VaultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Hardened => write!(f, "hardened"),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub mode: VaultMode,
}

impl VaultConfig {
    pub fn new(mode: VaultMode) -> Self {
        Self { mode }
    }

    pub fn hardened() -> Self {
        Self::new(VaultMode::Hardened)
    }

    pub fn development() -> Self {
        Self::new(VaultMode::Development)
    }

    /// Read the mode from `SESSION_VAULT_MODE`. Unset means development.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidConfig` for an unrecognised value.
    pub fn from_env() -> Result<Self> {
        match std::env::var(MODE_ENV_VAR) {
            Ok(raw) => Ok(Self::new(raw.parse()?)),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(VaultError::InvalidConfig(format!("{MODE_ENV_VAR}: {e}"))),
        }
    }
}
