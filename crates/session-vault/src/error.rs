//! Error types for session-vault.
//!
//! All errors are strongly typed and propagated without panicking.
//! Key material and plaintext payloads are never included in error messages.

/// Vault error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Corrupt record under key '{key}': {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Build a `CorruptRecord` error for a logical key.
    pub fn corrupt(key: &str, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Return `true` if this error reports unreadable stored data.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. })
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, VaultError>;
