//! session-vault — expiring, optionally encrypted key-value persistence
//! for front-end session state.
//!
//! Provides a store over a session-scoped and a persistent substrate with
//! lazy TTL expiry, hashed keys and encrypted values in hardened mode, a
//! logout cascade over the well-known identity keys, UUID-shaped trace
//! identifiers, and user-agent sniffing.

pub mod browser;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identifier;
pub mod judge;
pub mod keys;
pub mod storage;
pub mod time;
pub mod vault;

// Re-export primary types
pub use config::{VaultConfig, VaultMode};
pub use crypto::{Cipher, PlainCipher, VaultCipher};
pub use error::{Result, VaultError};
pub use judge::{EmptyCheck, JudgeEmpty};
pub use keys::{WellKnownKey, IDENTITY_KEYS};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use time::{Clock, ManualClock, SystemClock};
pub use vault::{ExpiringKeyStore, Lookup, StorageScope, StoreBuilder, StoredRecord};
