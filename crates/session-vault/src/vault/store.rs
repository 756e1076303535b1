//! `ExpiringKeyStore`: namespaced get/set/clear over two scopes with lazy
//! expiry and optional at-rest obfuscation.
//!
//! In hardened mode every lookup key is hashed and every serialized record
//! encrypted before it reaches the substrate. In development mode keys and
//! JSON are stored verbatim. A record written in one mode cannot be found
//! from the other.
//!
//! Reading the persistent user-id key after its deadline logs the session
//! out: the session scope is wiped and every identity key removed. The
//! [`Lookup`] returned by [`ExpiringKeyStore::get`] reports when that
//! happened.
//!
//! Each scope has its own lock, held across every read-modify-write
//! sequence. Locks are always taken session first, then persistent.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::VaultConfig;
use crate::crypto::{Cipher, PlainCipher};
use crate::error::{Result, VaultError};
use crate::judge::{EmptyCheck, JudgeEmpty};
use crate::keys::{WellKnownKey, IDENTITY_KEYS};
use crate::storage::{MemoryStorage, StorageBackend};
use crate::time::{Clock, SystemClock};
use crate::vault::record::StoredRecord;
use crate::vault::scope::StorageScope;

// ── Lookup ────────────────────────────────────────────────────────────────────

/// Result of a read.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    /// The payload, if present and unexpired.
    pub value: Option<T>,
    /// `true` if this read found the user id expired and ran the logout
    /// cascade.
    pub cascade_triggered: bool,
}

impl<T> Lookup<T> {
    fn missing() -> Self {
        Self {
            value: None,
            cascade_triggered: false,
        }
    }

    fn found(value: T) -> Self {
        Self {
            value: Some(value),
            cascade_triggered: false,
        }
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Builder for [`ExpiringKeyStore`].
pub struct StoreBuilder<S> {
    session: S,
    persistent: S,
    config: VaultConfig,
    cipher: Option<Arc<dyn Cipher>>,
    empty_check: Arc<dyn EmptyCheck>,
    clock: Arc<dyn Clock>,
}

impl<S: StorageBackend> StoreBuilder<S> {
    pub fn new(session: S, persistent: S) -> Self {
        Self {
            session,
            persistent,
            config: VaultConfig::default(),
            cipher: None,
            empty_check: Arc::new(JudgeEmpty),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn config(mut self, config: VaultConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cipher(mut self, cipher: impl Cipher + 'static) -> Self {
        self.cipher = Some(Arc::new(cipher));
        self
    }

    pub fn empty_check(mut self, check: impl EmptyCheck + 'static) -> Self {
        self.empty_check = Arc::new(check);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Finish the store.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidConfig` if hardened mode is selected
    /// without a cipher.
    pub fn build(self) -> Result<ExpiringKeyStore<S>> {
        let cipher = match (self.config.mode.is_hardened(), self.cipher) {
            (_, Some(cipher)) => cipher,
            (false, None) => Arc::new(PlainCipher) as Arc<dyn Cipher>,
            (true, None) => {
                return Err(VaultError::InvalidConfig(
                    "hardened mode requires a cipher".to_string(),
                ))
            }
        };

        Ok(ExpiringKeyStore {
            session: self.session,
            persistent: self.persistent,
            config: self.config,
            cipher,
            empty_check: self.empty_check,
            clock: self.clock,
            locks: ScopeLocks::default(),
        })
    }
}

// ── Scope locks ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ScopeLocks {
    session: Mutex<()>,
    persistent: Mutex<()>,
}

type ScopeGuard<'a> = MutexGuard<'a, ()>;

// ── ExpiringKeyStore ──────────────────────────────────────────────────────────

/// Facade over a session and a persistent substrate.
///
/// Everything durable lives in the substrates; the store itself only holds
/// its collaborators and the per-scope locks.
pub struct ExpiringKeyStore<S> {
    session: S,
    persistent: S,
    config: VaultConfig,
    cipher: Arc<dyn Cipher>,
    empty_check: Arc<dyn EmptyCheck>,
    clock: Arc<dyn Clock>,
    locks: ScopeLocks,
}

impl ExpiringKeyStore<MemoryStorage> {
    /// A development-mode store over two fresh in-memory maps.
    pub fn in_memory() -> Self {
        Self {
            session: MemoryStorage::new(),
            persistent: MemoryStorage::new(),
            config: VaultConfig::development(),
            cipher: Arc::new(PlainCipher),
            empty_check: Arc::new(JudgeEmpty),
            clock: Arc::new(SystemClock),
            locks: ScopeLocks::default(),
        }
    }
}

impl<S: StorageBackend> ExpiringKeyStore<S> {
    pub fn builder(session: S, persistent: S) -> StoreBuilder<S> {
        StoreBuilder::new(session, persistent)
    }

    pub fn config(&self) -> VaultConfig {
        self.config
    }

    /// The raw substrate behind `scope`.
    pub fn backend(&self, scope: StorageScope) -> &S {
        match scope {
            StorageScope::Session => &self.session,
            StorageScope::Persistent => &self.persistent,
        }
    }

    /// The key actually used in the substrate for logical `key`.
    pub fn storage_key(&self, key: &str) -> String {
        if self.config.mode.is_hardened() {
            self.cipher.hash(key)
        } else {
            key.to_string()
        }
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Store `value` under `key`.
    ///
    /// A value that serializes to `null` is ignored, so an existing entry is
    /// never replaced by nothing. `ttl_days` only applies to the persistent
    /// scope; `None` or zero means the record never expires.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::SerializationError` if `value` cannot be encoded,
    /// `VaultError::EncryptionFailed` in hardened mode, or whatever the
    /// substrate reports.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        scope: StorageScope,
        key: impl AsRef<str>,
        value: &T,
        ttl_days: Option<u32>,
    ) -> Result<()> {
        let key = key.as_ref();
        let payload =
            serde_json::to_value(value).map_err(|e| VaultError::SerializationError(e.to_string()))?;
        if payload.is_null() {
            log::debug!("skipping write of null value to {scope} key '{key}'");
            return Ok(());
        }

        let record = match ttl_days {
            Some(days) if scope.supports_ttl() => {
                StoredRecord::with_ttl(payload, self.clock.now_millis(), days)
            }
            _ => StoredRecord::new(payload),
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| VaultError::SerializationError(e.to_string()))?;
        let stored = if self.config.mode.is_hardened() {
            self.cipher.encrypt(&json)?
        } else {
            json
        };

        let _guard = self.lock_scope(scope)?;
        self.backend(scope)
            .set_item(&self.storage_key(key), &stored)
    }

    /// Remove a single entry. Absent keys are a no-op.
    pub fn clear(&self, scope: StorageScope, key: impl AsRef<str>) -> Result<()> {
        let _guard = self.lock_scope(scope)?;
        self.backend(scope)
            .remove_item(&self.storage_key(key.as_ref()))
    }

    /// Remove every entry in `scope`.
    pub fn clear_scope(&self, scope: StorageScope) -> Result<()> {
        let _guard = self.lock_scope(scope)?;
        self.backend(scope).clear()
    }

    /// Wipe the session scope and remove every persistent identity key.
    ///
    /// Best-effort: a failure part-way leaves earlier removals in place.
    pub fn logout_cascade(&self) -> Result<()> {
        let _session = self.lock_scope(StorageScope::Session)?;
        let _persistent = self.lock_scope(StorageScope::Persistent)?;
        self.cascade_locked()
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Read the value under `key`.
    ///
    /// An expired record is removed and reported as missing. If it was the
    /// persistent user id, the logout cascade runs as well and
    /// `cascade_triggered` is set.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::CorruptRecord` if the stored text cannot be
    /// decrypted or does not decode as a record holding a `T`.
    pub fn get<T: DeserializeOwned>(
        &self,
        scope: StorageScope,
        key: impl AsRef<str>,
    ) -> Result<Lookup<T>> {
        let key = key.as_ref();
        let lookup = self.lookup_value(scope, key)?;
        let value = match lookup.value {
            Some(payload) => Some(serde_json::from_value(payload).map_err(|e| {
                log::warn!("{scope} key '{key}' holds an unexpected payload: {e}");
                VaultError::corrupt(key, format!("payload: {e}"))
            })?),
            None => None,
        };
        Ok(Lookup {
            value,
            cascade_triggered: lookup.cascade_triggered,
        })
    }

    /// [`get`](Self::get) without the cascade flag.
    pub fn get_value<T: DeserializeOwned>(
        &self,
        scope: StorageScope,
        key: impl AsRef<str>,
    ) -> Result<Option<T>> {
        self.get(scope, key).map(Lookup::into_value)
    }

    /// `true` iff the persistent user id and token both hold non-empty
    /// values. Runs lazy expiry on both.
    pub fn is_authenticated(&self) -> Result<bool> {
        let user = self.lookup_value(StorageScope::Persistent, WellKnownKey::UserId.as_str())?;
        let token = self.lookup_value(StorageScope::Persistent, WellKnownKey::Token.as_str())?;
        let present = |v: &Option<Value>| {
            v.as_ref()
                .is_some_and(|value| !self.empty_check.is_empty(value))
        };
        Ok(present(&user.value) && present(&token.value))
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn lock_scope(&self, scope: StorageScope) -> Result<ScopeGuard<'_>> {
        let lock = match scope {
            StorageScope::Session => &self.locks.session,
            StorageScope::Persistent => &self.locks.persistent,
        };
        lock.lock()
            .map_err(|_| VaultError::StorageError(format!("{scope} scope lock poisoned")))
    }

    /// Caller holds both scope locks.
    fn cascade_locked(&self) -> Result<()> {
        log::debug!("logout cascade: clearing session scope and identity keys");
        self.session.clear()?;
        for key in IDENTITY_KEYS {
            self.persistent.remove_item(&self.storage_key(key.as_str()))?;
        }
        Ok(())
    }

    /// Read and decode the record under `key`, applying lazy expiry.
    ///
    /// A persistent user-id read may end in the cascade, so it takes the
    /// session lock up front to keep the lock order.
    fn lookup_value(&self, scope: StorageScope, key: &str) -> Result<Lookup<Value>> {
        let may_cascade =
            scope == StorageScope::Persistent && key == WellKnownKey::UserId.as_str();
        let _session = if may_cascade {
            Some(self.lock_scope(StorageScope::Session)?)
        } else {
            None
        };
        let _guard = self.lock_scope(scope)?;

        let storage_key = self.storage_key(key);
        let Some(raw) = self.backend(scope).get_item(&storage_key)? else {
            return Ok(Lookup::missing());
        };

        let record = self.decode(key, &raw)?;
        if !record.is_expired_at(self.clock.now_millis()) {
            return Ok(Lookup::found(record.payload));
        }

        log::debug!("{scope} key '{key}' expired");
        self.backend(scope).remove_item(&storage_key)?;

        if may_cascade {
            self.cascade_locked()?;
        }
        Ok(Lookup {
            value: None,
            cascade_triggered: may_cascade,
        })
    }

    fn decode(&self, key: &str, raw: &str) -> Result<StoredRecord<Value>> {
        let json = if self.config.mode.is_hardened() {
            self.cipher.decrypt(raw).map_err(|e| {
                log::warn!("failed to decrypt record under '{key}': {e}");
                VaultError::corrupt(key, e.to_string())
            })?
        } else {
            raw.to_string()
        };

        serde_json::from_str(&json).map_err(|e| {
            log::warn!("failed to decode record under '{key}': {e}");
            VaultError::corrupt(key, format!("decode: {e}"))
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
