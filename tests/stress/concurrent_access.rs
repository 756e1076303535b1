//! Stress tests: a store shared across threads.
//!
//! The store locks each scope across read-modify-write sequences, so
//! concurrent writers never lose each other's records and lazy expiry
//! never deletes a value written after the expired one was read.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use session_vault::time::DAY_MILLIS;
use session_vault::{
    ExpiringKeyStore, ManualClock, MemoryStorage, StorageBackend, StorageScope, VaultCipher,
    VaultConfig, WellKnownKey,
};

fn shared_store() -> Arc<ExpiringKeyStore<MemoryStorage>> {
    Arc::new(
        ExpiringKeyStore::builder(MemoryStorage::new(), MemoryStorage::new())
            .config(VaultConfig::hardened())
            .cipher(VaultCipher::new(&[9u8; 32]).unwrap())
            .build()
            .unwrap(),
    )
}

#[test]
fn stress_concurrent_writers_distinct_keys() {
    let store = shared_store();
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("t{t}-k{i}");
                    store
                        .set(StorageScope::Persistent, &key, &(t * 1000 + i), Some(1))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer panicked");
    }

    assert_eq!(store.backend(StorageScope::Persistent).len(), 800);
    for t in 0..8 {
        for i in 0..100 {
            let v: Option<i32> = store
                .get_value(StorageScope::Persistent, format!("t{t}-k{i}"))
                .unwrap();
            assert_eq!(v, Some(t * 1000 + i));
        }
    }
}

#[test]
fn stress_readers_during_logout() {
    let store = shared_store();
    store
        .set(StorageScope::Persistent, WellKnownKey::UserId, "u-1", None)
        .unwrap();
    store
        .set(StorageScope::Persistent, WellKnownKey::Token, "t-1", None)
        .unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    // Either state is acceptable mid-cascade; errors are not.
                    store.is_authenticated().unwrap();
                }
            })
        })
        .collect();

    store.logout_cascade().unwrap();
    for r in readers {
        r.join().expect("reader panicked");
    }
    assert!(!store.is_authenticated().unwrap());
}

// ── Forced interleavings ──────────────────────────────────────────────────────

/// In-memory backend that parks the first reader of `gated_key` right
/// after its read, until released or a timeout passes.
struct PausingStorage {
    inner: MemoryStorage,
    gated_key: &'static str,
    reached: Mutex<Option<Sender<()>>>,
    release: Mutex<Option<Receiver<()>>>,
}

impl PausingStorage {
    fn plain() -> Self {
        Self {
            inner: MemoryStorage::new(),
            gated_key: "",
            reached: Mutex::new(None),
            release: Mutex::new(None),
        }
    }

    fn gated(key: &'static str) -> (Self, Receiver<()>, Sender<()>) {
        let (reached_tx, reached_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let storage = Self {
            inner: MemoryStorage::new(),
            gated_key: key,
            reached: Mutex::new(Some(reached_tx)),
            release: Mutex::new(Some(release_rx)),
        };
        (storage, reached_rx, release_tx)
    }
}

impl StorageBackend for PausingStorage {
    fn get_item(&self, key: &str) -> session_vault::Result<Option<String>> {
        let value = self.inner.get_item(key)?;
        if key == self.gated_key {
            if let Some(reached) = self.reached.lock().unwrap().take() {
                let _ = reached.send(());
                if let Some(release) = self.release.lock().unwrap().take() {
                    let _ = release.recv_timeout(Duration::from_millis(300));
                }
            }
        }
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> session_vault::Result<()> {
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> session_vault::Result<()> {
        self.inner.remove_item(key)
    }

    fn clear(&self) -> session_vault::Result<()> {
        self.inner.clear()
    }
}

#[test]
fn stress_write_during_expiry_survives() {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let (persistent, reached, release) = PausingStorage::gated("theme");
    let store = ExpiringKeyStore::builder(PausingStorage::plain(), persistent)
        .config(VaultConfig::development())
        .clock(clock.clone())
        .build()
        .unwrap();

    store
        .set(StorageScope::Persistent, "theme", "stale", Some(1))
        .unwrap();
    clock.advance(2 * DAY_MILLIS);

    let store = &store;
    thread::scope(|s| {
        let reader = s.spawn(move || {
            store
                .get_value::<String>(StorageScope::Persistent, "theme")
                .unwrap()
        });

        reached.recv().expect("reader never reached the substrate");
        let writer = s.spawn(move || {
            store
                .set(StorageScope::Persistent, "theme", "fresh", None)
                .unwrap();
            let _ = release.send(());
        });

        assert_eq!(reader.join().expect("reader panicked"), None);
        writer.join().expect("writer panicked");
    });

    let after: Option<String> = store.get_value(StorageScope::Persistent, "theme").unwrap();
    assert_eq!(after.as_deref(), Some("fresh"));
}

#[test]
fn stress_expired_user_id_reads_race_logout() {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let store = Arc::new(
        ExpiringKeyStore::builder(MemoryStorage::new(), MemoryStorage::new())
            .config(VaultConfig::hardened())
            .cipher(VaultCipher::new(&[9u8; 32]).unwrap())
            .clock(clock.clone())
            .build()
            .unwrap(),
    );

    for round in 0..50 {
        store
            .set(StorageScope::Persistent, WellKnownKey::UserId, &format!("u-{round}"), Some(1))
            .unwrap();
        store
            .set(StorageScope::Session, "tab", &round, None)
            .unwrap();
        clock.advance(2 * DAY_MILLIS);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    if t % 2 == 0 {
                        store.logout_cascade().unwrap();
                    } else {
                        let user: Option<String> = store
                            .get_value(StorageScope::Persistent, WellKnownKey::UserId)
                            .unwrap();
                        assert_eq!(user, None);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread panicked");
        }

        assert!(store.backend(StorageScope::Session).is_empty());
        assert!(!store.is_authenticated().unwrap());
    }
}
