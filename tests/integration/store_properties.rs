//! Integration tests: observable properties of the expiring store.
//!
//! Covers round-trips in both modes, TTL boundaries, null writes,
//! cascade completeness and isolation between modes.

use std::sync::Arc;

use serde_json::{json, Value};
use session_vault::time::DAY_MILLIS;
use session_vault::{
    ExpiringKeyStore, ManualClock, MemoryStorage, StorageBackend, StorageScope, VaultCipher,
    VaultConfig, VaultMode, WellKnownKey, IDENTITY_KEYS,
};

const T0: u64 = 1_710_000_000_000;
const MASTER_KEY: [u8; 32] = [0x5a; 32];

fn build(
    mode: VaultMode,
    session: Arc<MemoryStorage>,
    persistent: Arc<MemoryStorage>,
    clock: Arc<ManualClock>,
) -> ExpiringKeyStore<Arc<MemoryStorage>> {
    ExpiringKeyStore::builder(session, persistent)
        .config(VaultConfig::new(mode))
        .cipher(VaultCipher::new(&MASTER_KEY).expect("cipher"))
        .clock(clock)
        .build()
        .expect("store should build")
}

fn fresh(mode: VaultMode) -> (ExpiringKeyStore<Arc<MemoryStorage>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let store = build(
        mode,
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
        clock.clone(),
    );
    (store, clock)
}

fn sample_values() -> Vec<Value> {
    vec![
        json!("u-1001"),
        json!(0),
        json!(false),
        json!(3.25),
        json!(""),
        json!([]),
        json!({"id": 9, "name": "atlas", "tags": ["a", "b"]}),
        json!([{"id": 1}, {"id": 2, "nested": {"deep": [null, true]}}]),
        json!("unicode ✓ 中文"),
    ]
}

#[test]
fn round_trip_every_value_in_both_modes_and_scopes() {
    for mode in [VaultMode::Development, VaultMode::Hardened] {
        let (store, _) = fresh(mode);
        for scope in [StorageScope::Session, StorageScope::Persistent] {
            for (i, value) in sample_values().into_iter().enumerate() {
                let key = format!("k{i}");
                store.set(scope, &key, &value, None).unwrap();
                let back: Option<Value> = store.get_value(scope, &key).unwrap();
                assert_eq!(back, Some(value), "mode={mode} scope={scope} key={key}");
            }
        }
    }
}

#[test]
fn ttl_boundary_is_exclusive_of_deadline() {
    for ttl_days in [1u32, 3, 30] {
        let (store, clock) = fresh(VaultMode::Hardened);
        store
            .set(StorageScope::Persistent, "theme", "dark", Some(ttl_days))
            .unwrap();

        let deadline = T0 + u64::from(ttl_days) * DAY_MILLIS;
        clock.set(deadline - 1);
        let v: Option<String> = store.get_value(StorageScope::Persistent, "theme").unwrap();
        assert_eq!(v.as_deref(), Some("dark"), "one ms before deadline");

        clock.set(deadline);
        let v: Option<String> = store.get_value(StorageScope::Persistent, "theme").unwrap();
        assert_eq!(v, None, "at deadline");
    }
}

#[test]
fn ttl_beyond_deadline_stays_expired() {
    let (store, clock) = fresh(VaultMode::Development);
    store
        .set(StorageScope::Persistent, "theme", "dark", Some(2))
        .unwrap();
    clock.set(T0 + 365 * DAY_MILLIS);
    assert_eq!(
        store
            .get_value::<String>(StorageScope::Persistent, "theme")
            .unwrap(),
        None
    );
}

#[test]
fn no_ttl_never_expires() {
    let (store, clock) = fresh(VaultMode::Hardened);
    store
        .set(StorageScope::Persistent, "lang", "en", None)
        .unwrap();
    store
        .set(StorageScope::Persistent, "zero", "ttl", Some(0))
        .unwrap();
    clock.set(u64::MAX);
    assert_eq!(
        store
            .get_value::<String>(StorageScope::Persistent, "lang")
            .unwrap()
            .as_deref(),
        Some("en")
    );
    assert_eq!(
        store
            .get_value::<String>(StorageScope::Persistent, "zero")
            .unwrap()
            .as_deref(),
        Some("ttl")
    );
}

#[test]
fn null_write_leaves_prior_value() {
    for mode in [VaultMode::Development, VaultMode::Hardened] {
        let (store, _) = fresh(mode);
        for scope in [StorageScope::Session, StorageScope::Persistent] {
            store.set(scope, "slot", &json!({"v": 1}), None).unwrap();
            store.set(scope, "slot", &Value::Null, Some(5)).unwrap();
            store.set(scope, "slot", &Option::<u8>::None, None).unwrap();
            let v: Option<Value> = store.get_value(scope, "slot").unwrap();
            assert_eq!(v, Some(json!({"v": 1})));
        }
    }
}

#[test]
fn null_write_to_empty_slot_creates_nothing() {
    let (store, _) = fresh(VaultMode::Development);
    store
        .set(StorageScope::Persistent, "slot", &Value::Null, None)
        .unwrap();
    assert!(store.backend(StorageScope::Persistent).is_empty());
}

#[test]
fn cascade_clears_identity_and_session() {
    for mode in [VaultMode::Development, VaultMode::Hardened] {
        let (store, _) = fresh(mode);
        for key in IDENTITY_KEYS {
            store
                .set(StorageScope::Persistent, key, &format!("{key}-value"), Some(10))
                .unwrap();
        }
        for i in 0..5 {
            store
                .set(StorageScope::Session, format!("s{i}"), &i, None)
                .unwrap();
        }
        store
            .set(StorageScope::Persistent, "remember-me", &true, None)
            .unwrap();

        store.logout_cascade().unwrap();

        for key in IDENTITY_KEYS {
            let v: Option<Value> = store.get_value(StorageScope::Persistent, key).unwrap();
            assert_eq!(v, None, "{key} should be cleared");
        }
        for i in 0..5 {
            let v: Option<Value> = store
                .get_value(StorageScope::Session, format!("s{i}"))
                .unwrap();
            assert_eq!(v, None);
        }
        assert!(store.backend(StorageScope::Session).is_empty());
        let kept: Option<bool> = store
            .get_value(StorageScope::Persistent, "remember-me")
            .unwrap();
        assert_eq!(kept, Some(true));
    }
}

#[test]
fn expired_user_id_read_triggers_cascade() {
    let (store, clock) = fresh(VaultMode::Hardened);
    store
        .set(StorageScope::Persistent, WellKnownKey::UserId, "u-1", Some(7))
        .unwrap();
    for key in IDENTITY_KEYS.iter().skip(1) {
        store
            .set(StorageScope::Persistent, key, &json!({"k": key.as_str()}), None)
            .unwrap();
    }
    store
        .set(StorageScope::Session, "draft", "text", None)
        .unwrap();

    clock.advance(7 * DAY_MILLIS);
    let lookup = store
        .get::<String>(StorageScope::Persistent, WellKnownKey::UserId)
        .unwrap();
    assert_eq!(lookup.value, None);
    assert!(lookup.cascade_triggered);

    for key in IDENTITY_KEYS {
        let v: Option<Value> = store.get_value(StorageScope::Persistent, key).unwrap();
        assert_eq!(v, None, "{key} should be gone after cascade");
    }
    assert!(store.backend(StorageScope::Session).is_empty());
}

#[test]
fn modes_do_not_see_each_other() {
    let session = Arc::new(MemoryStorage::new());
    let persistent = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::new(T0));
    let hardened = build(
        VaultMode::Hardened,
        session.clone(),
        persistent.clone(),
        clock.clone(),
    );
    let development = build(VaultMode::Development, session, persistent, clock);

    hardened
        .set(StorageScope::Persistent, "token", "sealed", None)
        .unwrap();
    development
        .set(StorageScope::Persistent, "lang", "plain", None)
        .unwrap();

    // The other mode looks under a different key, so it finds nothing.
    assert_eq!(
        development
            .get_value::<String>(StorageScope::Persistent, "token")
            .unwrap(),
        None
    );
    assert_eq!(
        hardened
            .get_value::<String>(StorageScope::Persistent, "lang")
            .unwrap(),
        None
    );

    // Each mode still reads its own writes.
    assert_eq!(
        hardened
            .get_value::<String>(StorageScope::Persistent, "token")
            .unwrap()
            .as_deref(),
        Some("sealed")
    );
    assert_eq!(
        development
            .get_value::<String>(StorageScope::Persistent, "lang")
            .unwrap()
            .as_deref(),
        Some("plain")
    );
}

#[test]
fn plain_record_under_hashed_key_is_corrupt_in_hardened_mode() {
    let (store, _) = fresh(VaultMode::Hardened);
    let hashed = store.storage_key("token");
    store
        .backend(StorageScope::Persistent)
        .set_item(&hashed, r#"{"obj":"plain"}"#)
        .unwrap();
    let err = store
        .get::<String>(StorageScope::Persistent, "token")
        .unwrap_err();
    assert!(err.is_corrupt());
}
