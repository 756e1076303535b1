//! Basic vault usage: store session state, read it back, log out.
//!
//! Run with: cargo run --example basic_vault

use session_vault::{
    ExpiringKeyStore, MemoryStorage, StorageScope, VaultCipher, VaultConfig, WellKnownKey,
};

fn main() -> session_vault::Result<()> {
    let store = ExpiringKeyStore::builder(MemoryStorage::new(), MemoryStorage::new())
        .config(VaultConfig::hardened())
        .cipher(VaultCipher::new(&[7u8; 32])?)
        .build()?;

    // Log in for a week.
    store.set(StorageScope::Persistent, WellKnownKey::UserId, "u-1001", Some(7))?;
    store.set(StorageScope::Persistent, WellKnownKey::Token, "tok-7f3a", Some(7))?;
    store.set(StorageScope::Session, "breadcrumbs", &["home", "reports"], None)?;

    println!("Authenticated: {}", store.is_authenticated()?);

    let user: Option<String> = store.get_value(StorageScope::Persistent, WellKnownKey::UserId)?;
    println!("User: {}", user.unwrap_or_default());

    // What actually sits in the substrate: hashed key, encrypted value.
    let raw_key = store.storage_key(WellKnownKey::UserId.as_str());
    println!("Stored under: {raw_key}");

    store.logout_cascade()?;
    println!("After logout: {}", store.is_authenticated()?);

    Ok(())
}
