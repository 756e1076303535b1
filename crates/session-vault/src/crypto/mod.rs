//! Cryptographic primitives for session-vault.
//!
//! This module provides:
//! - The [`Cipher`] capability the store uses for key hashing and
//!   value encryption
//! - ChaCha20-Poly1305 value encryption with synthetic nonces
//! - HKDF-SHA256 key and nonce derivation
//! - Argon2id passphrase-based key derivation
//! - Random salt generation

pub mod cipher;
pub mod derivation;
pub mod encryption;
pub mod random;

pub use cipher::{Cipher, PlainCipher};
pub use encryption::VaultCipher;
