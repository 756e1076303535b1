//! Key and nonce derivation using HKDF-SHA256.
//!
//! The vault encryption key is derived from a master key (raw bytes or
//! an Argon2id passphrase key) under a fixed context string. Nonces are
//! synthetic: derived from the key and the plaintext, so encrypting the
//! same value twice under one key yields the same ciphertext.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{Result, VaultError};

/// Derive a 32-byte child key from a root key and context string.
///
/// Uses HKDF-SHA256 (RFC 5869) with the root key as IKM and
/// the context as info.
pub fn derive_key(root_key_bytes: &[u8; 32], context: &str) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, root_key_bytes);
    let mut output = [0u8; 32];
    hk.expand(context.as_bytes(), &mut output)
        .map_err(|e| VaultError::DerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}

/// Derive the 12-byte ChaCha20-Poly1305 nonce for `plaintext`.
///
/// The plaintext is the HKDF salt and the encryption key the IKM.
pub fn synthetic_nonce(key: &[u8; 32], plaintext: &[u8]) -> Result<[u8; 12]> {
    let hk = Hkdf::<Sha256>::new(Some(plaintext), key);
    let mut nonce = [0u8; 12];
    hk.expand(nonce_context().as_bytes(), &mut nonce)
        .map_err(|e| VaultError::DerivationFailed(format!("nonce expand failed: {e}")))?;
    Ok(nonce)
}

/// Derivation path for the value encryption key.
pub fn encryption_context() -> String {
    "session-vault/encryption".to_string()
}

/// Derivation path for synthetic nonces.
pub fn nonce_context() -> String {
    "session-vault/nonce".to_string()
}
