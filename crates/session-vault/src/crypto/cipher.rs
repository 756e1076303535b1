//! The cipher capability consumed by the store.

use crate::error::Result;

/// Key obfuscation and value encryption for hardened mode.
///
/// `hash` must be deterministic; it is never reversed. `decrypt` must
/// invert `encrypt` for a fixed cipher instance.
pub trait Cipher: Send + Sync {
    /// Obfuscate a lookup key.
    fn hash(&self, plaintext: &str) -> String;

    /// Encrypt a serialized record into storable text.
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Recover a serialized record from storable text.
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Pass-through cipher: every operation returns its input.
///
/// Useful in tests and for tooling that wants hardened-mode code paths
/// without real key material.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainCipher;

impl Cipher for PlainCipher {
    fn hash(&self, plaintext: &str) -> String {
        plaintext.to_string()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        Ok(ciphertext.to_string())
    }
}
