//! Value encryption using ChaCha20-Poly1305 and passphrase-based
//! key derivation using Argon2id.
//!
//! Stored text format: base64 of `nonce (12 bytes) || ciphertext`.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::crypto::cipher::Cipher;
use crate::crypto::derivation;
use crate::error::{Result, VaultError};

/// Argon2id parameters for passphrase-based key derivation.
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Derive a 32-byte master key from a passphrase and salt using Argon2id.
pub fn derive_passphrase_key(passphrase: &[u8], salt: &[u8; 16]) -> Result<[u8; 32]> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| VaultError::DerivationFailed(format!("Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase, salt, &mut output)
        .map_err(|e| VaultError::DerivationFailed(format!("Argon2 hash: {e}")))?;

    Ok(output)
}

/// Encrypt plaintext with ChaCha20-Poly1305 under an explicit nonce.
pub fn encrypt(key: &[u8; 32], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("cipher init: {e}")))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encrypt: {e}")))
}

/// Decrypt ciphertext with ChaCha20-Poly1305.
pub fn decrypt(key: &[u8; 32], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| VaultError::DecryptionFailed(format!("cipher init: {e}")))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| VaultError::DecryptionFailed("authentication tag mismatch".to_string()))
}

/// The hardened-mode cipher.
///
/// Keys are hashed with SHA-256 (lowercase hex). Values are encrypted with
/// ChaCha20-Poly1305 under a key derived from the master key; nonces are
/// synthetic, so equal plaintexts produce equal ciphertexts.
///
/// The encryption key is zeroized on drop.
pub struct VaultCipher {
    key: [u8; 32],
}

impl VaultCipher {
    /// Build a cipher from 32 bytes of master key material.
    pub fn new(master_key: &[u8; 32]) -> Result<Self> {
        let key = derivation::derive_key(master_key, &derivation::encryption_context())?;
        Ok(Self { key })
    }

    /// Build a cipher from a passphrase and a stored 16-byte salt.
    pub fn from_passphrase(passphrase: &[u8], salt: &[u8; 16]) -> Result<Self> {
        let mut master = derive_passphrase_key(passphrase, salt)?;
        let cipher = Self::new(&master);
        master.zeroize();
        cipher
    }
}

impl Drop for VaultCipher {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for VaultCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCipher").finish_non_exhaustive()
    }
}

impl Cipher for VaultCipher {
    fn hash(&self, plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.as_bytes()))
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = derivation::synthetic_nonce(&self.key, plaintext.as_bytes())?;
        let ciphertext = encrypt(&self.key, &nonce, plaintext.as_bytes())?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(base64::engine::general_purpose::STANDARD.encode(blob))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let blob = base64::engine::general_purpose::STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| VaultError::DecryptionFailed(format!("base64: {e}")))?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::DecryptionFailed(format!(
                "ciphertext too short ({} bytes)",
                blob.len()
            )));
        }
        let (nonce, body) = blob.split_at(NONCE_LEN);
        let plaintext = decrypt(&self.key, nonce, body)?;
        String::from_utf8(plaintext)
            .map_err(|e| VaultError::DecryptionFailed(format!("utf-8: {e}")))
    }
}
