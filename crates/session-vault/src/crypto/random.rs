//! Salt generation for passphrase-derived vault keys.

use rand::RngCore;

/// A fresh 16-byte Argon2id salt from the thread-local generator.
pub fn random_salt_16() -> [u8; 16] {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
