//! Salted PBKDF2 password derivation and constant-time verification.
//!
//! Salts are random bytes rendered as lowercase hex, and the hex *string*
//! (not the raw bytes) is what gets fed to the KDF. Existing store files
//! depend on that.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::users::UserRecord;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const SALT_BYTES: usize = 16;
pub const KEY_BYTES: usize = 32;

/// A salt and the key derived from it, both hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub salt: String,
    pub key: String,
}

/// Derive a verification key for `password`. A fresh salt is generated when
/// `salt` is `None`.
pub fn hash_password(password: &str, salt: Option<&str>) -> HashedPassword {
    let salt = match salt {
        Some(salt) => salt.to_string(),
        None => generate_salt(),
    };
    let key = derive_key(password, &salt);
    HashedPassword {
        salt,
        key: hex::encode(key),
    }
}

/// Recompute the key for `provided` with the record's salt and compare it to
/// the stored key. A stored key that is not valid hex of the expected length
/// never verifies.
pub fn verify_password(record: &UserRecord, provided: &str) -> bool {
    let derived = derive_key(provided, &record.salt);
    let Ok(stored) = hex::decode(&record.password_key) else {
        return false;
    };
    constant_time_eq(&derived, &stored)
}

fn derive_key(password: &str, salt: &str) -> [u8; KEY_BYTES] {
    let mut key = [0u8; KEY_BYTES];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut key,
    );
    key
}

fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
