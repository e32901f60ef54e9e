//! Password Hashing
//!
//! Salted PBKDF2-HMAC-SHA256 with a fixed iteration count. Hashes and salts
//! travel as hex strings.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Random salt length before hex encoding
pub const SALT_BYTES: usize = 16;

/// Derived key length (SHA-256 output size)
pub const HASH_BYTES: usize = 32;

/// A derived password hash together with the salt that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Generate a random hex-encoded salt
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password, generating a fresh salt when none is supplied.
///
/// The salt string's UTF-8 bytes feed the KDF directly; a hex salt is not
/// decoded first.
pub fn hash_password(password: &str, salt: Option<&str>) -> PasswordHash {
    let salt = match salt {
        Some(salt) => salt.to_string(),
        None => generate_salt(),
    };

    let mut derived = [0u8; HASH_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut derived,
    );

    PasswordHash {
        hash: hex::encode(derived),
        salt,
    }
}

/// Verify a password against a stored hash and salt
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let candidate = hash_password(password, Some(salt));
    constant_time_eq(candidate.hash.as_bytes(), hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("correct-horse-battery-staple", None);

        assert_eq!(hashed.hash.len(), HASH_BYTES * 2);
        assert_eq!(hashed.salt.len(), SALT_BYTES * 2);
        assert!(verify_password("correct-horse-battery-staple", &hashed.hash, &hashed.salt));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hashed = hash_password("real-password", Some("somesalt"));
        assert!(!verify_password("wrong-password", &hashed.hash, &hashed.salt));
    }

    #[test]
    fn test_wrong_salt_fails() {
        let hashed = hash_password("real-password", Some("salt-a"));
        assert!(!verify_password("real-password", &hashed.hash, "salt-b"));
    }

    #[test]
    fn test_tampered_hash_fails() {
        let hashed = hash_password("real-password", None);
        let mut tampered = hashed.hash.clone();
        let last = if tampered.ends_with('0') { "1" } else { "0" };
        tampered.replace_range(tampered.len() - 1.., last);

        assert!(!verify_password("real-password", &tampered, &hashed.salt));
        assert!(!verify_password("real-password", "", &hashed.salt));
    }

    #[test]
    fn test_supplied_salt_is_deterministic() {
        let first = hash_password("pw", Some("fixed"));
        let second = hash_password("pw", Some("fixed"));

        assert_eq!(first, second);
        assert_eq!(first.salt, "fixed");
    }

    #[test]
    fn test_generated_salts_differ() {
        let first = hash_password("pw", None);
        let second = hash_password("pw", None);

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn test_known_vector() {
        // PBKDF2-HMAC-SHA256("password", "salt", 100000, 32)
        let hashed = hash_password("password", Some("salt"));
        assert_eq!(
            hashed.hash,
            "0394a2ede332c9a13eb82e9b24631604c31df978b4e2f0fbd2c549944f9d79a5"
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }
}
