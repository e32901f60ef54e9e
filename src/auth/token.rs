//! Session Tokens

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Local};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Random bytes behind each token before encoding
pub const TOKEN_BYTES: usize = 32;

/// Token lifetime used by [`generate_token`]
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Upper bound on a token lifetime in either direction (100 years)
pub const MAX_EXPIRY_HOURS: i64 = 24 * 365 * 100;

/// An issued token and the user it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Local>,
}

impl TokenRecord {
    /// Check whether the record expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Local>) -> bool {
        self.expires_at <= now
    }

    /// Check whether the record has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Local::now())
    }
}

/// Generate a token for `user_id` that expires in 24 hours
pub fn generate_token(user_id: &str) -> TokenRecord {
    generate_token_with_expiry(user_id, DEFAULT_EXPIRY_HOURS)
}

/// Generate a token for `user_id` that expires after `expiry_hours`.
///
/// The lifetime is clamped to [`MAX_EXPIRY_HOURS`]; negative values yield
/// an already-expired record.
pub fn generate_token_with_expiry(user_id: &str, expiry_hours: i64) -> TokenRecord {
    let hours = expiry_hours.clamp(-MAX_EXPIRY_HOURS, MAX_EXPIRY_HOURS);
    generate_token_with_ttl(user_id, Duration::hours(hours))
}

/// Generate a token for `user_id` that expires after `ttl`.
///
/// The lifetime is clamped to [`MAX_EXPIRY_HOURS`] in either direction.
pub fn generate_token_with_ttl(user_id: &str, ttl: Duration) -> TokenRecord {
    let bound = Duration::hours(MAX_EXPIRY_HOURS);
    let ttl = ttl.clamp(-bound, bound);
    let now = Local::now();

    TokenRecord {
        token: random_token(),
        user_id: user_id.to_string(),
        expires_at: now.checked_add_signed(ttl).unwrap_or(now),
    }
}

/// URL-safe base64 (unpadded) of [`TOKEN_BYTES`] random bytes
fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
