//! Authentication Module
//!
//! Password hashing, token generation and session management.

pub mod manager;
pub mod password;
pub mod token;
pub mod types;
pub mod verifier;

pub use manager::{AuthService, AuthStats};
pub use password::{generate_salt, hash_password, verify_password, PasswordHash};
pub use token::{generate_token, generate_token_with_expiry, generate_token_with_ttl, TokenRecord};
pub use types::{SessionRegistry, User, UserStore};
pub use verifier::{AllowAll, CredentialVerifier};
