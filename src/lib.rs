//! authkit Library
//!
//! Password hashing, session token generation and an in-memory session
//! registry, plus a couple of small formatting and parsing helpers.

pub mod auth;
pub mod config;
pub mod helpers;

pub use auth::{AuthService, CredentialVerifier, PasswordHash, TokenRecord};
pub use config::Config;

/// Common error type for the library
pub type Result<T> = anyhow::Result<T>;
