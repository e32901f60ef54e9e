//! Authentication Service

use super::token::{generate_token_with_ttl, TokenRecord};
use super::{AllowAll, CredentialVerifier, SessionRegistry, UserStore};
use crate::config::{manager::MAX_TOKEN_TTL, Config};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{Duration, Local};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Issues tokens on login and tracks them until logout
pub struct AuthService {
    verifier: Box<dyn CredentialVerifier>,
    registry: Mutex<SessionRegistry>,
    token_ttl: Duration,
}

impl AuthService {
    /// Create a service from configuration.
    ///
    /// Credentials are checked against the configured users when
    /// `auth.use_user_store` is set and accepted unconditionally otherwise.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        if config.auth.use_user_store {
            let store = UserStore::from_config(&config.auth.users);
            info!("Using user store with {} users", store.len());
            Self::with_verifier(&config, store)
        } else {
            warn!("No user store configured, every credential pair will be accepted");
            Self::with_verifier(&config, AllowAll)
        }
    }

    /// Create a service with a custom credential check.
    ///
    /// Fails when `auth.token_ttl` exceeds [`MAX_TOKEN_TTL`].
    pub fn with_verifier<V>(config: &Config, verifier: V) -> Result<Self>
    where
        V: CredentialVerifier + 'static,
    {
        if config.auth.token_ttl > MAX_TOKEN_TTL {
            bail!("auth.token_ttl cannot exceed 365 days");
        }

        let token_ttl = Duration::from_std(config.auth.token_ttl)
            .context("auth.token_ttl is out of range")?;

        Ok(Self {
            verifier: Box::new(verifier),
            registry: Mutex::new(SessionRegistry::new()),
            token_ttl,
        })
    }

    /// Authenticate a user and return a fresh token
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        if !self.verifier.verify(username, password) {
            warn!("Failed login for user '{}'", username);
            return None;
        }

        let record = generate_token_with_ttl(username, self.token_ttl);
        let token = record.token.clone();
        debug!("Issued token for '{}' expiring at {}", username, record.expires_at);

        self.registry.lock().insert(record);
        info!("Successful login for user '{}'", username);
        Some(token)
    }

    /// Invalidate a token
    pub fn logout(&self, token: &str) -> bool {
        match self.registry.lock().remove(token) {
            Some(record) => {
                info!("Logged out user '{}'", record.user_id);
                true
            }
            None => {
                debug!("Logout for unknown token");
                false
            }
        }
    }

    /// Look up the record behind a token. Expiry is not consulted.
    pub fn session(&self, token: &str) -> Option<TokenRecord> {
        self.registry.lock().get(token).cloned()
    }

    /// Get all records held by a user
    pub fn user_sessions(&self, user_id: &str) -> Vec<TokenRecord> {
        self.registry
            .lock()
            .user_tokens(user_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.lock().len()
    }

    /// Remove every record whose expiry has passed
    pub fn purge_expired(&self) -> usize {
        let purged = self.registry.lock().purge_expired(Local::now());
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }
        purged
    }

    /// Get session statistics
    pub fn stats(&self) -> AuthStats {
        let registry = self.registry.lock();
        let now = Local::now();

        AuthStats {
            active_sessions: registry.len(),
            active_users: registry.user_count(),
            expired_sessions: registry
                .iter()
                .filter(|record| record.is_expired_at(now))
                .count(),
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStats {
    pub active_sessions: usize,
    pub active_users: usize,
    /// Records still registered whose expiry has passed
    pub expired_sessions: usize,
}
