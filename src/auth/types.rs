//! Authentication Types

use std::collections::HashMap;

use chrono::{DateTime, Local};

use super::password::{hash_password, verify_password, PasswordHash};
use super::token::TokenRecord;
use super::verifier::CredentialVerifier;
use crate::config::UserConfig;

/// User information stored in the user store
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub password: PasswordHash,
    pub enabled: bool,
}

impl User {
    /// Create a new user, hashing the password with a fresh salt
    pub fn new(username: String, password: &str, enabled: bool) -> Self {
        Self {
            username,
            password: hash_password(password, None),
            enabled,
        }
    }

    /// Verify a password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password.hash, &self.password.salt)
    }
}

/// User store for managing user credentials
#[derive(Debug, Default)]
pub struct UserStore {
    users: HashMap<String, User>,
}

impl UserStore {
    /// Create a new empty user store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from configured users
    pub fn from_config(users: &[UserConfig]) -> Self {
        let mut store = Self::new();
        store.load_from_config(users);
        store
    }

    /// Add a user to the store, replacing any user with the same name
    pub fn add_user(&mut self, username: String, password: &str, enabled: bool) {
        let user = User::new(username.clone(), password, enabled);
        self.users.insert(username, user);
    }

    /// Get a user by username
    pub fn get_user(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Validate user credentials
    pub fn validate_credentials(&self, username: &str, password: &str) -> bool {
        match self.get_user(username) {
            Some(user) => user.enabled && user.verify_password(password),
            None => false,
        }
    }

    /// Replace the store contents with configured users
    pub fn load_from_config(&mut self, users: &[UserConfig]) {
        self.users.clear();
        for user_config in users {
            self.add_user(
                user_config.username.clone(),
                &user_config.password,
                user_config.enabled,
            );
        }
    }

    /// Get all usernames
    pub fn get_usernames(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    /// Check if user exists
    pub fn user_exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialVerifier for UserStore {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.validate_credentials(username, password)
    }
}

/// Active tokens keyed by token string
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, TokenRecord>,
    user_sessions: HashMap<String, Vec<String>>, // user_id -> tokens
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record under its token, replacing any record with that token
    pub fn insert(&mut self, record: TokenRecord) {
        let token = record.token.clone();
        let user_id = record.user_id.clone();

        if let Some(previous) = self.sessions.insert(token.clone(), record) {
            self.unindex(&previous.user_id, &token);
        }

        self.user_sessions.entry(user_id).or_default().push(token);
    }

    /// Get a record by token
    pub fn get(&self, token: &str) -> Option<&TokenRecord> {
        self.sessions.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.sessions.contains_key(token)
    }

    /// Remove a record, returning it if it was present
    pub fn remove(&mut self, token: &str) -> Option<TokenRecord> {
        let record = self.sessions.remove(token)?;
        self.unindex(&record.user_id, token);
        Some(record)
    }

    /// Drop every record whose expiry is at or before `now`
    pub fn purge_expired(&mut self, now: DateTime<Local>) -> usize {
        let expired: Vec<String> = self
            .iter()
            .filter(|record| record.is_expired_at(now))
            .map(|record| record.token.clone())
            .collect();

        for token in &expired {
            self.remove(token);
        }

        expired.len()
    }

    /// Get the records belonging to a user
    pub fn user_tokens(&self, user_id: &str) -> Vec<&TokenRecord> {
        match self.user_sessions.get(user_id) {
            Some(tokens) => tokens
                .iter()
                .filter_map(|token| self.sessions.get(token))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Iterate over every stored record
    pub fn iter(&self) -> impl Iterator<Item = &TokenRecord> {
        self.sessions.values()
    }

    /// Number of users holding at least one token
    pub fn user_count(&self) -> usize {
        self.user_sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn unindex(&mut self, user_id: &str, token: &str) {
        if let Some(tokens) = self.user_sessions.get_mut(user_id) {
            tokens.retain(|t| t != token);
            if tokens.is_empty() {
                self.user_sessions.remove(user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{generate_token, generate_token_with_expiry};

    fn user_config(username: &str, password: &str, enabled: bool) -> UserConfig {
        UserConfig {
            username: username.to_string(),
            password: password.to_string(),
            enabled,
        }
    }

    #[test]
    fn test_user_store_validation() {
        let store = UserStore::from_config(&[
            user_config("alice", "wonderland", true),
            user_config("mallory", "secret", false),
        ]);

        assert_eq!(store.len(), 2);
        assert!(store.validate_credentials("alice", "wonderland"));
        assert!(!store.validate_credentials("alice", "looking-glass"));
        assert!(!store.validate_credentials("mallory", "secret"));
        assert!(!store.validate_credentials("nobody", "wonderland"));
    }

    #[test]
    fn test_user_store_never_keeps_plaintext() {
        let mut store = UserStore::new();
        store.add_user("alice".to_string(), "wonderland", true);

        let user = store.get_user("alice").unwrap();
        assert_ne!(user.password.hash, "wonderland");
        assert!(user.verify_password("wonderland"));
    }

    #[test]
    fn test_reload_replaces_users() {
        let mut store = UserStore::from_config(&[user_config("alice", "pw", true)]);
        store.load_from_config(&[user_config("bob", "pw", true)]);

        assert!(!store.user_exists("alice"));
        assert!(store.user_exists("bob"));
        assert_eq!(store.get_usernames(), vec!["bob".to_string()]);
    }

    #[test]
    fn test_registry_insert_and_remove() {
        let mut registry = SessionRegistry::new();
        let record = generate_token("alice");
        let token = record.token.clone();

        registry.insert(record.clone());
        assert!(registry.contains(&token));
        assert_eq!(registry.get(&token), Some(&record));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.remove(&token), Some(record));
        assert_eq!(registry.remove(&token), None);
        assert!(registry.is_empty());
        assert_eq!(registry.user_count(), 0);
    }

    #[test]
    fn test_registry_user_index() {
        let mut registry = SessionRegistry::new();
        let first = generate_token("alice");
        let second = generate_token("alice");
        let other = generate_token("bob");

        registry.insert(first.clone());
        registry.insert(second.clone());
        registry.insert(other);

        assert_eq!(registry.user_tokens("alice").len(), 2);
        assert_eq!(registry.user_count(), 2);

        registry.remove(&first.token);
        let remaining = registry.user_tokens("alice");
        assert_eq!(remaining, vec![&second]);

        registry.remove(&second.token);
        assert!(registry.user_tokens("alice").is_empty());
        assert_eq!(registry.user_count(), 1);
    }

    #[test]
    fn test_registry_reinsert_same_token_moves_owner() {
        let mut registry = SessionRegistry::new();
        let record = generate_token("alice");
        let mut moved = record.clone();
        moved.user_id = "bob".to_string();

        registry.insert(record);
        registry.insert(moved.clone());

        assert_eq!(registry.len(), 1);
        assert!(registry.user_tokens("alice").is_empty());
        assert_eq!(registry.user_tokens("bob"), vec![&moved]);
    }

    #[test]
    fn test_registry_purge_expired() {
        let mut registry = SessionRegistry::new();
        let live = generate_token("alice");
        let stale = generate_token_with_expiry("alice", -1);

        registry.insert(live.clone());
        registry.insert(stale.clone());

        assert_eq!(registry.purge_expired(Local::now()), 1);
        assert!(registry.contains(&live.token));
        assert!(!registry.contains(&stale.token));
        assert_eq!(registry.user_tokens("alice").len(), 1);
    }
}
