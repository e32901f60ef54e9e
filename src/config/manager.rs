//! Configuration Manager

use super::Config;
use crate::Result;
use anyhow::{bail, Context};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Longest accepted token lifetime
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Accepted values for `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Manages configuration loading and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config = Self::load_from_str(&content)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;

            tracing::info!("Configuration loaded and validated successfully");
            Ok(config)
        } else {
            tracing::warn!("Configuration file not found at {}, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn load_from_str(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Config> {
        let mut config = Config::default();

        if let Ok(ttl) = std::env::var("AUTHKIT_TOKEN_TTL") {
            config.auth.token_ttl = humantime::parse_duration(&ttl)
                .with_context(|| format!("Invalid AUTHKIT_TOKEN_TTL: {}", ttl))?;
        }

        if let Ok(use_store) = std::env::var("AUTHKIT_USE_USER_STORE") {
            config.auth.use_user_store = use_store
                .parse::<bool>()
                .with_context(|| format!("Invalid AUTHKIT_USE_USER_STORE: {}", use_store))?;
        }

        if let Ok(log_level) = std::env::var("AUTHKIT_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_auth_config()
            .context("Authentication configuration validation failed")?;

        self.validate_logging_config()
            .context("Logging configuration validation failed")?;

        Ok(())
    }

    /// Validate authentication configuration
    fn validate_auth_config(&self) -> Result<()> {
        if self.auth.token_ttl.is_zero() {
            bail!("token_ttl must be greater than 0");
        }

        if self.auth.token_ttl > MAX_TOKEN_TTL {
            bail!("token_ttl cannot exceed 365 days");
        }

        if self.auth.use_user_store && self.auth.users.is_empty() {
            bail!("When the user store is enabled, at least one user must be configured");
        }

        let mut seen = HashSet::new();
        for (i, user) in self.auth.users.iter().enumerate() {
            if user.username.is_empty() {
                bail!("User {} has empty username", i);
            }

            if user.username.len() > 255 {
                bail!("User {} username exceeds 255 bytes", i);
            }

            if user.password.is_empty() {
                bail!("User {} has empty password", i);
            }

            if user.password.len() > 255 {
                bail!("User {} password exceeds 255 bytes", i);
            }

            if !seen.insert(user.username.as_str()) {
                bail!("User {} duplicates username '{}'", i, user.username);
            }
        }

        Ok(())
    }

    /// Validate logging configuration
    fn validate_logging_config(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            bail!("logging.level must be one of: {}", LOG_LEVELS.join(", "));
        }

        Ok(())
    }

    /// Merge with CLI arguments
    pub fn merge_with_cli_args(&mut self, token_ttl_hours: Option<u64>, log_level: Option<&str>) {
        if let Some(hours) = token_ttl_hours {
            self.auth.token_ttl = Duration::from_secs(hours.saturating_mul(3600));
            tracing::info!("CLI override: token TTL set to {}h", hours);
        }

        if let Some(level) = log_level {
            self.logging.level = level.to_string();
            tracing::info!("CLI override: log level set to {}", level);
        }
    }
}
