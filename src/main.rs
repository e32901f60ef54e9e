//! authkit - Password hashing, session tokens and session registry CLI
//!
//! Thin command-line front end over the authkit library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authkit::{
    auth::{self, AuthService},
    config::{Config, ConfigManager},
    helpers,
};

/// CLI arguments for authkit
#[derive(Parser, Debug)]
#[command(name = "authkit")]
#[command(about = "authkit - Password hashing, session tokens and an in-memory session registry")]
#[command(version)]
#[command(long_about = "
authkit - Password hashing, session tokens and an in-memory session registry

Configuration priority (highest to lowest):
1. Command-line arguments
2. Configuration file
3. Environment variables
4. Built-in defaults

Environment variables:
  AUTHKIT_TOKEN_TTL       - Token lifetime (e.g., 24h, 90m)
  AUTHKIT_USE_USER_STORE  - Check logins against configured users (true/false)
  AUTHKIT_LOG_LEVEL       - Log level (trace, debug, info, warn, error)
  RUST_LOG                - Overrides the log filter entirely
")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "authkit.toml",
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, help = "Log level")]
    pub log_level: Option<String>,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Token lifetime in hours (overrides config file)
    #[arg(long, help = "Token lifetime in hours")]
    pub token_ttl_hours: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hash a password, generating a salt unless one is given
    Hash {
        password: String,
        #[arg(long)]
        salt: Option<String>,
    },
    /// Check a password against a hash and salt
    Verify {
        password: String,
        hash: String,
        salt: String,
    },
    /// Generate a token record for a user
    Token {
        user_id: String,
        #[arg(long, default_value_t = auth::token::DEFAULT_EXPIRY_HOURS, allow_hyphen_values = true)]
        hours: i64,
    },
    /// Format a Unix timestamp as local time
    FormatDate {
        #[arg(allow_hyphen_values = true)]
        timestamp: i64,
    },
    /// Parse JSON, printing null for malformed input
    ParseJson { data: String },
    /// Log in, then log out twice with the issued token
    SessionDemo { username: String, password: String },
    /// Validate configuration and exit
    ValidateConfig,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Load configuration with priority: CLI args > config file > environment > defaults
    let mut config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        ConfigManager::load_from_env()?
    };

    config.merge_with_cli_args(args.token_ttl_hours, args.log_level.as_deref());

    init_tracing(&args, &config)?;

    config
        .validate()
        .context("Final configuration validation failed")?;

    debug!("authkit v{} starting", env!("CARGO_PKG_VERSION"));

    run(args.command, config)
}

fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Hash { password, salt } => {
            let hashed = auth::hash_password(&password, salt.as_deref());
            println!("hash: {}", hashed.hash);
            println!("salt: {}", hashed.salt);
        }
        Command::Verify { password, hash, salt } => {
            let matches = auth::verify_password(&password, &hash, &salt);
            println!("{}", matches);
            if !matches {
                std::process::exit(1);
            }
        }
        Command::Token { user_id, hours } => {
            let record = auth::generate_token_with_expiry(&user_id, hours);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::FormatDate { timestamp } => {
            println!("{}", helpers::format_date(timestamp)?);
        }
        Command::ParseJson { data } => match helpers::parse_json(&data) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("null"),
        },
        Command::SessionDemo { username, password } => {
            let service = AuthService::new(Arc::new(config))?;
            match service.login(&username, &password) {
                Some(token) => {
                    println!("login: {}", token);
                    println!("logout: {}", service.logout(&token));
                    println!("logout again: {}", service.logout(&token));
                }
                None => println!("login: rejected"),
            }
        }
        Command::ValidateConfig => {
            info!("Configuration is valid");
            info!("Configuration summary:");
            info!("  Token TTL: {}", humantime::format_duration(config.auth.token_ttl));
            info!(
                "  User store: {}",
                if config.auth.use_user_store {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            info!("  Configured users: {}", config.auth.users.len());
            info!("  Log level: {}", config.logging.level);
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(args: &CliArgs, config: &Config) -> Result<()> {
    let log_level = if args.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(())
}
