//! Configuration Module
//!
//! Centralized configuration for the account service: signing secret,
//! per-purpose token lifetimes, hashing cost, and the URLs embedded in
//! outbound email links. Configuration is read once at process start and
//! passed by value to the services; nothing re-reads the environment later.

use chrono::Duration;

use crate::utils::security::DEFAULT_BCRYPT_COST;

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get required environment variable or panic
    pub fn get_required(key: &str) -> String {
        env::var(key).unwrap_or_else(|_| panic!("Required environment variable {} is not set", key))
    }
}

/// Signing secret and per-purpose token lifetimes
///
/// The secret is process-wide and immutable after startup; there is no
/// runtime rotation path.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret shared by all token purposes
    pub secret: String,

    /// Lifetime of session tokens (default 7 days)
    pub session_ttl: Duration,

    /// Lifetime of email verification tokens (default 7 days, matching the
    /// session lifetime)
    pub verification_ttl: Duration,

    /// Lifetime of password reset tokens (default 1 hour)
    pub reset_ttl: Duration,
}

impl TokenConfig {
    /// Create a configuration with the default per-purpose lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            session_ttl: Duration::days(7),
            verification_ttl: Duration::days(7),
            reset_ttl: Duration::hours(1),
        }
    }

    /// Create a configuration with explicit per-purpose lifetimes
    pub fn with_ttls(
        secret: impl Into<String>,
        session_ttl: Duration,
        verification_ttl: Duration,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            secret: secret.into(),
            session_ttl,
            verification_ttl,
            reset_ttl,
        }
    }

    /// Create token configuration from environment variables
    ///
    /// Panics if `TOKEN_SECRET` is not set.
    pub fn from_env() -> Self {
        let defaults = Self::new(env::get_required("TOKEN_SECRET"));
        Self {
            session_ttl: Duration::seconds(env::get_i64(
                "SESSION_TOKEN_TTL_SECS",
                defaults.session_ttl.num_seconds(),
            )),
            verification_ttl: Duration::seconds(env::get_i64(
                "VERIFICATION_TOKEN_TTL_SECS",
                defaults.verification_ttl.num_seconds(),
            )),
            reset_ttl: Duration::seconds(env::get_i64(
                "RESET_TOKEN_TTL_SECS",
                defaults.reset_ttl.num_seconds(),
            )),
            ..defaults
        }
    }
}

/// Application configuration combining all service settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Token signing configuration
    pub token: TokenConfig,

    /// bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,

    /// Base URL prepended to verification links in outbound email
    pub base_url: String,

    /// Frontend URL reset links point at
    pub reset_url: String,
}

impl AppConfig {
    /// Create application configuration from environment variables
    ///
    /// Panics if `TOKEN_SECRET` is not set.
    pub fn from_env() -> Self {
        Self {
            token: TokenConfig::from_env(),
            bcrypt_cost: env::get_u32("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            base_url: env::get_string("BASE_URL", "http://localhost:8080/"),
            reset_url: env::get_string(
                "RESET_PASSWORD_URL",
                "http://localhost:8080/reset-password",
            ),
        }
    }
}
