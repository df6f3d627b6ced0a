//! Token Claims Model
//!
//! The signed payload carried by every token the service issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims encoded into a signed token
///
/// Session, verification, and reset tokens all share this shape; the purpose
/// of a token is implicit in which flow minted it and which flow it is
/// presented to. The codec never rejects a structurally valid token for
/// being presented to the wrong flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the account's public identifier
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// Create new claims for `subject` covering the given validity window
    pub fn new(subject: &str, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// The subject identifier this token was issued for
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Issue time as a UTC datetime
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_else(Utc::now)
    }

    /// Expiry time as a UTC datetime
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
