//! Token Codec Service
//!
//! Signs and verifies the compact tokens used for sessions, email
//! verification, and password resets. The signing key is fixed at
//! construction; there is no runtime rotation path.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::config::TokenConfig;
use crate::models::TokenClaims;

/// Custom error types for the token codec
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token's signature does not verify against the configured secret
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token cannot be decoded into a claims structure
    #[error("token is malformed")]
    Malformed,

    /// The claims could not be signed into a token string
    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Codec for issuing and validating signed tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
    verification_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    /// Create a new codec from the given signing configuration
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            session_ttl: config.session_ttl,
            verification_ttl: config.verification_ttl,
            reset_ttl: config.reset_ttl,
        }
    }

    /// Produce a signed token for `subject` valid for the given duration
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims::new(subject, now, now + ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a long-lived session token
    pub fn issue_session_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.session_ttl)
    }

    /// Issue an email verification token
    pub fn issue_verification_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.verification_ttl)
    }

    /// Issue a short-lived password reset token
    pub fn issue_reset_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.reset_ttl)
    }

    /// Decode a token and verify its signature
    ///
    /// Expired tokens still parse; callers decide what expiry means for
    /// their flow via [`is_expired`](Self::is_expired).
    pub fn parse(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }

    /// Whether the token's validity window has passed
    ///
    /// Evaluated against wall-clock time at every call; the same token can
    /// report `false` now and `true` later. Fails under the same conditions
    /// as [`parse`](Self::parse).
    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        let claims = self.parse(token)?;
        Ok(Utc::now().timestamp() >= claims.exp)
    }
}
