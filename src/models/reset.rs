//! Password Reset Model
//!
//! The persisted record binding an outstanding reset token to an account.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single active password reset request
///
/// At most one record exists per account: a repeated reset request rotates
/// the token on the existing record instead of creating a second one. The
/// token string stored here is the only token material the service ever
/// persists.
#[derive(Debug, Clone)]
pub struct PasswordResetRecord {
    /// Internal storage key
    pub id: Uuid,

    /// Internal key of the account this record is bound to (one-to-one)
    pub account_id: Uuid,

    /// Current reset token in signed string form
    pub token: String,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,
}

impl PasswordResetRecord {
    /// Create a fresh record binding `token` to the given account
    pub fn new(account_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            token: token.into(),
            created_at: Utc::now(),
        }
    }
}
