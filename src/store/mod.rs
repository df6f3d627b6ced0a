//! Storage Interfaces
//!
//! Trait seams between the flows and whatever persists their state. The
//! flows only ever talk to these traits; the crate ships an in-memory
//! implementation for tests and embedders without a database, and a
//! PostgreSQL implementation backed by SQLx.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AccountRecord, PasswordResetRecord, Role};

/// Errors surfaced by store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for account records
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by normalized email address
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<AccountRecord>>;

    /// Look up an account by its opaque public identifier
    async fn find_by_public_id(&self, public_id: &str) -> StoreResult<Option<AccountRecord>>;

    /// Look up the account holding `token` as its pending verification token
    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<AccountRecord>>;

    /// Look up an account by its internal storage key
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<AccountRecord>>;

    /// Insert or update an account record, keyed by its internal id
    async fn save(&self, record: &AccountRecord) -> StoreResult<()>;

    /// Delete the account with the given public identifier
    ///
    /// Returns whether a record was actually removed.
    async fn delete(&self, public_id: &str) -> StoreResult<bool>;

    /// Fetch a zero-indexed page of accounts in stable insertion order
    ///
    /// An out-of-range page yields an empty vector, not an error.
    async fn page(&self, index: u32, size: u32) -> StoreResult<Vec<AccountRecord>>;
}

/// Read access to the role catalog
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Look up a role and its authority bundle by name
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
}

/// Persistence operations for password reset records
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    /// Look up the record holding the given token string
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<PasswordResetRecord>>;

    /// Look up the record bound to the given account, if one is live
    async fn find_by_account_id(&self, account_id: Uuid)
        -> StoreResult<Option<PasswordResetRecord>>;

    /// Insert or update a reset record, keyed by its internal id
    async fn save(&self, record: &PasswordResetRecord) -> StoreResult<()>;

    /// Remove the record holding the given token string
    ///
    /// Returns whether a record was actually removed. Callers use this as
    /// the single-use consumption step: of two racing callers that found the
    /// same record, exactly one observes `true` here.
    async fn delete(&self, token: &str) -> StoreResult<bool>;
}
