//! Error Handling Utilities
//!
//! The service-facing error taxonomy for account and credential operations.

use thiserror::Error;

use crate::service::token::TokenError;
use crate::store::StoreError;

/// Main application error type that can represent errors from any flow
#[derive(Error, Debug)]
pub enum AppError {
    /// Attempted to create an account with an email that already exists
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// Operation targeted a missing account or record
    #[error("record not found: {0}")]
    NotFound(String),

    /// Input validation failed with detailed error message
    #[error("validation error: {0}")]
    Validation(String),

    /// Token was forged, tampered with, or structurally corrupt.
    ///
    /// Expiry is never reported through this variant; expired tokens are a
    /// normal flow outcome and surface as boolean results.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Underlying storage operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing operation failed
    #[error("password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;
