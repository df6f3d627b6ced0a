//! Request Models
//!
//! Input payloads for account operations, with validation.

use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{email_validator, name_validator};

/// Request payload for creating a new account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Account holder's first name (1-50 characters)
    #[validate(custom(function = "name_validator"))]
    pub first_name: String,

    /// Account holder's last name (1-50 characters)
    #[validate(custom(function = "name_validator"))]
    pub last_name: String,

    /// Email address (must be unique and valid format)
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// Plaintext password, hashed before storage (8-128 characters)
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub password: String,

    /// Role names to assign; unknown names are ignored and an empty
    /// resolution falls back to the default user role
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Request payload for renaming an account
///
/// Only the name fields are mutable through this path; email and roles are
/// immutable here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenameAccountRequest {
    /// New first name (1-50 characters)
    #[validate(custom(function = "name_validator"))]
    pub first_name: String,

    /// New last name (1-50 characters)
    #[validate(custom(function = "name_validator"))]
    pub last_name: String,
}
