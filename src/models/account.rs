//! Account Model
//!
//! Core account data structures, including the role/authority permission
//! bundles attached to every account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the role every account receives when none is assigned explicitly
pub const ROLE_USER: &str = "USER";

/// Name of the administrative role
pub const ROLE_ADMIN: &str = "ADMIN";

/// A single named permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    /// Unique authority name
    pub name: String,
}

impl Authority {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named bundle of authorities assignable to accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role name
    pub name: String,

    /// Authorities granted by this role
    pub authorities: Vec<Authority>,
}

impl Role {
    pub fn new(name: impl Into<String>, authorities: Vec<Authority>) -> Self {
        Self {
            name: name.into(),
            authorities,
        }
    }

    /// The standard user role: read and write access
    pub fn user() -> Self {
        Self::new(
            ROLE_USER,
            vec![Authority::new("READ"), Authority::new("WRITE")],
        )
    }

    /// The administrative role: read, write, and delete access
    pub fn admin() -> Self {
        Self::new(
            ROLE_ADMIN,
            vec![
                Authority::new("READ"),
                Authority::new("WRITE"),
                Authority::new("DELETE"),
            ],
        )
    }
}

/// Account representation for callers outside the core
///
/// This struct represents an account without sensitive information like the
/// password hash or the pending verification token. All datetime fields use
/// UTC for consistency across deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Externally-exposed opaque identifier, distinct from the storage key
    pub public_id: String,

    /// Account holder's first name
    pub first_name: String,

    /// Account holder's last name
    pub last_name: String,

    /// Account's email address (unique, normalized)
    pub email: String,

    /// Whether the email address has been verified
    pub email_verified: bool,

    /// Names of the roles assigned to this account
    pub roles: Vec<String>,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the account was last modified
    pub updated_at: DateTime<Utc>,
}

/// Internal account representation including credential material
///
/// This struct is the storage-facing shape: it carries the password hash and
/// the pending verification token. It is never handed to callers of the flow
/// entry points; they receive [`Account`] instead.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    /// Internal storage key
    pub id: Uuid,

    /// Externally-exposed opaque identifier
    pub public_id: String,

    /// Account holder's first name
    pub first_name: String,

    /// Account holder's last name
    pub last_name: String,

    /// Account's email address (unique, normalized)
    pub email: String,

    /// bcrypt hashed password
    pub password_hash: String,

    /// Whether the email address has been verified
    pub email_verified: bool,

    /// Pending verification token; present only while the account is
    /// unverified with a verification round outstanding
    pub verification_token: Option<String>,

    /// Roles assigned to this account
    pub roles: Vec<Role>,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the account was last modified
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Display name used in outbound email greetings
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<AccountRecord> for Account {
    /// Convert the internal representation to the public account struct
    ///
    /// Strips the password hash and the pending verification token so neither
    /// can leak through a flow's return value.
    fn from(record: AccountRecord) -> Self {
        Account {
            public_id: record.public_id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            email_verified: record.email_verified,
            roles: record.roles.into_iter().map(|role| role.name).collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
