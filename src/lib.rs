//! Account Service Library
//!
//! A user-account and credential-lifecycle service: registration with
//! email verification, stateless signed-token authentication, and
//! password-reset flows over a role/authority permission model.
//!
//! # Features
//!
//! - **Account Lifecycle**: create, rename, delete, and page accounts with
//!   input validation
//! - **Password Security**: bcrypt hashing with configurable cost factors
//! - **Signed Tokens**: HS256 session, verification, and reset tokens with
//!   per-purpose lifetimes
//! - **Verification Flow**: single-use email verification with automatic
//!   re-issue on expiry
//! - **Password Reset**: single-use, short-lived reset tokens rotated in
//!   place on repeated requests
//! - **Pluggable Storage**: trait-based stores with in-memory and
//!   PostgreSQL implementations
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use account_service::{
//!     config::{AppConfig, TokenConfig},
//!     mail::LoggingMailDispatcher,
//!     models::CreateAccountRequest,
//!     service::{AccountService, TokenService, VerificationService},
//!     store::memory::{InMemoryAccountStore, InMemoryRoleStore},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig {
//!         token: TokenConfig::new("signing-secret"),
//!         bcrypt_cost: 12,
//!         base_url: "http://localhost:8080/".to_string(),
//!         reset_url: "http://localhost:8080/reset-password".to_string(),
//!     };
//!
//!     let accounts = Arc::new(InMemoryAccountStore::new());
//!     let roles = Arc::new(InMemoryRoleStore::with_default_roles());
//!     let tokens = Arc::new(TokenService::new(config.token.clone()));
//!     let mailer = Arc::new(LoggingMailDispatcher);
//!
//!     let account_service = AccountService::new(
//!         accounts.clone(),
//!         roles,
//!         tokens.clone(),
//!         mailer.clone(),
//!         &config,
//!     );
//!
//!     let account = account_service
//!         .create_account(CreateAccountRequest {
//!             first_name: "Alice".to_string(),
//!             last_name: "Smith".to_string(),
//!             email: "alice@example.com".to_string(),
//!             password: "SecurePass123".to_string(),
//!             roles: vec![],
//!         })
//!         .await?;
//!     println!("created account {}", account.public_id);
//!
//!     // The verification link in the dispatched email carries the pending
//!     // token; presenting it flips the account to verified.
//!     let verification = VerificationService::new(accounts, tokens, mailer, &config);
//!     let _ = verification.verify_email_token("token-from-link").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Service Layer**: flow entry points and business logic
//! - **Models**: account, role, reset-record, and token claim structures
//! - **Store**: persistence trait seams plus in-memory and Postgres backends
//! - **Mail**: outbound email seam with fire-and-forget dispatch
//! - **Policy**: authorization predicates for the boundary layer
//! - **Utils**: hashing, validation, and the error taxonomy

/// Configuration management for all service settings
pub mod config;

/// Outbound email interfaces and dispatch helpers
pub mod mail;

/// Data models and request structures
pub mod models;

/// Authorization predicates consulted by the boundary layer
pub mod policy;

/// Business logic and flow entry points
pub mod service;

/// Persistence interfaces and implementations
pub mod store;

/// Shared utilities for security, validation, and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use config::{AppConfig, TokenConfig};
pub use mail::{LoggingMailDispatcher, MailDispatcher};
pub use models::{
    Account, AccountRecord, Authority, CreateAccountRequest, PasswordResetRecord,
    RenameAccountRequest, Role, TokenClaims, ROLE_ADMIN, ROLE_USER,
};
pub use service::{
    AccountService, PasswordResetService, TokenError, TokenService, VerificationService,
};
pub use store::{AccountStore, ResetTokenStore, RoleStore, StoreError};
pub use utils::error::{AppError, AppResult};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
