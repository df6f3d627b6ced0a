//! Account Service
//!
//! Core account lifecycle: registration, renaming, deletion, and paging.
//! Registration mints the initial verification token and hands the
//! verification email to the dispatcher without blocking on it.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::mail::{self, MailDispatcher};
use crate::models::{
    Account, AccountRecord, CreateAccountRequest, RenameAccountRequest, Role, ROLE_USER,
};
use crate::service::token::TokenService;
use crate::store::{AccountStore, RoleStore};
use crate::utils::error::{AppError, AppResult};
use crate::utils::security::{generate_public_id, hash_password_with_cost, PUBLIC_ID_LENGTH};
use crate::utils::validation::normalize_email;

/// Core account service providing lifecycle operations
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    roles: Arc<dyn RoleStore>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn MailDispatcher>,
    bcrypt_cost: u32,
    base_url: String,
}

impl AccountService {
    /// Create a new account service from its collaborators and settings
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        roles: Arc<dyn RoleStore>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn MailDispatcher>,
        config: &AppConfig,
    ) -> Self {
        Self {
            accounts,
            roles,
            tokens,
            mailer,
            bcrypt_cost: config.bcrypt_cost,
            base_url: config.base_url.clone(),
        }
    }

    /// Create a new account in the unverified state
    ///
    /// Assigns a fresh public identifier, hashes the password, mints the
    /// initial verification token, and triggers the verification email.
    /// Delivery failure never fails the creation.
    pub async fn create_account(&self, request: CreateAccountRequest) -> AppResult<Account> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("invalid account data: {}", e)))?;

        let email = normalize_email(&request.email);
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let public_id = generate_public_id(PUBLIC_ID_LENGTH);
        let password_hash = hash_password_with_cost(&request.password, self.bcrypt_cost)?;
        let verification_token = self.tokens.issue_verification_token(&public_id)?;
        let roles = self.resolve_roles(&request.roles).await?;

        let now = Utc::now();
        let record = AccountRecord {
            id: Uuid::new_v4(),
            public_id,
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            password_hash,
            email_verified: false,
            verification_token: Some(verification_token),
            roles,
            created_at: now,
            updated_at: now,
        };

        self.accounts.save(&record).await?;

        mail::dispatch_verification_email(
            Arc::clone(&self.mailer),
            record.clone(),
            self.base_url.clone(),
        );

        Ok(record.into())
    }

    /// Update an account's name fields
    ///
    /// Email and roles are immutable through this path.
    pub async fn rename_account(
        &self,
        public_id: &str,
        request: RenameAccountRequest,
    ) -> AppResult<Account> {
        request
            .validate()
            .map_err(|e| AppError::Validation(format!("invalid rename data: {}", e)))?;

        let mut record = self
            .accounts
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account {}", public_id)))?;

        record.first_name = request.first_name;
        record.last_name = request.last_name;
        record.updated_at = Utc::now();

        self.accounts.save(&record).await?;

        Ok(record.into())
    }

    /// Delete the account with the given public identifier
    pub async fn delete_account(&self, public_id: &str) -> AppResult<()> {
        if !self.accounts.delete(public_id).await? {
            return Err(AppError::NotFound(format!("account {}", public_id)));
        }

        Ok(())
    }

    /// Fetch a zero-indexed page of accounts in stable storage order
    ///
    /// An out-of-range page yields an empty vector.
    pub async fn list_accounts(&self, page_index: u32, page_size: u32) -> AppResult<Vec<Account>> {
        let records = self.accounts.page(page_index, page_size).await?;
        Ok(records.into_iter().map(Account::from).collect())
    }

    /// Look up an account by email address
    pub async fn get_account_by_email(&self, email: &str) -> AppResult<Account> {
        let email = normalize_email(email);
        let record = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account with email {}", email)))?;

        Ok(record.into())
    }

    /// Look up an account by its public identifier
    pub async fn get_account_by_public_id(&self, public_id: &str) -> AppResult<Account> {
        let record = self
            .accounts
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account {}", public_id)))?;

        Ok(record.into())
    }

    /// Resolve requested role names through the catalog
    ///
    /// Unknown names are ignored. An empty resolution falls back to the
    /// default user role so every account ends up with at least one role.
    async fn resolve_roles(&self, names: &[String]) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = Vec::new();
        for name in names {
            if roles.iter().any(|role| &role.name == name) {
                continue;
            }
            if let Some(role) = self.roles.find_by_name(name).await? {
                roles.push(role);
            }
        }

        if roles.is_empty() {
            let fallback = self
                .roles
                .find_by_name(ROLE_USER)
                .await?
                .unwrap_or_else(Role::user);
            roles.push(fallback);
        }

        Ok(roles)
    }
}
