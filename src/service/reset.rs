//! Password Reset Service
//!
//! Issues and consumes single-use reset tokens. A repeated request rotates
//! the account's outstanding token in place, so at most one reset record is
//! live per account; consumption deletes the record before the credential is
//! rotated, which is what makes the token single-use under concurrency.

use std::sync::Arc;

use chrono::Utc;
use log::{error, warn};

use crate::config::AppConfig;
use crate::mail::{self, MailDispatcher};
use crate::models::PasswordResetRecord;
use crate::service::token::TokenService;
use crate::store::{AccountStore, ResetTokenStore};
use crate::utils::error::AppResult;
use crate::utils::security::{hash_password_with_cost, verify_password};
use crate::utils::validation::normalize_email;

/// Service driving the password reset flow
pub struct PasswordResetService {
    accounts: Arc<dyn AccountStore>,
    resets: Arc<dyn ResetTokenStore>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn MailDispatcher>,
    bcrypt_cost: u32,
    reset_url: String,
}

impl PasswordResetService {
    /// Create a new reset service from its collaborators and settings
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        resets: Arc<dyn ResetTokenStore>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn MailDispatcher>,
        config: &AppConfig,
    ) -> Self {
        Self {
            accounts,
            resets,
            tokens,
            mailer,
            bcrypt_cost: config.bcrypt_cost,
            reset_url: config.reset_url.clone(),
        }
    }

    /// Start a password reset for the account registered under `email`
    ///
    /// Returns false for an unknown email and when the reset record cannot
    /// be persisted; both outcomes are indistinguishable to the caller so
    /// the response does not reveal which addresses are registered. An
    /// existing record's token is rotated in place rather than creating a
    /// second live record.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<bool> {
        let email = normalize_email(email);
        let account = match self.accounts.find_by_email(&email).await? {
            Some(account) => account,
            None => return Ok(false),
        };

        let token = self.tokens.issue_reset_token(&account.public_id)?;
        let record = match self.resets.find_by_account_id(account.id).await? {
            Some(mut record) => {
                record.token = token;
                record
            }
            None => PasswordResetRecord::new(account.id, token),
        };

        if let Err(err) = self.resets.save(&record).await {
            error!(
                "password reset request for {} could not be persisted: {}",
                account.email, err
            );
            return Ok(false);
        }

        mail::dispatch_password_reset_email(
            Arc::clone(&self.mailer),
            account,
            record,
            self.reset_url.clone(),
        );

        Ok(true)
    }

    /// Consume a reset token and rotate the bound account's credential
    ///
    /// Fails closed (false) when the token has expired or matches no live
    /// record. A matching record is deleted before the credential changes,
    /// so the token is consumed exactly once regardless of outcome; of two
    /// racing callers only one proceeds past the delete. Tampered or corrupt
    /// tokens propagate as errors.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<bool> {
        if self.tokens.is_expired(token)? {
            return Ok(false);
        }

        let record = match self.resets.find_by_token(token).await? {
            Some(record) => record,
            None => return Ok(false),
        };

        if !self.resets.delete(&record.token).await? {
            // Another caller consumed the record between lookup and delete
            return Ok(false);
        }

        let mut account = match self.accounts.find_by_id(record.account_id).await? {
            Some(account) => account,
            None => {
                warn!("reset record {} pointed at a missing account", record.id);
                return Ok(false);
            }
        };

        account.password_hash = hash_password_with_cost(new_password, self.bcrypt_cost)?;
        account.updated_at = Utc::now();
        self.accounts.save(&account).await?;

        // Confirm the persisted digest accepts the new password
        let stored = match self.accounts.find_by_id(record.account_id).await? {
            Some(stored) => stored,
            None => return Ok(false),
        };

        Ok(verify_password(new_password, &stored.password_hash)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::mail::LoggingMailDispatcher;
    use crate::models::CreateAccountRequest;
    use crate::service::account::AccountService;
    use crate::store::memory::{
        InMemoryAccountStore, InMemoryResetTokenStore, InMemoryRoleStore,
    };
    use crate::utils::error::AppError;
    use chrono::Duration;

    struct Fixture {
        accounts: Arc<InMemoryAccountStore>,
        resets: Arc<InMemoryResetTokenStore>,
        account_service: AccountService,
        reset_service: PasswordResetService,
        tokens: Arc<TokenService>,
    }

    fn fixture() -> Fixture {
        let config = AppConfig {
            token: TokenConfig::new("test_signing_secret"),
            bcrypt_cost: 4,
            base_url: "http://localhost:8080/".to_string(),
            reset_url: "http://localhost:8080/reset-password".to_string(),
        };
        let accounts = Arc::new(InMemoryAccountStore::new());
        let resets = Arc::new(InMemoryResetTokenStore::new());
        let tokens = Arc::new(TokenService::new(config.token.clone()));
        let mailer = Arc::new(LoggingMailDispatcher);

        let account_service = AccountService::new(
            accounts.clone(),
            Arc::new(InMemoryRoleStore::with_default_roles()),
            tokens.clone(),
            mailer.clone(),
            &config,
        );
        let reset_service = PasswordResetService::new(
            accounts.clone(),
            resets.clone(),
            tokens.clone(),
            mailer,
            &config,
        );

        Fixture {
            accounts,
            resets,
            account_service,
            reset_service,
            tokens,
        }
    }

    async fn create_account(fx: &Fixture, email: &str, password: &str) {
        fx.account_service
            .create_account(CreateAccountRequest {
                first_name: "John".to_string(),
                last_name: "Connor".to_string(),
                email: email.to_string(),
                password: password.to_string(),
                roles: vec![],
            })
            .await
            .unwrap();
    }

    async fn live_token(fx: &Fixture, email: &str) -> String {
        let account = fx.accounts.find_by_email(email).await.unwrap().unwrap();
        fx.resets
            .find_by_account_id(account.id)
            .await
            .unwrap()
            .unwrap()
            .token
    }

    // ============================================================================
    // Reset Request Tests
    // ============================================================================

    #[tokio::test]
    async fn test_request_reset_unknown_email() {
        let fx = fixture();

        let requested = fx
            .reset_service
            .request_password_reset("nobody@mail.com")
            .await
            .unwrap();

        assert!(!requested);
    }

    #[tokio::test]
    async fn test_request_reset_creates_bound_record() {
        let fx = fixture();
        create_account(&fx, "a@b.com", "secretpass").await;

        let requested = fx
            .reset_service
            .request_password_reset("a@b.com")
            .await
            .unwrap();
        assert!(requested);

        let account = fx.accounts.find_by_email("a@b.com").await.unwrap().unwrap();
        let record = fx
            .resets
            .find_by_account_id(account.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.account_id, account.id);
        assert!(!fx.tokens.is_expired(&record.token).unwrap());
    }

    #[tokio::test]
    async fn test_repeated_request_rotates_token_in_place() {
        let fx = fixture();
        create_account(&fx, "a@b.com", "secretpass").await;

        fx.reset_service
            .request_password_reset("a@b.com")
            .await
            .unwrap();
        let old_token = live_token(&fx, "a@b.com").await;

        fx.reset_service
            .request_password_reset("a@b.com")
            .await
            .unwrap();
        let new_token = live_token(&fx, "a@b.com").await;

        assert_ne!(old_token, new_token);

        // The rotated-out token no longer matches any record
        assert!(fx
            .resets
            .find_by_token(&old_token)
            .await
            .unwrap()
            .is_none());
        assert!(!fx
            .reset_service
            .reset_password(&old_token, "irrelevant")
            .await
            .unwrap());

        // The current token still works
        assert!(fx
            .reset_service
            .reset_password(&new_token, "fresh-password")
            .await
            .unwrap());
    }

    // ============================================================================
    // Reset Confirmation Tests
    // ============================================================================

    #[tokio::test]
    async fn test_reset_password_rotates_credential() {
        let fx = fixture();
        create_account(&fx, "a@b.com", "secretpass").await;

        fx.reset_service
            .request_password_reset("a@b.com")
            .await
            .unwrap();
        let token = live_token(&fx, "a@b.com").await;

        let reset = fx
            .reset_service
            .reset_password(&token, "brand-new-pass")
            .await
            .unwrap();
        assert!(reset);

        let record = fx.accounts.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(!verify_password("secretpass", &record.password_hash).unwrap());
        assert!(verify_password("brand-new-pass", &record.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_reset_token_is_single_use() {
        let fx = fixture();
        create_account(&fx, "a@b.com", "secretpass").await;

        fx.reset_service
            .request_password_reset("a@b.com")
            .await
            .unwrap();
        let token = live_token(&fx, "a@b.com").await;

        assert!(fx
            .reset_service
            .reset_password(&token, "first-new-pass")
            .await
            .unwrap());

        // Record is gone, second use fails closed
        assert!(fx.resets.find_by_token(&token).await.unwrap().is_none());
        assert!(!fx
            .reset_service
            .reset_password(&token, "second-new-pass")
            .await
            .unwrap());

        let record = fx.accounts.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(verify_password("first-new-pass", &record.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_expired_reset_token_fails_closed() {
        let fx = fixture();
        create_account(&fx, "a@b.com", "secretpass").await;

        let account = fx.accounts.find_by_email("a@b.com").await.unwrap().unwrap();
        let expired = fx
            .tokens
            .issue(&account.public_id, Duration::seconds(-5))
            .unwrap();
        fx.resets
            .save(&PasswordResetRecord::new(account.id, expired.clone()))
            .await
            .unwrap();

        let reset = fx
            .reset_service
            .reset_password(&expired, "new-password")
            .await
            .unwrap();
        assert!(!reset);

        // Credential unchanged
        let record = fx.accounts.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(verify_password("secretpass", &record.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_reset_with_no_matching_record_fails_closed() {
        let fx = fixture();
        create_account(&fx, "a@b.com", "secretpass").await;

        let account = fx.accounts.find_by_email("a@b.com").await.unwrap().unwrap();
        let stray = fx.tokens.issue_reset_token(&account.public_id).unwrap();

        assert!(!fx
            .reset_service
            .reset_password(&stray, "new-password")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_reset_token_is_an_error() {
        let fx = fixture();

        let result = fx
            .reset_service
            .reset_password("garbage-token", "new-password")
            .await;

        assert!(matches!(result, Err(AppError::Token(_))));
    }
}
