//! Email Verification Service
//!
//! Validates pending verification tokens and drives the account's
//! unverified-to-verified transition. Expired tokens are re-issued and the
//! verification email re-sent; forged or corrupt tokens are surfaced as
//! errors rather than folded into the boolean outcome.

use std::sync::Arc;

use chrono::Utc;

use crate::config::AppConfig;
use crate::mail::{self, MailDispatcher};
use crate::service::token::TokenService;
use crate::store::AccountStore;
use crate::utils::error::AppResult;

/// Service validating email verification tokens
pub struct VerificationService {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn MailDispatcher>,
    base_url: String,
}

impl VerificationService {
    /// Create a new verification service from its collaborators and settings
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn MailDispatcher>,
        config: &AppConfig,
    ) -> Self {
        Self {
            accounts,
            tokens,
            mailer,
            base_url: config.base_url.clone(),
        }
    }

    /// Validate a verification token and flip the owning account to verified
    ///
    /// Returns false when no account holds the token (including tokens
    /// already consumed) or when the token has expired; expiry additionally
    /// rotates the pending token and re-sends the verification email.
    /// Tampered or corrupt tokens propagate as errors.
    pub async fn verify_email_token(&self, token: &str) -> AppResult<bool> {
        let mut record = match self.accounts.find_by_verification_token(token).await? {
            Some(record) => record,
            None => return Ok(false),
        };

        if self.tokens.is_expired(token)? {
            // Expired but genuine: start a fresh verification round
            let reissued = self.tokens.issue_verification_token(&record.public_id)?;
            record.verification_token = Some(reissued);
            record.email_verified = false;
            record.updated_at = Utc::now();
            self.accounts.save(&record).await?;

            mail::dispatch_verification_email(
                Arc::clone(&self.mailer),
                record,
                self.base_url.clone(),
            );

            return Ok(false);
        }

        record.verification_token = None;
        record.email_verified = true;
        record.updated_at = Utc::now();
        self.accounts.save(&record).await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::mail::LoggingMailDispatcher;
    use crate::models::CreateAccountRequest;
    use crate::service::account::AccountService;
    use crate::store::memory::{InMemoryAccountStore, InMemoryRoleStore};
    use crate::utils::error::AppError;
    use chrono::Duration;

    struct Fixture {
        accounts: Arc<InMemoryAccountStore>,
        account_service: AccountService,
        verification: VerificationService,
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
        let tokens = Arc::new(TokenService::new(config.token.clone()));
        let mailer = Arc::new(LoggingMailDispatcher);

        let account_service = AccountService::new(
            accounts.clone(),
            Arc::new(InMemoryRoleStore::with_default_roles()),
            tokens.clone(),
            mailer.clone(),
            &config,
        );
        let verification =
            VerificationService::new(accounts.clone(), tokens.clone(), mailer, &config);

        Fixture {
            accounts,
            account_service,
            verification,
            tokens,
        }
    }

    fn create_request() -> CreateAccountRequest {
        CreateAccountRequest {
            first_name: "John".to_string(),
            last_name: "Connor".to_string(),
            email: "johnny@mail.com".to_string(),
            password: "SecurePass123".to_string(),
            roles: vec![],
        }
    }

    #[tokio::test]
    async fn test_valid_token_verifies_account() {
        let fx = fixture();
        let account = fx
            .account_service
            .create_account(create_request())
            .await
            .unwrap();

        let token = fx
            .accounts
            .find_by_public_id(&account.public_id)
            .await
            .unwrap()
            .unwrap()
            .verification_token
            .unwrap();

        let verified = fx.verification.verify_email_token(&token).await.unwrap();
        assert!(verified);

        let record = fx
            .accounts
            .find_by_public_id(&account.public_id)
            .await
            .unwrap()
            .unwrap();
        assert!(record.email_verified);
        assert!(record.verification_token.is_none());
    }

    #[tokio::test]
    async fn test_consumed_token_is_rejected() {
        let fx = fixture();
        let account = fx
            .account_service
            .create_account(create_request())
            .await
            .unwrap();

        let token = fx
            .accounts
            .find_by_public_id(&account.public_id)
            .await
            .unwrap()
            .unwrap()
            .verification_token
            .unwrap();

        assert!(fx.verification.verify_email_token(&token).await.unwrap());

        // Second presentation finds no holder: the stored token is gone
        assert!(!fx.verification.verify_email_token(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected_without_error() {
        let fx = fixture();
        let stray = fx.tokens.issue_verification_token("nobody").unwrap();

        assert!(!fx.verification.verify_email_token(&stray).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_rotates_and_stays_unverified() {
        let fx = fixture();
        let account = fx
            .account_service
            .create_account(create_request())
            .await
            .unwrap();

        // Swap the pending token for one whose window has already passed
        let mut record = fx
            .accounts
            .find_by_public_id(&account.public_id)
            .await
            .unwrap()
            .unwrap();
        let expired = fx
            .tokens
            .issue(&record.public_id, Duration::seconds(-5))
            .unwrap();
        record.verification_token = Some(expired.clone());
        fx.accounts.save(&record).await.unwrap();

        let verified = fx.verification.verify_email_token(&expired).await.unwrap();
        assert!(!verified);

        let record = fx
            .accounts
            .find_by_public_id(&account.public_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!record.email_verified);

        // A fresh token was minted; the expired one no longer matches
        let pending = record.verification_token.unwrap();
        assert_ne!(pending, expired);
        assert!(!fx.tokens.is_expired(&pending).unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_stored_token_is_an_error() {
        let fx = fixture();
        let account = fx
            .account_service
            .create_account(create_request())
            .await
            .unwrap();

        let mut record = fx
            .accounts
            .find_by_public_id(&account.public_id)
            .await
            .unwrap()
            .unwrap();
        record.verification_token = Some("garbage-token".to_string());
        fx.accounts.save(&record).await.unwrap();

        // Distinct from both "not found" and "expired"
        let result = fx.verification.verify_email_token("garbage-token").await;
        assert!(matches!(result, Err(AppError::Token(_))));
    }
}
