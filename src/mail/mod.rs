//! Mail Dispatch
//!
//! The outbound-email seam consumed by the account flows. Transport is a
//! collaborator concern; the crate ships a logging dispatcher for
//! deployments where no relay is wired up, and the flows hand every send to
//! a spawned task so dispatch outcome never alters a flow's result.

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;

use crate::models::{AccountRecord, PasswordResetRecord};

/// Path appended to the base URL in verification links
pub const VERIFICATION_PATH: &str = "users/email-verification";

/// Error raised by a dispatcher when a message cannot be delivered
#[derive(Error, Debug)]
#[error("email dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Outbound email operations consumed by the flows
///
/// Implementations may fail; the flows catch and log failures, they never
/// propagate them to the caller of the triggering operation.
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Send the verification link for the account's pending token
    async fn send_verification_email(
        &self,
        account: &AccountRecord,
        base_url: &str,
    ) -> Result<(), DispatchError>;

    /// Send the reset link for the given reset record
    async fn send_password_reset_email(
        &self,
        account: &AccountRecord,
        reset: &PasswordResetRecord,
        reset_url: &str,
    ) -> Result<(), DispatchError>;
}

/// Hand a verification email to the runtime without awaiting the outcome
///
/// The triggering flow has already committed its state change; a delivery
/// failure is logged and otherwise swallowed.
pub fn dispatch_verification_email(
    mailer: Arc<dyn MailDispatcher>,
    record: AccountRecord,
    base_url: String,
) {
    tokio::spawn(async move {
        if let Err(err) = mailer.send_verification_email(&record, &base_url).await {
            warn!(
                "verification email for {} was not delivered: {}",
                record.email, err
            );
        }
    });
}

/// Hand a password reset email to the runtime without awaiting the outcome
pub fn dispatch_password_reset_email(
    mailer: Arc<dyn MailDispatcher>,
    record: AccountRecord,
    reset: PasswordResetRecord,
    reset_url: String,
) {
    tokio::spawn(async move {
        if let Err(err) = mailer
            .send_password_reset_email(&record, &reset, &reset_url)
            .await
        {
            warn!(
                "password reset email for {} was not delivered: {}",
                record.email, err
            );
        }
    });
}

/// Build the verification link embedded in a verification email
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!("{base_url}{VERIFICATION_PATH}?token={token}")
}

/// Build the password reset link embedded in a reset email
pub fn password_reset_link(reset_url: &str, token: &str) -> String {
    format!("{reset_url}?token={token}")
}

/// Dispatcher that writes outbound messages to the log instead of a relay
///
/// Stands in wherever no SMTP transport is configured; useful in development
/// and in tests of the surrounding flows.
#[derive(Default)]
pub struct LoggingMailDispatcher;

#[async_trait]
impl MailDispatcher for LoggingMailDispatcher {
    async fn send_verification_email(
        &self,
        account: &AccountRecord,
        base_url: &str,
    ) -> Result<(), DispatchError> {
        let token = account.verification_token.as_deref().unwrap_or_default();
        info!(
            "verification email for {} <{}>: {}",
            account.full_name(),
            account.email,
            verification_link(base_url, token)
        );
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        account: &AccountRecord,
        reset: &PasswordResetRecord,
        reset_url: &str,
    ) -> Result<(), DispatchError> {
        info!(
            "password reset email for {} <{}>: {}",
            account.full_name(),
            account.email,
            password_reset_link(reset_url, &reset.token)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn record() -> AccountRecord {
        AccountRecord {
            id: Uuid::new_v4(),
            public_id: "abc123".to_string(),
            first_name: "John".to_string(),
            last_name: "Connor".to_string(),
            email: "johnny@mail.com".to_string(),
            password_hash: "hash".to_string(),
            email_verified: false,
            verification_token: Some("tok".to_string()),
            roles: vec![Role::user()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_link_formats() {
        assert_eq!(
            verification_link("http://localhost:8080/", "tok"),
            "http://localhost:8080/users/email-verification?token=tok"
        );
        assert_eq!(
            password_reset_link("http://localhost:8080/reset", "tok"),
            "http://localhost:8080/reset?token=tok"
        );
    }

    #[tokio::test]
    async fn test_logging_dispatcher_never_fails() {
        let dispatcher = LoggingMailDispatcher;
        let account = record();
        let reset = PasswordResetRecord::new(account.id, "reset-tok");

        assert!(dispatcher
            .send_verification_email(&account, "http://localhost:8080/")
            .await
            .is_ok());
        assert!(dispatcher
            .send_password_reset_email(&account, &reset, "http://localhost:8080/reset")
            .await
            .is_ok());
    }
}
