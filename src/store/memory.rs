//! In-Memory Stores
//!
//! RwLock-backed store implementations with insertion-order paging. Used by
//! the test suite and by embedders that want the flows without a database.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AccountRecord, PasswordResetRecord, Role};
use crate::store::{AccountStore, ResetTokenStore, RoleStore, StoreResult};

/// In-memory account store
#[derive(Default)]
pub struct InMemoryAccountStore {
    // Vec keeps insertion order, which page() exposes
    records: Arc<RwLock<Vec<AccountRecord>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<AccountRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.email == email).cloned())
    }

    async fn find_by_public_id(&self, public_id: &str) -> StoreResult<Option<AccountRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.public_id == public_id).cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<AccountRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<AccountRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn save(&self, record: &AccountRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn delete(&self, public_id: &str) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.public_id != public_id);
        Ok(records.len() < before)
    }

    async fn page(&self, index: u32, size: u32) -> StoreResult<Vec<AccountRecord>> {
        let records = self.records.read().await;
        let start = index as usize * size as usize;
        Ok(records
            .iter()
            .skip(start)
            .take(size as usize)
            .cloned()
            .collect())
    }
}

/// In-memory role catalog
#[derive(Default)]
pub struct InMemoryRoleStore {
    roles: Arc<RwLock<Vec<Role>>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-populated with the standard USER and ADMIN roles
    pub fn with_default_roles() -> Self {
        Self {
            roles: Arc::new(RwLock::new(vec![Role::user(), Role::admin()])),
        }
    }

    /// Add a role to the catalog
    pub async fn insert(&self, role: Role) {
        let mut roles = self.roles.write().await;
        match roles.iter_mut().find(|r| r.name == role.name) {
            Some(existing) => *existing = role,
            None => roles.push(role),
        }
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.iter().find(|r| r.name == name).cloned())
    }
}

/// In-memory password reset record store
#[derive(Default)]
pub struct InMemoryResetTokenStore {
    records: Arc<RwLock<Vec<PasswordResetRecord>>>,
}

impl InMemoryResetTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResetTokenStore for InMemoryResetTokenStore {
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<PasswordResetRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.token == token).cloned())
    }

    async fn find_by_account_id(
        &self,
        account_id: Uuid,
    ) -> StoreResult<Option<PasswordResetRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.account_id == account_id).cloned())
    }

    async fn save(&self, record: &PasswordResetRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn delete(&self, token: &str) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.token != token);
        Ok(records.len() < before)
    }
}
