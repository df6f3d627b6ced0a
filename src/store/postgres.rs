//! PostgreSQL Stores
//!
//! SQLx-backed implementations of the store traits, plus connection pool
//! configuration and migration support.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{AccountRecord, Authority, PasswordResetRecord, Role};
use crate::store::{AccountStore, ResetTokenStore, RoleStore, StoreResult};

/// Database connection pool type alias for convenience
pub type DatabasePool = PgPool;

/// Database configuration for connection setup
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/account_service".to_string(),
            max_connections: 20,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl DatabaseConfig {
    /// Create database configuration from environment variables
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let url = std::env::var("DATABASE_URL")?;

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let connect_timeout_secs = std::env::var("DB_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }

    /// Create a database connection pool from this configuration
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .connect(&self.url)
            .await
    }
}

/// Run the embedded schema migrations against the given pool
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

const ACCOUNT_COLUMNS: &str = "id, public_id, first_name, last_name, email, password_hash, \
                               email_verified, verification_token, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    public_id: String,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    email_verified: bool,
    verification_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ResetRow {
    id: Uuid,
    account_id: Uuid,
    token: String,
    created_at: DateTime<Utc>,
}

impl From<ResetRow> for PasswordResetRecord {
    fn from(row: ResetRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            token: row.token,
            created_at: row.created_at,
        }
    }
}

async fn load_authorities(pool: &PgPool, role_id: Uuid) -> Result<Vec<Authority>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT a.name FROM authorities a \
         JOIN roles_authorities ra ON ra.authority_id = a.id \
         WHERE ra.role_id = $1 ORDER BY a.name",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Authority::new(row.get::<String, _>("name")))
        .collect())
}

async fn load_roles(pool: &PgPool, account_id: Uuid) -> Result<Vec<Role>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT r.id, r.name FROM roles r \
         JOIN accounts_roles ar ON ar.role_id = r.id \
         WHERE ar.account_id = $1 ORDER BY r.name",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    let mut roles = Vec::with_capacity(rows.len());
    for row in rows {
        let role_id: Uuid = row.get("id");
        let name: String = row.get("name");
        let authorities = load_authorities(pool, role_id).await?;
        roles.push(Role::new(name, authorities));
    }

    Ok(roles)
}

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, row: AccountRow) -> Result<AccountRecord, sqlx::Error> {
        let roles = load_roles(&self.pool, row.id).await?;
        Ok(AccountRecord {
            id: row.id,
            public_id: row.public_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            email_verified: row.email_verified,
            verification_token: row.verification_token,
            roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn fetch_one_by(
        &self,
        sql: String,
        value: &str,
    ) -> StoreResult<Option<AccountRecord>> {
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<AccountRecord>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        self.fetch_one_by(sql, email).await
    }

    async fn find_by_public_id(&self, public_id: &str) -> StoreResult<Option<AccountRecord>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE public_id = $1");
        self.fetch_one_by(sql, public_id).await
    }

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<AccountRecord>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE verification_token = $1");
        self.fetch_one_by(sql, token).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<AccountRecord>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &AccountRecord) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO accounts (id, public_id, first_name, last_name, email, password_hash, \
                                   email_verified, verification_token, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO UPDATE SET \
                 first_name = EXCLUDED.first_name, \
                 last_name = EXCLUDED.last_name, \
                 email = EXCLUDED.email, \
                 password_hash = EXCLUDED.password_hash, \
                 email_verified = EXCLUDED.email_verified, \
                 verification_token = EXCLUDED.verification_token, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(record.id)
        .bind(&record.public_id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.email_verified)
        .bind(&record.verification_token)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        // Replace the role links wholesale; the role catalog itself is
        // managed outside this store.
        sqlx::query("DELETE FROM accounts_roles WHERE account_id = $1")
            .bind(record.id)
            .execute(&mut *tx)
            .await?;

        for role in &record.roles {
            sqlx::query(
                "INSERT INTO accounts_roles (account_id, role_id) \
                 SELECT $1, id FROM roles WHERE name = $2 \
                 ON CONFLICT DO NOTHING",
            )
            .bind(record.id)
            .bind(&role.name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, public_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE public_id = $1")
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn page(&self, index: u32, size: u32) -> StoreResult<Vec<AccountRecord>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at, id LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(size as i64)
            .bind(index as i64 * size as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.hydrate(row).await?);
        }

        Ok(records)
    }
}

/// PostgreSQL-backed role catalog
#[derive(Clone)]
pub struct PostgresRoleStore {
    pool: PgPool,
}

impl PostgresRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PostgresRoleStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let row = sqlx::query("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let role_id: Uuid = row.get("id");
                let name: String = row.get("name");
                let authorities = load_authorities(&self.pool, role_id).await?;
                Ok(Some(Role::new(name, authorities)))
            }
            None => Ok(None),
        }
    }
}

/// PostgreSQL-backed password reset record store
#[derive(Clone)]
pub struct PostgresResetTokenStore {
    pool: PgPool,
}

impl PostgresResetTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PostgresResetTokenStore {
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<PasswordResetRecord>> {
        let row = sqlx::query_as::<_, ResetRow>(
            "SELECT id, account_id, token, created_at FROM password_reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PasswordResetRecord::from))
    }

    async fn find_by_account_id(
        &self,
        account_id: Uuid,
    ) -> StoreResult<Option<PasswordResetRecord>> {
        let row = sqlx::query_as::<_, ResetRow>(
            "SELECT id, account_id, token, created_at FROM password_reset_tokens \
             WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PasswordResetRecord::from))
    }

    async fn save(&self, record: &PasswordResetRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (id, account_id, token, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET token = EXCLUDED.token",
        )
        .bind(record.id)
        .bind(record.account_id)
        .bind(&record.token)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, token: &str) -> StoreResult<bool> {
        // Single-row delete doubles as the consumption step: of two racing
        // callers, only one sees rows_affected == 1.
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
