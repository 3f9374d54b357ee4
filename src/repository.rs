use crate::models::{Role, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// RepoError
///
/// Failures the storage collaborator can report. `DuplicateEmail` is the only
/// variant the service treats as a client error (409); everything else maps to
/// an internal failure.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the
/// service to interact with the data layer without knowing the specific
/// implementation (Postgres in production, an in-memory map in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    /// One page of users ordered by creation time.
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, RepoError>;
    async fn count_users(&self) -> Result<i64, RepoError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Inserts a fully-populated record. Reports `DuplicateEmail` on a unique
    /// violation.
    async fn insert_user(&self, user: User) -> Result<User, RepoError>;

    /// Persists a merged candidate. Returns `None` when the id no longer
    /// exists; reports `DuplicateEmail` when the new email collides.
    async fn update_user(&self, user: User) -> Result<Option<User>, RepoError>;

    /// Returns true when a row was actually removed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are runtime-checked (`sqlx::query_as`) so the crate builds without a
/// live database connection.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Raw row shape: role travels as TEXT and is parsed into the closed enum on the
// way out, so a corrupted row surfaces as an explicit error instead of a panic.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|e| RepoError::Corrupt(format!("user {}: {}", row.id, e)))?;
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, role, password_hash, created_at, updated_at";

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

fn map_write_error(err: sqlx::Error, email: &str) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return RepoError::DuplicateEmail(email.to_string());
        }
    }
    RepoError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, RepoError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC OFFSET $1 LIMIT $2"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count_users(&self) -> Result<i64, RepoError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: User) -> Result<User, RepoError> {
        let query = format!(
            "INSERT INTO users (id, first_name, last_name, email, role, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.role.to_string())
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &user.email))?;

        User::try_from(row)
    }

    async fn update_user(&self, user: User) -> Result<Option<User>, RepoError> {
        // id and password_hash are deliberately not updatable through this path.
        let query = format!(
            "UPDATE users SET first_name = $2, last_name = $3, email = $4, role = $5, updated_at = $6 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.role.to_string())
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &user.email))?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
