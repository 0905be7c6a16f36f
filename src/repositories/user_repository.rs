use crate::models::User;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{map_unique_violation, RepositoryError, RepositoryResult};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        verification_code: &str,
    ) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    /// Marks the user verified and clears the one-time code.
    async fn mark_verified(&self, email: &str) -> RepositoryResult<()>;
    async fn set_verification_code(&self, email: &str, code: &str) -> RepositoryResult<()>;
    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, is_verified, verification_code, created_at";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        verification_code: &str,
    ) -> RepositoryResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, is_verified, verification_code) \
             VALUES (?, ?, ?, FALSE, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(verification_code)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn mark_verified(&self, email: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_verified = TRUE, verification_code = NULL WHERE email = ?",
        )
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_verification_code(&self, email: &str, code: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET verification_code = ? WHERE email = ?")
            .bind(code)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>> {
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
