pub mod test_helpers {
    use sqlx::{
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
        SqlitePool,
    };
    use std::str::FromStr;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    use crate::graphql;
    use crate::repositories::{
        poll_repository::SqlitePollRepository, user_repository::SqliteUserRepository,
    };
    use crate::services::{AuthService, MockEmailService, PollService, UserService};
    use crate::AppState;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when you need to test features that don't work with in-memory databases
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let options = SqliteConnectOptions::from_str(&database_url)?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        verified: bool,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, is_verified, verification_code)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind("Test User")
        .bind(email)
        .bind(password_hash)
        .bind(verified)
        .bind(if verified { None } else { Some("123456") })
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Create a test poll with the given options, returning (poll_id, option_ids)
    pub async fn create_test_poll(
        pool: &SqlitePool,
        user_id: i64,
        question: &str,
        options: &[&str],
    ) -> Result<(i64, Vec<i64>), sqlx::Error> {
        let result = sqlx::query("INSERT INTO polls (user_id, question) VALUES (?, ?)")
            .bind(user_id)
            .bind(question)
            .execute(pool)
            .await?;
        let poll_id = result.last_insert_rowid();

        let mut option_ids = Vec::with_capacity(options.len());
        for text in options {
            let result = sqlx::query("INSERT INTO options (poll_id, text) VALUES (?, ?)")
                .bind(poll_id)
                .bind(text)
                .execute(pool)
                .await?;
            option_ids.push(result.last_insert_rowid());
        }

        Ok((poll_id, option_ids))
    }

    /// Wire a complete application state over the given pool, with the
    /// logging email transport and a fixed JWT secret.
    pub fn build_test_state(pool: SqlitePool) -> AppState {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let poll_repository = Arc::new(SqlitePollRepository::new(pool.clone()));

        let user_service = Arc::new(UserService::new(
            user_repository.clone(),
            Arc::new(MockEmailService::new()),
        ));
        let auth_service = Arc::new(AuthService::new(user_repository.clone(), "test-secret"));
        let poll_service = Arc::new(PollService::new(poll_repository, user_repository));

        let schema = graphql::build_schema(
            user_service.clone(),
            auth_service.clone(),
            poll_service.clone(),
        );

        AppState {
            user_service,
            auth_service,
            poll_service,
            schema,
            pool,
        }
    }
}
