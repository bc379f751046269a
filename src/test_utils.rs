pub mod test_helpers {
    use crate::{config::AppConfig, db, models::EntryType};
    use rust_decimal::Decimal;
    use sqlx::SqlitePool;
    use std::net::IpAddr;
    use tempfile::NamedTempFile;

    /// Opens a single-connection pool through `db::create_pool` and applies
    /// the migrations, exactly as the server does at startup.
    async fn open_migrated(database_url: String) -> Result<SqlitePool, sqlx::Error> {
        let config = AppConfig {
            database_url,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            max_connections: 1,
        };
        let pool = db::create_pool(&config).await?;
        db::run_migrations(&pool)
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

        Ok(pool)
    }

    /// Empty in-memory ledger with the schema applied.
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        open_migrated("sqlite::memory:".to_string()).await
    }

    /// File-backed ledger, for data that must outlive a pool. Keep the
    /// returned file alive for as long as the database is used.
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;

        let pool = open_migrated(format!("sqlite://{}", db_path)).await?;
        Ok((pool, temp_file))
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let result =
            sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)")
                .bind("Test User")
                .bind(email)
                .bind(password_hash)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert an entry directly, bypassing validation
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_test_entry(
        pool: &SqlitePool,
        user_id: i64,
        description: &str,
        month: i64,
        year: i64,
        value: Decimal,
        entry_type: EntryType,
        status: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO entries (description, month, year, value, entry_type, status, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(description)
        .bind(month)
        .bind(year)
        .bind(value.to_string())
        .bind(entry_type.as_str())
        .bind(status)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}

#[cfg(test)]
pub async fn create_test_user(
    pool: &sqlx::SqlitePool,
    email: &str,
    password: &str,
) -> Result<i64, sqlx::Error> {
    test_helpers::insert_test_user(pool, email, password).await
}
