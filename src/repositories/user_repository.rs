use super::{map_write_error, RepositoryError, RepositoryResult};
use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let result = sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: Some("Usuario".to_string()),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = SqliteUserRepository::new(create_test_pool().await);

        let created = repo.create_user(&new_user("usuario@email.com")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name.as_deref(), Some("Usuario"));
        assert!(created.created_at.is_some());

        let by_email = repo.find_by_email("usuario@email.com").await.unwrap();
        assert_eq!(by_email, Some(created.clone()));

        let by_id = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_already_exists() {
        let repo = SqliteUserRepository::new(create_test_pool().await);

        repo.create_user(&new_user("dup@email.com")).await.unwrap();
        let result = repo.create_user(&new_user("dup@email.com")).await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_exists_by_email() {
        let repo = SqliteUserRepository::new(create_test_pool().await);

        assert!(!repo.exists_by_email("nobody@email.com").await.unwrap());
        repo.create_user(&new_user("somebody@email.com")).await.unwrap();
        assert!(repo.exists_by_email("somebody@email.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_missing_user_is_none() {
        let repo = SqliteUserRepository::new(create_test_pool().await);

        assert!(repo.find_by_id(42).await.unwrap().is_none());
        assert!(repo.find_by_email("ghost@email.com").await.unwrap().is_none());
    }
}
