use crate::models::user::{NewUser, RegisterUserRequest, User};
use crate::repositories::{RepositoryError, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("{0}")]
    Authentication(&'static str),
    #[error("email already registered")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub const UNKNOWN_EMAIL: &str = "no user found for the given email";
pub const INVALID_PASSWORD: &str = "invalid password";

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            tracing::warn!(email, "authentication failed: unknown email");
            return Err(UserServiceError::Authentication(UNKNOWN_EMAIL));
        };

        if !self.verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = user.id, "authentication failed: wrong password");
            return Err(UserServiceError::Authentication(INVALID_PASSWORD));
        }

        Ok(user)
    }

    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, UserServiceError> {
        self.ensure_email_available(&request.email).await?;

        let new_user = NewUser {
            name: request.name,
            email: request.email,
            password_hash: self.hash_password(&request.password)?,
        };

        match self.repository.create_user(&new_user).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "registered user");
                Ok(user)
            }
            // Lost a race with a concurrent registration
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    async fn ensure_email_available(&self, email: &str) -> Result<(), UserServiceError> {
        if self.repository.exists_by_email(email).await? {
            return Err(UserServiceError::EmailTaken);
        }
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::HashingError(e.to_string()))
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    fn stored_user(password: &str) -> User {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();

        User {
            id: 1,
            name: Some("Usuario".to_string()),
            email: "usuario@email.com".to_string(),
            password_hash,
            created_at: None,
        }
    }

    fn register_request() -> RegisterUserRequest {
        RegisterUserRequest {
            name: Some("Usuario".to_string()),
            email: "usuario@email.com".to_string(),
            password: "123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockUserRepository::new();
        let user = stored_user("123");
        let user_clone = user.clone();

        mock_repo
            .expect_find_by_email()
            .with(eq("usuario@email.com"))
            .times(1)
            .returning(move |_| {
                let user = user_clone.clone();
                Box::pin(async move { Ok(Some(user)) })
            });

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.authenticate("usuario@email.com", "123").await;
        assert_eq!(result.expect("Expected Ok result"), user);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_email()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.authenticate("usuario@email.com", "123").await;
        assert!(matches!(
            result,
            Err(UserServiceError::Authentication(UNKNOWN_EMAIL))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut mock_repo = MockUserRepository::new();
        let user = stored_user("123");

        mock_repo.expect_find_by_email().times(1).returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.authenticate("usuario@email.com", "456").await;
        assert!(matches!(
            result,
            Err(UserServiceError::Authentication(INVALID_PASSWORD))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_plaintext_stored_password() {
        let mut mock_repo = MockUserRepository::new();
        let mut user = stored_user("123");
        user.password_hash = "123".to_string();

        mock_repo.expect_find_by_email().times(1).returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.authenticate("usuario@email.com", "123").await;
        assert!(matches!(result, Err(UserServiceError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_exists_by_email()
            .with(eq("usuario@email.com"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(false) }));
        mock_repo
            .expect_create_user()
            .withf(|new_user: &NewUser| {
                new_user.email == "usuario@email.com"
                    && new_user.password_hash != "123"
                    && new_user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|new_user| {
                let user = User {
                    id: 1,
                    name: new_user.name.clone(),
                    email: new_user.email.clone(),
                    password_hash: new_user.password_hash.clone(),
                    created_at: None,
                };
                Box::pin(async move { Ok(user) })
            });

        let service = UserService::new(Arc::new(mock_repo));

        let user = service.register(register_request()).await.unwrap();
        assert_eq!(user.id, 1);
        assert!(service.verify_password("123", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_existing_email_never_inserts() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(true) }));
        mock_repo.expect_create_user().never();

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.register(register_request()).await;
        assert!(matches!(result, Err(UserServiceError::EmailTaken)));
        assert_eq!(
            result.unwrap_err().to_string(),
            "email already registered"
        );
    }

    #[tokio::test]
    async fn test_register_unique_violation_maps_to_email_taken() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_exists_by_email()
            .returning(|_| Box::pin(async move { Ok(false) }));
        mock_repo
            .expect_create_user()
            .times(1)
            .returning(|_| Box::pin(async move { Err(RepositoryError::AlreadyExists) }));

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.register(register_request()).await;
        assert!(matches!(result, Err(UserServiceError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_find_by_id_absent_is_none() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_id()
            .with(eq(9))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = UserService::new(Arc::new(mock_repo));

        assert!(service.find_by_id(9).await.unwrap().is_none());
    }
}
