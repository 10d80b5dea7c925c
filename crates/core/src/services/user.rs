//! User service.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use minitwit_common::{AppError, AppResult, TokenGenerator};
use minitwit_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    token_gen: TokenGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(email, length(min = 3, max = 128))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            token_gen: TokenGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        // The raw password never reaches the store
        let password_hash = hash_password(&input.password)?;
        let token = self.token_gen.generate();

        let user = self
            .user_repo
            .create(&input.username, &input.email, &password_hash, &token)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "Registered new user");

        Ok(user)
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(id).await
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_username(username).await
    }

    /// Authenticate a user by access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Log a user in and return the user with an active access token.
    ///
    /// Users created before token issuance hold no token; login mints
    /// one for them on the spot.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(user::Model, String)> {
        let user = self.authenticate(username, password).await?;

        let token = match user.token.clone() {
            Some(token) => token,
            None => self.regenerate_token(user.id).await?,
        };

        Ok((user, token))
    }

    /// Replace a user's access token, invalidating the previous one.
    pub async fn regenerate_token(&self, user_id: i64) -> AppResult<String> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        let new_token = self.token_gen.generate();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(new_token.clone()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: i64, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "unused".to_string(),
            token: Some("test_token".to_string()),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(user_db: Arc<sea_orm::DatabaseConnection>) -> UserService {
        UserService::new(UserRepository::new(user_db))
    }

    // Unit tests for password functions
    #[test]
    fn test_hash_password() {
        let password = "test_password_123";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "test_password_123";
        let hash = hash_password(password).unwrap();

        let result = verify_password(password, &hash).unwrap();
        assert!(result);
    }

    #[test]
    fn test_verify_password_incorrect() {
        let password = "test_password_123";
        let hash = hash_password(password).unwrap();

        let result = verify_password("wrong_password", &hash).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("test", "invalid_hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_password_different_each_time() {
        let password = "same_password";
        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(verify_password(password, &hash1).unwrap());
        assert!(verify_password(password, &hash2).unwrap());
    }

    #[test]
    fn test_create_user_input_validation() {
        // Empty username
        let input = CreateUserInput {
            username: String::new(),
            email: "new@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        // Malformed email
        let input = CreateUserInput {
            username: "newuser".to_string(),
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        // Empty password
        let input = CreateUserInput {
            username: "newuser".to_string(),
            email: "new@example.com".to_string(),
            password: String::new(),
        };
        assert!(input.validate().is_err());

        // Valid input
        let input = CreateUserInput {
            username: "newuser".to_string(),
            email: "new@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_ok());
    }

    // Service tests
    #[tokio::test]
    async fn test_create_user() {
        let user = create_test_user(1, "newuser");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[user.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 1,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let input = CreateUserInput {
            username: "newuser".to_string(),
            email: "newuser@example.com".to_string(),
            password: "password123".to_string(),
        };

        let result = service.create(input).await.unwrap();
        assert_eq!(result.username, "newuser");
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let existing = create_test_user(1, "taken");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let input = CreateUserInput {
            username: "taken".to_string(),
            email: "fresh@example.com".to_string(),
            password: "password123".to_string(),
        };

        let result = service.create(input).await;
        match result {
            Err(AppError::DuplicateUsername) => {}
            _ => panic!("Expected DuplicateUsername error"),
        }
    }

    #[tokio::test]
    async fn test_create_user_invalid_input_skips_store() {
        // No query results appended: validation must fail first
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db);

        let input = CreateUserInput {
            username: "newuser".to_string(),
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
        };

        let result = service.create(input).await;
        match result {
            Err(AppError::Validation(_)) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_get_by_username_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let result = service.get_by_username("nobody").await;
        match result {
            Err(AppError::UnknownUser(name)) => assert_eq!(name, "nobody"),
            _ => panic!("Expected UnknownUser error"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut user = create_test_user(1, "testuser");
        user.password_hash = hash_password("right_password").unwrap();

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let result = service
            .authenticate("testuser", "right_password")
            .await
            .unwrap();
        assert_eq!(result.id, 1);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut user = create_test_user(1, "testuser");
        user.password_hash = hash_password("right_password").unwrap();

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let result = service.authenticate("testuser", "wrong_password").await;
        match result {
            Err(AppError::Unauthorized) => {}
            _ => panic!("Expected Unauthorized error"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let result = service.authenticate("nobody", "password").await;
        match result {
            Err(AppError::Unauthorized) => {}
            _ => panic!("Expected Unauthorized error"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_by_token_found() {
        let user = create_test_user(1, "testuser");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let result = service.authenticate_by_token("test_token").await.unwrap();
        assert_eq!(result.id, 1);
    }

    #[tokio::test]
    async fn test_authenticate_by_token_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let result = service.authenticate_by_token("invalid").await;
        match result {
            Err(AppError::Unauthorized) => {}
            _ => panic!("Expected Unauthorized error"),
        }
    }

    #[tokio::test]
    async fn test_regenerate_token() {
        let user = create_test_user(1, "testuser");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let token = service.regenerate_token(1).await.unwrap();
        assert_eq!(token.len(), 32);
        assert_ne!(token, "test_token");
    }

    #[tokio::test]
    async fn test_regenerate_token_unknown_user() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let result = service.regenerate_token(404).await;
        match result {
            Err(AppError::Unauthorized) => {}
            _ => panic!("Expected Unauthorized error"),
        }
    }

    #[tokio::test]
    async fn test_login_returns_existing_token() {
        let mut user = create_test_user(1, "testuser");
        user.password_hash = hash_password("secret").unwrap();

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let (user, token) = service.login("testuser", "secret").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(token, "test_token");
    }

    #[tokio::test]
    async fn test_login_mints_token_when_missing() {
        let mut user = create_test_user(1, "testuser");
        user.password_hash = hash_password("secret").unwrap();
        user.token = None;

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user.clone()]])
                .append_query_results([[user]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = create_test_service(user_db);

        let (user, token) = service.login("testuser", "secret").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(token.len(), 32);
    }
}
