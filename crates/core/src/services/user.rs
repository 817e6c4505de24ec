//! User service: registration, token auth and passwords.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::user,
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::validate_username;

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials";

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    following_repo: FollowingRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1, max = 150))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Credentials for token login.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Input for changing the current user's password.
#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordInput {
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Public representation of a user.
///
/// `is_subscribed` is omitted where the viewer's relation is meaningless,
/// e.g. in the registration response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

impl UserView {
    #[must_use]
    pub fn new(user: &user::Model, is_subscribed: Option<bool>) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, following_repo: FollowingRepository) -> Self {
        Self {
            user_repo,
            following_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;
        validate_username(&input.username)?;

        let email = input.email.trim().to_lowercase();

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest(
                "A user with that email already exists".to_string(),
            ));
        }
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "A user with that username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            email: Set(email),
            username: Set(input.username),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            password: Set(password_hash),
            token: Set(None),
            is_admin: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Registered user");

        Ok(user)
    }

    /// Exchange email and password for the user's auth token.
    ///
    /// Each user has at most one token; an existing one is returned as is.
    pub async fn login(&self, input: LoginInput) -> AppResult<String> {
        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
        }

        if let Some(token) = user.token.clone() {
            return Ok(token);
        }

        let token = self.id_gen.generate_token();
        let user_id = user.id;
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        self.user_repo.update(active).await?;

        tracing::debug!(user_id, "Issued auth token");
        Ok(token)
    }

    /// Revoke the user's auth token.
    pub async fn logout(&self, user: &user::Model) -> AppResult<()> {
        let mut active: user::ActiveModel = user.clone().into();
        active.token = Set(None);
        self.user_repo.update(active).await?;
        Ok(())
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i32) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List users ordered by ID, with the total count.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<(Vec<user::Model>, u64)> {
        let users = self.user_repo.find_page(limit, offset).await?;
        let count = self.user_repo.count().await?;
        Ok((users, count))
    }

    /// Change the password after checking the current one.
    pub async fn set_password(&self, user: &user::Model, input: SetPasswordInput) -> AppResult<()> {
        input.validate()?;

        if !verify_password(&input.current_password, &user.password)? {
            return Err(AppError::BadRequest("Invalid password".to_string()));
        }

        let mut active: user::ActiveModel = user.clone().into();
        active.password = Set(hash_password(&input.new_password)?);
        self.user_repo.update(active).await?;

        Ok(())
    }

    /// Present a user as seen by `viewer`.
    pub async fn present(
        &self,
        viewer: Option<&user::Model>,
        user: &user::Model,
    ) -> AppResult<UserView> {
        let is_subscribed = match viewer {
            Some(viewer) => self.following_repo.is_following(viewer.id, user.id).await?,
            None => false,
        };
        Ok(UserView::new(user, Some(is_subscribed)))
    }

    /// Present a list of users as seen by `viewer`, with one subscription lookup.
    pub async fn present_many(
        &self,
        viewer: Option<&user::Model>,
        users: &[user::Model],
    ) -> AppResult<Vec<UserView>> {
        let followed = match viewer {
            Some(viewer) => {
                let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
                self.following_repo.find_followed_among(viewer.id, &ids).await?
            }
            None => vec![],
        };

        Ok(users
            .iter()
            .map(|u| UserView::new(u, Some(followed.contains(&u.id))))
            .collect())
    }
}

/// Hash a password using Argon2.
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
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
    use foodgram_db::entities::following;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: i32, username: &str, password: &str) -> user::Model {
        user::Model {
            id,
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: hash_password(password).unwrap(),
            token: None,
            is_admin: false,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(
        user_db: Arc<DatabaseConnection>,
        following_db: Arc<DatabaseConnection>,
    ) -> UserService {
        UserService::new(
            UserRepository::new(user_db),
            FollowingRepository::new(following_db),
        )
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            email: "not-an-email".to_string(),
            username: "cook".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password: "longenough".to_string(),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn test_register_rejects_reserved_username() {
        let service = create_test_service(empty_db(), empty_db());
        let result = service
            .register(RegisterInput {
                email: "me@example.com".to_string(),
                username: "me".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                password: "longenough".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let existing = create_test_user(1, "cook", "longenough");
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = create_test_service(user_db, empty_db());
        let result = service
            .register(RegisterInput {
                email: "Cook@Example.com".to_string(),
                username: "cook2".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                password: "longenough".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_login_returns_existing_token() {
        let mut user = create_test_user(1, "cook", "longenough");
        user.token = Some("existing-token".to_string());

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = create_test_service(user_db, empty_db());
        let token = service
            .login(LoginInput {
                email: "cook@example.com".to_string(),
                password: "longenough".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(token, "existing-token");
    }

    #[tokio::test]
    async fn test_login_issues_token() {
        let user = create_test_user(1, "cook", "longenough");
        let mut updated = user.clone();
        updated.token = Some("new".to_string());

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[updated]])
                .into_connection(),
        );

        let service = create_test_service(user_db, empty_db());
        let token = service
            .login(LoginInput {
                email: "cook@example.com".to_string(),
                password: "longenough".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(token.len(), 32);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = create_test_user(1, "cook", "longenough");
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = create_test_service(user_db, empty_db());
        let result = service
            .login(LoginInput {
                email: "cook@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(user_db, empty_db());
        let result = service.authenticate_by_token("nope").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_set_password_checks_current() {
        let user = create_test_user(1, "cook", "longenough");
        let service = create_test_service(empty_db(), empty_db());

        let result = service
            .set_password(
                &user,
                SetPasswordInput {
                    current_password: "not-it-at-all".to_string(),
                    new_password: "brand-new-pass".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_present_anonymous_is_not_subscribed() {
        let user = create_test_user(2, "author", "longenough");
        let service = create_test_service(empty_db(), empty_db());

        let view = service.present(None, &user).await.unwrap();

        assert_eq!(view.is_subscribed, Some(false));
        assert_eq!(view.username, "author");
    }

    #[tokio::test]
    async fn test_present_many_batches_subscriptions() {
        let viewer = create_test_user(1, "reader", "longenough");
        let a = create_test_user(2, "a", "longenough");
        let b = create_test_user(3, "b", "longenough");

        let following_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[following::Model {
                    id: 1,
                    follower_id: 1,
                    author_id: 3,
                    created_at: Utc::now().into(),
                }]])
                .into_connection(),
        );

        let service = create_test_service(empty_db(), following_db);
        let views = service
            .present_many(Some(&viewer), &[a, b])
            .await
            .unwrap();

        assert_eq!(views[0].is_subscribed, Some(false));
        assert_eq!(views[1].is_subscribed, Some(true));
    }

    #[test]
    fn test_user_view_omits_unknown_subscription() {
        let user = create_test_user(5, "cook", "longenough");
        let json = serde_json::to_value(UserView::new(&user, None)).unwrap();

        assert!(json.get("is_subscribed").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["id"], 5);
    }
}
