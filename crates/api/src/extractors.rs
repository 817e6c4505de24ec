//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use foodgram_common::AppError;
use foodgram_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    /// Borrow the viewer, if any.
    #[must_use]
    pub const fn viewer(&self) -> Option<&user::Model> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Authenticated admin extractor.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn user(is_admin: bool) -> user::Model {
        user::Model {
            id: 1,
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Cook".to_string(),
            password: "hash".to_string(),
            token: Some("token".to_string()),
            is_admin,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn parts(user: Option<user::Model>) -> Parts {
        let (mut parts, ()) = Request::builder().uri("/").body(()).unwrap().into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    #[tokio::test]
    async fn test_auth_user_rejects_anonymous() {
        let result = AuthUser::from_request_parts(&mut parts(None), &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_maybe_auth_user() {
        let anonymous = MaybeAuthUser::from_request_parts(&mut parts(None), &())
            .await
            .unwrap();
        assert!(anonymous.viewer().is_none());

        let signed_in = MaybeAuthUser::from_request_parts(&mut parts(Some(user(false))), &())
            .await
            .unwrap();
        assert_eq!(signed_in.viewer().unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_admin_user() {
        let result = AdminUser::from_request_parts(&mut parts(Some(user(false))), &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let result = AdminUser::from_request_parts(&mut parts(None), &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));

        let AdminUser(admin) = AdminUser::from_request_parts(&mut parts(Some(user(true))), &())
            .await
            .unwrap();
        assert!(admin.is_admin);
    }
}
