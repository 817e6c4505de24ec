//! Application state and authentication middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use foodgram_common::{Config, StorageBackend, config::PaginationConfig};
use foodgram_core::{
    FavoriteService, FollowingService, IngredientService, RecipeService, ShoppingCartService,
    TagService, UserService,
};
use foodgram_db::repositories::{
    FavoriteRepository, FollowingRepository, IngredientRepository, RecipeRepository,
    ShoppingCartRepository, TagRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and tokens.
    pub user_service: UserService,
    /// Subscriptions.
    pub following_service: FollowingService,
    /// Tags.
    pub tag_service: TagService,
    /// Ingredients.
    pub ingredient_service: IngredientService,
    /// Recipes.
    pub recipe_service: RecipeService,
    /// Favorites.
    pub favorite_service: FavoriteService,
    /// Shopping cart.
    pub shopping_cart_service: ShoppingCartService,
    /// Page size defaults.
    pub pagination: PaginationConfig,
    /// Public base URL used for pagination links.
    pub base_url: String,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let following_repo = FollowingRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let ingredient_repo = IngredientRepository::new(Arc::clone(&db));
        let recipe_repo = RecipeRepository::new(Arc::clone(&db));
        let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
        let cart_repo = ShoppingCartRepository::new(Arc::clone(&db));

        Self {
            user_service: UserService::new(user_repo.clone(), following_repo.clone()),
            following_service: FollowingService::new(
                following_repo.clone(),
                user_repo.clone(),
                recipe_repo.clone(),
            ),
            tag_service: TagService::new(tag_repo.clone()),
            ingredient_service: IngredientService::new(ingredient_repo.clone()),
            recipe_service: RecipeService::new(
                recipe_repo.clone(),
                user_repo,
                tag_repo,
                ingredient_repo,
                following_repo,
                favorite_repo.clone(),
                cart_repo.clone(),
                storage,
            ),
            favorite_service: FavoriteService::new(favorite_repo, recipe_repo.clone()),
            shopping_cart_service: ShoppingCartService::new(cart_repo, recipe_repo),
            pagination: config.pagination.clone(),
            base_url: config.server.url.clone(),
        }
    }
}

/// Extract the key from `Token <key>` or `Bearer <key>`.
fn token_from_header(value: &str) -> Option<&str> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// An unknown token leaves the request anonymous; endpoints that need a user
/// reject it through [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = token_from_header(auth_str)
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid auth token"),
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_header() {
        assert_eq!(token_from_header("Token abc"), Some("abc"));
        assert_eq!(token_from_header("Bearer abc"), Some("abc"));
        assert_eq!(token_from_header("Token "), None);
        assert_eq!(token_from_header("Basic abc"), None);
        assert_eq!(token_from_header("abc"), None);
    }
}
