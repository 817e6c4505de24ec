//! Favorite service.

use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::{favorite, user},
    repositories::{FavoriteRepository, RecipeRepository},
};
use sea_orm::Set;

use crate::services::recipe::ShortRecipe;

/// Favorite service for managing recipe bookmarks.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    recipe_repo: RecipeRepository,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            favorite_repo,
            recipe_repo,
        }
    }

    /// Add a recipe to the user's favorites.
    pub async fn add(&self, user: &user::Model, recipe_id: i32) -> AppResult<ShortRecipe> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        if self.favorite_repo.is_favorited(user.id, recipe_id).await? {
            return Err(AppError::BadRequest(
                "Recipe is already in favorites".to_string(),
            ));
        }

        let model = favorite::ActiveModel {
            user_id: Set(user.id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        self.favorite_repo.create(model).await?;

        Ok(ShortRecipe::from(&recipe))
    }

    /// Remove a recipe from the user's favorites.
    pub async fn remove(&self, user: &user::Model, recipe_id: i32) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        let removed = self
            .favorite_repo
            .delete_by_user_and_recipe(user.id, recipe_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound("Recipe is not in favorites".to_string()));
        }
        Ok(())
    }
}
