//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use crate::repositories::write_error;
use foodgram_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a favorite by user and recipe.
    pub async fn find_by_user_and_recipe(
        &self,
        user_id: i32,
        recipe_id: i32,
    ) -> AppResult<Option<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a recipe is favorited by user.
    pub async fn is_favorited(&self, user_id: i32, recipe_id: i32) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_recipe(user_id, recipe_id)
            .await?
            .is_some())
    }

    /// Of the given recipes, return the ones the user has favorited.
    pub async fn find_recipe_ids_among(
        &self,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> AppResult<Vec<i32>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|f| f.recipe_id).collect())
    }

    /// Create a new favorite.
    pub async fn create(&self, model: favorite::ActiveModel) -> AppResult<favorite::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, "Recipe is already in favorites"))
    }

    /// Delete a favorite by user and recipe, returning the number of removed rows.
    pub async fn delete_by_user_and_recipe(&self, user_id: i32, recipe_id: i32) -> AppResult<u64> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
