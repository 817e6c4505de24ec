//! Ingredient service.

use foodgram_common::AppResult;
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};

/// Ingredient lookup service.
#[derive(Clone)]
pub struct IngredientService {
    ingredient_repo: IngredientRepository,
}

impl IngredientService {
    #[must_use]
    pub const fn new(ingredient_repo: IngredientRepository) -> Self {
        Self { ingredient_repo }
    }

    /// Ingredients ordered by name. `name` narrows to names starting with it.
    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        self.ingredient_repo.find_all(name).await
    }

    pub async fn get(&self, id: i32) -> AppResult<ingredient::Model> {
        self.ingredient_repo.get_by_id(id).await
    }
}
