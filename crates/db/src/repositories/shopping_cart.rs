//! Shopping cart repository.

use std::sync::Arc;

use crate::entities::{
    RecipeIngredient, ShoppingCartItem, ingredient, recipe, recipe_ingredient, shopping_cart_item,
};
use crate::repositories::write_error;
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QuerySelect, RelationTrait,
};

/// One ingredient line of one recipe in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CartIngredientRow {
    /// Ingredient name.
    pub name: String,
    /// Ingredient unit.
    pub measurement_unit: String,
    /// Amount used by the recipe.
    pub amount: i32,
}

/// Shopping cart repository for database operations.
#[derive(Clone)]
pub struct ShoppingCartRepository {
    db: Arc<DatabaseConnection>,
}

impl ShoppingCartRepository {
    /// Create a new shopping cart repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a cart entry by user and recipe.
    pub async fn find_by_user_and_recipe(
        &self,
        user_id: i32,
        recipe_id: i32,
    ) -> AppResult<Option<shopping_cart_item::Model>> {
        ShoppingCartItem::find()
            .filter(shopping_cart_item::Column::UserId.eq(user_id))
            .filter(shopping_cart_item::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a recipe is in the user's cart.
    pub async fn is_in_cart(&self, user_id: i32, recipe_id: i32) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_recipe(user_id, recipe_id)
            .await?
            .is_some())
    }

    /// Of the given recipes, return the ones in the user's cart.
    pub async fn find_recipe_ids_among(
        &self,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> AppResult<Vec<i32>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = ShoppingCartItem::find()
            .filter(shopping_cart_item::Column::UserId.eq(user_id))
            .filter(shopping_cart_item::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|c| c.recipe_id).collect())
    }

    /// Add a recipe to the cart.
    pub async fn create(
        &self,
        model: shopping_cart_item::ActiveModel,
    ) -> AppResult<shopping_cart_item::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, "Recipe is already in the shopping cart"))
    }

    /// Remove a recipe from the cart, returning the number of removed rows.
    pub async fn delete_by_user_and_recipe(&self, user_id: i32, recipe_id: i32) -> AppResult<u64> {
        let result = ShoppingCartItem::delete_many()
            .filter(shopping_cart_item::Column::UserId.eq(user_id))
            .filter(shopping_cart_item::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Every ingredient line of every recipe in the user's cart, unaggregated.
    pub async fn ingredient_rows(&self, user_id: i32) -> AppResult<Vec<CartIngredientRow>> {
        RecipeIngredient::find()
            .select_only()
            .column(ingredient::Column::Name)
            .column(ingredient::Column::MeasurementUnit)
            .column(recipe_ingredient::Column::Amount)
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Ingredient.def())
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Recipe.def())
            .join(JoinType::InnerJoin, recipe::Relation::ShoppingCartItems.def())
            .filter(shopping_cart_item::Column::UserId.eq(user_id))
            .into_model::<CartIngredientRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    #[tokio::test]
    async fn test_is_in_cart() {
        let item = shopping_cart_item::Model {
            id: 1,
            user_id: 1,
            recipe_id: 7,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[item]])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        assert!(repo.is_in_cart(1, 7).await.unwrap());
    }

    #[tokio::test]
    async fn test_ingredient_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "name" => Value::from("flour"),
                        "measurement_unit" => Value::from("g"),
                        "amount" => Value::Int(Some(200)),
                    },
                    btreemap! {
                        "name" => Value::from("flour"),
                        "measurement_unit" => Value::from("g"),
                        "amount" => Value::Int(Some(300)),
                    },
                ]])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        let rows = repo.ingredient_rows(1).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "flour");
        assert_eq!(rows[1].amount, 300);
    }
}
