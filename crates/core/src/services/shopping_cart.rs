//! Shopping cart service and the downloadable shopping list.

use std::collections::BTreeMap;

use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::{shopping_cart_item, user},
    repositories::{CartIngredientRow, RecipeRepository, ShoppingCartRepository},
};
use sea_orm::Set;

use crate::services::recipe::ShortRecipe;

/// One consolidated line of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Shopping cart service.
#[derive(Clone)]
pub struct ShoppingCartService {
    cart_repo: ShoppingCartRepository,
    recipe_repo: RecipeRepository,
}

impl ShoppingCartService {
    /// Create a new shopping cart service.
    #[must_use]
    pub const fn new(cart_repo: ShoppingCartRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            cart_repo,
            recipe_repo,
        }
    }

    /// Add a recipe to the user's cart.
    pub async fn add(&self, user: &user::Model, recipe_id: i32) -> AppResult<ShortRecipe> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        if self.cart_repo.is_in_cart(user.id, recipe_id).await? {
            return Err(AppError::BadRequest(
                "Recipe is already in the shopping cart".to_string(),
            ));
        }

        let model = shopping_cart_item::ActiveModel {
            user_id: Set(user.id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        self.cart_repo.create(model).await?;

        Ok(ShortRecipe::from(&recipe))
    }

    /// Remove a recipe from the user's cart.
    pub async fn remove(&self, user: &user::Model, recipe_id: i32) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        let removed = self
            .cart_repo
            .delete_by_user_and_recipe(user.id, recipe_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound(
                "Recipe is not in the shopping cart".to_string(),
            ));
        }
        Ok(())
    }

    /// Consolidated ingredients of every recipe in the user's cart.
    pub async fn shopping_list(&self, user: &user::Model) -> AppResult<Vec<ShoppingListLine>> {
        let rows = self.cart_repo.ingredient_rows(user.id).await?;
        Ok(aggregate(rows))
    }

    /// The shopping list rendered as a plain-text document.
    pub async fn download(&self, user: &user::Model) -> AppResult<String> {
        let lines = self.shopping_list(user).await?;
        tracing::debug!(user_id = user.id, lines = lines.len(), "Rendered shopping list");
        Ok(render(&lines))
    }
}

/// Sum amounts per (name, unit), ordered by name.
fn aggregate(rows: Vec<CartIngredientRow>) -> Vec<ShoppingListLine> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for row in rows {
        *totals
            .entry((row.name, row.measurement_unit))
            .or_default() += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingListLine {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

fn render(lines: &[ShoppingListLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "{} — {} {}\n",
                line.name, line.amount, line.measurement_unit
            )
        })
        .collect()
}
