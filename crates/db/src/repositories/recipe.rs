//! Recipe repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    Recipe, RecipeIngredient, RecipeTag, favorite, recipe, recipe_ingredient, recipe_tag,
    shopping_cart_item, tag,
};
use foodgram_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};

/// Filters for recipe listings. Empty fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Recipes by this author.
    pub author_id: Option<i32>,
    /// Recipes carrying any of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Recipes favorited by this user.
    pub favorited_by: Option<i32>,
    /// Recipes in this user's shopping cart.
    pub in_cart_of: Option<i32>,
}

/// An ingredient reference with its amount, as written to `recipe_ingredient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    /// Referenced ingredient.
    pub ingredient_id: i32,
    /// Amount in the ingredient's unit.
    pub amount: i32,
}

#[derive(Debug, FromQueryResult)]
struct AuthorRecipeCount {
    author_id: i32,
    recipes_count: i64,
}

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a recipe by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Get filtered recipes (paginated, newest first).
    pub async fn find_page(
        &self,
        filter: &RecipeFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<recipe::Model>> {
        filtered(filter)
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes matching a filter.
    pub async fn count(&self, filter: &RecipeFilter) -> AppResult<u64> {
        filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recipes of several authors, newest first, with at most `limit_each`
    /// per author.
    pub async fn find_by_authors(
        &self,
        author_ids: &[i32],
        limit_each: Option<u64>,
    ) -> AppResult<Vec<recipe::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let recipes = Recipe::find()
            .filter(recipe::Column::AuthorId.is_in(author_ids.to_vec()))
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(limit) = limit_each else {
            return Ok(recipes);
        };

        let mut taken: HashMap<i32, u64> = HashMap::new();
        Ok(recipes
            .into_iter()
            .filter(|r| {
                let seen = taken.entry(r.author_id).or_default();
                *seen += 1;
                *seen <= limit
            })
            .collect())
    }

    /// Recipe counts per author. Authors without recipes are absent.
    pub async fn count_by_authors(&self, author_ids: &[i32]) -> AppResult<HashMap<i32, u64>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Recipe::find()
            .select_only()
            .column(recipe::Column::AuthorId)
            .column_as(
                SimpleExpr::from(Func::count(Expr::col((Recipe, recipe::Column::Id)))),
                "recipes_count",
            )
            .filter(recipe::Column::AuthorId.is_in(author_ids.to_vec()))
            .group_by(recipe::Column::AuthorId)
            .into_model::<AuthorRecipeCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.author_id, row.recipes_count.max(0) as u64))
            .collect())
    }

    /// Tag links of the given recipes.
    pub async fn find_tag_links(&self, recipe_ids: &[i32]) -> AppResult<Vec<recipe_tag::Model>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        RecipeTag::find()
            .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .order_by_asc(recipe_tag::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredient lines of the given recipes.
    pub async fn find_ingredient_links(
        &self,
        recipe_ids: &[i32],
    ) -> AppResult<Vec<recipe_ingredient::Model>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .order_by_asc(recipe_ingredient::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a recipe together with its tag and ingredient links.
    ///
    /// Runs in a single transaction; nothing is written if any insert fails.
    pub async fn create_with_components(
        &self,
        model: recipe::ActiveModel,
        tag_ids: &[i32],
        ingredients: &[IngredientAmount],
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recipe = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        insert_components(&txn, recipe.id, tag_ids, ingredients)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(recipe)
    }

    /// Update a recipe and replace its tag and ingredient links.
    pub async fn update_with_components(
        &self,
        model: recipe::ActiveModel,
        tag_ids: &[i32],
        ingredients: &[IngredientAmount],
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recipe = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeTag::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        insert_components(&txn, recipe.id, tag_ids, ingredients)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(recipe)
    }

    /// Delete a recipe. Links, favorites and cart entries cascade.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

fn filtered(filter: &RecipeFilter) -> Select<Recipe> {
    let mut query = Recipe::find();

    if let Some(author_id) = filter.author_id {
        query = query.filter(recipe::Column::AuthorId.eq(author_id));
    }

    if !filter.tag_slugs.is_empty() {
        query = query.filter(
            recipe::Column::Id.in_subquery(
                Query::select()
                    .column((recipe_tag::Entity, recipe_tag::Column::RecipeId))
                    .from(recipe_tag::Entity)
                    .inner_join(
                        tag::Entity,
                        Expr::col((tag::Entity, tag::Column::Id))
                            .equals((recipe_tag::Entity, recipe_tag::Column::TagId)),
                    )
                    .and_where(tag::Column::Slug.is_in(filter.tag_slugs.clone()))
                    .to_owned(),
            ),
        );
    }

    if let Some(user_id) = filter.favorited_by {
        query = query.filter(
            recipe::Column::Id.in_subquery(
                Query::select()
                    .column(favorite::Column::RecipeId)
                    .from(favorite::Entity)
                    .and_where(favorite::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        );
    }

    if let Some(user_id) = filter.in_cart_of {
        query = query.filter(
            recipe::Column::Id.in_subquery(
                Query::select()
                    .column(shopping_cart_item::Column::RecipeId)
                    .from(shopping_cart_item::Entity)
                    .and_where(shopping_cart_item::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        );
    }

    query
}

async fn insert_components<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
    tag_ids: &[i32],
    ingredients: &[IngredientAmount],
) -> Result<(), DbErr> {
    if !tag_ids.is_empty() {
        RecipeTag::insert_many(tag_ids.iter().map(|&tag_id| recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
            ..Default::default()
        }))
        .exec_without_returning(conn)
        .await?;
    }

    if !ingredients.is_empty() {
        RecipeIngredient::insert_many(ingredients.iter().map(|line| {
            recipe_ingredient::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(line.ingredient_id),
                amount: Set(line.amount),
                ..Default::default()
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_recipe(id: i32, author_id: i32) -> recipe::Model {
        recipe::Model {
            id,
            author_id,
            name: format!("Recipe {id}"),
            text: "Mix and bake.".to_string(),
            image: "/media/recipes/a.png".to_string(),
            cooking_time: 30,
            created_at: Utc::now().into(),
        }
    }

    fn exec_ok(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    #[tokio::test]
    async fn test_find_by_authors_limits_each_author() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_recipe(9, 2),
                    create_test_recipe(8, 3),
                    create_test_recipe(7, 2),
                    create_test_recipe(6, 2),
                ]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let recipes = repo.find_by_authors(&[2, 3], Some(2)).await.unwrap();

        let ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 8, 7]);
    }

    #[tokio::test]
    async fn test_find_by_authors_empty_input() {
        let repo = RecipeRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        assert!(repo.find_by_authors(&[], None).await.unwrap().is_empty());
        assert!(repo.count_by_authors(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_by_authors() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    btreemap! {
                        "author_id" => Value::Int(Some(2)),
                        "recipes_count" => Value::BigInt(Some(3)),
                    },
                    btreemap! {
                        "author_id" => Value::Int(Some(3)),
                        "recipes_count" => Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let counts = repo.count_by_authors(&[2, 3, 4]).await.unwrap();

        assert_eq!(counts.get(&2), Some(&3));
        assert_eq!(counts.get(&3), Some(&1));
        assert_eq!(counts.get(&4), None);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let result = repo.get_by_id(5).await;

        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_page_and_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe(2, 1), create_test_recipe(1, 1)]])
                .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(2)) }]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let filter = RecipeFilter {
            tag_slugs: vec!["breakfast".to_string()],
            favorited_by: Some(3),
            ..Default::default()
        };

        let page = repo.find_page(&filter, 6, 0).await.unwrap();
        let count = repo.count(&filter).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, 2);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_filter_builds_subqueries() {
        use sea_orm::QueryTrait;

        let filter = RecipeFilter {
            author_id: Some(4),
            tag_slugs: vec!["lunch".to_string()],
            favorited_by: Some(1),
            in_cart_of: Some(1),
        };

        let sql = filtered(&filter).build(DatabaseBackend::Postgres).to_string();

        assert!(sql.contains(r#""recipe"."author_id" = 4"#));
        assert!(sql.contains(r#"FROM "recipe_tag""#));
        assert!(sql.contains(r#"FROM "favorite""#));
        assert!(sql.contains(r#"FROM "shopping_cart_item""#));
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        use sea_orm::QueryTrait;

        let sql = filtered(&RecipeFilter::default())
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(!sql.contains("WHERE"));
    }

    #[tokio::test]
    async fn test_create_with_components() {
        let recipe = create_test_recipe(10, 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .append_exec_results([exec_ok(2), exec_ok(1)])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let created = repo
            .create_with_components(
                recipe::ActiveModel {
                    author_id: Set(1),
                    name: Set(recipe.name.clone()),
                    text: Set(recipe.text.clone()),
                    image: Set(recipe.image.clone()),
                    cooking_time: Set(30),
                    created_at: Set(recipe.created_at),
                    ..Default::default()
                },
                &[1, 2],
                &[IngredientAmount {
                    ingredient_id: 7,
                    amount: 200,
                }],
            )
            .await
            .unwrap();

        assert_eq!(created.id, 10);
    }

    #[tokio::test]
    async fn test_update_with_components_replaces_links() {
        let recipe = create_test_recipe(10, 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .append_exec_results([exec_ok(2), exec_ok(1), exec_ok(1), exec_ok(1)])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let mut active: recipe::ActiveModel = recipe.into();
        active.cooking_time = Set(45);

        let updated = repo
            .update_with_components(
                active,
                &[3],
                &[IngredientAmount {
                    ingredient_id: 8,
                    amount: 1,
                }],
            )
            .await
            .unwrap();

        assert_eq!(updated.id, 10);
    }
}
