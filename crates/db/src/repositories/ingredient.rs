//! Ingredient repository.

use std::sync::Arc;

use crate::entities::{Ingredient, ingredient};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
    sea_query::{Expr, LikeExpr},
};

/// Ingredient repository for database operations.
#[derive(Clone)]
pub struct IngredientRepository {
    db: Arc<DatabaseConnection>,
}

impl IngredientRepository {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get ingredients ordered by name, optionally limited to a name prefix.
    pub async fn find_all(&self, name_prefix: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        by_name_prefix(name_prefix)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an ingredient by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<ingredient::Model>> {
        Ingredient::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an ingredient by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<ingredient::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {id}")))
    }

    /// Find ingredients by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<ingredient::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ingredient::find()
            .filter(ingredient::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all ingredients.
    pub async fn count(&self) -> AppResult<u64> {
        Ingredient::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Bulk insert ingredients, returning the number of inserted rows.
    pub async fn insert_many(&self, models: Vec<ingredient::ActiveModel>) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        Ingredient::insert_many(models)
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn by_name_prefix(name_prefix: Option<&str>) -> Select<Ingredient> {
    let mut query = Ingredient::find()
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::Id);

    if let Some(prefix) = name_prefix.filter(|p| !p.is_empty()) {
        let pattern = format!("{}%", escape_like(prefix));
        query = query.filter(
            Expr::col((Ingredient, ingredient::Column::Name))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    query
}

/// Escape LIKE wildcards so `prefix` matches literally.
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
