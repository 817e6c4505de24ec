//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use crate::repositories::write_error;
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get all tags ordered by ID.
    pub async fn find_all(&self) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_asc(tag::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<tag::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {id}")))
    }

    /// Find tags by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<tag::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Tag::find()
            .filter(tag::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(tag::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag other than `exclude_id` sharing the name, color or slug.
    pub async fn find_conflicting(
        &self,
        name: &str,
        color: &str,
        slug: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Option<tag::Model>> {
        let mut query = Tag::find().filter(
            Condition::any()
                .add(tag::Column::Name.eq(name))
                .add(tag::Column::Color.eq(color))
                .add(tag::Column::Slug.eq(slug)),
        );

        if let Some(id) = exclude_id {
            query = query.filter(tag::Column::Id.ne(id));
        }

        query
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new tag.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, "Tag name, color and slug must be unique"))
    }

    /// Update a tag.
    pub async fn update(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, "Tag name, color and slug must be unique"))
    }

    /// Delete a tag.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        Tag::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tag(id: i32, slug: &str) -> tag::Model {
        tag::Model {
            id,
            name: slug.to_uppercase(),
            color: format!("#00000{id}"),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag(1, "breakfast"), create_test_tag(2, "lunch")]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let tags = repo.find_all().await.unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].slug, "breakfast");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.get_by_id(9).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_conflicting() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag(1, "breakfast")]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let conflict = repo
            .find_conflicting("Other", "#ffffff", "breakfast", Some(2))
            .await
            .unwrap();

        assert_eq!(conflict.map(|t| t.id), Some(1));
    }
}
