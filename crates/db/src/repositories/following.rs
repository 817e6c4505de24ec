//! Following (subscription) repository.

use std::sync::Arc;

use crate::entities::{Following, following};
use crate::repositories::write_error;
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Following repository for database operations.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowingRepository {
    /// Create a new following repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a subscription by follower and author.
    pub async fn find_by_pair(
        &self,
        follower_id: i32,
        author_id: i32,
    ) -> AppResult<Option<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `follower_id` is subscribed to `author_id`.
    pub async fn is_following(&self, follower_id: i32, author_id: i32) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, author_id).await?.is_some())
    }

    /// Of the given authors, return the ones `follower_id` is subscribed to.
    pub async fn find_followed_among(
        &self,
        follower_id: i32,
        author_ids: &[i32],
    ) -> AppResult<Vec<i32>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::AuthorId.is_in(author_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|f| f.author_id).collect())
    }

    /// Create a new subscription.
    pub async fn create(&self, model: following::ActiveModel) -> AppResult<following::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, "Already subscribed to this author"))
    }

    /// Delete a subscription, returning the number of removed rows.
    pub async fn delete_by_pair(&self, follower_id: i32, author_id: i32) -> AppResult<u64> {
        let result = Following::delete_many()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Get the subscriptions of a user (paginated, oldest first).
    pub async fn find_by_follower(
        &self,
        follower_id: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .order_by_asc(following::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the subscriptions of a user.
    pub async fn count_by_follower(&self, follower_id: i32) -> AppResult<u64> {
        Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
