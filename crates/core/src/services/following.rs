//! Following (subscription) service.

use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::{following, user},
    repositories::{FollowingRepository, RecipeRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::{recipe::ShortRecipe, user::UserView};

/// An author as listed in the viewer's subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<ShortRecipe>,
    pub recipes_count: u64,
}

/// Following service for managing subscriptions.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        following_repo: FollowingRepository,
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
    ) -> Self {
        Self {
            following_repo,
            user_repo,
            recipe_repo,
        }
    }

    /// Subscribe `follower` to an author.
    pub async fn subscribe(
        &self,
        follower: &user::Model,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> AppResult<SubscriptionView> {
        let author = self.user_repo.get_by_id(author_id).await?;

        if follower.id == author.id {
            return Err(AppError::BadRequest(
                "You cannot subscribe to yourself".to_string(),
            ));
        }

        if self
            .following_repo
            .is_following(follower.id, author.id)
            .await?
        {
            return Err(AppError::BadRequest(
                "Already subscribed to this author".to_string(),
            ));
        }

        let model = following::ActiveModel {
            follower_id: Set(follower.id),
            author_id: Set(author.id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        self.following_repo.create(model).await?;

        tracing::debug!(follower_id = follower.id, author_id, "Subscribed");
        self.subscription_views(std::slice::from_ref(&author), recipes_limit)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Subscription entry missing".to_string()))
    }

    /// Unsubscribe `follower` from an author.
    pub async fn unsubscribe(&self, follower: &user::Model, author_id: i32) -> AppResult<()> {
        self.user_repo.get_by_id(author_id).await?;

        let removed = self
            .following_repo
            .delete_by_pair(follower.id, author_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound("Subscription not found".to_string()));
        }

        tracing::debug!(follower_id = follower.id, author_id, "Unsubscribed");
        Ok(())
    }

    /// Authors `follower` is subscribed to (paginated), with the total count.
    pub async fn subscriptions(
        &self,
        follower: &user::Model,
        limit: u64,
        offset: u64,
        recipes_limit: Option<u64>,
    ) -> AppResult<(Vec<SubscriptionView>, u64)> {
        let edges = self
            .following_repo
            .find_by_follower(follower.id, limit, offset)
            .await?;
        let count = self.following_repo.count_by_follower(follower.id).await?;

        let author_ids: Vec<i32> = edges.iter().map(|f| f.author_id).collect();
        let authors = self.user_repo.find_by_ids(&author_ids).await?;

        // Keep subscription order
        let ordered: Vec<user::Model> = author_ids
            .iter()
            .filter_map(|id| authors.iter().find(|a| a.id == *id).cloned())
            .collect();
        let views = self.subscription_views(&ordered, recipes_limit).await?;

        Ok((views, count))
    }

    /// Build entries for `authors` with two queries regardless of their number.
    async fn subscription_views(
        &self,
        authors: &[user::Model],
        recipes_limit: Option<u64>,
    ) -> AppResult<Vec<SubscriptionView>> {
        let author_ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let recipes = self
            .recipe_repo
            .find_by_authors(&author_ids, recipes_limit)
            .await?;
        let counts = self.recipe_repo.count_by_authors(&author_ids).await?;

        Ok(authors
            .iter()
            .map(|author| SubscriptionView {
                user: UserView::new(author, Some(true)),
                recipes: recipes
                    .iter()
                    .filter(|r| r.author_id == author.id)
                    .map(ShortRecipe::from)
                    .collect(),
                recipes_count: counts.get(&author.id).copied().unwrap_or(0),
            })
            .collect())
    }
}
