//! Tag service.

use foodgram_common::{AppError, AppResult};
use foodgram_db::{entities::tag, repositories::TagRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::validation::{validate_color, validate_slug};

/// Input for creating a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(min = 1, max = 150))]
    pub name: String,

    #[validate(length(equal = 7))]
    pub color: String,

    #[validate(length(min = 1, max = 50))]
    pub slug: String,
}

/// Input for updating a tag. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTagInput {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,

    #[validate(length(equal = 7))]
    pub color: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub slug: Option<String>,
}

/// Tag service.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self { tag_repo }
    }

    /// List all tags.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.find_all().await
    }

    /// Get a tag by ID.
    pub async fn get(&self, id: i32) -> AppResult<tag::Model> {
        self.tag_repo.get_by_id(id).await
    }

    /// Create a tag.
    pub async fn create(&self, input: CreateTagInput) -> AppResult<tag::Model> {
        input.validate()?;
        validate_color(&input.color)?;
        validate_slug(&input.slug)?;

        self.ensure_unique(&input.name, &input.color, &input.slug, None)
            .await?;

        let model = tag::ActiveModel {
            name: Set(input.name),
            color: Set(input.color),
            slug: Set(input.slug),
            ..Default::default()
        };

        self.tag_repo.create(model).await
    }

    /// Update a tag.
    pub async fn update(&self, id: i32, input: UpdateTagInput) -> AppResult<tag::Model> {
        input.validate()?;

        let existing = self.tag_repo.get_by_id(id).await?;

        let name = input.name.unwrap_or_else(|| existing.name.clone());
        let color = input.color.unwrap_or_else(|| existing.color.clone());
        let slug = input.slug.unwrap_or_else(|| existing.slug.clone());
        validate_color(&color)?;
        validate_slug(&slug)?;

        self.ensure_unique(&name, &color, &slug, Some(id)).await?;

        let mut active: tag::ActiveModel = existing.into();
        active.name = Set(name);
        active.color = Set(color);
        active.slug = Set(slug);

        self.tag_repo.update(active).await
    }

    /// Delete a tag. Recipes keep their other tags.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.tag_repo.get_by_id(id).await?;
        self.tag_repo.delete(id).await
    }

    async fn ensure_unique(
        &self,
        name: &str,
        color: &str,
        slug: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<()> {
        match self
            .tag_repo
            .find_conflicting(name, color, slug, exclude_id)
            .await?
        {
            Some(_) => Err(AppError::BadRequest(
                "A tag with this name, color or slug already exists".to_string(),
            )),
            None => Ok(()),
        }
    }
}
