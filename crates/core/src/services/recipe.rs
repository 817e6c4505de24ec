//! Recipe service.
//!
//! Owns recipe validation, image decoding and the read representation.
//! Reads are assembled with a fixed sequence of batched queries so a page of
//! recipes costs the same number of round trips as a single recipe.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use foodgram_common::{AppError, AppResult, StorageBackend, generate_storage_key};
use foodgram_db::{
    entities::{ingredient, recipe, tag, user},
    repositories::{
        FavoriteRepository, FollowingRepository, IngredientAmount, IngredientRepository,
        RecipeFilter, RecipeRepository, ShoppingCartRepository, TagRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::user::UserView;

/// One ingredient line of a recipe write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct IngredientAmountInput {
    pub id: i32,

    #[validate(range(min = 1, max = 32767))]
    pub amount: i32,
}

/// Input for creating or updating a recipe.
#[derive(Debug, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(length(min = 1, message = "at least one tag is required"))]
    pub tags: Vec<i32>,

    #[validate(
        length(min = 1, message = "at least one ingredient is required"),
        nested
    )]
    pub ingredients: Vec<IngredientAmountInput>,

    /// `data:image/<ext>;base64,<payload>`. Required on create.
    pub image: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1))]
    pub text: String,

    #[validate(range(min = 1))]
    pub cooking_time: i32,
}

/// Recipe list filters as requested by a client.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    pub author: Option<i32>,
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

/// Ingredient line in the recipe representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientView {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: i32,
    pub tags: Vec<tag::Model>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe representation used by favorites, cart and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortRecipe {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<&recipe::Model> for ShortRecipe {
    fn from(recipe: &recipe::Model) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Decoded image payload.
#[derive(Debug, PartialEq, Eq)]
struct DecodedImage {
    bytes: Vec<u8>,
    extension: String,
    content_type: String,
}

/// Recipe service.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    user_repo: UserRepository,
    tag_repo: TagRepository,
    ingredient_repo: IngredientRepository,
    following_repo: FollowingRepository,
    favorite_repo: FavoriteRepository,
    cart_repo: ShoppingCartRepository,
    storage: Arc<dyn StorageBackend>,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        recipe_repo: RecipeRepository,
        user_repo: UserRepository,
        tag_repo: TagRepository,
        ingredient_repo: IngredientRepository,
        following_repo: FollowingRepository,
        favorite_repo: FavoriteRepository,
        cart_repo: ShoppingCartRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            recipe_repo,
            user_repo,
            tag_repo,
            ingredient_repo,
            following_repo,
            favorite_repo,
            cart_repo,
            storage,
        }
    }

    /// Create a recipe authored by `author`.
    pub async fn create(&self, author: &user::Model, input: RecipeInput) -> AppResult<RecipeView> {
        let (tag_ids, ingredients) = self.validate_components(&input).await?;

        let image = input
            .image
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::Validation("image: this field is required".to_string()))?;
        let image_url = self.store_image(image).await?;

        let model = recipe::ActiveModel {
            author_id: Set(author.id),
            name: Set(input.name),
            text: Set(input.text),
            image: Set(image_url.clone()),
            cooking_time: Set(input.cooking_time),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let recipe = match self
            .recipe_repo
            .create_with_components(model, &tag_ids, &ingredients)
            .await
        {
            Ok(recipe) => recipe,
            Err(e) => {
                self.discard_image(&image_url).await;
                return Err(e);
            }
        };

        tracing::info!(recipe_id = recipe.id, author_id = author.id, "Created recipe");
        self.present_one(Some(author), recipe).await
    }

    /// Update a recipe, replacing its tags and ingredients.
    ///
    /// Only the author or an admin may update. The image is kept when the
    /// input carries none.
    pub async fn update(
        &self,
        actor: &user::Model,
        id: i32,
        input: RecipeInput,
    ) -> AppResult<RecipeView> {
        let existing = self.recipe_repo.get_by_id(id).await?;
        ensure_can_modify(actor, &existing)?;

        let (tag_ids, ingredients) = self.validate_components(&input).await?;

        let new_image = match input.image.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(data) => Some(self.store_image(data).await?),
            None => None,
        };

        let old_image = existing.image.clone();
        let mut active: recipe::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.text = Set(input.text);
        active.cooking_time = Set(input.cooking_time);
        if let Some(url) = &new_image {
            active.image = Set(url.clone());
        }

        let recipe = match self
            .recipe_repo
            .update_with_components(active, &tag_ids, &ingredients)
            .await
        {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(url) = &new_image {
                    self.discard_image(url).await;
                }
                return Err(e);
            }
        };

        if new_image.is_some() {
            self.discard_image(&old_image).await;
        }

        tracing::info!(recipe_id = recipe.id, actor_id = actor.id, "Updated recipe");
        self.present_one(Some(actor), recipe).await
    }

    /// Delete a recipe. Only the author or an admin may delete.
    pub async fn delete(&self, actor: &user::Model, id: i32) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(id).await?;
        ensure_can_modify(actor, &recipe)?;

        self.recipe_repo.delete(id).await?;
        self.discard_image(&recipe.image).await;

        tracing::info!(recipe_id = id, actor_id = actor.id, "Deleted recipe");
        Ok(())
    }

    /// Get a recipe as seen by `viewer`.
    pub async fn get(&self, viewer: Option<&user::Model>, id: i32) -> AppResult<RecipeView> {
        let recipe = self.recipe_repo.get_by_id(id).await?;
        self.present_one(viewer, recipe).await
    }

    /// List recipes (newest first) with the total count of matches.
    pub async fn list(
        &self,
        viewer: Option<&user::Model>,
        query: &RecipeListQuery,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<RecipeView>, u64)> {
        let Some(filter) = build_filter(viewer, query) else {
            return Ok((vec![], 0));
        };

        let recipes = self.recipe_repo.find_page(&filter, limit, offset).await?;
        let count = self.recipe_repo.count(&filter).await?;
        let views = self.present(viewer, recipes).await?;

        Ok((views, count))
    }

    async fn present_one(
        &self,
        viewer: Option<&user::Model>,
        recipe: recipe::Model,
    ) -> AppResult<RecipeView> {
        self.present(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Recipe vanished while presenting".to_string()))
    }

    /// Build full representations for `recipes`, preserving their order.
    pub async fn present(
        &self,
        viewer: Option<&user::Model>,
        recipes: Vec<recipe::Model>,
    ) -> AppResult<Vec<RecipeView>> {
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let author_ids = unique(recipes.iter().map(|r| r.author_id));

        let authors: HashMap<i32, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let tag_links = self.recipe_repo.find_tag_links(&recipe_ids).await?;
        let tags: HashMap<i32, tag::Model> = self
            .tag_repo
            .find_by_ids(&unique(tag_links.iter().map(|l| l.tag_id)))
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let ingredient_links = self.recipe_repo.find_ingredient_links(&recipe_ids).await?;
        let ingredients: HashMap<i32, ingredient::Model> = self
            .ingredient_repo
            .find_by_ids(&unique(ingredient_links.iter().map(|l| l.ingredient_id)))
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let (favorited, in_cart, followed) = match viewer {
            Some(viewer) => (
                self.favorite_repo
                    .find_recipe_ids_among(viewer.id, &recipe_ids)
                    .await?,
                self.cart_repo
                    .find_recipe_ids_among(viewer.id, &recipe_ids)
                    .await?,
                self.following_repo
                    .find_followed_among(viewer.id, &author_ids)
                    .await?,
            ),
            None => (vec![], vec![], vec![]),
        };
        let favorited: HashSet<i32> = favorited.into_iter().collect();
        let in_cart: HashSet<i32> = in_cart.into_iter().collect();
        let followed: HashSet<i32> = followed.into_iter().collect();

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors.get(&recipe.author_id).ok_or_else(|| {
                    AppError::Internal(format!("Author of recipe {} is missing", recipe.id))
                })?;

                let recipe_tags = tag_links
                    .iter()
                    .filter(|l| l.recipe_id == recipe.id)
                    .filter_map(|l| tags.get(&l.tag_id).cloned())
                    .collect();

                let recipe_ingredients = ingredient_links
                    .iter()
                    .filter(|l| l.recipe_id == recipe.id)
                    .filter_map(|l| {
                        ingredients.get(&l.ingredient_id).map(|i| RecipeIngredientView {
                            id: i.id,
                            name: i.name.clone(),
                            measurement_unit: i.measurement_unit.clone(),
                            amount: l.amount,
                        })
                    })
                    .collect();

                Ok(RecipeView {
                    id: recipe.id,
                    tags: recipe_tags,
                    author: UserView::new(author, Some(followed.contains(&author.id))),
                    ingredients: recipe_ingredients,
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    name: recipe.name,
                    image: recipe.image,
                    text: recipe.text,
                    cooking_time: recipe.cooking_time,
                })
            })
            .collect()
    }

    /// Validate tags and ingredients, returning them ready for writing.
    async fn validate_components(
        &self,
        input: &RecipeInput,
    ) -> AppResult<(Vec<i32>, Vec<IngredientAmount>)> {
        input.validate()?;

        let mut seen = HashSet::new();
        for tag_id in &input.tags {
            if !seen.insert(*tag_id) {
                return Err(AppError::BadRequest(format!(
                    "tags: tag {tag_id} is listed more than once"
                )));
            }
        }

        let mut seen = HashSet::new();
        for line in &input.ingredients {
            if !seen.insert(line.id) {
                return Err(AppError::BadRequest(
                    "ingredients: ingredients must not repeat".to_string(),
                ));
            }
        }

        let found_tags = self.tag_repo.find_by_ids(&input.tags).await?;
        if let Some(missing) = input
            .tags
            .iter()
            .find(|id| !found_tags.iter().any(|t| t.id == **id))
        {
            return Err(AppError::BadRequest(format!(
                "tags: tag {missing} does not exist"
            )));
        }

        let ingredient_ids: Vec<i32> = input.ingredients.iter().map(|l| l.id).collect();
        let found_ingredients = self.ingredient_repo.find_by_ids(&ingredient_ids).await?;
        if let Some(missing) = ingredient_ids
            .iter()
            .find(|id| !found_ingredients.iter().any(|i| i.id == **id))
        {
            return Err(AppError::BadRequest(format!(
                "ingredients: ingredient {missing} does not exist"
            )));
        }

        let ingredients = input
            .ingredients
            .iter()
            .map(|line| IngredientAmount {
                ingredient_id: line.id,
                amount: line.amount,
            })
            .collect();

        Ok((input.tags.clone(), ingredients))
    }

    async fn store_image(&self, data_uri: &str) -> AppResult<String> {
        let image = decode_image(data_uri)?;
        let key = generate_storage_key(&image.extension);
        let file = self
            .storage
            .upload(&key, &image.bytes, &image.content_type)
            .await?;

        tracing::debug!(
            key = %file.key,
            size = file.size,
            content_type = %file.content_type,
            "Stored recipe image"
        );
        Ok(file.url)
    }

    /// Remove a stored image. Failures are logged, not returned.
    async fn discard_image(&self, url: &str) {
        let Some(key) = self.storage.key_from_url(url) else {
            return;
        };
        if let Err(e) = self.storage.delete(&key).await {
            tracing::warn!(error = %e, key = %key, "Failed to delete recipe image");
        }
    }
}

fn ensure_can_modify(actor: &user::Model, recipe: &recipe::Model) -> AppResult<()> {
    if actor.is_admin || actor.id == recipe.author_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author can modify this recipe".to_string(),
        ))
    }
}

/// Translate client filters into a repository filter.
///
/// Returns `None` when the result is known to be empty: an anonymous viewer
/// asking for their favorites or cart.
fn build_filter(viewer: Option<&user::Model>, query: &RecipeListQuery) -> Option<RecipeFilter> {
    let mut filter = RecipeFilter {
        author_id: query.author,
        tag_slugs: query.tags.clone(),
        ..Default::default()
    };

    if query.is_favorited == Some(true) {
        filter.favorited_by = Some(viewer?.id);
    }
    if query.is_in_shopping_cart == Some(true) {
        filter.in_cart_of = Some(viewer?.id);
    }

    Some(filter)
}

/// Decode a `data:image/...;base64,` URI.
///
/// The format is sniffed from the decoded bytes; the client's label only has
/// to name some image type. Extension and content type follow the sniffed
/// format, and only raster formats are stored.
fn decode_image(data_uri: &str) -> AppResult<DecodedImage> {
    let invalid = || AppError::BadRequest("image: expected a base64 data URI".to_string());

    let rest = data_uri.trim().strip_prefix("data:").ok_or_else(invalid)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let label = meta.strip_suffix(";base64").ok_or_else(invalid)?;
    if label.strip_prefix("image/").is_none_or(str::is_empty) {
        return Err(invalid());
    }

    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Err(invalid());
    }

    let unsupported =
        || AppError::BadRequest("image: only JPEG, PNG, GIF and WebP images are accepted".to_string());
    let (extension, content_type) = match image::guess_format(&bytes).map_err(|_| unsupported())? {
        ImageFormat::Jpeg => ("jpg", "image/jpeg"),
        ImageFormat::Png => ("png", "image/png"),
        ImageFormat::Gif => ("gif", "image/gif"),
        ImageFormat::WebP => ("webp", "image/webp"),
        _ => return Err(unsupported()),
    };

    Ok(DecodedImage {
        bytes,
        extension: extension.to_string(),
        content_type: content_type.to_string(),
    })
}

fn unique(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_common::{UploadedFile, storage::StorageBackend};
    use foodgram_db::entities::{favorite, following, recipe_ingredient, recipe_tag};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Mutex;

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[derive(Default)]
    struct MemoryStorage {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl StorageBackend for MemoryStorage {
        async fn upload(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> AppResult<UploadedFile> {
            Ok(UploadedFile {
                key: key.to_string(),
                url: self.public_url(key),
                size: data.len() as u64,
                content_type: content_type.to_string(),
            })
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/media/{key}")
        }

        fn key_from_url(&self, url: &str) -> Option<String> {
            url.strip_prefix("/media/").map(ToString::to_string)
        }
    }

    /// One mock connection per repository, in constructor order.
    struct Dbs {
        recipe: MockDatabase,
        user: MockDatabase,
        tag: MockDatabase,
        ingredient: MockDatabase,
        following: MockDatabase,
        favorite: MockDatabase,
        cart: MockDatabase,
    }

    impl Dbs {
        fn new() -> Self {
            Self {
                recipe: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
                tag: MockDatabase::new(DatabaseBackend::Postgres),
                ingredient: MockDatabase::new(DatabaseBackend::Postgres),
                following: MockDatabase::new(DatabaseBackend::Postgres),
                favorite: MockDatabase::new(DatabaseBackend::Postgres),
                cart: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn service(self, storage: Arc<MemoryStorage>) -> RecipeService {
            let conn = |db: MockDatabase| -> Arc<DatabaseConnection> { Arc::new(db.into_connection()) };
            RecipeService::new(
                RecipeRepository::new(conn(self.recipe)),
                UserRepository::new(conn(self.user)),
                TagRepository::new(conn(self.tag)),
                IngredientRepository::new(conn(self.ingredient)),
                FollowingRepository::new(conn(self.following)),
                FavoriteRepository::new(conn(self.favorite)),
                ShoppingCartRepository::new(conn(self.cart)),
                storage,
            )
        }
    }

    fn test_user(id: i32, is_admin: bool) -> user::Model {
        user::Model {
            id,
            email: format!("user{id}@example.com"),
            username: format!("user{id}"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: "hash".to_string(),
            token: None,
            is_admin,
            created_at: Utc::now().into(),
        }
    }

    fn test_recipe(id: i32, author_id: i32) -> recipe::Model {
        recipe::Model {
            id,
            author_id,
            name: format!("Recipe {id}"),
            text: "Cook it.".to_string(),
            image: format!("/media/recipes/{id}.png"),
            cooking_time: 15,
            created_at: Utc::now().into(),
        }
    }

    fn test_tag(id: i32) -> tag::Model {
        tag::Model {
            id,
            name: format!("Tag {id}"),
            color: format!("#00000{id}"),
            slug: format!("tag{id}"),
        }
    }

    fn test_ingredient(id: i32, name: &str) -> ingredient::Model {
        ingredient::Model {
            id,
            name: name.to_string(),
            measurement_unit: "g".to_string(),
        }
    }

    fn test_input() -> RecipeInput {
        RecipeInput {
            tags: vec![1],
            ingredients: vec![IngredientAmountInput { id: 7, amount: 200 }],
            image: Some(PNG_URI.to_string()),
            name: "Pancakes".to_string(),
            text: "Whisk and fry.".to_string(),
            cooking_time: 20,
        }
    }

    #[test]
    fn test_decode_image() {
        let image = decode_image(PNG_URI).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(&image.bytes[1..4], b"PNG");

        let jpeg = decode_image("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(jpeg.extension, "jpg");
    }

    #[test]
    fn test_decode_image_uses_sniffed_format() {
        // PNG bytes labelled as JPEG are stored as PNG
        let image = decode_image("data:image/jpeg;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.content_type, "image/png");
    }

    #[test]
    fn test_decode_image_rejects_non_images() {
        // "hello" labelled as PNG
        let result = decode_image("data:image/png;base64,aGVsbG8=");
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let svg = STANDARD.encode(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><script>alert(1)</script></svg>"#,
        );
        let result = decode_image(&format!("data:image/svg+xml;base64,{svg}"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = decode_image(&format!("data:image/png;base64,{svg}"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        assert!(decode_image("iVBORw0KGgo=").is_err());
        assert!(decode_image("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_image("data:image/png;base64,!!!").is_err());
        assert!(decode_image("data:image/png,iVBORw0KGgo=").is_err());
        assert!(decode_image("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_build_filter_anonymous() {
        let query = RecipeListQuery {
            is_favorited: Some(true),
            ..Default::default()
        };
        assert!(build_filter(None, &query).is_none());

        let query = RecipeListQuery {
            is_favorited: Some(false),
            is_in_shopping_cart: Some(false),
            author: Some(3),
            ..Default::default()
        };
        let filter = build_filter(None, &query).unwrap();
        assert_eq!(filter.author_id, Some(3));
        assert_eq!(filter.favorited_by, None);
        assert_eq!(filter.in_cart_of, None);
    }

    #[test]
    fn test_build_filter_viewer() {
        let viewer = test_user(4, false);
        let query = RecipeListQuery {
            tags: vec!["lunch".to_string()],
            is_in_shopping_cart: Some(true),
            ..Default::default()
        };
        let filter = build_filter(Some(&viewer), &query).unwrap();
        assert_eq!(filter.in_cart_of, Some(4));
        assert_eq!(filter.tag_slugs, vec!["lunch".to_string()]);
    }

    #[test]
    fn test_ensure_can_modify() {
        let recipe = test_recipe(1, 2);
        assert!(ensure_can_modify(&test_user(2, false), &recipe).is_ok());
        assert!(ensure_can_modify(&test_user(9, true), &recipe).is_ok());
        assert!(matches!(
            ensure_can_modify(&test_user(3, false), &recipe),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_recipe_input_validation() {
        let mut input = test_input();
        input.tags.clear();
        assert!(input.validate().is_err());

        let mut input = test_input();
        input.ingredients.clear();
        assert!(input.validate().is_err());

        let mut input = test_input();
        input.ingredients[0].amount = 0;
        assert!(input.validate().is_err());

        let mut input = test_input();
        input.cooking_time = 0;
        assert!(input.validate().is_err());

        assert!(test_input().validate().is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_ingredients() {
        let mut input = test_input();
        input.ingredients = vec![
            IngredientAmountInput { id: 7, amount: 1 },
            IngredientAmountInput { id: 7, amount: 2 },
        ];

        let service = Dbs::new().service(Arc::new(MemoryStorage::default()));
        let result = service.create(&test_user(1, false), input).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_tag() {
        let mut dbs = Dbs::new();
        dbs.tag = dbs.tag.append_query_results([Vec::<tag::Model>::new()]);

        let service = dbs.service(Arc::new(MemoryStorage::default()));
        let result = service.create(&test_user(1, false), test_input()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_requires_image() {
        let mut dbs = Dbs::new();
        dbs.tag = dbs.tag.append_query_results([[test_tag(1)]]);
        dbs.ingredient = dbs
            .ingredient
            .append_query_results([[test_ingredient(7, "flour")]]);

        let mut input = test_input();
        input.image = None;

        let service = dbs.service(Arc::new(MemoryStorage::default()));
        let result = service.create(&test_user(1, false), input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_forbidden_for_other_user() {
        let mut dbs = Dbs::new();
        dbs.recipe = dbs.recipe.append_query_results([[test_recipe(1, 2)]]);

        let service = dbs.service(Arc::new(MemoryStorage::default()));
        let result = service.update(&test_user(3, false), 1, test_input()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_image() {
        let mut dbs = Dbs::new();
        dbs.recipe = dbs
            .recipe
            .append_query_results([[test_recipe(1, 2)]])
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let storage = Arc::new(MemoryStorage::default());
        let service = dbs.service(storage.clone());
        service.delete(&test_user(2, false), 1).await.unwrap();

        assert_eq!(
            storage.deleted.lock().unwrap().as_slice(),
            ["recipes/1.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_get_anonymous_flags_false() {
        let mut dbs = Dbs::new();
        dbs.recipe = dbs
            .recipe
            .append_query_results([[test_recipe(1, 2)]])
            .append_query_results([[recipe_tag::Model {
                id: 1,
                recipe_id: 1,
                tag_id: 1,
            }]])
            .append_query_results([[recipe_ingredient::Model {
                id: 1,
                recipe_id: 1,
                ingredient_id: 7,
                amount: 200,
            }]]);
        dbs.user = dbs.user.append_query_results([[test_user(2, false)]]);
        dbs.tag = dbs.tag.append_query_results([[test_tag(1)]]);
        dbs.ingredient = dbs
            .ingredient
            .append_query_results([[test_ingredient(7, "flour")]]);

        let service = dbs.service(Arc::new(MemoryStorage::default()));
        let view = service.get(None, 1).await.unwrap();

        assert!(!view.is_favorited);
        assert!(!view.is_in_shopping_cart);
        assert_eq!(view.author.is_subscribed, Some(false));
        assert_eq!(view.tags.len(), 1);
        assert_eq!(view.ingredients[0].name, "flour");
        assert_eq!(view.ingredients[0].amount, 200);
    }

    #[tokio::test]
    async fn test_get_reflects_viewer_state() {
        let mut dbs = Dbs::new();
        dbs.recipe = dbs
            .recipe
            .append_query_results([[test_recipe(1, 2)]])
            .append_query_results([Vec::<recipe_tag::Model>::new()])
            .append_query_results([Vec::<recipe_ingredient::Model>::new()]);
        dbs.user = dbs.user.append_query_results([[test_user(2, false)]]);
        dbs.favorite = dbs.favorite.append_query_results([[favorite::Model {
            id: 1,
            user_id: 5,
            recipe_id: 1,
            created_at: Utc::now().into(),
        }]]);
        dbs.cart = dbs
            .cart
            .append_query_results([Vec::<foodgram_db::entities::shopping_cart_item::Model>::new()]);
        dbs.following = dbs.following.append_query_results([[following::Model {
            id: 1,
            follower_id: 5,
            author_id: 2,
            created_at: Utc::now().into(),
        }]]);

        let service = dbs.service(Arc::new(MemoryStorage::default()));
        let view = service.get(Some(&test_user(5, false)), 1).await.unwrap();

        assert!(view.is_favorited);
        assert!(!view.is_in_shopping_cart);
        assert_eq!(view.author.is_subscribed, Some(true));
    }

    #[tokio::test]
    async fn test_list_anonymous_favorites_is_empty() {
        let service = Dbs::new().service(Arc::new(MemoryStorage::default()));
        let query = RecipeListQuery {
            is_favorited: Some(true),
            ..Default::default()
        };

        let (views, count) = service.list(None, &query, 6, 0).await.unwrap();

        assert!(views.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_short_recipe_serialization() {
        let json = serde_json::to_value(ShortRecipe::from(&test_recipe(3, 1))).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["cooking_time"], 15);
        assert!(json.get("text").is_none());
    }
}
