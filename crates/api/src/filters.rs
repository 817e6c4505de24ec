//! Query parameters for list endpoints.

use foodgram_core::RecipeListQuery;
use serde::{Deserialize, Deserializer, de};

use crate::pagination::PageParams;

/// Deserialize `1`/`0`/`true`/`false` (any case) into a flag.
///
/// An empty value means the filter is not applied.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" => Ok(Some(true)),
        "0" | "false" => Ok(Some(false)),
        other => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"one of 1, 0, true, false",
        )),
    }
}

/// `GET /recipes` query parameters.
///
/// `tags` may repeat (`tags=breakfast&tags=lunch`) and matches any of them.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQueryParams {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Tag slugs.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Author id.
    pub author: Option<i32>,
    /// Only recipes the viewer has (or has not) favorited.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_favorited: Option<bool>,
    /// Only recipes in (or not in) the viewer's cart.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeQueryParams {
    /// Split into the pagination window and the service-level filter.
    #[must_use]
    pub fn into_parts(self) -> (PageParams, RecipeListQuery) {
        (
            PageParams {
                page: self.page,
                limit: self.limit,
            },
            RecipeListQuery {
                author: self.author,
                tags: self.tags,
                is_favorited: self.is_favorited,
                is_in_shopping_cart: self.is_in_shopping_cart,
            },
        )
    }
}

/// `GET /ingredients` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct IngredientQueryParams {
    /// Name prefix.
    pub name: Option<String>,
}

/// `recipes_limit` for subscription entries.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RecipesLimitParams {
    /// Maximum number of recipes embedded per author.
    pub recipes_limit: Option<u64>,
}

/// `GET /users/subscriptions` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SubscriptionQueryParams {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Maximum number of recipes embedded per author.
    pub recipes_limit: Option<u64>,
}

impl SubscriptionQueryParams {
    /// The pagination window.
    #[must_use]
    pub const fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}
