//! Ingredient endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use foodgram_common::AppResult;
use foodgram_db::entities::ingredient;

use crate::{filters::IngredientQueryParams, middleware::AppState};

/// List ingredients, optionally by name prefix. Not paginated.
async fn list(
    State(state): State<AppState>,
    Query(params): Query<IngredientQueryParams>,
) -> AppResult<Json<Vec<ingredient::Model>>> {
    let name = params.name.as_deref().filter(|n| !n.is_empty());
    let ingredients = state.ingredient_service.list(name).await?;
    Ok(Json(ingredients))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ingredient::Model>> {
    let ingredient = state.ingredient_service.get(id).await?;
    Ok(Json(ingredient))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}
