//! Recipe, favorite and shopping cart endpoints.

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::Query;
use foodgram_common::AppResult;
use foodgram_core::{RecipeInput, RecipeView, ShortRecipe};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    filters::RecipeQueryParams,
    middleware::AppState,
    pagination::Page,
    response::{Created, TextAttachment, no_content},
};

const SHOPPING_LIST_FILENAME: &str = "shopping-list.txt";

/// List recipes, newest first.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<RecipeQueryParams>,
) -> AppResult<Json<Page<RecipeView>>> {
    let (page_params, query) = params.into_parts();
    let request = page_params.resolve(&state.pagination)?;

    let (recipes, count) = state
        .recipe_service
        .list(viewer.viewer(), &query, request.limit, request.offset())
        .await?;

    Ok(Json(Page::new(
        recipes,
        count,
        request,
        &state.base_url,
        &uri,
    )?))
}

/// Create a recipe.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RecipeInput>,
) -> AppResult<Created<RecipeView>> {
    let recipe = state.recipe_service.create(&user, req).await?;
    Ok(Created(recipe))
}

/// Get a recipe.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<RecipeView>> {
    let recipe = state.recipe_service.get(viewer.viewer(), id).await?;
    Ok(Json(recipe))
}

/// Update a recipe. Author or admin only.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<RecipeInput>,
) -> AppResult<Json<RecipeView>> {
    let recipe = state.recipe_service.update(&user, id, req).await?;
    Ok(Json(recipe))
}

/// Delete a recipe. Author or admin only.
async fn destroy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.recipe_service.delete(&user, id).await?;
    Ok(no_content())
}

async fn add_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Created<ShortRecipe>> {
    let recipe = state.favorite_service.add(&user, id).await?;
    Ok(Created(recipe))
}

async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.favorite_service.remove(&user, id).await?;
    Ok(no_content())
}

async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Created<ShortRecipe>> {
    let recipe = state.shopping_cart_service.add(&user, id).await?;
    Ok(Created(recipe))
}

async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.shopping_cart_service.remove(&user, id).await?;
    Ok(no_content())
}

/// Download the consolidated shopping list as a text file.
async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<TextAttachment> {
    let body = state.shopping_cart_service.download(&user).await?;
    Ok(TextAttachment::new(SHOPPING_LIST_FILENAME, body))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/{id}",
            get(show).patch(update).put(update).delete(destroy),
        )
        .route(
            "/{id}/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
}
