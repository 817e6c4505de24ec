//! User and subscription endpoints.

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use foodgram_common::AppResult;
use foodgram_core::{RegisterInput, SetPasswordInput, SubscriptionView, UserView};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    filters::{RecipesLimitParams, SubscriptionQueryParams},
    middleware::AppState,
    pagination::{Page, PageParams},
    response::{Created, no_content},
};

/// List users.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<UserView>>> {
    let request = params.resolve(&state.pagination)?;

    let (users, count) = state
        .user_service
        .list(request.limit, request.offset())
        .await?;
    let views = state
        .user_service
        .present_many(viewer.viewer(), &users)
        .await?;

    Ok(Json(Page::new(
        views,
        count,
        request,
        &state.base_url,
        &uri,
    )?))
}

/// Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<Created<UserView>> {
    let user = state.user_service.register(req).await?;
    Ok(Created(UserView::new(&user, None)))
}

/// Get the current user.
async fn me(AuthUser(user): AuthUser, State(state): State<AppState>) -> AppResult<Json<UserView>> {
    let view = state.user_service.present(Some(&user), &user).await?;
    Ok(Json(view))
}

/// Change the current user's password.
async fn set_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetPasswordInput>,
) -> AppResult<StatusCode> {
    state.user_service.set_password(&user, req).await?;
    Ok(no_content())
}

/// Authors the current user is subscribed to.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SubscriptionQueryParams>,
) -> AppResult<Json<Page<SubscriptionView>>> {
    let request = params.page_params().resolve(&state.pagination)?;

    let (views, count) = state
        .following_service
        .subscriptions(&user, request.limit, request.offset(), params.recipes_limit)
        .await?;

    Ok(Json(Page::new(
        views,
        count,
        request,
        &state.base_url,
        &uri,
    )?))
}

/// Get a user by ID.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<UserView>> {
    let user = state.user_service.get(id).await?;
    let view = state.user_service.present(viewer.viewer(), &user).await?;
    Ok(Json(view))
}

/// Subscribe to an author.
async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<RecipesLimitParams>,
) -> AppResult<Created<SubscriptionView>> {
    let view = state
        .following_service
        .subscribe(&user, id, params.recipes_limit)
        .await?;
    Ok(Created(view))
}

/// Unsubscribe from an author.
async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.following_service.unsubscribe(&user, id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/me", get(me))
        .route("/set_password", post(set_password))
        .route("/subscriptions", get(subscriptions))
        .route("/{id}", get(show))
        .route("/{id}/subscribe", post(subscribe).delete(unsubscribe))
}
