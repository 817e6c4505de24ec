//! Tag endpoints.
//!
//! Reads are public; writes require an admin.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use foodgram_common::AppResult;
use foodgram_core::{CreateTagInput, UpdateTagInput};
use foodgram_db::entities::tag;

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{Created, no_content},
};

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<tag::Model>>> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags))
}

async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<tag::Model>> {
    let tag = state.tag_service.get(id).await?;
    Ok(Json(tag))
}

async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTagInput>,
) -> AppResult<Created<tag::Model>> {
    let tag = state.tag_service.create(req).await?;
    tracing::info!(tag_id = tag.id, admin_id = admin.id, "Tag created");
    Ok(Created(tag))
}

async fn update(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateTagInput>,
) -> AppResult<Json<tag::Model>> {
    let tag = state.tag_service.update(id, req).await?;
    Ok(Json(tag))
}

async fn delete(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.tag_service.delete(id).await?;
    tracing::info!(tag_id = id, admin_id = admin.id, "Tag deleted");
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(delete))
}
