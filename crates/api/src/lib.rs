//! HTTP API layer for foodgram.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, users and subscriptions, tags, ingredients, recipes
//! - **Extractors**: token authentication, admin checks
//! - **Pagination**: page-number pages with absolute `next`/`previous` links
//! - **Filters**: recipe list query parameters
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod filters;
pub mod middleware;
pub mod pagination;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// Build the `/api` application with authentication applied.
///
/// Tracing, CORS and media serving are layered on by the server binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state)
}
