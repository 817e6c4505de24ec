//! Response helpers.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `201 Created` with a JSON body.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// `204 No Content`.
#[must_use]
pub const fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// A plain-text file download.
#[derive(Debug)]
pub struct TextAttachment {
    filename: &'static str,
    body: String,
}

impl TextAttachment {
    /// Create a download named `filename`.
    #[must_use]
    pub const fn new(filename: &'static str, body: String) -> Self {
        Self { filename, body }
    }
}

impl IntoResponse for TextAttachment {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            self.filename
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}
