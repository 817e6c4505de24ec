//! Field checks that the `validator` derive does not cover.

use std::sync::LazyLock;

use foodgram_common::{AppError, AppResult};
use regex::Regex;

/// Usernames that would shadow fixed routes.
const RESERVED_USERNAMES: &[&str] = &["me"];

#[allow(clippy::expect_used)]
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

#[allow(clippy::expect_used)]
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

#[allow(clippy::expect_used)]
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// Check a username against the allowed characters and reserved names.
pub fn validate_username(username: &str) -> AppResult<()> {
    if !USERNAME_RE.is_match(username) {
        return Err(AppError::Validation(
            "username: only letters, digits and @/./+/-/_ are allowed".to_string(),
        ));
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
    {
        return Err(AppError::Validation(format!(
            "username: '{username}' is reserved"
        )));
    }
    Ok(())
}

/// Check a tag slug.
pub fn validate_slug(slug: &str) -> AppResult<()> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "slug: only latin letters, digits, '-' and '_' are allowed".to_string(),
        ))
    }
}

/// Check a `#RRGGBB` color.
pub fn validate_color(color: &str) -> AppResult<()> {
    if COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "color: expected a hex color like #E26C2D".to_string(),
        ))
    }
}
