//! Repositories wrapping sea-orm queries per aggregate.

pub mod favorite;
pub mod following;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod tag;
pub mod user;

pub use favorite::FavoriteRepository;
pub use following::FollowingRepository;
pub use ingredient::IngredientRepository;
pub use recipe::{IngredientAmount, RecipeFilter, RecipeRepository};
pub use shopping_cart::{CartIngredientRow, ShoppingCartRepository};
pub use tag::TagRepository;
pub use user::UserRepository;

use foodgram_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert/update failure, surfacing unique violations as 400s.
pub(crate) fn write_error(err: DbErr, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::BadRequest(conflict.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}
