//! Business logic services.

#![allow(missing_docs)]

pub mod favorite;
pub mod following;
pub mod import;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod tag;
pub mod user;

pub use favorite::FavoriteService;
pub use following::{FollowingService, SubscriptionView};
pub use import::{ImportService, IngredientRecord};
pub use ingredient::IngredientService;
pub use recipe::{
    IngredientAmountInput, RecipeIngredientView, RecipeInput, RecipeListQuery, RecipeService,
    RecipeView, ShortRecipe,
};
pub use shopping_cart::{ShoppingCartService, ShoppingListLine};
pub use tag::{CreateTagInput, TagService, UpdateTagInput};
pub use user::{LoginInput, RegisterInput, SetPasswordInput, UserService, UserView};
