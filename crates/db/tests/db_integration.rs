//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `foodgram_test`)
//!   `TEST_DB_PASSWORD` (default: `foodgram_test`)
//!   `TEST_DB_NAME` (default: `foodgram_test`)

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use foodgram_common::AppError;
use foodgram_db::entities::{favorite, ingredient, recipe, shopping_cart_item, tag, user};
use foodgram_db::repositories::{
    FavoriteRepository, IngredientAmount, IngredientRepository, RecipeFilter, RecipeRepository,
    ShoppingCartRepository, TagRepository, UserRepository,
};
use foodgram_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

async fn seed_user(repo: &UserRepository, username: &str) -> user::Model {
    repo.create(user::ActiveModel {
        email: Set(format!("{username}@example.com")),
        username: Set(username.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        password: Set("hash".to_string()),
        is_admin: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    })
    .await
    .unwrap()
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.database.is_empty());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let result = TestDatabase::new().await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_recipe_lifecycle_and_shopping_rows() {
    let db = TestDatabase::new().await.unwrap();
    db.cleanup().await.unwrap();
    let conn = db.connection();

    let users = UserRepository::new(conn.clone());
    let tags = TagRepository::new(conn.clone());
    let ingredients = IngredientRepository::new(conn.clone());
    let recipes = RecipeRepository::new(conn.clone());
    let favorites = FavoriteRepository::new(conn.clone());
    let carts = ShoppingCartRepository::new(conn.clone());

    let author = seed_user(&users, "author").await;
    let reader = seed_user(&users, "reader").await;

    let breakfast = tags
        .create(tag::ActiveModel {
            name: Set("Breakfast".to_string()),
            color: Set("#E26C2D".to_string()),
            slug: Set("breakfast".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    ingredients
        .insert_many(vec![ingredient::ActiveModel {
            name: Set("flour".to_string()),
            measurement_unit: Set("g".to_string()),
            ..Default::default()
        }])
        .await
        .unwrap();
    let flour = ingredients.find_all(Some("fl")).await.unwrap().remove(0);

    let mut created = Vec::new();
    for amount in [200, 300] {
        let recipe = recipes
            .create_with_components(
                recipe::ActiveModel {
                    author_id: Set(author.id),
                    name: Set(format!("Bread {amount}")),
                    text: Set("Bake.".to_string()),
                    image: Set("/media/recipes/bread.png".to_string()),
                    cooking_time: Set(40),
                    created_at: Set(Utc::now().into()),
                    ..Default::default()
                },
                &[breakfast.id],
                &[IngredientAmount {
                    ingredient_id: flour.id,
                    amount,
                }],
            )
            .await
            .unwrap();
        created.push(recipe);
    }

    for recipe in &created {
        carts
            .create(shopping_cart_item::ActiveModel {
                user_id: Set(reader.id),
                recipe_id: Set(recipe.id),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let rows = carts.ingredient_rows(reader.id).await.unwrap();
    assert_eq!(rows.iter().map(|r| r.amount).sum::<i32>(), 500);

    favorites
        .create(favorite::ActiveModel {
            user_id: Set(reader.id),
            recipe_id: Set(created[0].id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let duplicate = favorites
        .create(favorite::ActiveModel {
            user_id: Set(reader.id),
            recipe_id: Set(created[0].id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let filter = RecipeFilter {
        tag_slugs: vec!["breakfast".to_string(), "missing".to_string()],
        favorited_by: Some(reader.id),
        ..Default::default()
    };
    assert_eq!(recipes.count(&filter).await.unwrap(), 1);

    recipes.delete(created[0].id).await.unwrap();
    assert!(!favorites.is_favorited(reader.id, created[0].id).await.unwrap());

    db.cleanup().await.unwrap();
}
