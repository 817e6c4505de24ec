//! Load the ingredient catalogue from CSV.
//!
//! Usage: `load-ingredients [path]`. Without a path the configured
//! `import.ingredients_path` is used. The import refuses to run when the
//! catalogue already has rows.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use foodgram_common::Config;
use foodgram_core::ImportService;
use foodgram_db::repositories::IngredientRepository;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=info".into()),
        )
        .init();

    let config = Config::load().context("loading configuration")?;
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| config.import.ingredients_path.clone(), PathBuf::from);

    let db = foodgram_db::init(&config)
        .await
        .context("connecting to database")?;
    foodgram_db::migrate(&db)
        .await
        .context("running migrations")?;

    let service = ImportService::new(IngredientRepository::new(Arc::new(db)));
    let imported = service
        .import_file(&path)
        .await
        .with_context(|| format!("importing {}", path.display()))?;

    info!(imported, path = %path.display(), "Ingredients loaded");
    Ok(())
}
