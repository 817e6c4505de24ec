//! One-shot ingredient import from CSV.

use std::io::Read;
use std::path::Path;

use foodgram_common::{AppError, AppResult};
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};
use sea_orm::Set;
use serde::Deserialize;

/// A `name,measurement_unit` CSV record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

/// Loads the ingredient catalogue into an empty database.
#[derive(Clone)]
pub struct ImportService {
    ingredient_repo: IngredientRepository,
}

impl ImportService {
    #[must_use]
    pub const fn new(ingredient_repo: IngredientRepository) -> Self {
        Self { ingredient_repo }
    }

    /// Import ingredients from a CSV file, returning the number of rows inserted.
    pub async fn import_file(&self, path: &Path) -> AppResult<u64> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            AppError::Import(format!("Failed to read {}: {e}", path.display()))
        })?;
        self.import(data.as_slice()).await
    }

    /// Import ingredients from CSV data.
    ///
    /// Refuses to run once any ingredient exists.
    pub async fn import<R: Read>(&self, reader: R) -> AppResult<u64> {
        if self.ingredient_repo.count().await? > 0 {
            return Err(AppError::Import(
                "Ingredients are already loaded; start from an empty database to reload them"
                    .to_string(),
            ));
        }

        let records = parse_records(reader)?;
        tracing::info!(rows = records.len(), "Loading ingredients");

        let models = records
            .into_iter()
            .map(|r| ingredient::ActiveModel {
                name: Set(r.name),
                measurement_unit: Set(r.measurement_unit),
                ..Default::default()
            })
            .collect();

        self.ingredient_repo.insert_many(models).await
    }
}

/// Parse CSV with a `name,measurement_unit` header.
pub fn parse_records<R: Read>(reader: R) -> AppResult<Vec<IngredientRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize()
        .enumerate()
        .map(|(i, record)| {
            record.map_err(|e| AppError::Import(format!("Invalid row {}: {e}", i + 2)))
        })
        .collect()
}
