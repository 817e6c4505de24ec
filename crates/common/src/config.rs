//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Media storage configuration.
    #[serde(default)]
    pub media: MediaConfig,
    /// Pagination defaults.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Data import configuration.
    #[serde(default)]
    pub import: ImportConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance, used for absolute pagination links.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Uploaded media configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded images are written to.
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// URL prefix the media directory is served under.
    #[serde(default = "default_media_url")]
    pub url: String,
}

/// Page-number pagination defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the request has no `limit`.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Upper bound for a requested `limit`.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

/// Ingredient import configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// CSV file with `name,measurement_unit` rows.
    #[serde(default = "default_ingredients_path")]
    pub ingredients_path: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            url: default_media_url(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            ingredients_path: default_ingredients_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

const fn default_page_size() -> u64 {
    6
}

const fn default_max_page_size() -> u64 {
    100
}

fn default_ingredients_path() -> PathBuf {
    PathBuf::from("../ingredients.csv")
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` in the working directory (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FOODGRAM_ENV`)
    /// 4. Environment variables with `FOODGRAM__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("FOODGRAM_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOODGRAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FOODGRAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
