//! Common utilities and shared types for foodgram.
//!
//! This crate provides foundational components used across all foodgram crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: auth tokens and storage keys via [`IdGenerator`]
//! - **Storage**: Media storage for uploaded recipe images
//!
//! # Example
//!
//! ```no_run
//! use foodgram_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let token = id_gen.generate_token();
//!     println!("Listening on {}:{} ({token})", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_storage_key};
