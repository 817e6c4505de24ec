//! Core business logic for foodgram.

pub mod services;
pub mod validation;

pub use services::*;
