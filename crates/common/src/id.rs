//! Token and key generation.

use ulid::Ulid;
use uuid::Uuid;

/// Generator for auth tokens and storage keys.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a ULID, lowercased.
    ///
    /// Used for storage keys so uploaded files sort by upload time.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an authentication token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // UUID v4: no time component
        Uuid::new_v4().simple().to_string()
    }
}
