//! Error types for the `vivarium-store` crate.
//!
//! All fallible store operations return [`StoreError`] through the
//! standard [`Result`] type alias.

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `fetch` was called for a key with no current value.
    #[error("entry not found: {key}")]
    NotFound {
        /// Canonical string form of the missing key.
        key: String,
    },

    /// A typed accessor failed to serialize or deserialize a value.
    #[error("value conversion failed for {key}: {source}")]
    Serde {
        /// Canonical string form of the key involved.
        key: String,
        /// The underlying serde error.
        source: serde_json::Error,
    },
}
