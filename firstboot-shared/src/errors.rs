//! Error taxonomy for first-boot resolution.
//!
//! Only `MetadataUnavailable` is fatal to a bootstrap run. `PayloadMalformed`
//! is produced by the user-data parser and recovered by the identity
//! resolver, which falls back to defaults.

use thiserror::Error;

/// Result alias used throughout firstboot.
pub type FirstbootResult<T> = Result<T, FirstbootError>;

#[derive(Debug, Error)]
pub enum FirstbootError {
    /// Instance metadata could not be fetched or lacks an instance id.
    #[error("instance metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// User-data is present but is not the expected JSON shape.
    #[error("user data malformed: {0}")]
    PayloadMalformed(String),

    /// A declarative resource was given a key outside its schema.
    #[error("unrecognized key '{key}' for {kind}")]
    UnrecognizedKey { kind: &'static str, key: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
