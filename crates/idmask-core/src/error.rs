//! Error types for idmask.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The detector emitted a class id the document's taxonomy does not know.
    #[error("Unknown class id {class_id} for {document} (taxonomy has {table_len} classes)")]
    UnknownClassId {
        document: String,
        class_id: u32,
        table_len: usize,
    },

    #[error("Taxonomy mismatch for {document}: taxonomy has {expected} classes, detector declares {declared}")]
    TaxonomyMismatch {
        document: String,
        expected: usize,
        declared: usize,
    },

    #[error("Class name mismatch for {document}: class {class_id} is {declared:?} in the model, {expected:?} in the taxonomy")]
    ClassNameMismatch {
        document: String,
        class_id: u32,
        expected: String,
        declared: String,
    },

    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Image file not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Detection error: {0}")]
    Detection(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Plaintext too large: {len} bytes exceeds maximum of {max}")]
    PlaintextTooLarge { len: usize, max: usize },

    /// Carries no detail: callers must not be able to tell malformed
    /// ciphertext from bad padding.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Usage: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable kind for the process boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownClassId { .. } => "unknown_class_id",
            Error::TaxonomyMismatch { .. } => "taxonomy_mismatch",
            Error::ClassNameMismatch { .. } => "class_name_mismatch",
            Error::ModelNotFound(_) => "model_not_found",
            Error::ImageNotFound(_) => "image_not_found",
            Error::Detection(_) => "detection",
            Error::InvalidKeyFormat(_) => "invalid_key_format",
            Error::PlaintextTooLarge { .. } => "plaintext_too_large",
            Error::DecryptionFailed => "decryption_failed",
            Error::InvalidPayload(_) => "invalid_payload",
            Error::Config(_) => "config",
            Error::Usage(_) => "usage",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Internal(_) => "internal",
        }
    }

    /// Misconfiguration errors that retrying the same call cannot fix.
    pub fn is_fatal_misconfiguration(&self) -> bool {
        matches!(
            self,
            Error::UnknownClassId { .. }
                | Error::TaxonomyMismatch { .. }
                | Error::ClassNameMismatch { .. }
                | Error::ModelNotFound(_)
                | Error::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
