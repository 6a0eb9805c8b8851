//! idmask core — error type and masking configuration shared by every crate.

pub mod config;
pub mod error;

pub use config::{MaskingConfig, OUTPUT_FILE_NAME};
pub use error::{Error, Result};
