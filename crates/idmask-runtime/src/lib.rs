//! Masking runtime — runs a document image through its detector, the region
//! normalizer and the report builder.
//!
//! Detector handles come from a shared `DetectorRegistry`; the pipeline
//! itself keeps no per-request state.

pub mod pipeline;
pub mod types;

pub use pipeline::MaskingPipeline;
pub use types::*;
