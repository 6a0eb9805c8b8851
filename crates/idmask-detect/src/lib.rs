//! idmask detect — detector adapters and model management.
//!
//! Provides the `Detector` trait consumed by the masking pipeline.
//! `CommandDetector` runs the external inference program configured for a
//! deployment; `DetectorRegistry` loads one detector per model artifact on
//! first use and rejects models whose class count disagrees with the
//! document taxonomy.

pub mod command;
pub mod detector;
pub mod registry;

pub use command::CommandDetector;
pub use detector::{Detector, StaticDetector};
pub use registry::{DetectorLoader, DetectorRegistry};

use idmask_core::MaskingConfig;

/// Create the registry described by a configuration.
pub fn create_registry(config: &MaskingConfig) -> DetectorRegistry {
    tracing::debug!(
        "Detector registry: model_dir={}, program={}",
        config.model_dir.display(),
        config.detector_program
    );
    DetectorRegistry::with_command(config.model_dir.clone(), config.detector_program.clone())
}
