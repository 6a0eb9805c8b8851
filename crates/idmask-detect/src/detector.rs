//! Detector trait and the in-process static implementation.
//!
//! The `Detector` trait abstracts over object-detection inference.
//! Implementations:
//! - `CommandDetector`: runs an external inference program per image
//! - `StaticDetector`: replays a fixed set of detections (precomputed output)

use std::path::Path;

use idmask_core::Result;
use idmask_protocol::RawDetection;

/// Trait for detection backends.
pub trait Detector: Send + Sync {
    /// Run detection on one image. Detections may include scores below
    /// `min_confidence`; filtering is the normalizer's job.
    fn predict(&self, image: &Path, min_confidence: f64) -> Result<Vec<RawDetection>>;

    /// Number of classes the loaded model declares.
    fn num_classes(&self) -> usize;

    /// Class names in model order, when the backend reports them.
    fn class_names(&self) -> Option<&[String]> {
        None
    }

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Detector that returns the same detections for every image.
pub struct StaticDetector {
    num_classes: usize,
    class_names: Option<Vec<String>>,
    detections: Vec<RawDetection>,
}

impl StaticDetector {
    pub fn new(num_classes: usize, detections: Vec<RawDetection>) -> Self {
        Self {
            num_classes,
            class_names: None,
            detections,
        }
    }

    /// Static detector that also reports its class names.
    pub fn with_class_names(class_names: Vec<String>, detections: Vec<RawDetection>) -> Self {
        Self {
            num_classes: class_names.len(),
            class_names: Some(class_names),
            detections,
        }
    }
}

impl Detector for StaticDetector {
    fn predict(&self, _image: &Path, _min_confidence: f64) -> Result<Vec<RawDetection>> {
        Ok(self.detections.clone())
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn class_names(&self) -> Option<&[String]> {
        self.class_names.as_deref()
    }

    fn name(&self) -> &str {
        "static"
    }
}
