//! Region normalization: raw detector output to canonical PII regions.

use idmask_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::taxonomy::DocumentType;

/// Axis-aligned box in detector corner form `(x1, y1, x2, y2)`.
///
/// Always satisfies `0 <= x1 <= x2` and `0 <= y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        let corners = [x1, y1, x2, y2];
        if corners.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(Error::Detection(format!(
                "box corners must be finite and non-negative: {:?}",
                corners
            )));
        }
        if x2 < x1 || y2 < y1 {
            return Err(Error::Detection(format!(
                "inverted box corners: {:?}",
                corners
            )));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn corners(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Corners are truncated toward zero before width/height are taken.
    pub fn to_rectangle(&self) -> Rectangle {
        let (x1, y1, x2, y2) = (
            self.x1 as u32,
            self.y1 as u32,
            self.x2 as u32,
            self.y2 as u32,
        );
        Rectangle {
            left: x1,
            top: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }
}

impl TryFrom<[f32; 4]> for BoundingBox {
    type Error = Error;

    fn try_from(c: [f32; 4]) -> Result<Self> {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        b.corners()
    }
}

/// One detection as emitted by a detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl RawDetection {
    pub fn new(class_id: u32, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }
}

/// Canonical `(left, top, width, height)` rectangle.
///
/// Zero-area rectangles are valid and kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rectangle {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }
}

/// A maskable region of a document image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiRegion {
    pub pattern: String,
    pub text: String,
    pub location: Rectangle,
}

impl PiiRegion {
    /// Region from a model label; no OCR text is read so `text` repeats the label.
    pub fn labelled(label: &str, location: Rectangle) -> Self {
        Self {
            pattern: label.to_string(),
            text: label.to_string(),
            location,
        }
    }
}

/// Turn raw detections into PII regions for one document type.
///
/// Every class id is resolved first; one unknown id fails the whole call.
/// Low-confidence and non-PII detections are dropped. Survivors keep their
/// input order and are neither de-duplicated nor merged.
pub fn normalize(
    document_type: DocumentType,
    detections: &[RawDetection],
    min_confidence: f64,
) -> Result<Vec<PiiRegion>> {
    if !(0.0..=1.0).contains(&min_confidence) {
        return Err(Error::Config(format!(
            "min_confidence must be within [0, 1], got {}",
            min_confidence
        )));
    }

    let resolved = detections
        .iter()
        .map(|d| document_type.lookup(d.class_id).map(|entry| (d, entry)))
        .collect::<Result<Vec<_>>>()?;

    let mut low_confidence = 0usize;
    let mut non_pii = 0usize;
    let mut regions = Vec::with_capacity(resolved.len());

    for (detection, entry) in resolved {
        if detection.confidence.is_nan() || detection.confidence < min_confidence {
            low_confidence += 1;
            continue;
        }
        if !entry.is_pii {
            non_pii += 1;
            continue;
        }
        regions.push(PiiRegion::labelled(entry.label, detection.bbox.to_rectangle()));
    }

    debug!(
        "Normalized {} detections for {}: kept={}, low_confidence={}, non_pii={}",
        detections.len(),
        document_type,
        regions.len(),
        low_confidence,
        non_pii
    );

    Ok(regions)
}
