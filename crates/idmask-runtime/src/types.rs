//! Runtime types.

use idmask_protocol::{identifier_fingerprint, MaskingReport, OcrWord, PiiRegion};
use serde::Serialize;

/// Result of masking one document image.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMasking {
    /// Document regions first, then QR regions when the document carries one.
    pub report: MaskingReport,
    /// Region holding the document number, if the type has one and it was found.
    #[serde(rename = "primaryIdentifier")]
    pub primary_identifier: Option<PiiRegion>,
}

impl DocumentMasking {
    /// Text of the OCR words lying wholly inside the primary identifier
    /// region, joined in reading order.
    pub fn identifier_text(&self, words: &[OcrWord]) -> Option<String> {
        let region = self.primary_identifier.as_ref()?;
        let text: String = words
            .iter()
            .filter(|word| word.bbox.is_within(&region.location))
            .map(|word| word.text.as_str())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Fingerprint of the document number read from the primary identifier
    /// region.
    ///
    /// `None` when no region was detected or no word falls inside it.
    pub fn identifier_fingerprint(&self, words: &[OcrWord]) -> Option<String> {
        self.identifier_text(words).map(|text| identifier_fingerprint(&text))
    }
}
