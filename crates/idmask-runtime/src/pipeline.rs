//! Masking pipeline — detector → normalizer → report.

use std::path::{Path, PathBuf};

use idmask_core::{Error, MaskingConfig, Result};
use idmask_detect::DetectorRegistry;
use idmask_protocol::{normalize, DocumentType, MaskingReport, OcrWord, PatternScanner};
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::types::DocumentMasking;

/// Runs one image (or one word list) to a finished report per call.
///
/// Holds no per-request state; the registry's detectors are read-only
/// after their first load.
pub struct MaskingPipeline<'r> {
    config: MaskingConfig,
    registry: &'r DetectorRegistry,
    scanner: PatternScanner,
}

impl<'r> MaskingPipeline<'r> {
    pub fn new(config: MaskingConfig, registry: &'r DetectorRegistry) -> Self {
        Self {
            config,
            registry,
            scanner: PatternScanner::new(),
        }
    }

    pub fn config(&self) -> &MaskingConfig {
        &self.config
    }

    /// Configured override, else the document type's own threshold.
    pub fn threshold_for(&self, document_type: DocumentType) -> f64 {
        self.config
            .min_confidence
            .unwrap_or_else(|| document_type.min_confidence())
    }

    /// Detect and normalize PII regions for a single model.
    pub fn mask_image(&self, document_type: DocumentType, image: &Path) -> Result<MaskingReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("mask_image", %run_id, document = %document_type);
        let _guard = span.enter();

        if !image.exists() {
            return Err(Error::ImageNotFound(image.to_path_buf()));
        }

        let threshold = self.threshold_for(document_type);
        let detector = self.registry.get(document_type)?;
        let detections = detector.predict(image, threshold)?;
        debug!("{} raw detections from {}", detections.len(), detector.name());

        let regions = normalize(document_type, &detections, threshold)?;
        info!(
            "Masked {}: {} regions from {} detections",
            image.display(),
            regions.len(),
            detections.len()
        );

        Ok(MaskingReport::build(regions))
    }

    /// Mask a whole document: its own model, plus the QR model for types
    /// that carry a QR code. A failure of either model fails the call.
    pub fn mask_document(
        &self,
        document_type: DocumentType,
        image: &Path,
    ) -> Result<DocumentMasking> {
        let mut report = self.mask_image(document_type, image)?;
        if document_type.scans_qr() {
            let qr = self.mask_image(DocumentType::QrCode, image)?;
            report.extend(qr);
        }

        let primary_identifier = document_type
            .primary_identifier()
            .and_then(|label| report.find_pattern(label))
            .cloned();
        if document_type.primary_identifier().is_some() && primary_identifier.is_none() {
            debug!("No primary identifier region found for {}", document_type);
        }

        Ok(DocumentMasking {
            report,
            primary_identifier,
        })
    }

    /// Pattern-scan OCR words for documents with no dedicated model.
    pub fn mask_words(&self, words: &[OcrWord]) -> MaskingReport {
        let regions = self.scanner.scan_words(words);
        debug!("Pattern scan: {} regions from {} words", regions.len(), words.len());
        MaskingReport::build(regions)
    }

    /// Write a report to the fixed output location and return its path.
    pub fn write_report(&self, report: &MaskingReport) -> Result<PathBuf> {
        let path = self.config.output_path();
        report.write_to(&path)?;
        Ok(path)
    }
}
