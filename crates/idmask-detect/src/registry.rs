//! Lazily loaded, read-only detector handles, one per model file.
//!
//! Each model is loaded at most once behind a `OnceCell`. Loading checks
//! that the artifact exists and that the detector's declared classes match
//! the document taxonomy (names when the backend reports them, else the
//! count), so a model/table version mismatch fails at load time instead of
//! mislabelling regions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use idmask_core::{Error, Result};
use idmask_protocol::DocumentType;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::command::CommandDetector;
use crate::detector::Detector;

/// Builds a detector for a document type from its model artifact path.
pub type DetectorLoader =
    dyn Fn(DocumentType, &Path) -> Result<Arc<dyn Detector>> + Send + Sync;

/// Registry of detector handles keyed by model file.
pub struct DetectorRegistry {
    model_dir: PathBuf,
    loader: Box<DetectorLoader>,
    slots: HashMap<&'static str, OnceCell<Arc<dyn Detector>>>,
}

static GLOBAL: OnceCell<DetectorRegistry> = OnceCell::new();

impl DetectorRegistry {
    pub fn new(model_dir: impl Into<PathBuf>, loader: Box<DetectorLoader>) -> Self {
        let slots = DocumentType::ALL
            .iter()
            .map(|doc| (doc.model_file(), OnceCell::new()))
            .collect();
        Self {
            model_dir: model_dir.into(),
            loader,
            slots,
        }
    }

    /// Registry whose detectors run the given external inference command.
    pub fn with_command(model_dir: impl Into<PathBuf>, command_line: impl Into<String>) -> Self {
        let command_line = command_line.into();
        Self::new(
            model_dir,
            Box::new(move |_, path| {
                let detector: Arc<dyn Detector> =
                    Arc::new(CommandDetector::load(&command_line, path)?);
                Ok(detector)
            }),
        )
    }

    /// Process-wide registry, created by `init` on first use.
    pub fn global<F>(init: F) -> &'static DetectorRegistry
    where
        F: FnOnce() -> DetectorRegistry,
    {
        GLOBAL.get_or_init(init)
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn model_path(&self, document_type: DocumentType) -> PathBuf {
        self.model_dir.join(document_type.model_file())
    }

    /// Get the detector for a document type, loading it on first use.
    ///
    /// A failed load is not cached; the next call retries.
    pub fn get(&self, document_type: DocumentType) -> Result<Arc<dyn Detector>> {
        let slot = self.slots.get(document_type.model_file()).ok_or_else(|| {
            Error::Internal(format!("no registry slot for {}", document_type))
        })?;
        slot.get_or_try_init(|| self.load(document_type)).map(Arc::clone)
    }

    /// Whether the model for a document type is already loaded.
    pub fn is_loaded(&self, document_type: DocumentType) -> bool {
        self.slots
            .get(document_type.model_file())
            .map(|slot| slot.get().is_some())
            .unwrap_or(false)
    }

    /// Load and validate every listed document type up front.
    pub fn preload(&self, document_types: &[DocumentType]) -> Result<()> {
        for doc in document_types {
            self.get(*doc)?;
        }
        Ok(())
    }

    fn load(&self, document_type: DocumentType) -> Result<Arc<dyn Detector>> {
        let path = self.model_path(document_type);
        if !path.exists() {
            return Err(Error::ModelNotFound(path));
        }

        let taxonomy = document_type.taxonomy();
        taxonomy.validate()?;

        let detector = (self.loader)(document_type, &path)?;
        match detector.class_names() {
            Some(names) => taxonomy.check_class_names(names)?,
            None => taxonomy.check_class_count(detector.num_classes())?,
        }

        info!(
            "Loaded {} detector for {} ({} classes) from {}",
            detector.name(),
            document_type,
            detector.num_classes(),
            path.display()
        );
        Ok(detector)
    }
}
