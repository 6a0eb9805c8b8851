//! Masking report: the serialized list of regions a masking tool consumes.

use std::path::Path;

use idmask_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::normalize::PiiRegion;

/// `{ "masked_pii": [...] }`. The list is always present, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingReport {
    pub masked_pii: Vec<PiiRegion>,
}

impl MaskingReport {
    /// Wrap regions as-is; no filtering or reordering.
    pub fn build(regions: Vec<PiiRegion>) -> Self {
        Self { masked_pii: regions }
    }

    pub fn len(&self) -> usize {
        self.masked_pii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masked_pii.is_empty()
    }

    /// Append another report's regions after this one's.
    pub fn extend(&mut self, other: MaskingReport) {
        self.masked_pii.extend(other.masked_pii);
    }

    /// First region whose pattern equals `label`.
    pub fn find_pattern(&self, label: &str) -> Option<&PiiRegion> {
        self.masked_pii.iter().find(|r| r.pattern == label)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty form with 4-space indentation, as written to `output.json`.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| idmask_core::Error::Internal(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Write the pretty report to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        info!("Wrote {} regions to {}", self.len(), path.display());
        Ok(())
    }
}
