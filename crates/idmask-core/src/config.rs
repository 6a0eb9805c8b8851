//! Masking configuration: confidence threshold, model directory, detector program.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_DETECTOR_PROGRAM: &str = "idmask-yolo";

/// Name of the report artifact written next to the model files.
pub const OUTPUT_FILE_NAME: &str = "output.json";

pub const ENV_MIN_CONFIDENCE: &str = "IDMASK_MIN_CONFIDENCE";
pub const ENV_MODEL_DIR: &str = "IDMASK_MODEL_DIR";
pub const ENV_DETECTOR: &str = "IDMASK_DETECTOR";

/// Top-level idmask configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingConfig {
    /// Overrides every document type's own confidence threshold when set.
    #[serde(default)]
    pub min_confidence: Option<f64>,
    /// Directory holding one model artifact per document type.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// External inference executable.
    #[serde(default = "default_detector_program")]
    pub detector_program: String,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_DIR)
}
fn default_detector_program() -> String {
    DEFAULT_DETECTOR_PROGRAM.into()
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            min_confidence: None,
            model_dir: default_model_dir(),
            detector_program: default_detector_program(),
        }
    }
}

impl MaskingConfig {
    /// Load config from a JSON file (missing fields default), then apply env overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let mut config: MaskingConfig = match std::fs::read_to_string(config_path) {
            Ok(s) => serde_json::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", config_path.display());
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MIN_CONFIDENCE) {
            let value = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} is not a number: {:?}", ENV_MIN_CONFIDENCE, raw))
            })?;
            self.min_confidence = Some(value);
        }
        if let Some(dir) = lookup(ENV_MODEL_DIR) {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(program) = lookup(ENV_DETECTOR) {
            self.detector_program = program;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.min_confidence {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::Config(format!(
                    "min_confidence must be within [0, 1], got {}",
                    threshold
                )));
            }
        }
        if self.detector_program.trim().is_empty() {
            return Err(Error::Config("detector_program is empty".into()));
        }
        Ok(())
    }

    /// Fixed location of the serialized report.
    pub fn output_path(&self) -> PathBuf {
        self.model_dir.join(OUTPUT_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MaskingConfig::default();
        assert_eq!(config.min_confidence, None);
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.output_path(), PathBuf::from("models").join("output.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_MIN_CONFIDENCE, "0.75"),
            (ENV_MODEL_DIR, "/opt/idmask/models"),
        ]);
        let mut config = MaskingConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.min_confidence, Some(0.75));
        assert_eq!(config.model_dir, PathBuf::from("/opt/idmask/models"));
        assert_eq!(config.detector_program, DEFAULT_DETECTOR_PROGRAM);
    }

    #[test]
    fn test_bad_confidence_override() {
        let mut config = MaskingConfig::default();
        let err = config
            .apply_overrides(|k| (k == ENV_MIN_CONFIDENCE).then(|| "high".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_validate_range() {
        let config = MaskingConfig {
            min_confidence: Some(1.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idmask.json");
        std::fs::write(&path, r#"{"model_dir": "weights"}"#).unwrap();

        let config = MaskingConfig::load(&path).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("weights"));
        assert_eq!(config.detector_program, DEFAULT_DETECTOR_PROGRAM);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MaskingConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.min_confidence, None);
    }
}
