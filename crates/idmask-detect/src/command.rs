//! Detector backed by an external inference program.
//!
//! The configured command line may carry leading arguments
//! (`python3 detect.py`); it is split on whitespace.
//!
//! Protocol, one process per call:
//! - `<program> describe <model>` prints `{"names": ["add", ...]}`
//! - `<program> predict <model> <image> --conf <c>` prints a JSON array of
//!   `{"class_id": 4, "confidence": 0.9, "box": [x1, y1, x2, y2]}`

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use idmask_core::{Error, Result};
use idmask_protocol::RawDetection;
use serde::Deserialize;
use tracing::{debug, info};

use crate::detector::Detector;

#[derive(Debug, Deserialize)]
struct ModelDescription {
    names: Vec<String>,
}

/// Detector that shells out to an inference executable.
pub struct CommandDetector {
    program: String,
    program_args: Vec<String>,
    model_path: PathBuf,
    class_names: Vec<String>,
}

impl CommandDetector {
    /// Describe the model once and keep its class list.
    pub fn load(command_line: &str, model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::ModelNotFound(model_path.to_path_buf()));
        }

        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("detector command is empty".into()))?;
        let program_args: Vec<String> = parts.collect();

        let output = Command::new(&program)
            .args(&program_args)
            .arg("describe")
            .arg(model_path)
            .output()
            .map_err(|e| Error::Detection(format!("Failed to run {}: {}", program, e)))?;
        let stdout = check_output(&program, "describe", output)?;

        let description: ModelDescription = serde_json::from_slice(&stdout).map_err(|e| {
            Error::Detection(format!("Unparsable model description from {}: {}", program, e))
        })?;

        info!(
            "Detector loaded: program={}, model={}, classes={}",
            program,
            model_path.display(),
            description.names.len()
        );

        Ok(Self {
            program,
            program_args,
            model_path: model_path.to_path_buf(),
            class_names: description.names,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Detector for CommandDetector {
    fn predict(&self, image: &Path, min_confidence: f64) -> Result<Vec<RawDetection>> {
        let output = Command::new(&self.program)
            .args(&self.program_args)
            .arg("predict")
            .arg(&self.model_path)
            .arg(image)
            .arg("--conf")
            .arg(min_confidence.to_string())
            .output()
            .map_err(|e| Error::Detection(format!("Failed to run {}: {}", self.program, e)))?;
        let stdout = check_output(&self.program, "predict", output)?;

        let detections: Vec<RawDetection> = serde_json::from_slice(&stdout).map_err(|e| {
            Error::Detection(format!("Unparsable detections from {}: {}", self.program, e))
        })?;
        debug!("{} returned {} detections", self.program, detections.len());
        Ok(detections)
    }

    fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    fn class_names(&self) -> Option<&[String]> {
        Some(&self.class_names)
    }

    fn name(&self) -> &str {
        "command"
    }
}

fn check_output(program: &str, verb: &str, output: Output) -> Result<Vec<u8>> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Detection(format!(
            "{} {} exited with {}: {}",
            program,
            verb,
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}
