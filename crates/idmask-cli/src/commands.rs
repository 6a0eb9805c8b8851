//! Subcommand parsing and execution.

use std::path::{Path, PathBuf};

use idmask_core::{Error, MaskingConfig, Result};
use idmask_detect::{create_registry, DetectorRegistry};
use idmask_protocol::DocumentType;
use idmask_runtime::MaskingPipeline;
use tracing::debug;

pub const USAGE: &str = "\
idmask — document PII masking and session key wrapping

Usage: idmask <command> [args]

Commands:
  detect <document-type> <image>       Locate PII regions, write output.json
  wrap <payload> <public-key-pem>      Wrap a payload, print base64
  unwrap <wrapped> <private-key-pem>   Unwrap a base64 payload, print it
  help                                 Show this help message

Document types: national_id_front, national_id_back, driving_license, qr_code
Key arguments take PEM text or a path to a PEM file.

Environment:
  IDMASK_MODEL_DIR        Model directory (default: models)
  IDMASK_DETECTOR         Inference command (default: idmask-yolo)
  IDMASK_MIN_CONFIDENCE   Confidence threshold override
  RUST_LOG                Log filter (default: warn)";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Detect {
        document_type: DocumentType,
        image: PathBuf,
    },
    Wrap {
        payload: String,
        public_key: String,
    },
    Unwrap {
        wrapped: String,
        private_key: String,
    },
    Help,
}

impl Command {
    /// Parse arguments following the program name.
    pub fn parse(args: &[String]) -> Result<Command> {
        let Some((verb, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        match verb.as_str() {
            "detect" => {
                let [document_type, image] = exact::<2>(rest, "detect <document-type> <image>")?;
                Ok(Command::Detect {
                    document_type: document_type.parse()?,
                    image: PathBuf::from(image),
                })
            }
            "wrap" => {
                let [payload, public_key] = exact::<2>(rest, "wrap <payload> <public-key-pem>")?;
                Ok(Command::Wrap {
                    payload,
                    public_key,
                })
            }
            "unwrap" => {
                let [wrapped, private_key] =
                    exact::<2>(rest, "unwrap <wrapped> <private-key-pem>")?;
                Ok(Command::Unwrap {
                    wrapped,
                    private_key,
                })
            }
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => Err(Error::Usage(format!(
                "unknown command {:?}; run `idmask help`",
                other
            ))),
        }
    }
}

fn exact<const N: usize>(args: &[String], usage: &str) -> Result<[String; N]> {
    <[String; N]>::try_from(args.to_vec()).map_err(|_| Error::Usage(format!("idmask {}", usage)))
}

/// Mask one image and write the report, returning the report path.
pub fn detect(config: MaskingConfig, document_type: DocumentType, image: &Path) -> Result<PathBuf> {
    let registry = DetectorRegistry::global(|| create_registry(&config));
    let pipeline = MaskingPipeline::new(config, registry);
    let report = pipeline.mask_image(document_type, image)?;
    pipeline.write_report(&report)
}

pub fn wrap(payload: &str, public_key: &str) -> Result<String> {
    let pem = read_pem(public_key)?;
    idmask_keywrap::wrap_base64(payload.as_bytes(), &pem)
}

pub fn unwrap(wrapped: &str, private_key: &str) -> Result<String> {
    let pem = read_pem(private_key)?;
    let payload = idmask_keywrap::unwrap_base64(wrapped, &pem)?;
    String::from_utf8(payload)
        .map_err(|_| Error::InvalidPayload("unwrapped payload is not UTF-8 text".into()))
}

/// A key argument is PEM text, or the path of a file holding it.
pub fn read_pem(arg: &str) -> Result<String> {
    if arg.contains("-----BEGIN") {
        return Ok(arg.to_string());
    }
    let path = Path::new(arg);
    if path.is_file() {
        debug!("Reading key from {}", path.display());
        return Ok(std::fs::read_to_string(path)?);
    }
    Ok(arg.to_string())
}
