//! idmask — PII region masking for identity documents and session key wrapping.

use std::process::ExitCode;

use idmask_core::{MaskingConfig, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::Command;

/// Config file read from the working directory when present.
const CONFIG_FILE: &str = "idmask.json";

fn main() -> ExitCode {
    // stdout carries the JSON result; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(stdout) => {
            println!("{}", stdout);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_fatal_misconfiguration() => {
            error!("{} (check the model directory and detector setup)", e);
            println!("{}", output::failure(&e));
            ExitCode::FAILURE
        }
        Err(e) => {
            warn!("{}", e);
            println!("{}", output::failure(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String> {
    match Command::parse(args)? {
        Command::Detect {
            document_type,
            image,
        } => {
            let config = MaskingConfig::load(std::path::Path::new(CONFIG_FILE))?;
            info!(
                "Detecting {} in {} (models in {})",
                document_type,
                image.display(),
                config.model_dir.display()
            );
            let output_file = commands::detect(config, document_type, &image)?;
            Ok(output::success(&output_file))
        }
        Command::Wrap {
            payload,
            public_key,
        } => commands::wrap(&payload, &public_key),
        Command::Unwrap {
            wrapped,
            private_key,
        } => commands::unwrap(&wrapped, &private_key),
        Command::Help => Ok(commands::USAGE.to_string()),
    }
}
