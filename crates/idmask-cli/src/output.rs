//! JSON bodies printed on stdout.

use std::path::Path;

use idmask_core::Error;
use serde_json::json;

pub fn success(output_file: &Path) -> String {
    json!({
        "status": "success",
        "output_file": output_file.display().to_string(),
    })
    .to_string()
}

pub fn failure(error: &Error) -> String {
    json!({
        "error": error.to_string(),
        "kind": error.kind(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_success_body() {
        let body: serde_json::Value =
            serde_json::from_str(&success(Path::new("models/output.json"))).unwrap();
        assert_eq!(
            body,
            json!({"status": "success", "output_file": "models/output.json"})
        );
    }

    #[test]
    fn test_failure_body() {
        let error = Error::ImageNotFound(PathBuf::from("missing.jpg"));
        let body: serde_json::Value = serde_json::from_str(&failure(&error)).unwrap();
        assert_eq!(body["error"], "Image file not found: missing.jpg");
        assert_eq!(body["kind"], "image_not_found");
    }
}
