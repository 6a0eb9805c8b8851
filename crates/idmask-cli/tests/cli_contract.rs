//! Process-boundary tests: stdout JSON bodies and exit codes of the
//! `idmask` binary.

use std::path::Path;
use std::process::{Command, Output};

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

fn idmask(dir: &Path, args: &[&str], env: &[(&str, String)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_idmask"));
    command
        .args(args)
        .current_dir(dir)
        .env_remove("IDMASK_MODEL_DIR")
        .env_remove("IDMASK_DETECTOR")
        .env_remove("IDMASK_MIN_CONFIDENCE")
        .env_remove("RUST_LOG");
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

const DRIVING_LICENSE_DETECTOR: &str = r#"
case "$1" in
  describe)
    echo '{"names": ["add", "blood_group", "dl_no", "dob", "name", "relation_with", "rto", "state", "vehicle_type"]}' ;;
  predict)
    echo '[{"class_id": 4, "confidence": 0.92, "box": [10.0, 20.0, 110.0, 70.0]},
           {"class_id": 2, "confidence": 0.31, "box": [5.0, 5.0, 50.0, 20.0]}]' ;;
  *) exit 2 ;;
esac
"#;

#[cfg(unix)]
#[test]
fn test_detect_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models");
    std::fs::create_dir(&models).unwrap();
    std::fs::write(models.join("driving_license.onnx"), b"weights").unwrap();
    let script = dir.path().join("detector.sh");
    std::fs::write(&script, DRIVING_LICENSE_DETECTOR).unwrap();
    let image = dir.path().join("licence.jpg");
    std::fs::write(&image, b"jpeg").unwrap();

    let output = idmask(
        dir.path(),
        &["detect", "driving_license", image.to_str().unwrap()],
        &[
            ("IDMASK_MODEL_DIR", models.display().to_string()),
            ("IDMASK_DETECTOR", format!("sh {}", script.display())),
        ],
    );
    assert!(output.status.success(), "{:?}", output);

    let body = stdout_json(&output);
    let output_file = models.join("output.json");
    assert_eq!(body["status"], "success");
    assert_eq!(body["output_file"], output_file.display().to_string());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_file).unwrap()).unwrap();
    assert_eq!(
        report,
        serde_json::json!({"masked_pii": [
            {"pattern": "name", "text": "name",
             "location": {"Left": 10, "Top": 20, "Width": 100, "Height": 50}}
        ]})
    );
}

#[test]
fn test_detect_missing_image() {
    let dir = tempfile::tempdir().unwrap();
    let output = idmask(dir.path(), &["detect", "qr_code", "absent.png"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let body = stdout_json(&output);
    assert_eq!(body["kind"], "image_not_found");
    assert!(body["error"].as_str().unwrap().contains("absent.png"));
}

#[test]
fn test_detect_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("qr.png"), b"png").unwrap();
    let output = idmask(
        dir.path(),
        &["detect", "qr_code", "qr.png"],
        &[("IDMASK_MODEL_DIR", dir.path().join("empty").display().to_string())],
    );

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["kind"], "model_not_found");
    let log = String::from_utf8_lossy(&output.stderr);
    assert!(log.contains("check the model directory"), "{}", log);
}

#[test]
fn test_detect_missing_argument() {
    let dir = tempfile::tempdir().unwrap();
    let output = idmask(dir.path(), &["detect", "national_id_front"], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["kind"], "usage");
}

#[test]
fn test_wrap_then_unwrap() {
    let dir = tempfile::tempdir().unwrap();
    let private_key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
    let public_pem = RsaPublicKey::from(&private_key)
        .to_public_key_pem(LineEnding::LF)
        .unwrap();
    let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap();
    let private_path = dir.path().join("private.pem");
    std::fs::write(&private_path, private_pem.as_bytes()).unwrap();

    let session_key = "q83vASNFZ4mrze8BI0VniQ==";
    let wrapped = idmask(dir.path(), &["wrap", session_key, &public_pem], &[]);
    assert!(wrapped.status.success(), "{:?}", wrapped);
    let wrapped_b64 = String::from_utf8(wrapped.stdout).unwrap();

    let unwrapped = idmask(
        dir.path(),
        &["unwrap", wrapped_b64.trim(), private_path.to_str().unwrap()],
        &[],
    );
    assert!(unwrapped.status.success(), "{:?}", unwrapped);
    assert_eq!(String::from_utf8(unwrapped.stdout).unwrap().trim(), session_key);

    let wrapped_b64 = wrapped_b64.trim();
    let first = if wrapped_b64.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}{}", first, &wrapped_b64[1..]);
    let failed = idmask(
        dir.path(),
        &["unwrap", &tampered, private_path.to_str().unwrap()],
        &[],
    );
    assert_eq!(failed.status.code(), Some(1));
    let body = stdout_json(&failed);
    assert_eq!(body["kind"], "decryption_failed");
    assert_eq!(body["error"], "Decryption failed");
}

#[test]
fn test_wrap_rejects_bad_key() {
    let dir = tempfile::tempdir().unwrap();
    let output = idmask(dir.path(), &["wrap", "c2Vzc2lvbg==", "not-a-key"], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["kind"], "invalid_key_format");
}

#[test]
fn test_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = idmask(dir.path(), &["help"], &[]);

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("detect <document-type> <image>"));
}
