//! Session key wrapping with RSA-OAEP.
//!
//! OAEP uses SHA-256 for both the main hash and MGF1, with no label.
//! Every call takes the key it needs; nothing is cached or generated here.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use idmask_core::{Error, Result};
use rand::rngs::OsRng;
use rsa::pkcs1::{self, DecodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, Document, SubjectPublicKeyInfoRef};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

/// SHA-256 output length in bytes.
const HASH_LEN: usize = 32;

/// OAEP overhead: two hash lengths plus two bytes.
const OAEP_OVERHEAD: usize = 2 * HASH_LEN + 2;

/// Largest public modulus accepted, in bits.
pub const MAX_KEY_BITS: usize = 16384;

/// A wrapped key addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedRecipient {
    pub recipient_id: String,
    /// Base64-encoded OAEP ciphertext
    pub wrapped_key: String,
}

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Largest plaintext OAEP/SHA-256 can carry under this key.
pub fn max_payload_len(public_key: &RsaPublicKey) -> usize {
    public_key.size().saturating_sub(OAEP_OVERHEAD)
}

fn invalid_public_key() -> Error {
    Error::InvalidKeyFormat("expected a PEM-encoded RSA public key (SPKI or PKCS#1)".into())
}

/// Parse an SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM.
///
/// Moduli up to `MAX_KEY_BITS` are accepted.
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey> {
    let (label, document) = Document::from_pem(pem.trim()).map_err(|_| invalid_public_key())?;
    let pkcs1_der = match label {
        "PUBLIC KEY" => {
            let spki = SubjectPublicKeyInfoRef::try_from(document.as_bytes())
                .map_err(|_| invalid_public_key())?;
            if spki.algorithm.oid != pkcs1::ALGORITHM_OID {
                return Err(Error::InvalidKeyFormat(format!(
                    "not an RSA public key (algorithm {})",
                    spki.algorithm.oid
                )));
            }
            spki.subject_public_key
                .as_bytes()
                .ok_or_else(invalid_public_key)?
        }
        "RSA PUBLIC KEY" => document.as_bytes(),
        other => {
            return Err(Error::InvalidKeyFormat(format!(
                "unexpected PEM label {:?}",
                other
            )));
        }
    };

    let key = pkcs1::RsaPublicKey::try_from(pkcs1_der).map_err(|_| invalid_public_key())?;
    RsaPublicKey::new_with_max_size(
        BigUint::from_bytes_be(key.modulus.as_bytes()),
        BigUint::from_bytes_be(key.public_exponent.as_bytes()),
        MAX_KEY_BITS,
    )
    .map_err(|e| Error::InvalidKeyFormat(format!("unusable RSA public key: {}", e)))
}

/// Parse a PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`) PEM.
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    let pem = pem.trim();
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }
    RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| {
        Error::InvalidKeyFormat(
            "expected an unencrypted PEM-encoded RSA private key (PKCS#8 or PKCS#1)".into(),
        )
    })
}

/// Encrypt `key` for the holder of `public_key`.
///
/// Oversized keys are rejected, never truncated.
pub fn wrap_with_key(key: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    let max = max_payload_len(public_key);
    // A modulus shorter than the OAEP overhead cannot carry even an empty key.
    if public_key.size() < OAEP_OVERHEAD || key.len() > max {
        return Err(Error::PlaintextTooLarge {
            len: key.len(),
            max,
        });
    }
    let wrapped = public_key
        .encrypt(&mut OsRng, oaep(), key)
        .map_err(|e| Error::Internal(format!("OAEP encryption failed: {}", e)))?;
    debug!(
        "Wrapped {} byte key under {} bit modulus",
        key.len(),
        public_key.size() * 8
    );
    Ok(wrapped)
}

/// Decrypt a wrapped key. Every decryption failure is the same
/// `DecryptionFailed`, whatever went wrong inside.
pub fn unwrap_with_key(wrapped: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    private_key
        .decrypt(oaep(), wrapped)
        .map_err(|_| Error::DecryptionFailed)
}

pub fn wrap(key: &[u8], public_key_pem: &str) -> Result<Vec<u8>> {
    let public_key = parse_public_key(public_key_pem)?;
    wrap_with_key(key, &public_key)
}

pub fn unwrap(wrapped: &[u8], private_key_pem: &str) -> Result<Vec<u8>> {
    let private_key = parse_private_key(private_key_pem)?;
    unwrap_with_key(wrapped, &private_key)
}

/// `wrap`, returning the ciphertext as standard base64.
pub fn wrap_base64(key: &[u8], public_key_pem: &str) -> Result<String> {
    wrap(key, public_key_pem).map(|wrapped| BASE64.encode(wrapped))
}

/// `unwrap` for a base64 ciphertext. Malformed base64 is reported as
/// `DecryptionFailed` like any other bad ciphertext.
pub fn unwrap_base64(wrapped_b64: &str, private_key_pem: &str) -> Result<Vec<u8>> {
    let private_key = parse_private_key(private_key_pem)?;
    let wrapped = BASE64
        .decode(wrapped_b64.trim())
        .map_err(|_| Error::DecryptionFailed)?;
    unwrap_with_key(&wrapped, &private_key)
}

/// Wrap one key for several recipients, in input order.
///
/// Stops at the first recipient whose key is unusable.
pub fn wrap_for_recipients<'a, I>(key: &[u8], recipients: I) -> Result<Vec<WrappedRecipient>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    recipients
        .into_iter()
        .map(|(recipient_id, public_key_pem)| {
            Ok(WrappedRecipient {
                recipient_id: recipient_id.to_string(),
                wrapped_key: wrap_base64(key, public_key_pem)?,
            })
        })
        .collect()
}
