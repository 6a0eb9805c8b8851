//! idmask keywrap — transport a symmetric session key under an RSA key pair.
//!
//! Independent of the detection pipeline. Keys are supplied by the caller
//! for every operation; nothing is generated or stored.

pub mod keywrap;

pub use keywrap::{
    max_payload_len, parse_private_key, parse_public_key, unwrap, unwrap_base64, unwrap_with_key,
    wrap, wrap_base64, wrap_for_recipients, wrap_with_key, WrappedRecipient,
};
