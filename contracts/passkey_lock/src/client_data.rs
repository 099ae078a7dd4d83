//! clientDataJSON assembly for WebAuthn `get` ceremonies.

extern crate alloc;
use alloc::vec;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use soroban_sdk::{Bytes, Env, String};

/// Challenge material spliced between the JSON fragments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Challenge {
    /// Already base64url, copied verbatim.
    Encoded(String),
    /// Raw bytes, base64url-encoded before splicing.
    Raw(Bytes),
}

pub struct ClientDataBuilder;

impl ClientDataBuilder {
    /// Returns `left ‖ base64url(challenge) ‖ right` as UTF-8 bytes.
    ///
    /// Fragments are not validated: a malformed JSON simply hashes to a
    /// digest the authenticator never signed.
    pub fn build(env: &Env, left: &String, challenge: &Challenge, right: &String) -> Bytes {
        let mut json = left.to_bytes();
        match challenge {
            Challenge::Encoded(encoded) => json.append(&encoded.to_bytes()),
            Challenge::Raw(raw) => json.append(&base64url(env, raw)),
        }
        json.append(&right.to_bytes());
        json
    }
}

/// RFC 4648 §5 base64url without padding.
pub fn base64url(env: &Env, raw: &Bytes) -> Bytes {
    let mut buf = vec![0u8; raw.len() as usize];
    raw.copy_into_slice(&mut buf);
    let encoded = URL_SAFE_NO_PAD.encode(&buf);
    Bytes::from_slice(env, encoded.as_bytes())
}
