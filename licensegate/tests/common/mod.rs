//! Shared test helpers for license token tests.

#![allow(dead_code)]

use ed25519_dalek::{Signer, SigningKey};
use licensegate::{codec, KeySource, PublicKey, ValidatorConfig, LICENSE_ISSUER};
use serde_json::{json, Value};

/// Fixed "now" used by deterministic tests.
pub const NOW: i64 = 1_700_000_000;

pub const REALM: &str = "app1";

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (SigningKey, PublicKey) {
    keypair_from_seed(1)
}

/// Returns a second, unrelated key pair.
pub fn other_keypair() -> (SigningKey, PublicKey) {
    keypair_from_seed(99)
}

fn keypair_from_seed(offset: u8) -> (SigningKey, PublicKey) {
    let mut seed = [0u8; 32];
    for (i, b) in seed.iter_mut().enumerate() {
        *b = offset.wrapping_add(i as u8);
    }
    let signing_key = SigningKey::from_bytes(&seed);
    let public = PublicKey::from(signing_key.verifying_key());
    (signing_key, public)
}

pub fn default_header() -> Value {
    json!({"alg": "EdDSA", "typ": "JWT", "version": 1})
}

/// Creates `base64url(header).base64url(payload).base64url(signature)`,
/// signing over the encoded `header.payload` prefix.
pub fn sign_raw(signing_key: &SigningKey, header_json: &str, payload_json: &str) -> String {
    let signing_input = format!(
        "{}.{}",
        codec::encode(header_json.as_bytes()),
        codec::encode(payload_json.as_bytes())
    );
    let signature = signing_key.sign(signing_input.as_bytes());
    format!("{signing_input}.{}", codec::encode(signature.to_bytes()))
}

pub fn sign_token(signing_key: &SigningKey, payload: &Value) -> String {
    sign_raw(signing_key, &default_header().to_string(), &payload.to_string())
}

/// A payload that passes every default check at [`NOW`].
pub fn valid_payload() -> Value {
    json!({
        "iss": LICENSE_ISSUER,
        "sub": "u1",
        "aud": REALM,
        "iat": NOW - 60,
        "exp": NOW + 30 * 24 * 3600,
        "jti": "token-1",
        "kind": "pro",
        "flags": ["export", "sync"],
        "features": {"seats": 5, "sso": true},
    })
}

/// Returns `payload` with `key` replaced (or removed when `value` is null).
pub fn with(mut payload: Value, key: &str, value: Value) -> Value {
    let map = payload.as_object_mut().expect("payload is an object");
    if value.is_null() {
        map.remove(key);
    } else {
        map.insert(key.to_string(), value);
    }
    payload
}

/// Config for [`REALM`] trusting [`test_keypair`], pinned to [`NOW`].
pub fn config() -> ValidatorConfig {
    let (_, public) = test_keypair();
    ValidatorConfig::new(REALM, KeySource::Static(public)).with_current_time(NOW)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
