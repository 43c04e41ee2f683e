//! Token decoding.
//!
//! Tokens use the format `base64url(header).base64url(payload).base64url(signature)`.
//! The signature covers the encoded `header.payload` substring exactly as it
//! appears in the token; it is never rebuilt from the parsed JSON.

use crate::codec;
use crate::key::SIGNATURE_LEN;
use crate::payload::LicensePayload;
use crate::result::{ErrorCode, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Signature algorithm tag every header must carry.
pub const ALGORITHM: &str = "EdDSA";

/// Token type tag every header must carry.
pub const TOKEN_TYPE: &str = "JWT";

/// Header versions this validator understands.
pub const SUPPORTED_VERSIONS: &[u64] = &[1];

/// A structurally valid token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    pub typ: String,
    pub version: u64,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
            version: SUPPORTED_VERSIONS[0],
        }
    }
}

/// A decoded, not yet verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: Header,
    pub payload: LicensePayload,
    pub signature: Vec<u8>,
    /// The encoded `header.payload` prefix of the raw token.
    pub signing_input: String,
}

/// Splits and decodes a token, validating header and payload structure.
///
/// # Errors
///
/// Returns `MALFORMED_TOKEN`, `INVALID_HEADER` or `INVALID_PAYLOAD` as
/// described on [`ErrorCode`].
pub fn decode(token: &str) -> Result<DecodedToken, ValidationError> {
    let (header_b64, payload_b64, signature_b64) = split(token)?;

    let header = parse_header(&decode_json(header_b64, "header")?)?;

    let payload = LicensePayload::from_value(decode_json(payload_b64, "payload")?).ok_or_else(
        || ValidationError::new(ErrorCode::InvalidPayload, "payload must be a JSON object"),
    )?;

    let signature = codec::decode(signature_b64).map_err(|e| {
        ValidationError::new(
            ErrorCode::MalformedToken,
            format!("signature is not valid base64url: {e}"),
        )
    })?;
    if signature.len() != SIGNATURE_LEN {
        return Err(ValidationError::new(
            ErrorCode::InvalidPayload,
            format!(
                "signature must be {SIGNATURE_LEN} bytes, got {}",
                signature.len()
            ),
        ));
    }

    let signing_input = token[..header_b64.len() + 1 + payload_b64.len()].to_string();

    Ok(DecodedToken {
        header,
        payload,
        signature,
        signing_input,
    })
}

/// Extracts the payload without checking the header or signature.
///
/// Only for diagnostics: the result has not been verified.
#[must_use]
pub fn decode_unverified_payload(token: &str) -> Option<LicensePayload> {
    let payload_b64 = token.split('.').nth(1)?;
    let bytes = codec::decode(payload_b64).ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    LicensePayload::from_value(value)
}

fn split(token: &str) -> Result<(&str, &str, &str), ValidationError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) => Ok((h, p, s)),
        _ => Err(ValidationError::new(
            ErrorCode::MalformedToken,
            format!(
                "token must have exactly 3 segments, got {}",
                token.split('.').count()
            ),
        )),
    }
}

fn decode_json(segment: &str, name: &str) -> Result<Value, ValidationError> {
    let bytes = codec::decode(segment).map_err(|e| {
        ValidationError::new(
            ErrorCode::MalformedToken,
            format!("{name} is not valid base64url: {e}"),
        )
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        ValidationError::new(
            ErrorCode::MalformedToken,
            format!("{name} is not valid JSON: {e}"),
        )
    })
}

fn parse_header(value: &Value) -> Result<Header, ValidationError> {
    let invalid = |msg: String| ValidationError::new(ErrorCode::InvalidHeader, msg);

    let Value::Object(fields) = value else {
        return Err(invalid("header must be a JSON object".to_string()));
    };

    let alg = fields.get("alg").and_then(Value::as_str);
    if alg != Some(ALGORITHM) {
        return Err(invalid(format!(
            "unsupported alg {}, expected {ALGORITHM}",
            describe(fields.get("alg"))
        )));
    }

    let typ = fields.get("typ").and_then(Value::as_str);
    if typ != Some(TOKEN_TYPE) {
        return Err(invalid(format!(
            "unsupported typ {}, expected {TOKEN_TYPE}",
            describe(fields.get("typ"))
        )));
    }

    let version = match fields.get("version") {
        None | Some(Value::Null) => return Err(invalid("missing version".to_string())),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| invalid(format!("version must be an integer, got {v}")))?,
    };
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(invalid(format!(
            "unsupported version {version}, supported: {SUPPORTED_VERSIONS:?}"
        )));
    }

    Ok(Header {
        alg: ALGORITHM.to_string(),
        typ: TOKEN_TYPE.to_string(),
        version,
    })
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "<missing>".to_string(), ToString::to_string)
}
