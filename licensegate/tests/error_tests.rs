use licensegate::{ErrorCode, LicenseError, ValidationError, WarningCode};
use pretty_assertions::assert_eq;

#[test]
fn error_display_config() {
    let err = LicenseError::Config("realm must not be empty".into());
    let msg = format!("{err}");
    assert!(msg.contains("invalid validator configuration"));
    assert!(msg.contains("realm"));
}

#[test]
fn error_display_invalid_public_key() {
    let err = LicenseError::InvalidPublicKey("expected 32 bytes".into());
    assert!(format!("{err}").contains("invalid public key"));
}

#[test]
fn error_display_key_fetch() {
    let err = LicenseError::KeyFetch("HTTP 404".into());
    assert!(format!("{err}").contains("public key fetch failed"));
}

#[test]
fn error_display_invalid_license_names_code() {
    let err = LicenseError::InvalidLicense {
        code: ErrorCode::TokenExpired,
        message: "license expired 2m 5s ago".into(),
    };
    assert_eq!(
        err.to_string(),
        "license is not valid (TOKEN_EXPIRED): license expired 2m 5s ago"
    );
}

#[test]
fn error_from_serde_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err = LicenseError::from(json_err);
    assert!(format!("{err}").contains("serialization error"));
}

#[test]
fn error_debug_impl() {
    let err = LicenseError::Config("x".into());
    assert!(format!("{err:?}").contains("Config"));
}

#[test]
fn error_codes_serialize_screaming_snake_case() {
    let cases = [
        (ErrorCode::MalformedToken, "MALFORMED_TOKEN"),
        (ErrorCode::SignatureVerificationFailed, "SIGNATURE_VERIFICATION_FAILED"),
        (ErrorCode::TokenNotYetValid, "TOKEN_NOT_YET_VALID"),
        (ErrorCode::MissingRequiredFeature, "MISSING_REQUIRED_FEATURE"),
        (ErrorCode::DomainNotAllowed, "DOMAIN_NOT_ALLOWED"),
        (ErrorCode::RevocationUnavailable, "REVOCATION_UNAVAILABLE"),
    ];
    for (code, text) in cases {
        assert_eq!(code.as_str(), text);
        assert_eq!(code.to_string(), text);
        assert_eq!(serde_json::to_value(code).unwrap(), serde_json::json!(text));
    }
}

#[test]
fn warning_codes_serialize_screaming_snake_case() {
    assert_eq!(
        serde_json::to_value(WarningCode::ExpiringSoon).unwrap(),
        serde_json::json!("EXPIRING_SOON")
    );
    assert_eq!(
        serde_json::to_value(WarningCode::ClockSkewApplied).unwrap(),
        serde_json::json!("CLOCK_SKEW_APPLIED")
    );
}

#[test]
fn validation_error_omits_absent_reason() {
    let err = ValidationError::new(ErrorCode::KindMismatch, "expected kind pro");
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["code"], serde_json::json!("KIND_MISMATCH"));
    assert_eq!(value["message"], serde_json::json!("expected kind pro"));
    assert!(value.get("reason").is_none());
}
