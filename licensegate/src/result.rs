//! Validation outcomes: error codes, warnings, and the tagged result.

use crate::payload::LicensePayload;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Machine-readable reason a token failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Wrong segment count or an undecodable segment.
    MalformedToken,
    /// Algorithm, type or version mismatch, or missing version.
    InvalidHeader,
    /// Payload is not an object, or the signature has the wrong length.
    InvalidPayload,
    /// Cryptographic check failed.
    SignatureVerificationFailed,
    /// `jti` or `sub` is on the revocation list.
    TokenRevoked,
    /// Revocation list could not be fetched under a fail-closed policy.
    RevocationUnavailable,
    /// `exp` plus clock skew is in the past.
    TokenExpired,
    /// `nbf` minus clock skew is in the future.
    TokenNotYetValid,
    /// No `exp` claim and expiration-less tokens are not allowed.
    ExpirationRequired,
    /// `iss` is not the license issuer.
    InvalidIssuer,
    /// `aud` does not contain the configured realm.
    InvalidAudience,
    /// A required flag is absent from `flags`.
    MissingRequiredFlag,
    /// `kind` differs from the required kind.
    KindMismatch,
    /// A required key is absent from `features`.
    MissingRequiredFeature,
    /// The configured hostname is not in `allowedDomains`.
    DomainNotAllowed,
}

impl ErrorCode {
    /// Returns the wire name of this code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::SignatureVerificationFailed => "SIGNATURE_VERIFICATION_FAILED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::RevocationUnavailable => "REVOCATION_UNAVAILABLE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenNotYetValid => "TOKEN_NOT_YET_VALID",
            Self::ExpirationRequired => "EXPIRATION_REQUIRED",
            Self::InvalidIssuer => "INVALID_ISSUER",
            Self::InvalidAudience => "INVALID_AUDIENCE",
            Self::MissingRequiredFlag => "MISSING_REQUIRED_FLAG",
            Self::KindMismatch => "KIND_MISMATCH",
            Self::MissingRequiredFeature => "MISSING_REQUIRED_FEATURE",
            Self::DomainNotAllowed => "DOMAIN_NOT_ALLOWED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-blocking observation produced by timing checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// Token expires within the next seven days.
    ExpiringSoon,
    /// Token is past `exp` but inside the clock-skew tolerance.
    ClockSkewApplied,
    /// Token has no `exp` and expiration-less tokens are allowed.
    NoExpiration,
}

/// Which revocation list entry matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    JtiRevoked,
    SubRevoked,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    /// Set only for [`ErrorCode::TokenRevoked`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RevocationReason>,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            reason: None,
        }
    }

    pub(crate) fn revoked(reason: RevocationReason, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::TokenRevoked,
            message: message.into(),
            reason: Some(reason),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: WarningCode,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Outcome of validating one token.
///
/// `Invalid::errors` always starts with `Invalid::error`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid {
        license: LicensePayload,
        warnings: Vec<ValidationWarning>,
    },
    Invalid {
        error: ValidationError,
        errors: Vec<ValidationError>,
        unverified_payload: Option<LicensePayload>,
    },
}

impl ValidationResult {
    pub(crate) fn valid(license: LicensePayload, warnings: Vec<ValidationWarning>) -> Self {
        Self::Valid { license, warnings }
    }

    pub(crate) fn invalid(error: ValidationError, unverified_payload: Option<LicensePayload>) -> Self {
        Self::Invalid {
            errors: vec![error.clone()],
            error,
            unverified_payload,
        }
    }

    /// Builds a failure whose primary error is followed by `rest`.
    pub(crate) fn invalid_with(
        error: ValidationError,
        rest: impl IntoIterator<Item = ValidationError>,
        unverified_payload: Option<LicensePayload>,
    ) -> Self {
        let errors = std::iter::once(error.clone()).chain(rest).collect();
        Self::Invalid {
            error,
            errors,
            unverified_payload,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Returns the verified payload on success.
    #[must_use]
    pub fn license(&self) -> Option<&LicensePayload> {
        match self {
            Self::Valid { license, .. } => Some(license),
            Self::Invalid { .. } => None,
        }
    }

    /// Returns the primary error on failure.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { error, .. } => Some(error),
        }
    }

    /// Returns every error on failure, or an empty slice on success.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Valid { .. } => &[],
            Self::Invalid { errors, .. } => errors,
        }
    }

    /// Returns the warnings on success, or an empty slice on failure.
    #[must_use]
    pub fn warnings(&self) -> &[ValidationWarning] {
        match self {
            Self::Valid { warnings, .. } => warnings,
            Self::Invalid { .. } => &[],
        }
    }

    /// Returns the decoded but unverified payload attached to a failure.
    #[must_use]
    pub fn unverified_payload(&self) -> Option<&LicensePayload> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid {
                unverified_payload, ..
            } => unverified_payload.as_ref(),
        }
    }

    #[must_use]
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings().iter().any(|w| w.code == code)
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid { license, warnings } => {
                let mut s = serializer.serialize_struct("ValidationResult", 3)?;
                s.serialize_field("valid", &true)?;
                s.serialize_field("license", license)?;
                s.serialize_field("warnings", warnings)?;
                s.end()
            }
            Self::Invalid {
                error,
                errors,
                unverified_payload,
            } => {
                let mut s = serializer.serialize_struct("ValidationResult", 4)?;
                s.serialize_field("valid", &false)?;
                s.serialize_field("error", error)?;
                s.serialize_field("errors", errors)?;
                match unverified_payload {
                    Some(payload) => s.serialize_field("unverifiedPayload", payload)?,
                    None => s.skip_field("unverifiedPayload")?,
                }
                s.end()
            }
        }
    }
}
