//! Signed license token validation.
//!
//! This crate handles:
//! - Token decoding and structural checks
//! - Ed25519 signature verification against a static or fetched public key
//! - Revocation by token id or subject, from an inline or remote list
//! - Identity, timing and entitlement claim checks
//! - Hostname allowlists
//!
//! # Token Format
//!
//! Tokens are formatted as `base64url(header).base64url(payload).base64url(signature)`.
//! The header is `{"alg":"EdDSA","typ":"JWT","version":1}`; the signature
//! covers the encoded `header.payload` substring.
//!
//! # Validators
//!
//! - [`LicenseValidator`] holds policy only and validates tokens per call.
//! - [`BoundLicense`] validates one token up front and answers entitlement
//!   questions synchronously from the captured result.
//!
//! Expected failures are never errors: validation always produces a
//! [`ValidationResult`]. [`LicenseError`] is reserved for building a
//! validator and for asking a failed [`BoundLicense`] for its license.
//!
//! # Revocation
//!
//! A revocation URL is fetched on every validation. If the fetch fails the
//! token is treated as not revoked, unless
//! [`RevocationFailurePolicy::FailClosed`] is configured.

mod bound;
mod claims;
pub mod codec;
mod config;
mod domain;
mod error;
mod key;
mod payload;
mod result;
mod revocation;
pub mod token;
mod validator;

pub use bound::{BoundLicense, ExpirationInfo};
pub use claims::{
    check_identity, check_matchers, check_timing, evaluate as evaluate_claims, ClaimOutcome,
    EXPIRING_SOON_SECS, LICENSE_ISSUER,
};
pub use config::{KeySource, TimingOptions, ValidatorConfig, ValidatorOptions, DEFAULT_CLOCK_SKEW_SECS};
pub use domain::{is_domain_allowed, matches as domain_matches, DomainCheck, DomainReason};
pub use error::{LicenseError, LicenseResult};
pub use key::{PublicKey, SIGNATURE_LEN};
pub use payload::LicensePayload;
pub use result::{
    ErrorCode, RevocationReason, ValidationError, ValidationResult, ValidationWarning, WarningCode,
};
pub use revocation::{RevocationFailurePolicy, RevocationList, RevocationSource};
pub use token::{decode, decode_unverified_payload, DecodedToken, Header};
pub use validator::LicenseValidator;
