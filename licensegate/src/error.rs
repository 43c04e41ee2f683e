//! Error types for validator construction and bound-license access.
//!
//! Token problems are never reported through [`LicenseError`]; they come back
//! as [`ValidationResult::Invalid`](crate::ValidationResult::Invalid).

use crate::result::ErrorCode;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Validator configuration is inconsistent or incomplete.
    #[error("invalid validator configuration: {0}")]
    Config(String),

    /// The public key could not be parsed as an Ed25519 key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Fetching the public key from its URL failed.
    #[error("public key fetch failed: {0}")]
    KeyFetch(String),

    /// The bound token did not validate, so there is no verified license.
    #[error("license is not valid ({code}): {message}")]
    InvalidLicense {
        /// Primary validation error code.
        code: ErrorCode,
        /// Primary validation error message.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
