//! A validator bound to one pre-validated token.
//!
//! Every accessor reads the captured [`ValidationResult`]; none of them
//! performs I/O. Accessors that describe entitlements return the "not
//! entitled" answer when the token did not validate.

use crate::domain::DomainCheck;
use crate::error::{LicenseError, LicenseResult};
use crate::payload::LicensePayload;
use crate::result::{ValidationError, ValidationResult, ValidationWarning};
use crate::validator::{domain_check, LicenseValidator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expiration details of a verified license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationInfo {
    /// `exp` claim, or `None` for a license without expiration.
    pub expires_at: Option<i64>,
    /// Seconds until `exp`; negative once it has passed.
    pub seconds_remaining: Option<i64>,
    pub expired: bool,
}

/// The outcome of validating one specific token, frozen at construction.
#[derive(Debug, Clone)]
pub struct BoundLicense {
    validator: LicenseValidator,
    token: String,
    result: ValidationResult,
    validated_at: i64,
}

impl BoundLicense {
    /// Runs the full validation pipeline once for `token`.
    pub async fn new(validator: LicenseValidator, token: impl Into<String>) -> Self {
        let token = token.into();
        let validated_at = validator.config().timing.now();
        let result = validator.validate_at(&token, validated_at).await;
        Self {
            validator,
            token,
            result,
            validated_at,
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    /// Time (seconds since epoch) the token was validated at.
    #[must_use]
    pub fn validated_at(&self) -> i64 {
        self.validated_at
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        self.result.error()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        self.result.errors()
    }

    #[must_use]
    pub fn warnings(&self) -> &[ValidationWarning] {
        self.result.warnings()
    }

    /// Returns the verified payload.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidLicense`] carrying the primary
    /// validation error if the token did not validate.
    pub fn license(&self) -> LicenseResult<&LicensePayload> {
        match &self.result {
            ValidationResult::Valid { license, .. } => Ok(license),
            ValidationResult::Invalid { error, .. } => Err(LicenseError::InvalidLicense {
                code: error.code,
                message: error.message.clone(),
            }),
        }
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.result.license().and_then(LicensePayload::subject)
    }

    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.result.license().and_then(LicensePayload::kind)
    }

    #[must_use]
    pub fn flags(&self) -> Vec<&str> {
        self.result
            .license()
            .map(LicensePayload::flags)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.result.license().is_some_and(|l| l.has_flag(flag))
    }

    #[must_use]
    pub fn feature(&self, key: &str) -> Option<&Value> {
        self.result.license().and_then(|l| l.feature(key))
    }

    #[must_use]
    pub fn has_feature(&self, key: &str) -> bool {
        self.result.license().is_some_and(|l| l.has_feature(key))
    }

    /// Classifies `hostname` against the license's `allowedDomains`.
    #[must_use]
    pub fn check_domain(&self, hostname: &str) -> DomainCheck {
        domain_check(&self.result, hostname)
    }

    /// Expiration details relative to the configured or wall-clock time;
    /// `None` when the token did not validate.
    #[must_use]
    pub fn expiration(&self) -> Option<ExpirationInfo> {
        self.expiration_at(self.validator.config().timing.now())
    }

    /// Expiration details relative to `now`.
    #[must_use]
    pub fn expiration_at(&self, now: i64) -> Option<ExpirationInfo> {
        let license = self.result.license()?;
        let expires_at = license.expires_at();
        let seconds_remaining = expires_at.map(|exp| exp.saturating_sub(now));
        Some(ExpirationInfo {
            expires_at,
            seconds_remaining,
            expired: seconds_remaining.is_some_and(|s| s < 0),
        })
    }

    /// Validates the same token again and returns a new bound instance.
    ///
    /// Timing claims go stale, so long-lived holders should call this
    /// periodically. `self` is left untouched.
    pub async fn revalidate(&self) -> Self {
        Self::new(self.validator.clone(), self.token.clone()).await
    }

    /// Returns an unbound validator sharing this instance's configuration.
    #[must_use]
    pub fn unbind(&self) -> LicenseValidator {
        self.validator.clone()
    }
}
