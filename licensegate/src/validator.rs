//! Validation pipeline and the unbound validator.
//!
//! The pipeline runs Decode → VerifySignature → CheckRevocation →
//! EvaluateClaims; the first failing stage ends the run. It holds no state of
//! its own, so [`LicenseValidator`] and [`BoundLicense`] are thin wrappers
//! around it. [`LicenseValidator::validate_at`] is the public entry point.

use crate::bound::BoundLicense;
use crate::claims;
use crate::config::{KeySource, ValidatorConfig};
use crate::domain::DomainCheck;
use crate::error::{LicenseError, LicenseResult};
use crate::key::PublicKey;
use crate::result::{ErrorCode, ValidationError, ValidationResult};
use crate::revocation;
use crate::token;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};

/// Validates `token` against `config` at time `now`.
///
/// Every outcome, including malformed input, is returned as a
/// [`ValidationResult`]; this function never fails.
pub(crate) async fn validate_token(
    token: &str,
    config: &ValidatorConfig,
    key: &PublicKey,
    client: &Client,
    now: i64,
) -> ValidationResult {
    let decoded = match token::decode(token.trim()) {
        Ok(decoded) => decoded,
        Err(error) => {
            debug!(code = %error.code, "Token decode failed");
            return ValidationResult::invalid(error, token::decode_unverified_payload(token.trim()));
        }
    };

    if !key.verify(decoded.signing_input.as_bytes(), &decoded.signature) {
        debug!("Token signature verification failed");
        return ValidationResult::invalid(
            ValidationError::new(
                ErrorCode::SignatureVerificationFailed,
                "signature does not match the configured public key",
            ),
            Some(decoded.payload),
        );
    }

    if let Some(error) = revocation::check(
        client,
        &config.revocation,
        config.revocation_failure,
        &decoded.payload,
    )
    .await
    {
        debug!(code = %error.code, reason = ?error.reason, "Token rejected by revocation check");
        return ValidationResult::invalid(error, Some(decoded.payload));
    }

    let outcome = claims::evaluate(&decoded.payload, config, now);
    let mut errors = outcome.errors.into_iter();
    match errors.next() {
        None => ValidationResult::valid(decoded.payload, outcome.warnings),
        Some(first) => {
            debug!(
                code = %first.code,
                error_count = errors.len() + 1,
                "Token claims rejected"
            );
            ValidationResult::invalid_with(first, errors, Some(decoded.payload))
        }
    }
}

#[derive(Debug)]
struct Resolved {
    config: ValidatorConfig,
    key: PublicKey,
}

/// Validator holding only policy; tokens are supplied per call.
///
/// Cloning is cheap and clones share the same resolved configuration.
#[derive(Debug, Clone)]
pub struct LicenseValidator {
    inner: Arc<Resolved>,
    client: Client,
}

impl LicenseValidator {
    /// Resolves `config` into a ready validator, fetching the public key if
    /// it is configured by URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is inconsistent or the key cannot be
    /// fetched or parsed.
    pub async fn new(config: ValidatorConfig) -> LicenseResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| LicenseError::Config(format!("failed to create HTTP client: {e}")))?;
        Self::with_client(config, client).await
    }

    /// Like [`LicenseValidator::new`] with a caller-supplied HTTP client.
    ///
    /// # Errors
    ///
    /// Same as [`LicenseValidator::new`].
    pub async fn with_client(config: ValidatorConfig, client: Client) -> LicenseResult<Self> {
        let config = config.validated()?;
        let key = match &config.key {
            KeySource::Static(key) => *key,
            KeySource::Url(url) => fetch_public_key(&client, url).await?,
        };
        Ok(Self {
            inner: Arc::new(Resolved { config, key }),
            client,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.inner.config
    }

    /// The resolved verification key.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.inner.key
    }

    /// Validates `token` at the configured or wall-clock time.
    pub async fn validate(&self, token: &str) -> ValidationResult {
        self.validate_at(token, self.inner.config.timing.now()).await
    }

    /// Validates `token` as of `now` (seconds since epoch).
    pub async fn validate_at(&self, token: &str, now: i64) -> ValidationResult {
        validate_token(token, &self.inner.config, &self.inner.key, &self.client, now).await
    }

    /// Validates `token` and classifies `hostname` against its
    /// `allowedDomains` claim.
    pub async fn check_domain(&self, token: &str, hostname: &str) -> DomainCheck {
        domain_check(&self.validate(token).await, hostname)
    }

    /// Validates `token` once and returns a bound view over the result.
    pub async fn bind(&self, token: impl Into<String>) -> BoundLicense {
        BoundLicense::new(self.clone(), token).await
    }
}

pub(crate) fn domain_check(result: &ValidationResult, hostname: &str) -> DomainCheck {
    match result.license() {
        Some(license) => DomainCheck::classify(hostname, license.allowed_domains().as_deref()),
        None => DomainCheck::invalid_license(),
    }
}

async fn fetch_public_key(client: &Client, url: &str) -> LicenseResult<PublicKey> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LicenseError::KeyFetch(format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        return Err(LicenseError::KeyFetch(format!(
            "{url} returned HTTP {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| LicenseError::KeyFetch(format!("failed to read body from {url}: {e}")))?;

    let key = PublicKey::parse(body.trim())?;
    info!(url = %url, "Public key fetched");
    Ok(key)
}
