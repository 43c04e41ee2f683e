//! Validator configuration.
//!
//! [`ValidatorConfig`] is the typed, already-consistent policy. Mutually
//! exclusive sources are tagged variants, so a config that has been built
//! can never hold two key sources or two revocation sources.
//! [`ValidatorOptions`] is the flat JSON form and is checked once when
//! converted.

use crate::error::{LicenseError, LicenseResult};
use crate::key::PublicKey;
use crate::revocation::{RevocationFailurePolicy, RevocationList, RevocationSource};
use serde::{Deserialize, Serialize};

/// Default tolerance applied to `exp` and `nbf`, in seconds.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Where the verification key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Static(PublicKey),
    /// Fetched once when the validator is built; the body is the key as text.
    Url(String),
}

/// Clock settings for timing claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingOptions {
    /// Seconds of tolerance for `exp` and `nbf`.
    #[serde(rename = "clockSkew")]
    pub clock_skew_secs: i64,
    /// Fixed "now" (seconds since epoch) instead of the wall clock.
    pub current_time: Option<i64>,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            current_time: None,
        }
    }
}

impl TimingOptions {
    /// Returns the configured time, or the wall clock.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.current_time
            .unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}

/// Immutable validation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Consuming application; must appear in the token audience.
    pub realm: String,
    pub key: KeySource,
    pub revocation: RevocationSource,
    pub revocation_failure: RevocationFailurePolicy,
    pub required_flags: Vec<String>,
    pub required_kind: Option<String>,
    pub required_features: Vec<String>,
    /// Hostname checked against the `allowedDomains` claim during validation.
    pub hostname: Option<String>,
    pub timing: TimingOptions,
    pub allow_no_expiration: bool,
}

impl ValidatorConfig {
    /// Creates a config with no entitlement requirements and no revocation.
    pub fn new(realm: impl Into<String>, key: KeySource) -> Self {
        Self {
            realm: realm.into(),
            key,
            revocation: RevocationSource::None,
            revocation_failure: RevocationFailurePolicy::default(),
            required_flags: Vec::new(),
            required_kind: None,
            required_features: Vec::new(),
            hostname: None,
            timing: TimingOptions::default(),
            allow_no_expiration: false,
        }
    }

    /// Parses the JSON configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Serialization`] for malformed JSON and
    /// [`LicenseError::Config`] for inconsistent options.
    pub fn from_json(json: &str) -> LicenseResult<Self> {
        let options: ValidatorOptions = serde_json::from_str(json)?;
        Self::try_from(options)
    }

    #[must_use]
    pub fn with_revocation(mut self, source: RevocationSource) -> Self {
        self.revocation = source;
        self
    }

    #[must_use]
    pub fn with_revocation_failure(mut self, policy: RevocationFailurePolicy) -> Self {
        self.revocation_failure = policy;
        self
    }

    #[must_use]
    pub fn with_required_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_required_kind(mut self, kind: impl Into<String>) -> Self {
        self.required_kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_required_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_features = features.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: TimingOptions) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_current_time(mut self, now: i64) -> Self {
        self.timing.current_time = Some(now);
        self
    }

    #[must_use]
    pub fn allow_no_expiration(mut self, allow: bool) -> Self {
        self.allow_no_expiration = allow;
        self
    }

    fn check(&self) -> LicenseResult<()> {
        if self.realm.trim().is_empty() {
            return Err(LicenseError::Config("realm must not be empty".to_string()));
        }
        if self.timing.clock_skew_secs < 0 {
            return Err(LicenseError::Config(format!(
                "clock skew must not be negative, got {}",
                self.timing.clock_skew_secs
            )));
        }
        if let KeySource::Url(url) = &self.key {
            check_url("publicKeyUrl", url)?;
        }
        if let RevocationSource::Url(url) = &self.revocation {
            check_url("revocationUrl", url)?;
        }
        Ok(())
    }

    pub(crate) fn validated(self) -> LicenseResult<Self> {
        self.check()?;
        Ok(self)
    }
}

fn check_url(field: &str, url: &str) -> LicenseResult<()> {
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| LicenseError::Config(format!("{field} is not a valid URL: {e}")))
}

/// Flat, serializable configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    pub realm: String,
    pub public_key: Option<String>,
    pub public_key_url: Option<String>,
    pub revocation: Option<RevocationList>,
    pub revocation_url: Option<String>,
    pub revocation_failure: RevocationFailurePolicy,
    pub required_flags: Vec<String>,
    pub required_kind: Option<String>,
    pub required_features: Vec<String>,
    pub hostname: Option<String>,
    pub timing: TimingOptions,
    pub allow_no_expiration: bool,
}

impl TryFrom<ValidatorOptions> for ValidatorConfig {
    type Error = LicenseError;

    fn try_from(options: ValidatorOptions) -> LicenseResult<Self> {
        let key = match (options.public_key, options.public_key_url) {
            (Some(key), None) => KeySource::Static(PublicKey::parse(&key)?),
            (None, Some(url)) => KeySource::Url(url),
            (Some(_), Some(_)) => {
                return Err(LicenseError::Config(
                    "publicKey and publicKeyUrl are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(LicenseError::Config(
                    "one of publicKey or publicKeyUrl is required".to_string(),
                ));
            }
        };

        let revocation = match (options.revocation, options.revocation_url) {
            (None, None) => RevocationSource::None,
            (Some(list), None) => RevocationSource::Static(list),
            (None, Some(url)) => RevocationSource::Url(url),
            (Some(_), Some(_)) => {
                return Err(LicenseError::Config(
                    "revocation and revocationUrl are mutually exclusive".to_string(),
                ));
            }
        };

        let config = Self {
            realm: options.realm,
            key,
            revocation,
            revocation_failure: options.revocation_failure,
            required_flags: options.required_flags,
            required_kind: options.required_kind,
            required_features: options.required_features,
            hostname: options.hostname,
            timing: options.timing,
            allow_no_expiration: options.allow_no_expiration,
        };
        config.check()?;
        Ok(config)
    }
}
