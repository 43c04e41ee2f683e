//! Revocation lists.
//!
//! A list is either supplied inline or fetched from a URL on every check.
//! When a fetch fails the check is skipped (fail-open) unless the validator
//! is configured with [`RevocationFailurePolicy::FailClosed`].

use crate::payload::LicensePayload;
use crate::result::{ErrorCode, RevocationReason, ValidationError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Explicit denylist of token ids and subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Vec<String>>,
}

impl RevocationList {
    /// Returns the first matching entry, checking `jti` before `sub`.
    #[must_use]
    pub fn check(&self, payload: &LicensePayload) -> Option<ValidationError> {
        if let (Some(jti), Some(revoked)) = (payload.token_id(), &self.jti) {
            if revoked.iter().any(|r| r == jti) {
                return Some(ValidationError::revoked(
                    RevocationReason::JtiRevoked,
                    format!("token id {jti} has been revoked"),
                ));
            }
        }
        if let (Some(sub), Some(revoked)) = (payload.subject(), &self.sub) {
            if revoked.iter().any(|r| r == sub) {
                return Some(ValidationError::revoked(
                    RevocationReason::SubRevoked,
                    format!("subject {sub} has been revoked"),
                ));
            }
        }
        None
    }
}

/// Where the revocation list comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RevocationSource {
    #[default]
    None,
    Static(RevocationList),
    /// Fetched fresh on every check.
    Url(String),
}

/// What to do when a remote revocation list cannot be obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevocationFailurePolicy {
    /// Treat the token as not revoked.
    #[default]
    #[serde(rename = "open")]
    FailOpen,
    /// Reject the token with `REVOCATION_UNAVAILABLE`.
    #[serde(rename = "closed")]
    FailClosed,
}

/// Checks a payload against the configured source.
pub(crate) async fn check(
    client: &Client,
    source: &RevocationSource,
    policy: RevocationFailurePolicy,
    payload: &LicensePayload,
) -> Option<ValidationError> {
    match source {
        RevocationSource::None => None,
        RevocationSource::Static(list) => list.check(payload),
        RevocationSource::Url(url) => match fetch(client, url).await {
            Some(list) => list.check(payload),
            None => match policy {
                RevocationFailurePolicy::FailOpen => None,
                RevocationFailurePolicy::FailClosed => Some(ValidationError::new(
                    ErrorCode::RevocationUnavailable,
                    format!("revocation list at {url} is unavailable"),
                )),
            },
        },
    }
}

/// Fetches a revocation list; any failure yields `None`.
pub(crate) async fn fetch(client: &Client, url: &str) -> Option<RevocationList> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url = %url, error = %e, "Revocation list fetch failed");
            return None;
        }
    };

    if !response.status().is_success() {
        warn!(url = %url, status = %response.status(), "Revocation list fetch returned an error status");
        return None;
    }

    match response.json::<RevocationList>().await {
        Ok(list) => {
            debug!(
                url = %url,
                jti_count = list.jti.as_ref().map_or(0, Vec::len),
                sub_count = list.sub.as_ref().map_or(0, Vec::len),
                "Revocation list fetched"
            );
            Some(list)
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Revocation list could not be parsed");
            None
        }
    }
}
