//! Hostname allowlist matching.

use serde::{Deserialize, Serialize};

/// Returns true if `hostname` matches `pattern`.
///
/// Matching is case-insensitive. A `*.suffix` pattern matches any hostname
/// ending in `.suffix`, but not the bare suffix itself.
#[must_use]
pub fn matches(hostname: &str, pattern: &str) -> bool {
    let hostname = hostname.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(suffix) => {
            hostname.len() > suffix.len() + 1
                && hostname.ends_with(suffix)
                && hostname.as_bytes()[hostname.len() - suffix.len() - 1] == b'.'
        }
        None => hostname == pattern,
    }
}

/// Applies an `allowedDomains` policy.
///
/// `None` allows everything, an empty list allows nothing.
#[must_use]
pub fn is_domain_allowed(hostname: &str, allowed: Option<&[&str]>) -> bool {
    match allowed {
        None => true,
        Some(patterns) => patterns.iter().any(|p| matches(hostname, p)),
    }
}

/// Why a domain check passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainReason {
    /// The token itself did not validate.
    InvalidLicense,
    /// The license carries no `allowedDomains` claim.
    Unrestricted,
    /// `allowedDomains` is present but empty.
    EmptyAllowlist,
    /// No pattern matched the hostname.
    NotInList,
    /// A pattern matched the hostname.
    Matched,
}

/// Outcome of checking a hostname against a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCheck {
    pub allowed: bool,
    pub reason: DomainReason,
}

impl DomainCheck {
    pub(crate) fn invalid_license() -> Self {
        Self {
            allowed: false,
            reason: DomainReason::InvalidLicense,
        }
    }

    /// Classifies `hostname` against an allowlist taken from a valid license.
    #[must_use]
    pub fn classify(hostname: &str, allowed: Option<&[&str]>) -> Self {
        let reason = match allowed {
            None => DomainReason::Unrestricted,
            Some([]) => DomainReason::EmptyAllowlist,
            Some(patterns) if patterns.iter().any(|p| matches(hostname, p)) => {
                DomainReason::Matched
            }
            Some(_) => DomainReason::NotInList,
        };
        Self {
            allowed: matches!(reason, DomainReason::Unrestricted | DomainReason::Matched),
            reason,
        }
    }
}
