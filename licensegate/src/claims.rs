//! Claim evaluation.
//!
//! Identity, timing and matcher checks are independent: each one always runs
//! and the results are concatenated in that order, so a caller sees every
//! violation at once.

use crate::config::{TimingOptions, ValidatorConfig};
use crate::domain;
use crate::payload::LicensePayload;
use crate::result::{ErrorCode, ValidationError, ValidationWarning, WarningCode};

/// The `iss` value every license must carry.
pub const LICENSE_ISSUER: &str = "licensegate";

/// Window before `exp` in which `EXPIRING_SOON` is reported.
pub const EXPIRING_SOON_SECS: i64 = 7 * 24 * 60 * 60;

/// Errors and warnings collected by one or more checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ClaimOutcome {
    fn error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.errors.push(ValidationError::new(code, message));
    }

    fn warning(&mut self, code: WarningCode, message: impl Into<String>) {
        self.warnings.push(ValidationWarning::new(code, message));
    }

    fn merge(&mut self, other: ClaimOutcome) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Runs every claim check against `payload` at time `now`.
#[must_use]
pub fn evaluate(payload: &LicensePayload, config: &ValidatorConfig, now: i64) -> ClaimOutcome {
    let mut outcome = check_identity(payload, &config.realm);
    outcome.merge(check_timing(
        payload,
        &config.timing,
        config.allow_no_expiration,
        now,
    ));
    outcome.merge(check_matchers(payload, config));
    outcome
}

/// Issuer must be [`LICENSE_ISSUER`]; audience must contain `realm`.
#[must_use]
pub fn check_identity(payload: &LicensePayload, realm: &str) -> ClaimOutcome {
    let mut outcome = ClaimOutcome::default();

    match payload.issuer() {
        Some(LICENSE_ISSUER) => {}
        Some(other) => outcome.error(
            ErrorCode::InvalidIssuer,
            format!("issuer {other:?} is not {LICENSE_ISSUER:?}"),
        ),
        None => outcome.error(
            ErrorCode::InvalidIssuer,
            format!("missing issuer, expected {LICENSE_ISSUER:?}"),
        ),
    }

    if !payload.audience().contains(&realm) {
        outcome.error(
            ErrorCode::InvalidAudience,
            format!("audience does not include realm {realm:?}"),
        );
    }

    outcome
}

/// Checks `exp` and `nbf` with clock-skew tolerance.
#[must_use]
pub fn check_timing(
    payload: &LicensePayload,
    timing: &TimingOptions,
    allow_no_expiration: bool,
    now: i64,
) -> ClaimOutcome {
    let mut outcome = ClaimOutcome::default();
    let skew = timing.clock_skew_secs;

    match payload.expires_at() {
        Some(exp) if now > exp.saturating_add(skew) => outcome.error(
            ErrorCode::TokenExpired,
            format!("license expired {} ago", format_duration(now.saturating_sub(exp))),
        ),
        Some(exp) => {
            let remaining = exp.saturating_sub(now);
            if remaining > 0 && remaining <= EXPIRING_SOON_SECS {
                outcome.warning(
                    WarningCode::ExpiringSoon,
                    format!("license expires in {}", format_duration(remaining)),
                );
            }
            if exp < now {
                outcome.warning(
                    WarningCode::ClockSkewApplied,
                    format!(
                        "license expired {} ago but is within the {skew}s clock skew",
                        format_duration(now.saturating_sub(exp))
                    ),
                );
            }
        }
        None if allow_no_expiration => {
            outcome.warning(WarningCode::NoExpiration, "license has no expiration");
        }
        None => outcome.error(
            ErrorCode::ExpirationRequired,
            "license has no expiration and one is required",
        ),
    }

    if let Some(nbf) = payload.not_before() {
        if now < nbf.saturating_sub(skew) {
            outcome.error(
                ErrorCode::TokenNotYetValid,
                format!("license becomes valid in {}", format_duration(nbf.saturating_sub(now))),
            );
        }
    }

    outcome
}

/// Checks required flags, kind, feature keys and the configured hostname.
#[must_use]
pub fn check_matchers(payload: &LicensePayload, config: &ValidatorConfig) -> ClaimOutcome {
    let mut outcome = ClaimOutcome::default();

    let flags = payload.flags();
    for flag in &config.required_flags {
        if !flags.contains(&flag.as_str()) {
            outcome.error(
                ErrorCode::MissingRequiredFlag,
                format!("missing required flag {flag:?}"),
            );
        }
    }

    if let Some(required) = &config.required_kind {
        if payload.kind() != Some(required.as_str()) {
            outcome.error(
                ErrorCode::KindMismatch,
                format!(
                    "license kind {} does not match required kind {required:?}",
                    payload
                        .kind()
                        .map_or_else(|| "<missing>".to_string(), |k| format!("{k:?}"))
                ),
            );
        }
    }

    for feature in &config.required_features {
        if !payload.has_feature(feature) {
            outcome.error(
                ErrorCode::MissingRequiredFeature,
                format!("missing required feature {feature:?}"),
            );
        }
    }

    if let Some(hostname) = &config.hostname {
        let allowed = payload.allowed_domains();
        if !domain::is_domain_allowed(hostname, allowed.as_deref()) {
            outcome.error(
                ErrorCode::DomainNotAllowed,
                format!("domain {hostname:?} is not allowed by this license"),
            );
        }
    }

    outcome
}

/// Renders a second count as a short human duration, e.g. `2d 3h`.
#[must_use]
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let (days, hours, minutes, seconds) = (
        secs / 86_400,
        secs % 86_400 / 3_600,
        secs % 3_600 / 60,
        secs % 60,
    );
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
