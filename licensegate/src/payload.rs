//! The license payload: an open JSON object with typed accessors for the
//! recognized claims.
//!
//! Unknown keys are kept verbatim so a validated license round-trips exactly
//! as it was issued.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded license payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicensePayload(Map<String, Value>);

impl LicensePayload {
    /// Wraps a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Returns a raw claim by name.
    #[must_use]
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.str_claim("iss")
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    /// Returns `aud` normalized to a list; a single string becomes one entry.
    #[must_use]
    pub fn audience(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Expiration timestamp (seconds since epoch).
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.time_claim("exp")
    }

    /// Not-before timestamp (seconds since epoch).
    #[must_use]
    pub fn not_before(&self) -> Option<i64> {
        self.time_claim("nbf")
    }

    /// Issued-at timestamp (seconds since epoch).
    #[must_use]
    pub fn issued_at(&self) -> Option<i64> {
        self.time_claim("iat")
    }

    #[must_use]
    pub fn token_id(&self) -> Option<&str> {
        self.str_claim("jti")
    }

    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.str_claim("kind")
    }

    /// Returns the string entries of `flags`; non-string entries are skipped.
    #[must_use]
    pub fn flags(&self) -> Vec<&str> {
        self.0
            .get("flags")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags().contains(&flag)
    }

    #[must_use]
    pub fn features(&self) -> Option<&Map<String, Value>> {
        self.0.get("features").and_then(Value::as_object)
    }

    /// Returns the value stored under a feature key.
    #[must_use]
    pub fn feature(&self, key: &str) -> Option<&Value> {
        self.features().and_then(|features| features.get(key))
    }

    #[must_use]
    pub fn has_feature(&self, key: &str) -> bool {
        self.feature(key).is_some()
    }

    /// Returns the domain allowlist.
    ///
    /// `None` means the claim is absent (unrestricted); an empty list denies
    /// every hostname.
    #[must_use]
    pub fn allowed_domains(&self) -> Option<Vec<&str>> {
        self.0
            .get("allowedDomains")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    fn str_claim(&self, claim: &str) -> Option<&str> {
        self.0.get(claim).and_then(Value::as_str)
    }

    // Fractional timestamps are truncated toward zero.
    fn time_claim(&self, claim: &str) -> Option<i64> {
        let value = self.0.get(claim)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
    }
}

impl From<Map<String, Value>> for LicensePayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> LicensePayload {
        LicensePayload::from_value(value).unwrap()
    }

    #[test]
    fn non_object_rejected() {
        assert!(LicensePayload::from_value(json!([1, 2])).is_none());
        assert!(LicensePayload::from_value(json!("x")).is_none());
        assert!(LicensePayload::from_value(Value::Null).is_none());
    }

    #[test]
    fn audience_normalization() {
        assert_eq!(payload(json!({"aud": "app1"})).audience(), vec!["app1"]);
        assert_eq!(
            payload(json!({"aud": ["app1", "app2"]})).audience(),
            vec!["app1", "app2"]
        );
        assert!(payload(json!({"aud": 7})).audience().is_empty());
        assert!(payload(json!({})).audience().is_empty());
    }

    #[test]
    fn time_claims_accept_floats() {
        let p = payload(json!({"exp": 1700000000.75, "nbf": 1600000000}));
        assert_eq!(p.expires_at(), Some(1_700_000_000));
        assert_eq!(p.not_before(), Some(1_600_000_000));
        assert_eq!(p.issued_at(), None);
    }

    #[test]
    fn non_numeric_exp_is_absent() {
        assert_eq!(payload(json!({"exp": "tomorrow"})).expires_at(), None);
    }

    #[test]
    fn entitlement_accessors() {
        let p = payload(json!({
            "kind": "pro",
            "flags": ["export", 3, "sync"],
            "features": {"seats": 5, "beta": false},
            "allowedDomains": ["*.example.org"],
        }));
        assert_eq!(p.kind(), Some("pro"));
        assert_eq!(p.flags(), vec!["export", "sync"]);
        assert!(p.has_flag("sync"));
        assert!(!p.has_flag("admin"));
        assert_eq!(p.feature("seats"), Some(&json!(5)));
        assert!(p.has_feature("beta"));
        assert!(!p.has_feature("missing"));
        assert_eq!(p.allowed_domains(), Some(vec!["*.example.org"]));
    }

    #[test]
    fn unknown_keys_preserved() {
        let original = json!({"sub": "u1", "custom": {"nested": [1, 2, 3]}});
        let p = payload(original.clone());
        assert_eq!(serde_json::to_value(&p).unwrap(), original);
    }

    #[test]
    fn map_views_expose_every_claim() {
        let p = payload(json!({"sub": "u1", "custom": true}));
        assert_eq!(p.as_map().len(), 2);
        assert_eq!(p.as_map().get("custom"), Some(&json!(true)));

        let map = p.clone().into_map();
        assert_eq!(LicensePayload::from(map), p);
    }
}
