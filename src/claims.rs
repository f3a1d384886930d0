use serde::Deserialize;

use crate::error::Error;
use crate::types::LinkageKey;

/// Identity claims staged in the session by the provider callback.
///
/// Parsed from the opaque claims JSON with the standard OIDC claim names.
/// `email` and `name` are optional at the provider and default to empty;
/// the onboarding handler rejects an empty username downstream.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct PendingClaims {
    /// Subject identifier, unique per identity at the issuer.
    pub sub: String,
    /// Issuer identifier.
    pub iss: String,
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl PendingClaims {
    /// Parse the claims JSON staged by the provider callback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Claims`] on malformed JSON — a defect in the
    /// upstream provider exchange, not user error.
    pub fn parse(claims_json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(claims_json)?)
    }

    /// The linkage key for this identity: `sub` ⊕ `iss`.
    #[must_use]
    pub fn linkage_key(&self) -> LinkageKey {
        LinkageKey::new(&self.sub, &self.iss)
    }
}
