use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::Error;

/// Decoded form of the opaque token bundle staged in the flow session.
///
/// The provider callback encodes the minted per-account secret together
/// with the opaque provider token into a single byte blob; onboarding
/// decodes it back. Both fields are [`SecretString`]: they never appear
/// in `Debug` output or logs, and are never persisted in session state
/// past a terminal onboarding outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBundle {
    pub secret: SecretString,
    pub provider_token: SecretString,
}

impl TokenBundle {
    #[must_use]
    pub fn new(secret: SecretString, provider_token: SecretString) -> Self {
        Self {
            secret,
            provider_token,
        }
    }

    /// Decode a bundle from the raw session bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenBundle`] if the blob is malformed or
    /// tampered with.
    pub fn decode(blob: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(blob).map_err(|e| Error::TokenBundle(e.to_string()))
    }

    /// Encode the bundle into the byte blob staged in the session.
    ///
    /// The callback side of the flow; also used by the in-memory
    /// reference implementations and tests.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        serde_json::json!({
            "secret": self.secret.expose_secret(),
            "provider_token": self.provider_token.expose_secret(),
        })
        .to_string()
        .into_bytes()
    }
}

/// Mints the per-account secret credential.
///
/// Minted once at onboarding, stored with the identity linkage, and used
/// later for non-interactive authentication. 32 random bytes, base64url.
#[must_use]
pub fn mint_secret() -> SecretString {
    let random_bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes).into()
}
