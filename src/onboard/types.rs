use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, LinkageKey, Username};

/// Fixed provenance marker recorded on accounts created by this flow.
pub const ONBOARD_COMMENT: &str = "Onboarded via OIDC provider";

/// Transient identity staged by the provider callback.
///
/// Exists only between the callback and onboarding completion, and is
/// consumed exactly once; never persisted directly.
#[derive(Debug, Clone)]
pub struct PendingIdentity {
    /// Raw serialized claims from the provider (subject, issuer, email,
    /// display name).
    pub claims_json: String,
    /// Opaque bytes encoding the minted secret and the provider token.
    pub token_blob: Vec<u8>,
}

/// Binding between one external identity and one local account.
///
/// Created together with the account, never independently (1:1). The
/// linkage key is unique across all accounts and immutable once bound.
#[derive(Debug, Clone)]
pub struct IdentityLinkage {
    pub key: LinkageKey,
    /// Credential minted once for this account, enabling later
    /// non-interactive authentication. Never logged.
    pub secret: SecretString,
    /// Opaque provider token. Never logged, never re-derived.
    pub provider_token: SecretString,
}

/// Account-creation input for [`AccountStore::onboard`](super::AccountStore::onboard).
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Username,
    pub display_name: String,
    pub email: String,
    /// Provenance marker, normally [`ONBOARD_COMMENT`].
    pub comment: String,
    pub linkage: IdentityLinkage,
}

/// Durable local account as persisted by the store.
#[derive(Debug, Clone)]
pub struct LocalAccount {
    pub id: AccountId,
    pub username: Username,
    pub display_name: String,
    pub email: String,
    pub comment: String,
    pub linkage: IdentityLinkage,
}

impl LocalAccount {
    /// Reduce to the session-safe view: the linkage (secret, provider
    /// token, linkage key) is stripped.
    #[must_use]
    pub fn into_view(self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id,
            username: self.username,
            display_name: self.display_name,
            email: self.email,
            comment: self.comment,
        }
    }
}

/// What the session holds for an onboarded user.
///
/// Carries no secret, token, or linkage fields by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: AccountId,
    pub username: Username,
    pub display_name: String,
    pub email: String,
    pub comment: String,
}
