use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::OnboardError;
use super::types::{AuthenticatedUser, PendingIdentity};
use crate::types::FlowId;

/// Error type consumer store implementations report with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Typed session keys the onboarding flow cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Raw claims JSON staged by the provider callback.
    PendingClaims,
    /// Opaque token bundle staged by the provider callback.
    PendingToken,
    /// Reduced view of the onboarded account.
    AuthenticatedUser,
}

impl SessionKey {
    /// Stable storage name for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingClaims => "oidc_pending_claims",
            Self::PendingToken => "oidc_pending_token",
            Self::AuthenticatedUser => "oidc_authenticated_user",
        }
    }
}

/// Opaque typed session value.
///
/// Each key is written with one variant only; reading a key through the
/// wrong variant is the "wrong shape" failure the handler guards against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionValue {
    Text(String),
    Bytes(Vec<u8>),
    Json(JsonValue),
}

impl SessionValue {
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Consumer-provided per-flow session storage.
///
/// Keyed by `(FlowId, SessionKey)`; values are opaque typed blobs with
/// per-authentication-flow lifetime. One logical caller per flow: the
/// flow is not expected to be mutated by two concurrent requests, and
/// implementations need not defend against that.
///
/// # Example
///
/// ```rust,ignore
/// impl SessionStore for MyAppState {
///     async fn get(&self, flow: &FlowId, key: SessionKey)
///         -> Result<Option<SessionValue>, BoxError>
///     {
///         self.redis.get(format!("{flow}:{}", key.as_str())).await
///     }
///     // set / remove analogous
/// }
/// ```
pub trait SessionStore: Send + Sync + 'static {
    /// Read a value, `None` if absent.
    fn get(
        &self,
        flow: &FlowId,
        key: SessionKey,
    ) -> impl Future<Output = Result<Option<SessionValue>, BoxError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(
        &self,
        flow: &FlowId,
        key: SessionKey,
        value: SessionValue,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Remove a value; removing an absent key is not an error.
    fn remove(
        &self,
        flow: &FlowId,
        key: SessionKey,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl<S: SessionStore> SessionStore for std::sync::Arc<S> {
    fn get(
        &self,
        flow: &FlowId,
        key: SessionKey,
    ) -> impl Future<Output = Result<Option<SessionValue>, BoxError>> + Send {
        S::get(self, flow, key)
    }

    fn set(
        &self,
        flow: &FlowId,
        key: SessionKey,
        value: SessionValue,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        S::set(self, flow, key, value)
    }

    fn remove(
        &self,
        flow: &FlowId,
        key: SessionKey,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        S::remove(self, flow, key)
    }
}

/// One authentication flow's view of the session store, and the only
/// mutator of the onboarding session keys.
///
/// The flow is an explicit state machine, `AwaitingOnboarding →
/// {Completed | Rejected}`:
///
/// | transition | session effect |
/// |---|---|
/// | [`pending_identity`](Self::pending_identity) | reads both pending keys, no mutation |
/// | [`complete`](Self::complete) | writes the authenticated-user view, removes both pending keys |
/// | [`reject`](Self::reject) | removes both pending keys |
///
/// Username-validation failures and duplicate conflicts perform no
/// transition at all: the pending identity stays in session so the flow
/// can resubmit without re-authenticating.
pub struct FlowSession<'a, S> {
    store: &'a S,
    flow: &'a FlowId,
}

impl<'a, S: SessionStore> FlowSession<'a, S> {
    pub fn new(store: &'a S, flow: &'a FlowId) -> Self {
        Self { store, flow }
    }

    async fn get(&self, key: SessionKey) -> Result<Option<SessionValue>, OnboardError> {
        self.store
            .get(self.flow, key)
            .await
            .map_err(|e| OnboardError::Session(e.to_string()))
    }

    async fn remove(&self, key: SessionKey) -> Result<(), OnboardError> {
        self.store
            .remove(self.flow, key)
            .await
            .map_err(|e| OnboardError::Session(e.to_string()))
    }

    /// Read the staged pending identity without consuming it.
    ///
    /// # Errors
    ///
    /// [`OnboardError::BadRequest`] if either pending key is absent or
    /// of the wrong shape — the handler was invoked outside the expected
    /// provider-callback sequence.
    pub async fn pending_identity(&self) -> Result<PendingIdentity, OnboardError> {
        let claims_json = self
            .get(SessionKey::PendingClaims)
            .await?
            .and_then(SessionValue::into_text)
            .ok_or_else(|| {
                OnboardError::BadRequest("no pending OIDC claims in session".into())
            })?;
        let token_blob = self
            .get(SessionKey::PendingToken)
            .await?
            .and_then(SessionValue::into_bytes)
            .ok_or_else(|| {
                OnboardError::BadRequest("no pending OIDC token in session".into())
            })?;
        Ok(PendingIdentity {
            claims_json,
            token_blob,
        })
    }

    /// `AwaitingOnboarding → Completed`: store the reduced view under the
    /// authenticated-user key and discard the pending identity. Both
    /// pending keys go — the minted secret must not outlive the flow.
    pub async fn complete(&self, user: &AuthenticatedUser) -> Result<(), OnboardError> {
        let value = serde_json::to_value(user)
            .map_err(|e| OnboardError::Internal(format!("serialize user view: {e}")))?;
        self.store
            .set(self.flow, SessionKey::AuthenticatedUser, SessionValue::Json(value))
            .await
            .map_err(|e| OnboardError::Session(e.to_string()))?;
        self.remove(SessionKey::PendingClaims).await?;
        self.remove(SessionKey::PendingToken).await?;
        Ok(())
    }

    /// `AwaitingOnboarding → Rejected`: discard the pending identity
    /// after a terminal persistence failure. No retry path remains.
    pub async fn reject(&self) -> Result<(), OnboardError> {
        self.remove(SessionKey::PendingClaims).await?;
        self.remove(SessionKey::PendingToken).await?;
        Ok(())
    }
}
