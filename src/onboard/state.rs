use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::OnboardSettings;
use super::session::SessionStore;
use super::store::AccountStore;

/// Shared state for the onboarding route handlers.
pub(super) struct OnboardState<S, A> {
    pub(super) sessions: Arc<S>,
    pub(super) accounts: Arc<A>,
    pub(super) settings: OnboardSettings,
}

// Manual Clone: avoid derive adding `S: Clone, A: Clone` bounds.
impl<S, A> Clone for OnboardState<S, A> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            accounts: self.accounts.clone(),
            settings: self.settings.clone(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl<S: SessionStore, A: AccountStore> FromRef<OnboardState<S, A>> for Key {
    fn from_ref(state: &OnboardState<S, A>) -> Self {
        state.settings.cookie_key.clone()
    }
}
