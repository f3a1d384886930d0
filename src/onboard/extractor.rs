use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;

use super::error::OnboardError;
use super::session::SessionStore;
use super::state::OnboardState;
use super::store::AccountStore;
use crate::types::FlowId;

/// Extract the flow handle from the private flow cookie.
///
/// The cookie is set by the provider-callback step; a request without it
/// arrived outside the expected callback sequence and is rejected with
/// `400 Bad Request`.
impl<S: SessionStore, A: AccountStore> FromRequestParts<OnboardState<S, A>> for FlowId {
    type Rejection = OnboardError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &OnboardState<S, A>,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                OnboardError::BadRequest("no authentication flow in progress".into())
            })?;

        jar.get(&state.settings.flow_cookie_name)
            .map(|c| Self::from(c.value().to_string()))
            .ok_or_else(|| {
                OnboardError::BadRequest("no authentication flow in progress".into())
            })
    }
}
