use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;

use super::config::OnboardConfig;
use super::error::OnboardError;
use super::handler;
use super::session::SessionStore;
use super::state::OnboardState;
use super::store::AccountStore;
use crate::types::FlowId;

/// Create the onboarding router.
///
/// Mounts the onboarding handler at the configured path (default
/// `/oidc/onboard`). The provider callback hands the user-agent over to
/// this route once it has staged the pending identity; both GET (via
/// redirect) and POST are accepted.
pub fn onboard_routes<S, A>(config: OnboardConfig, sessions: S, accounts: A) -> Router
where
    S: SessionStore,
    A: AccountStore,
{
    let onboard_path = config.settings.onboard_path.clone();

    let state = OnboardState {
        sessions: Arc::new(sessions),
        accounts: Arc::new(accounts),
        settings: config.settings,
    };

    Router::new()
        .route(&onboard_path, get(onboard::<S, A>).post(onboard::<S, A>))
        .with_state(state)
}

async fn onboard<S: SessionStore, A: AccountStore>(
    State(state): State<OnboardState<S, A>>,
    flow: FlowId,
) -> Result<Response, OnboardError> {
    handler::onboard_auto_user(
        state.sessions.as_ref(),
        state.accounts.as_ref(),
        &flow,
        &state.settings.success_redirect,
    )
    .await
}
