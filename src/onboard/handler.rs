use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::error::OnboardError;
use super::session::{FlowSession, SessionStore};
use super::store::{AccountStore, StoreError};
use super::types::{IdentityLinkage, NewAccount, ONBOARD_COMMENT};
use crate::claims::PendingClaims;
use crate::token::TokenBundle;
use crate::types::{FlowId, Username};

/// Onboard the user authenticated by the OIDC provider callback.
///
/// Consumes the pending identity staged in the flow session, creates the
/// local account bound to the external identity, and leaves the session
/// holding only the reduced authenticated-user view. Concurrency safety
/// is delegated entirely to [`AccountStore::onboard`]'s atomic
/// uniqueness check; no lock is taken here.
pub(super) async fn onboard_auto_user<S, A>(
    sessions: &S,
    accounts: &A,
    flow: &FlowId,
    success_redirect: &str,
) -> Result<Response, OnboardError>
where
    S: SessionStore,
    A: AccountStore,
{
    let session = FlowSession::new(sessions, flow);
    let pending = session.pending_identity().await?;

    // Decode before any session mutation: a malformed bundle or claims
    // blob is a defect in the upstream callback, not user error.
    let bundle = TokenBundle::decode(&pending.token_blob)?;
    let claims = PendingClaims::parse(&pending.claims_json)?;
    tracing::debug!(sub = %claims.sub, iss = %claims.iss, "onboarding pending OIDC identity");

    // Username is the email claim, copied as-is. On validation failure
    // the pending identity stays in session so the flow can resubmit.
    let username = Username::try_from(claims.email.clone())?;

    let account = NewAccount {
        username,
        display_name: claims.name.clone(),
        email: claims.email.clone(),
        comment: ONBOARD_COMMENT.to_string(),
        linkage: IdentityLinkage {
            key: claims.linkage_key(),
            secret: bundle.secret,
            provider_token: bundle.provider_token,
        },
    };

    let created = match accounts.onboard(account).await {
        Ok(created) => created,
        Err(StoreError::Duplicate(key)) => {
            // Losing side of a race, or a re-authentication of an
            // already-onboarded identity. Session stays untouched.
            tracing::warn!(%key, "duplicate account on onboarding");
            return Err(OnboardError::Duplicate);
        }
        Err(e) => {
            session.reject().await?;
            return Err(OnboardError::Internal(e.to_string()));
        }
    };

    let view = created.into_view();
    session.complete(&view).await?;
    tracing::info!(account = %view.id, username = %view.username, "onboarded OIDC user");

    Ok(found(success_redirect))
}

// axum's `Redirect` constructors answer 303/307/308; this flow answers
// 302 Found.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::memory::{MemoryAccountStore, MemorySessionStore};
    use super::super::session::{SessionKey, SessionValue};
    use super::super::store::DuplicateKey;
    use super::super::types::LocalAccount;
    use super::*;
    use crate::token::mint_secret;

    const CLAIMS: &str = r#"{"sub":"abc","iss":"https://idp","email":"u@x.com","name":"U. Ser"}"#;

    fn flow(id: &str) -> FlowId {
        FlowId::from(id.to_string())
    }

    fn token_blob() -> Vec<u8> {
        TokenBundle::new(mint_secret(), "provider-token".into()).encode()
    }

    async fn stage(sessions: &MemorySessionStore, flow: &FlowId, claims: &str, blob: Vec<u8>) {
        sessions
            .set(flow, SessionKey::PendingClaims, SessionValue::Text(claims.into()))
            .await
            .unwrap();
        sessions
            .set(flow, SessionKey::PendingToken, SessionValue::Bytes(blob))
            .await
            .unwrap();
    }

    async fn run(
        sessions: &MemorySessionStore,
        accounts: &MemoryAccountStore,
        flow: &FlowId,
    ) -> Result<Response, OnboardError> {
        onboard_auto_user(sessions, accounts, flow, "/").await
    }

    #[tokio::test]
    async fn happy_path_creates_account_and_redirects() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();
        let flow = flow("flow-1");
        stage(&sessions, &flow, CLAIMS, token_blob()).await;

        let response = run(&sessions, &accounts, &flow).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");

        assert_eq!(accounts.len().await, 1);
        let username: Username = "u@x.com".parse().unwrap();
        let account = accounts.find_by_username(&username).await.unwrap();
        assert_eq!(account.email, "u@x.com");
        assert_eq!(account.display_name, "U. Ser");
        assert_eq!(account.comment, ONBOARD_COMMENT);
        assert_eq!(account.linkage.key.as_str(), "abchttps://idp");
    }

    #[tokio::test]
    async fn happy_path_settles_the_session() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();
        let flow = flow("flow-1");
        stage(&sessions, &flow, CLAIMS, token_blob()).await;

        run(&sessions, &accounts, &flow).await.unwrap();

        assert!(
            sessions
                .get(&flow, SessionKey::PendingClaims)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            sessions
                .get(&flow, SessionKey::PendingToken)
                .await
                .unwrap()
                .is_none()
        );
        let view = sessions
            .get(&flow, SessionKey::AuthenticatedUser)
            .await
            .unwrap()
            .and_then(SessionValue::into_json)
            .unwrap();
        assert_eq!(view["username"], "u@x.com");
        let json = view.to_string();
        assert!(!json.contains("secret"));
        assert!(!json.contains("token"));
        assert!(!json.contains("linkage"));
    }

    #[tokio::test]
    async fn missing_session_state_is_bad_request() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();
        let flow = flow("flow-1");

        let err = run(&sessions, &accounts, &flow).await.unwrap_err();
        assert!(matches!(err, OnboardError::BadRequest(_)));
        assert!(accounts.is_empty().await);
    }

    #[tokio::test]
    async fn empty_email_is_bad_request_and_session_kept() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();
        let flow = flow("flow-1");
        stage(
            &sessions,
            &flow,
            r#"{"sub":"abc","iss":"https://idp"}"#,
            token_blob(),
        )
        .await;

        let err = run(&sessions, &accounts, &flow).await.unwrap_err();
        assert!(matches!(err, OnboardError::BadRequest(_)));
        assert!(accounts.is_empty().await);

        // Retry-friendly: both pending keys survive a validation failure.
        assert!(
            sessions
                .get(&flow, SessionKey::PendingClaims)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            sessions
                .get(&flow, SessionKey::PendingToken)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn overlong_email_is_bad_request() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();
        let flow = flow("flow-1");
        let claims = format!(
            r#"{{"sub":"abc","iss":"https://idp","email":"{}"}}"#,
            "a".repeat(256)
        );
        stage(&sessions, &flow, &claims, token_blob()).await;

        let err = run(&sessions, &accounts, &flow).await.unwrap_err();
        assert!(matches!(err, OnboardError::BadRequest(_)));
        assert!(accounts.is_empty().await);
    }

    #[tokio::test]
    async fn illegal_character_email_is_bad_request() {
        for c in crate::types::ILLEGAL_USERNAME_CHARS {
            let sessions = MemorySessionStore::new();
            let accounts = MemoryAccountStore::new();
            let flow = flow("flow-1");
            let claims = format!(
                r#"{{"sub":"abc","iss":"https://idp","email":"u{c}x.com"}}"#
            );
            stage(&sessions, &flow, &claims, token_blob()).await;

            let err = run(&sessions, &accounts, &flow).await.unwrap_err();
            assert!(
                matches!(err, OnboardError::BadRequest(_)),
                "email with {c:?} should be rejected"
            );
            assert!(accounts.is_empty().await);
        }
    }

    #[tokio::test]
    async fn undecodable_token_blob_is_internal_and_session_kept() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();
        let flow = flow("flow-1");
        stage(&sessions, &flow, CLAIMS, b"garbage".to_vec()).await;

        let err = run(&sessions, &accounts, &flow).await.unwrap_err();
        assert!(matches!(err, OnboardError::Internal(_)));
        assert!(accounts.is_empty().await);

        // Decode fails before any session mutation.
        assert!(
            sessions
                .get(&flow, SessionKey::PendingClaims)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            sessions
                .get(&flow, SessionKey::PendingToken)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn malformed_claims_json_is_internal() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();
        let flow = flow("flow-1");
        stage(&sessions, &flow, "not json", token_blob()).await;

        let err = run(&sessions, &accounts, &flow).await.unwrap_err();
        assert!(matches!(err, OnboardError::Internal(_)));
        assert!(accounts.is_empty().await);
    }

    #[tokio::test]
    async fn second_onboarding_with_same_email_conflicts() {
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();

        let first = flow("flow-1");
        stage(&sessions, &first, CLAIMS, token_blob()).await;
        run(&sessions, &accounts, &first).await.unwrap();

        // A different identity claiming the same email.
        let second = flow("flow-2");
        stage(
            &sessions,
            &second,
            r#"{"sub":"xyz","iss":"https://idp","email":"u@x.com"}"#,
            token_blob(),
        )
        .await;
        let err = run(&sessions, &accounts, &second).await.unwrap_err();

        assert!(matches!(err, OnboardError::Duplicate));
        assert!(err.to_string().contains("Conflict in username"));
        assert_eq!(accounts.len().await, 1);

        // Conflict leaves the second flow's session untouched.
        assert!(
            sessions
                .get(&second, SessionKey::PendingClaims)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            sessions
                .get(&second, SessionKey::PendingToken)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn reonboarding_the_same_identity_conflicts() {
        // A successful onboarding followed by a fresh re-authentication
        // of the identical identity must not create a second account.
        let sessions = MemorySessionStore::new();
        let accounts = MemoryAccountStore::new();

        let first = flow("flow-1");
        stage(&sessions, &first, CLAIMS, token_blob()).await;
        run(&sessions, &accounts, &first).await.unwrap();

        let second = flow("flow-2");
        stage(&sessions, &second, CLAIMS, token_blob()).await;
        let err = run(&sessions, &accounts, &second).await.unwrap_err();

        assert!(matches!(err, OnboardError::Duplicate));
        assert_eq!(accounts.len().await, 1);
    }

    struct FailingAccountStore;

    impl AccountStore for FailingAccountStore {
        async fn onboard(&self, _account: NewAccount) -> Result<LocalAccount, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn backend_failure_is_internal_and_discards_pending_identity() {
        let sessions = MemorySessionStore::new();
        let accounts = FailingAccountStore;
        let flow = flow("flow-1");
        stage(&sessions, &flow, CLAIMS, token_blob()).await;

        let err = onboard_auto_user(&sessions, &accounts, &flow, "/")
            .await
            .unwrap_err();
        assert!(matches!(err, OnboardError::Internal(_)));

        // No retry path: both pending keys are gone.
        assert!(
            sessions
                .get(&flow, SessionKey::PendingClaims)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            sessions
                .get(&flow, SessionKey::PendingToken)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            sessions
                .get(&flow, SessionKey::AuthenticatedUser)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn concurrent_flows_on_same_identity_race_to_one_account() {
        let sessions = std::sync::Arc::new(MemorySessionStore::new());
        let accounts = std::sync::Arc::new(MemoryAccountStore::new());

        let flow_a = flow("flow-a");
        let flow_b = flow("flow-b");
        stage(&sessions, &flow_a, CLAIMS, token_blob()).await;
        stage(&sessions, &flow_b, CLAIMS, token_blob()).await;

        let a = {
            let (sessions, accounts, flow) = (sessions.clone(), accounts.clone(), flow_a);
            tokio::spawn(async move { onboard_auto_user(&sessions, &accounts, &flow, "/").await })
        };
        let b = {
            let (sessions, accounts, flow) = (sessions.clone(), accounts.clone(), flow_b);
            tokio::spawn(async move { onboard_auto_user(&sessions, &accounts, &flow, "/").await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        assert!(a.is_ok() != b.is_ok(), "exactly one flow must win");
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser.unwrap_err(), OnboardError::Duplicate));
        assert_eq!(accounts.len().await, 1);
    }

    #[test]
    fn duplicate_key_display_is_loggable() {
        let key = DuplicateKey::Username("u@x.com".parse().unwrap());
        assert_eq!(key.to_string(), "username u@x.com");
    }
}
