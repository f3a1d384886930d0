use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Fixed user-facing message for a duplicate-username conflict.
pub const CONFLICT_MESSAGE: &str =
    "Conflict in username, the user with same username has been onboarded.";

/// Terminal outcomes of one onboarding request. Nothing is retried
/// automatically.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OnboardError {
    /// Malformed or missing session state, or username validation
    /// failure. The pending identity stays in session for resubmission.
    #[error("{0}")]
    BadRequest(String),

    /// Duplicate username or linkage key reported by the account store.
    #[error("Conflict in username, the user with same username has been onboarded.")]
    Duplicate,

    /// Session store operation failed.
    #[error("session store error: {0}")]
    Session(String),

    /// Token decode, claims parse, or unclassified persistence failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for OnboardError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::Duplicate => (StatusCode::CONFLICT, CONFLICT_MESSAGE).into_response(),
            Self::Session(_) | Self::Internal(_) | Self::Config(_) => {
                // The underlying cause is logged, never exposed to the caller.
                tracing::error!(error = %self, "Onboarding internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<crate::error::Error> for OnboardError {
    fn from(e: crate::error::Error) -> Self {
        match &e {
            crate::error::Error::InvalidUsername(_) => Self::BadRequest(e.to_string()),
            _ => Self::Internal(e.to_string()),
        }
    }
}
