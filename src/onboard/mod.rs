//! OIDC auto-onboarding flow for Axum.
//!
//! The provider callback (external to this crate) authenticates the user
//! and stages two values in the flow session: the raw claims JSON and an
//! opaque token bundle. This module owns the commit phase: it consumes
//! that pending identity, validates it, and creates the local account
//! bound to the external identity — exactly once, even under concurrent
//! attempts.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use oidc_onboard::onboard::{OnboardConfig, onboard_routes};
//!
//! // 1. Implement SessionStore and AccountStore traits for your app
//! // 2. Configure from environment
//! let config = OnboardConfig::from_env()?;
//!
//! // 3. Mount the onboarding route
//! let app = axum::Router::new()
//!     .merge(onboard_routes(config, session_store, account_store));
//! ```

mod config;
mod error;
mod extractor;
mod handler;
mod memory;
mod routes;
mod session;
mod state;
mod store;
mod types;

pub use config::OnboardConfig;
pub use error::{CONFLICT_MESSAGE, OnboardError};
pub use memory::{MemoryAccountStore, MemorySessionStore};
pub use routes::onboard_routes;
pub use session::{BoxError, FlowSession, SessionKey, SessionStore, SessionValue};
pub use store::{AccountStore, DuplicateKey, StoreError};
pub use types::{
    AuthenticatedUser, IdentityLinkage, LocalAccount, NewAccount, ONBOARD_COMMENT,
    PendingIdentity,
};

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
