use std::future::Future;

use derive_more::Display;

use super::types::{LocalAccount, NewAccount};
use crate::types::{LinkageKey, Username};

/// Which uniqueness constraint an onboarding attempt collided with.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DuplicateKey {
    #[display("username {_0}")]
    Username(Username),
    #[display("linkage key {_0}")]
    Linkage(LinkageKey),
}

/// Errors from the account persistence layer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// An account with the same username or linkage key already exists.
    /// Distinguished variant — callers match on it rather than on error
    /// text.
    #[error("duplicate account: {0}")]
    Duplicate(DuplicateKey),

    /// Unclassified backend failure.
    #[error("account store error: {0}")]
    Backend(String),
}

/// Consumer-provided account persistence.
///
/// # Example
///
/// ```rust,ignore
/// impl AccountStore for MyAppState {
///     async fn onboard(&self, account: NewAccount) -> Result<LocalAccount, StoreError> {
///         // INSERT under a transaction with unique indexes on
///         // username and linkage key; translate the constraint
///         // violation into StoreError::Duplicate.
///     }
/// }
/// ```
pub trait AccountStore: Send + Sync + 'static {
    /// Atomically create a local account bound to an external identity.
    ///
    /// Contract: username uniqueness and linkage-key uniqueness are
    /// enforced as a single atomic unit (e.g. constraints checked at
    /// commit time); an account is never partially created. For two
    /// concurrent calls racing on the same username or linkage key,
    /// exactly one returns `Ok` and the other
    /// [`StoreError::Duplicate`]; no duplicate account is ever visible
    /// to subsequent reads.
    fn onboard(
        &self,
        account: NewAccount,
    ) -> impl Future<Output = Result<LocalAccount, StoreError>> + Send;
}

impl<A: AccountStore> AccountStore for std::sync::Arc<A> {
    fn onboard(
        &self,
        account: NewAccount,
    ) -> impl Future<Output = Result<LocalAccount, StoreError>> + Send {
        A::onboard(self, account)
    }
}
