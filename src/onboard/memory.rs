use std::collections::HashMap;

use tokio::sync::Mutex;

use super::session::{BoxError, SessionKey, SessionStore, SessionValue};
use super::store::{AccountStore, DuplicateKey, StoreError};
use super::types::{LocalAccount, NewAccount};
use crate::types::{AccountId, FlowId, Username};

/// In-memory [`SessionStore`] for development and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    flows: Mutex<HashMap<FlowId, HashMap<SessionKey, SessionValue>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    async fn get(&self, flow: &FlowId, key: SessionKey) -> Result<Option<SessionValue>, BoxError> {
        Ok(self
            .flows
            .lock()
            .await
            .get(flow)
            .and_then(|values| values.get(&key))
            .cloned())
    }

    async fn set(
        &self,
        flow: &FlowId,
        key: SessionKey,
        value: SessionValue,
    ) -> Result<(), BoxError> {
        self.flows
            .lock()
            .await
            .entry(flow.clone())
            .or_default()
            .insert(key, value);
        Ok(())
    }

    async fn remove(&self, flow: &FlowId, key: SessionKey) -> Result<(), BoxError> {
        if let Some(values) = self.flows.lock().await.get_mut(flow) {
            values.remove(&key);
        }
        Ok(())
    }
}

/// In-memory [`AccountStore`] for development and tests.
///
/// The reference implementation of the atomicity contract: both
/// uniqueness checks and the insert happen under one lock guard, so a
/// racing pair of onboarding attempts observes exactly one success and
/// one [`StoreError::Duplicate`].
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<LocalAccount>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of onboarded accounts.
    pub async fn len(&self) -> usize {
        self.accounts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.lock().await.is_empty()
    }

    /// Look up an account by username.
    pub async fn find_by_username(&self, username: &Username) -> Option<LocalAccount> {
        self.accounts
            .lock()
            .await
            .iter()
            .find(|a| &a.username == username)
            .cloned()
    }
}

impl AccountStore for MemoryAccountStore {
    async fn onboard(&self, account: NewAccount) -> Result<LocalAccount, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.iter().any(|a| a.username == account.username) {
            return Err(StoreError::Duplicate(DuplicateKey::Username(
                account.username,
            )));
        }
        if accounts.iter().any(|a| a.linkage.key == account.linkage.key) {
            return Err(StoreError::Duplicate(DuplicateKey::Linkage(
                account.linkage.key,
            )));
        }
        let created = LocalAccount {
            id: AccountId::generate(),
            username: account.username,
            display_name: account.display_name,
            email: account.email,
            comment: account.comment,
            linkage: account.linkage,
        };
        accounts.push(created.clone());
        Ok(created)
    }
}
