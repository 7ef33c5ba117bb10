// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::credential::SessionCredential;
use super::error::SessionError;

/// Persistent key/value storage for session credentials.
///
/// Keys are [`CacheKey`](super::CacheKey) strings. Implementations return
/// `Ok(None)` for absent keys and reserve errors for backend failures.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<SessionCredential>, SessionError>;

    async fn set(&self, key: &str, credential: &SessionCredential) -> Result<(), SessionError>;
}

/// Process-local credential store
///
/// # Example
///
/// ```ignore
/// let store = InMemoryCredentialStore::new();
/// store.set(key.as_str(), &credential).await?;
/// let cached = store.get(key.as_str()).await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    entries: Arc<RwLock<HashMap<String, SessionCredential>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SessionCredential>, SessionError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, credential: &SessionCredential) -> Result<(), SessionError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), credential.clone());
        tracing::debug!(key = %key, total = entries.len(), "credential cached in memory");
        Ok(())
    }
}
