// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::Address;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::credential::{CacheKey, ContractScope, SessionCredential};
use super::error::SessionError;
use super::store::CredentialStore;
use crate::fhe::FheEngine;
use crate::wallet::WalletSigner;

type CredentialFuture = Shared<BoxFuture<'static, Result<SessionCredential, SessionError>>>;

/// Current unix time in seconds
pub(crate) fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// Serves session credentials from a [`CredentialStore`], creating and
/// signing new ones on a miss.
///
/// At most one creation per cache key is in flight: callers arriving while a
/// creation is pending await the same shared future, so the wallet sees a
/// single signature prompt.
///
/// # Example
///
/// ```ignore
/// let manager = DecryptionSessionManager::new(Arc::new(InMemoryCredentialStore::new()), 365)?;
/// let credential = manager.get_or_create(engine, signer, &[contract]).await?;
/// ```
pub struct DecryptionSessionManager {
    store: Arc<dyn CredentialStore>,
    validity_days: u32,
    in_flight: Mutex<HashMap<CacheKey, CredentialFuture>>,
}

impl DecryptionSessionManager {
    /// `validity_days` is the lifetime given to every newly created
    /// credential and must be at least 1.
    pub fn new(store: Arc<dyn CredentialStore>, validity_days: u32) -> Result<Self, SessionError> {
        if validity_days == 0 {
            return Err(SessionError::InvalidValidityWindow(validity_days));
        }
        Ok(Self {
            store,
            validity_days,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    pub fn validity_days(&self) -> u32 {
        self.validity_days
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Number of credential creations currently awaiting completion
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Return a valid credential for the signer and `contracts`, creating one
    /// (one signature prompt) when the store has none.
    pub async fn get_or_create(
        &self,
        engine: Arc<dyn FheEngine>,
        signer: Arc<dyn WalletSigner>,
        contracts: &[Address],
    ) -> Result<SessionCredential, SessionError> {
        let scope = ContractScope::new(contracts)?;
        let user = signer.address();
        let key = CacheKey::new(user, &scope);

        let future = {
            let mut in_flight = self.in_flight.lock().await;
            // A completed entry belongs to a caller that has not cleaned up
            // yet; its result is not reused
            match in_flight.get(&key).filter(|pending| pending.peek().is_none()) {
                Some(pending) => {
                    debug!(key = %key, "joining in-flight credential request");
                    pending.clone()
                }
                None => {
                    let future = resolve(
                        self.store.clone(),
                        engine,
                        signer,
                        scope,
                        key.clone(),
                        self.validity_days,
                    )
                    .boxed()
                    .shared();
                    in_flight.insert(key.clone(), future.clone());
                    future
                }
            }
        };

        let result = future.clone().await;

        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(&key)
            .map_or(false, |pending| pending.ptr_eq(&future))
        {
            in_flight.remove(&key);
        }

        result
    }
}

async fn resolve(
    store: Arc<dyn CredentialStore>,
    engine: Arc<dyn FheEngine>,
    signer: Arc<dyn WalletSigner>,
    scope: ContractScope,
    key: CacheKey,
    validity_days: u32,
) -> Result<SessionCredential, SessionError> {
    let user = signer.address();
    let now = unix_now();

    match store.get(key.as_str()).await {
        Ok(Some(cached)) if cached.matches(user, &scope) => match cached.check_fresh(now) {
            Ok(()) => {
                debug!(key = %key, expires_at = cached.expires_at(), "credential cache hit");
                return Ok(cached);
            }
            Err(reason) => debug!(key = %key, "{}, regenerating", reason),
        },
        Ok(Some(_)) => warn!(key = %key, "cached credential scope mismatch, regenerating"),
        Ok(None) => debug!(key = %key, "no cached credential"),
        Err(e) => warn!(key = %key, "credential store read failed, regenerating: {}", e),
    }

    let keypair = engine
        .generate_keypair()
        .await
        .map_err(|e| SessionError::Engine(e.to_string()))?;
    let payload = engine
        .build_authorization_payload(&scope, &keypair.public_key, now, validity_days)
        .map_err(|e| SessionError::Engine(e.to_string()))?;

    info!(key = %key, user = ?user, contracts = scope.len(), "requesting decryption authorization signature");
    let signature = signer
        .sign_typed_data(&payload)
        .await
        .map_err(|e| SessionError::SigningDenied(e.to_string()))?;

    let credential = SessionCredential {
        ephemeral_public_key: keypair.public_key,
        ephemeral_private_key: keypair.private_key,
        authorization_signature: signature,
        scoped_contracts: scope,
        user_address: user,
        issued_at: now,
        validity_days,
    };

    if let Err(e) = store.set(key.as_str(), &credential).await {
        warn!(key = %key, "credential created but could not be persisted: {}", e);
    } else {
        info!(key = %key, expires_at = credential.expires_at(), "decryption credential created");
    }

    Ok(credential)
}
