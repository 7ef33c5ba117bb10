// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DecryptionSessionManager against the public API

use crate::common::{contract_address, user_address, MockEngine, MockSigner, VALIDITY_DAYS};
use ethers::types::{Address, Bytes};
use private_nft_client::session::{
    CacheKey, ContractScope, CredentialStore, DecryptionSessionManager, InMemoryCredentialStore,
    SessionCredential, SECONDS_PER_DAY,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn manager(store: &InMemoryCredentialStore) -> DecryptionSessionManager {
    DecryptionSessionManager::new(Arc::new(store.clone()), VALIDITY_DAYS).unwrap()
}

fn stale_credential(scope: ContractScope, issued_at: u64, validity_days: u32) -> SessionCredential {
    SessionCredential {
        ephemeral_public_key: Bytes::from(vec![0xee; 32]),
        ephemeral_private_key: Bytes::from(vec![0xdd; 32]),
        authorization_signature: Bytes::from(vec![0xcc; 65]),
        scoped_contracts: scope,
        user_address: user_address(),
        issued_at,
        validity_days,
    }
}

#[tokio::test]
async fn test_two_requests_one_prompt() {
    let store = InMemoryCredentialStore::new();
    let manager = manager(&store);
    let engine = Arc::new(MockEngine::new());
    let signer = Arc::new(MockSigner::new());

    let first = manager
        .get_or_create(engine.clone(), signer.clone(), &[contract_address()])
        .await
        .unwrap();
    let second = manager
        .get_or_create(engine.clone(), signer.clone(), &[contract_address()])
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(signer.prompt_count(), 1);
    assert_eq!(first.validity_days, VALIDITY_DAYS);
}

#[tokio::test]
async fn test_expired_credential_never_returned() {
    let store = InMemoryCredentialStore::new();
    let scope = ContractScope::single(contract_address());
    let key = CacheKey::new(user_address(), &scope);

    // Expires exactly now
    let expired = stale_credential(scope.clone(), now() - 2 * SECONDS_PER_DAY, 2);
    store.set(key.as_str(), &expired).await.unwrap();

    let manager = manager(&store);
    let signer = Arc::new(MockSigner::new());
    let fresh = manager
        .get_or_create(Arc::new(MockEngine::new()), signer.clone(), &[contract_address()])
        .await
        .unwrap();

    assert_ne!(fresh, expired);
    assert!(fresh.is_valid_at(now()));
    assert_eq!(signer.prompt_count(), 1);
    assert_eq!(store.get(key.as_str()).await.unwrap(), Some(fresh));
}

#[tokio::test]
async fn test_scope_is_canonical() {
    let store = InMemoryCredentialStore::new();
    let manager = manager(&store);
    let engine = Arc::new(MockEngine::new());
    let signer = Arc::new(MockSigner::new());
    let a = Address::from([0x0a; 20]);
    let b = Address::from([0x0b; 20]);

    manager
        .get_or_create(engine.clone(), signer.clone(), &[b, a, b])
        .await
        .unwrap();
    let reused = manager
        .get_or_create(engine.clone(), signer.clone(), &[a, b])
        .await
        .unwrap();

    assert_eq!(signer.prompt_count(), 1);
    assert_eq!(reused.scoped_contracts.addresses(), &[a, b]);

    // A subset is a different scope
    manager
        .get_or_create(engine, signer.clone(), &[a])
        .await
        .unwrap();
    assert_eq!(signer.prompt_count(), 2);
    assert_eq!(store.count().await, 2);
}

#[tokio::test]
async fn test_concurrent_requests_dedupe() {
    let store = InMemoryCredentialStore::new();
    let manager = Arc::new(manager(&store));
    let engine = Arc::new(MockEngine::new());
    let signer = Arc::new(MockSigner::with_delay(Duration::from_millis(50)));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            let engine = engine.clone();
            let signer = signer.clone();
            tokio::spawn(async move {
                manager
                    .get_or_create(engine, signer, &[contract_address()])
                    .await
            })
        })
        .collect();

    let mut credentials = Vec::new();
    for task in tasks {
        credentials.push(task.await.unwrap().unwrap());
    }

    assert_eq!(signer.prompt_count(), 1);
    assert_eq!(engine.keypair_count(), 1);
    assert!(credentials.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(manager.in_flight_count().await, 0);
}

#[tokio::test]
async fn test_denied_signature_not_cached() {
    let store = InMemoryCredentialStore::new();
    let manager = manager(&store);
    let signer = Arc::new(MockSigner::new());
    signer.set_reject(true);

    let result = manager
        .get_or_create(Arc::new(MockEngine::new()), signer.clone(), &[contract_address()])
        .await;

    assert!(result.is_err());
    assert_eq!(store.count().await, 0);
    assert_eq!(manager.in_flight_count().await, 0);
}
