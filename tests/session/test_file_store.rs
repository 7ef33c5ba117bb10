// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Credentials persisted on disk survive a new manager

use crate::common::{contract_address, MockEngine, MockSigner};
use private_nft_client::crypto::CredentialSealer;
use private_nft_client::session::{
    CredentialStore, DecryptionSessionManager, FileCredentialStore,
};
use std::sync::Arc;
use tempfile::TempDir;

fn sealed_store(dir: &TempDir, secret: &[u8]) -> FileCredentialStore {
    FileCredentialStore::new(dir.path())
        .with_sealer(CredentialSealer::from_secret(secret).unwrap())
}

#[tokio::test]
async fn test_credential_survives_restart() {
    let dir = TempDir::new().unwrap();
    let signer = Arc::new(MockSigner::new());

    let first = {
        let manager =
            DecryptionSessionManager::new(Arc::new(sealed_store(&dir, b"secret")), 7).unwrap();
        manager
            .get_or_create(Arc::new(MockEngine::new()), signer.clone(), &[contract_address()])
            .await
            .unwrap()
    };

    let manager =
        DecryptionSessionManager::new(Arc::new(sealed_store(&dir, b"secret")), 7).unwrap();
    let second = manager
        .get_or_create(Arc::new(MockEngine::new()), signer.clone(), &[contract_address()])
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(signer.prompt_count(), 1);
}

#[tokio::test]
async fn test_private_key_not_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = sealed_store(&dir, b"secret");
    let manager = DecryptionSessionManager::new(Arc::new(store), 7).unwrap();
    let credential = manager
        .get_or_create(
            Arc::new(MockEngine::new()),
            Arc::new(MockSigner::new()),
            &[contract_address()],
        )
        .await
        .unwrap();

    let private_hex = hex::encode(&credential.ephemeral_private_key);
    let mut entries = std::fs::read_dir(dir.path().join("credentials")).unwrap();
    let path = entries.next().unwrap().unwrap().path();
    let contents = std::fs::read_to_string(path).unwrap();
    assert!(!contents.contains(&private_hex));
}

#[tokio::test]
async fn test_wrong_secret_regenerates() {
    let dir = TempDir::new().unwrap();
    let signer = Arc::new(MockSigner::new());

    let manager =
        DecryptionSessionManager::new(Arc::new(sealed_store(&dir, b"secret")), 7).unwrap();
    manager
        .get_or_create(Arc::new(MockEngine::new()), signer.clone(), &[contract_address()])
        .await
        .unwrap();

    let store = sealed_store(&dir, b"other secret");
    let key = private_nft_client::session::CacheKey::new(
        crate::common::user_address(),
        &private_nft_client::session::ContractScope::single(contract_address()),
    );
    assert_eq!(store.get(key.as_str()).await.unwrap(), None);

    let manager = DecryptionSessionManager::new(Arc::new(store), 7).unwrap();
    manager
        .get_or_create(Arc::new(MockEngine::new()), signer.clone(), &[contract_address()])
        .await
        .unwrap();
    assert_eq!(signer.prompt_count(), 2);
}
