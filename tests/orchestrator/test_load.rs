// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Load workflow: atomic commit of owned ids, public data and supply

use crate::common::{dragon, user_address, Harness};
use ethers::types::{Address, U256};
use private_nft_client::fhe::CiphertextHandle;
use private_nft_client::orchestrator::ErrorKind;

fn handles(seed: u8) -> [CiphertextHandle; 3] {
    [
        CiphertextHandle::new([seed; 32]),
        CiphertextHandle::new([seed + 1; 32]),
        CiphertextHandle::new([seed + 2; 32]),
    ]
}

#[tokio::test]
async fn test_load_only_owned_tokens() {
    let h = Harness::new();
    let mine = h.contract.seed_token(user_address(), "Enchanted Sword", handles(1));
    h.contract
        .seed_token(Address::from([0x22; 20]), "Someone else's", handles(10));

    let owned = h.orchestrator.load().await.unwrap();

    assert_eq!(owned, vec![mine]);
    let snapshot = h.orchestrator.snapshot().await;
    assert_eq!(snapshot.owned_tokens, vec![mine]);
    assert_eq!(snapshot.total_supply, U256::from(2));
    assert_eq!(snapshot.public_data(mine).unwrap().name, "Enchanted Sword");
    assert_eq!(snapshot.message, "Loaded 1 NFTs");
    assert!(snapshot.has_loaded_once);
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn test_partial_failure_commits_nothing() {
    let h = Harness::new();
    let first = h.contract.seed_token(user_address(), "First", handles(1));
    h.orchestrator.load().await.unwrap();
    let before = h.orchestrator.snapshot().await;

    h.contract.seed_token(user_address(), "Second", handles(4));
    h.contract.set_fail_public_data(true);
    let err = h.orchestrator.load().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SubmissionFailed);
    let after = h.orchestrator.snapshot().await;
    assert_eq!(after.owned_tokens, vec![first]);
    assert_eq!(after.total_supply, before.total_supply);
    assert_eq!(after.tokens, before.tokens);
    assert!(after.message.starts_with("Error loading NFTs"));
    assert!(!after.is_loading);
}

#[tokio::test]
async fn test_load_requires_signer() {
    let h = Harness::new();
    h.orchestrator.set_signer(None).await;

    let err = h.orchestrator.load().await.unwrap_err();

    assert!(err.is_precondition());
    assert_eq!(h.contract.owner_read_count(), 0);
    assert!(!h.orchestrator.snapshot().await.has_loaded_once);
}

#[tokio::test]
async fn test_ensure_loaded_runs_once() {
    let h = Harness::new();
    h.contract.seed_token(user_address(), "First", handles(1));

    h.orchestrator.ensure_loaded().await.unwrap();
    h.orchestrator.ensure_loaded().await.unwrap();

    assert_eq!(h.contract.owner_read_count(), 1);
}

#[tokio::test]
async fn test_load_keeps_decrypted_mirror() {
    let h = Harness::new();
    h.orchestrator.mint(dragon()).await.unwrap();
    let token_id = U256::from(1);
    h.orchestrator.decrypt(token_id).await.unwrap();

    h.orchestrator.load().await.unwrap();

    let snapshot = h.orchestrator.snapshot().await;
    assert_eq!(snapshot.decrypted(token_id).unwrap().rarity, "95");
}
