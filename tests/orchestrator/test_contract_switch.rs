// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Swapping the contract client while idle and mid-operation

use crate::common::{dragon, user_address, Harness, MockContract, MockEngine, MockSigner};
use ethers::types::{Address, U256};
use private_nft_client::fhe::CiphertextHandle;
use private_nft_client::orchestrator::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

fn other_address() -> Address {
    Address::from([0xb0; 20])
}

#[tokio::test]
async fn test_switch_clears_loaded_state() {
    let h = Harness::new();
    h.orchestrator.mint(dragon()).await.unwrap();
    h.orchestrator.decrypt(U256::from(1)).await.unwrap();

    // Same deployment again keeps everything
    h.orchestrator.set_contract(Some(h.contract.clone())).await;
    let same = h.orchestrator.snapshot().await;
    assert!(same.decrypted(U256::from(1)).is_some());
    assert!(same.has_loaded_once);

    h.orchestrator
        .set_contract(Some(Arc::new(MockContract::with_address(other_address()))))
        .await;

    let snapshot = h.orchestrator.snapshot().await;
    assert_eq!(snapshot.contract_address, Some(other_address()));
    assert!(snapshot.owned_tokens.is_empty());
    assert!(snapshot.tokens.is_empty());
    assert_eq!(snapshot.total_supply, U256::zero());
    assert!(!snapshot.has_loaded_once);
}

#[tokio::test]
async fn test_decrypt_running_during_switch_commits_nothing() {
    let h = Harness::with_parts(
        MockEngine::new(),
        MockSigner::with_delay(Duration::from_millis(100)),
        MockContract::new(),
    );
    h.orchestrator.mint(dragon()).await.unwrap();
    let other = Arc::new(MockContract::with_address(other_address()));

    let (decrypted, _) = tokio::join!(h.orchestrator.decrypt(U256::from(1)), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        h.orchestrator.set_contract(Some(other.clone())).await;
    });

    assert_eq!(decrypted.unwrap_err().kind(), ErrorKind::DecryptionFailed);
    let snapshot = h.orchestrator.snapshot().await;
    assert_eq!(snapshot.contract_address, Some(other_address()));
    assert!(snapshot.tokens.is_empty());
    assert!(!snapshot.is_decrypting);

    // Token #1 on the new deployment is decrypted for real, not served from
    // the discarded result
    h.orchestrator.mint(dragon()).await.unwrap();
    let decrypts_before = h.engine.decrypt_count();
    let attributes = h.orchestrator.decrypt(U256::from(1)).await.unwrap();
    assert_eq!(attributes.rarity, "95");
    assert_eq!(h.engine.decrypt_count(), decrypts_before + 1);
    assert_eq!(other.handle_read_count(), 3);
}

#[tokio::test]
async fn test_load_running_during_switch_commits_nothing() {
    let h = Harness::with_parts(
        MockEngine::new(),
        MockSigner::new(),
        MockContract::with_read_delay(Duration::from_millis(50)),
    );
    h.contract.seed_token(
        user_address(),
        "Old Chain Relic",
        [CiphertextHandle::new([9; 32]); 3],
    );

    let (loaded, _) = tokio::join!(h.orchestrator.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.orchestrator
            .set_contract(Some(Arc::new(MockContract::with_address(other_address()))))
            .await;
    });

    assert_eq!(loaded.unwrap_err().kind(), ErrorKind::SubmissionFailed);
    let snapshot = h.orchestrator.snapshot().await;
    assert!(snapshot.owned_tokens.is_empty());
    assert!(snapshot.tokens.is_empty());
    assert!(!snapshot.has_loaded_once);

    assert_eq!(h.orchestrator.load().await.unwrap(), Vec::<U256>::new());
    assert!(h.orchestrator.snapshot().await.has_loaded_once);
}
