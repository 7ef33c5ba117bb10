// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-operation flags and interleaving of different operations

use crate::common::{dragon, user_address, Harness, MockContract, MockEngine, MockSigner};
use ethers::types::U256;
use private_nft_client::fhe::CiphertextHandle;
use std::time::Duration;

#[tokio::test]
async fn test_concurrent_load_is_noop() {
    let h = Harness::with_parts(
        MockEngine::new(),
        MockSigner::new(),
        MockContract::with_read_delay(Duration::from_millis(50)),
    );
    let token_id = h.contract.seed_token(
        user_address(),
        "Crystal of Power",
        [CiphertextHandle::new([7; 32]); 3],
    );

    let (first, second) = tokio::join!(h.orchestrator.load(), h.orchestrator.load());

    assert_eq!(first.unwrap(), vec![token_id]);
    assert!(second.unwrap_err().is_precondition());
    assert_eq!(h.contract.owner_read_count(), 1);

    let concurrent = h.orchestrator.snapshot().await;
    h.orchestrator.load().await.unwrap();
    let single = h.orchestrator.snapshot().await;
    assert_eq!(concurrent.owned_tokens, single.owned_tokens);
    assert_eq!(concurrent.tokens, single.tokens);
    assert_eq!(concurrent.total_supply, single.total_supply);
}

#[tokio::test]
async fn test_concurrent_decrypts_share_one_prompt() {
    let h = Harness::with_parts(
        MockEngine::new(),
        MockSigner::with_delay(Duration::from_millis(50)),
        MockContract::new(),
    );
    h.orchestrator.mint(dragon()).await.unwrap();
    h.orchestrator.mint(dragon()).await.unwrap();

    // Same operation kind: the second is dropped while the first runs
    let (first, second) = tokio::join!(
        h.orchestrator.decrypt(U256::from(1)),
        h.orchestrator.decrypt(U256::from(2))
    );
    assert!(first.is_ok());
    assert!(second.unwrap_err().is_precondition());
    assert_eq!(h.signer.prompt_count(), 1);

    h.orchestrator.decrypt(U256::from(2)).await.unwrap();
    assert_eq!(h.signer.prompt_count(), 1);
}

#[tokio::test]
async fn test_load_and_decrypt_interleave() {
    let h = Harness::with_parts(
        MockEngine::new(),
        MockSigner::with_delay(Duration::from_millis(30)),
        MockContract::with_read_delay(Duration::from_millis(30)),
    );
    h.orchestrator.mint(dragon()).await.unwrap();

    let (loaded, decrypted) = tokio::join!(
        h.orchestrator.load(),
        h.orchestrator.decrypt(U256::from(1))
    );

    assert_eq!(loaded.unwrap(), vec![U256::from(1)]);
    assert_eq!(decrypted.unwrap().power, "850");
    let snapshot = h.orchestrator.snapshot().await;
    assert!(snapshot.decrypted(U256::from(1)).is_some());
    assert!(snapshot.public_data(U256::from(1)).is_some());
    assert!(!snapshot.is_loading && !snapshot.is_decrypting);
}

#[tokio::test]
async fn test_concurrent_mints_send_one_transaction() {
    let h = Harness::with_parts(
        MockEngine::new(),
        MockSigner::new(),
        MockContract::with_mint_delay(Duration::from_millis(50)),
    );

    let (first, second) = tokio::join!(h.orchestrator.mint(dragon()), h.orchestrator.mint(dragon()));

    assert!(first.is_ok());
    assert!(second.unwrap_err().is_precondition());
    assert_eq!(h.contract.mints_sent(), 1);
    assert_eq!(h.engine.encrypt_count(), 1);
    assert_eq!(h.contract.token_count(), 1);
}

#[tokio::test]
async fn test_mint_during_load_forces_another_load() {
    let h = Harness::with_parts(
        MockEngine::new(),
        MockSigner::new(),
        MockContract::with_read_delay(Duration::from_millis(50)),
    );

    // The mint finishes while the load is still reading; its own reload is
    // dropped because a load is running
    let (loaded, minted) = tokio::join!(h.orchestrator.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.orchestrator.mint(dragon()).await
    });
    assert!(loaded.is_ok());
    assert!(minted.is_ok());
    assert!(!h.orchestrator.snapshot().await.has_loaded_once);

    h.orchestrator.ensure_loaded().await.unwrap();

    let snapshot = h.orchestrator.snapshot().await;
    assert!(snapshot.has_loaded_once);
    assert_eq!(snapshot.owned_tokens, vec![U256::from(1)]);
    assert_eq!(h.contract.owner_read_count(), 2);
}
