// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Minimal capability mocks for unit tests. The end-to-end mocks live in
//! `tests/common`.

use async_trait::async_trait;
use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Bytes};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::fhe::{
    AuthorizationPayload, CiphertextHandle, ClearValue, EncryptedBatch, EphemeralKeypair,
    FheEngine, FheError, HandleContractPair, PlaintextValue,
};
use crate::session::{ContractScope, SessionCredential};
use crate::wallet::{SignerError, WalletSigner};

pub fn contract_address() -> Address {
    Address::from([0xc0; 20])
}

pub fn user_address() -> Address {
    Address::from([0x11; 20])
}

/// Encrypts by position: handle byte 0 is the batch number, byte 1 the index
#[derive(Default)]
pub struct MockEngine {
    keypairs: AtomicUsize,
    encryptions: AtomicUsize,
    reject_encrypt: AtomicBool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_encryption() -> Self {
        let engine = Self::default();
        engine.reject_encrypt.store(true, Ordering::SeqCst);
        engine
    }

    pub fn encrypt_count(&self) -> usize {
        self.encryptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FheEngine for MockEngine {
    async fn generate_keypair(&self) -> Result<EphemeralKeypair, FheError> {
        let n = self.keypairs.fetch_add(1, Ordering::SeqCst) as u8;
        Ok(EphemeralKeypair {
            public_key: Bytes::from(vec![n; 32]),
            private_key: Bytes::from(vec![n ^ 0xff; 32]),
        })
    }

    fn build_authorization_payload(
        &self,
        _scope: &ContractScope,
        _public_key: &[u8],
        _start_timestamp: u64,
        _validity_days: u32,
    ) -> Result<AuthorizationPayload, FheError> {
        let typed_data: TypedData = serde_json::from_value(serde_json::json!({
            "types": {"EIP712Domain": [{"name": "name", "type": "string"}]},
            "primaryType": "EIP712Domain",
            "domain": {"name": "Decryption"},
            "message": {}
        }))
        .map_err(|e| FheError::Rejected(e.to_string()))?;
        Ok(AuthorizationPayload::from(typed_data))
    }

    async fn encrypt_batch(
        &self,
        _contract: Address,
        _user: Address,
        values: &[PlaintextValue],
    ) -> Result<EncryptedBatch, FheError> {
        if self.reject_encrypt.load(Ordering::SeqCst) {
            return Err(FheError::Rejected("relayer unavailable".to_string()));
        }
        let batch = self.encryptions.fetch_add(1, Ordering::SeqCst) as u8;
        let handles = (0..values.len())
            .map(|index| {
                let mut bytes = [0u8; 32];
                bytes[0] = batch;
                bytes[1] = index as u8;
                CiphertextHandle::new(bytes)
            })
            .collect();
        Ok(EncryptedBatch {
            handles,
            input_proof: Bytes::from(vec![0xaa, batch]),
        })
    }

    async fn user_decrypt(
        &self,
        _handles: &[HandleContractPair],
        _credential: &SessionCredential,
    ) -> Result<HashMap<CiphertextHandle, ClearValue>, FheError> {
        Err(FheError::Rejected("not used by unit tests".to_string()))
    }
}

pub struct MockSigner {
    signatures: AtomicUsize,
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            signatures: AtomicUsize::new(0),
        }
    }

    pub fn sign_count(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for MockSigner {
    fn address(&self) -> Address {
        user_address()
    }

    async fn sign_typed_data(&self, _payload: &AuthorizationPayload) -> Result<Bytes, SignerError> {
        let n = self.signatures.fetch_add(1, Ordering::SeqCst) as u8;
        Ok(Bytes::from(vec![n; 65]))
    }
}
