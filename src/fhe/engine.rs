// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use ethers::types::Address;
use std::collections::HashMap;

use super::types::{
    AuthorizationPayload, CiphertextHandle, ClearValue, EncryptedBatch, EphemeralKeypair,
    HandleContractPair, PlaintextValue,
};
use crate::session::{ContractScope, SessionCredential};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FheError {
    #[error("FHE engine is not initialized")]
    Unavailable,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Engine rejected request: {0}")]
    Rejected(String),

    #[error("Relayer error: {0}")]
    Relayer(String),
}

/// Opaque FHE capability consumed by the session manager, the input builder
/// and the orchestrator.
#[async_trait]
pub trait FheEngine: Send + Sync {
    /// Generate a fresh ephemeral keypair for a decryption session.
    async fn generate_keypair(&self) -> Result<EphemeralKeypair, FheError>;

    /// Build the EIP-712 payload that authorizes `public_key` to decrypt
    /// handles of the contracts in `scope` for `validity_days` days starting
    /// at `start_timestamp` (unix seconds).
    fn build_authorization_payload(
        &self,
        scope: &ContractScope,
        public_key: &[u8],
        start_timestamp: u64,
        validity_days: u32,
    ) -> Result<AuthorizationPayload, FheError>;

    /// Encrypt `values` for `contract` on behalf of `user`. The returned
    /// handles are in input order.
    async fn encrypt_batch(
        &self,
        contract: Address,
        user: Address,
        values: &[PlaintextValue],
    ) -> Result<EncryptedBatch, FheError>;

    /// Decrypt `handles` under a signed session credential.
    async fn user_decrypt(
        &self,
        handles: &[HandleContractPair],
        credential: &SessionCredential,
    ) -> Result<HashMap<CiphertextHandle, ClearValue>, FheError>;
}
