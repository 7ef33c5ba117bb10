// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod contracts;
pub mod crypto;
pub mod fhe;
pub mod input;
pub mod orchestrator;
pub mod session;
pub mod wallet;

#[cfg(test)]
mod test_utils;

// Re-export main types
pub use config::{ClientConfig, Deployment, DeploymentRegistry};
pub use contracts::{
    ContractError, EthersNftContract, MintReceipt, MintRequest, NftContractClient,
    PublicTokenData, TokenId,
};
pub use fhe::{
    AuthorizationPayload, CiphertextHandle, ClearValue, EncryptedBatch, EphemeralKeypair,
    FheEngine, FheError, HandleContractPair, PlaintextValue,
};
pub use input::{encrypt_values, EncryptedInputBuilder, InputError};
pub use orchestrator::{
    Capabilities, DecryptedAttributes, ErrorKind, NftMetadata, NftOrchestrator, NftSnapshot,
    OperationError, OperationKind, OrchestratorEvent,
};
pub use session::{
    CacheKey, ContractScope, CredentialStore, DecryptionSessionManager, FileCredentialStore,
    InMemoryCredentialStore, SessionCredential, SessionError,
};
pub use wallet::{LocalWalletSigner, SignerError, WalletSigner};
