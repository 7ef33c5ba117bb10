// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! FHE Engine Capability
//!
//! The homomorphic encryption scheme itself lives outside this crate. This
//! module defines the narrow capability the client needs from it:
//!
//! - **Keypairs**: ephemeral keypairs for user decryption sessions
//! - **Authorization**: EIP-712 payloads the wallet signs to authorize decryption
//! - **Encryption**: batched encrypted inputs with a single validity proof
//! - **User decryption**: recovering cleartext for handles under a signed session
//!
//! Implementations wrap whatever FHE runtime the embedding application uses.

pub mod engine;
pub mod types;

pub use engine::{FheEngine, FheError};
pub use types::{
    AuthorizationPayload, CiphertextHandle, ClearValue, EncryptedBatch, EphemeralKeypair,
    HandleContractPair, PlaintextValue,
};
