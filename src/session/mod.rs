// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decryption Sessions
//!
//! A session credential is an ephemeral keypair plus the holder's wallet
//! signature over an EIP-712 authorization. It is scoped to one user and a
//! canonical set of contract addresses, and is valid for a caller-chosen
//! number of days from the moment it was signed.
//!
//! The [`DecryptionSessionManager`] hands out credentials from a
//! [`CredentialStore`] when a valid one exists and otherwise creates, signs
//! and persists a new one. Concurrent requests for the same cache key share a
//! single creation so the wallet is prompted at most once.

pub mod credential;
pub mod error;
pub mod file_store;
pub mod manager;
pub mod store;

pub use credential::{CacheKey, ContractScope, SessionCredential, SECONDS_PER_DAY};
pub use error::SessionError;
pub use file_store::FileCredentialStore;
pub use manager::DecryptionSessionManager;
pub use store::{CredentialStore, InMemoryCredentialStore};
