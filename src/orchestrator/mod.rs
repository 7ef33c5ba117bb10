// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Operation Orchestrator
//!
//! Coordinates the three client workflows over the PrivateNFT contract:
//!
//! - **Mint**: encrypt rarity, power and legendary status in one batch and
//!   submit them with the public metadata, then reload owned tokens
//! - **Load**: fetch owned token ids, their public data (concurrently) and
//!   the total supply, committing all three together
//! - **Decrypt**: fetch a token's handles, obtain a session credential and
//!   recover the plaintext attributes
//!
//! Each workflow has its own running flag. Different workflows may overlap;
//! a second call to a workflow that is already running is dropped. Results
//! are committed in a single state write at the end of a successful run, and
//! every failure is reported through the status message, the event stream
//! and the returned [`OperationError`].

pub mod error;
pub mod events;
mod guard;
pub mod operations;
pub mod state;

pub use error::{ErrorKind, OperationError};
pub use events::{OperationKind, OrchestratorEvent};
pub use operations::{Capabilities, NftOrchestrator};
pub use state::{
    DecryptedAttributes, EncryptedAttributes, NftMetadata, NftSnapshot, RarityTier, TokenRecord,
};
