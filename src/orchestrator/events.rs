// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::U256;
use serde::{Deserialize, Serialize};

use super::error::ErrorKind;
use super::state::DecryptedAttributes;
use crate::contracts::{MintReceipt, TokenId};

/// Operation kinds guarded by their own running flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Mint,
    Load,
    Decrypt,
}

/// Change notifications published by the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    StatusChanged {
        message: String,
    },
    OperationStarted {
        operation: OperationKind,
    },
    TokensLoaded {
        owned: Vec<TokenId>,
        total_supply: U256,
    },
    TokenMinted {
        receipt: MintReceipt,
    },
    TokenDecrypted {
        token_id: TokenId,
        attributes: DecryptedAttributes,
    },
    OperationFailed {
        operation: OperationKind,
        kind: ErrorKind,
        reason: String,
    },
}
