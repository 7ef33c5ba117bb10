// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fhe::CiphertextHandle;

// PrivateNFT contract ABI. Encrypted attributes travel as bytes32 handles.
abigen!(
    PrivateNFT,
    r#"[
        {
            "inputs": [{"internalType": "address", "name": "owner", "type": "address"}],
            "name": "getTokensByOwner",
            "outputs": [{"internalType": "uint256[]", "name": "", "type": "uint256[]"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint256", "name": "tokenId", "type": "uint256"}],
            "name": "getPublicData",
            "outputs": [
                {"internalType": "string", "name": "name", "type": "string"},
                {"internalType": "string", "name": "description", "type": "string"},
                {"internalType": "string", "name": "imageUrl", "type": "string"},
                {"internalType": "address", "name": "owner", "type": "address"},
                {"internalType": "bool", "name": "exists", "type": "bool"}
            ],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint256", "name": "tokenId", "type": "uint256"}],
            "name": "getRarity",
            "outputs": [{"internalType": "euint32", "name": "", "type": "bytes32"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint256", "name": "tokenId", "type": "uint256"}],
            "name": "getPower",
            "outputs": [{"internalType": "euint32", "name": "", "type": "bytes32"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint256", "name": "tokenId", "type": "uint256"}],
            "name": "getIsLegendary",
            "outputs": [{"internalType": "ebool", "name": "", "type": "bytes32"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [],
            "name": "totalSupply",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "address", "name": "to", "type": "address"},
                {"internalType": "string", "name": "name", "type": "string"},
                {"internalType": "string", "name": "description", "type": "string"},
                {"internalType": "string", "name": "imageUrl", "type": "string"},
                {"internalType": "externalEuint32", "name": "encryptedRarity", "type": "bytes32"},
                {"internalType": "externalEuint32", "name": "encryptedPower", "type": "bytes32"},
                {"internalType": "externalEbool", "name": "encryptedIsLegendary", "type": "bytes32"},
                {"internalType": "bytes", "name": "inputProof", "type": "bytes"}
            ],
            "name": "mint",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "nonpayable",
            "type": "function"
        }
    ]"#
);

pub type TokenId = U256;

/// Public, plaintext fields of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTokenData {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub owner: Address,
    pub exists: bool,
}

/// Arguments of a mint transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub owner: Address,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub rarity: CiphertextHandle,
    pub power: CiphertextHandle,
    pub is_legendary: CiphertextHandle,
    pub input_proof: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("Contract call failed: {0}")]
    Call(String),

    #[error("Transaction submission failed: {0}")]
    Submission(String),

    #[error("Transaction {0:?} reverted")]
    Reverted(H256),

    #[error("Transaction {0:?} dropped from mempool")]
    Dropped(H256),

    #[error("No signing wallet configured")]
    NoSigner,
}

impl From<ethers::providers::ProviderError> for ContractError {
    fn from(err: ethers::providers::ProviderError) -> Self {
        ContractError::Call(err.to_string())
    }
}
