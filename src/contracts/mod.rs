// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod client;
pub mod types;

pub use client::{EthersNftContract, NftContractClient};
pub use types::{ContractError, MintReceipt, MintRequest, PublicTokenData, TokenId};
