// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::types::{
    ContractError, MintReceipt, MintRequest, PrivateNFT, PublicTokenData, TokenId,
};
use crate::fhe::CiphertextHandle;

type ChainProvider = Arc<Provider<Http>>;
type ChainSigner = SignerMiddleware<Arc<Provider<Http>>, LocalWallet>;

/// PrivateNFT contract surface used by the orchestrator
#[async_trait]
pub trait NftContractClient: Send + Sync {
    /// Deployed contract address
    fn address(&self) -> Address;

    async fn get_tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenId>, ContractError>;

    async fn get_public_data(&self, token_id: TokenId) -> Result<PublicTokenData, ContractError>;

    async fn get_rarity(&self, token_id: TokenId) -> Result<CiphertextHandle, ContractError>;

    async fn get_power(&self, token_id: TokenId) -> Result<CiphertextHandle, ContractError>;

    async fn get_is_legendary(&self, token_id: TokenId) -> Result<CiphertextHandle, ContractError>;

    async fn total_supply(&self) -> Result<U256, ContractError>;

    /// Broadcast a mint transaction and return its hash without waiting
    async fn send_mint(&self, request: &MintRequest) -> Result<H256, ContractError>;

    /// Wait until `tx_hash` is mined with the configured confirmations.
    /// A reverted or dropped transaction is an error.
    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<MintReceipt, ContractError>;
}

/// [`NftContractClient`] over JSON-RPC: reads through a plain provider,
/// writes through a wallet-backed signer middleware.
pub struct EthersNftContract {
    address: Address,
    provider: ChainProvider,
    reader: PrivateNFT<Provider<Http>>,
    writer: Option<PrivateNFT<ChainSigner>>,
    confirmations: usize,
}

impl EthersNftContract {
    pub fn new(address: Address, provider: ChainProvider, wallet: Option<LocalWallet>) -> Self {
        let reader = PrivateNFT::new(address, provider.clone());
        let writer = wallet.map(|wallet| {
            let signer = SignerMiddleware::new(provider.clone(), wallet);
            PrivateNFT::new(address, Arc::new(signer))
        });

        Self {
            address,
            provider,
            reader,
            writer,
            confirmations: 1,
        }
    }

    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Connect to `rpc_url`, verifying that it serves `chain_id`
    pub async fn connect(
        rpc_url: &str,
        chain_id: u64,
        address: Address,
        wallet: Option<LocalWallet>,
    ) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| anyhow!("Failed to create provider: {}", e))?
            .interval(Duration::from_millis(500));

        let remote_chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| anyhow!("Failed to connect to RPC: {}", e))?;
        if remote_chain_id.as_u64() != chain_id {
            return Err(anyhow!(
                "Chain ID mismatch: expected {}, got {}",
                chain_id,
                remote_chain_id
            ));
        }

        let wallet = wallet.map(|wallet| wallet.with_chain_id(chain_id));
        info!(contract = ?address, chain_id, rpc_url, "connected to PrivateNFT");
        Ok(Self::new(address, Arc::new(provider), wallet))
    }

    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }
}

fn call_error<M: Middleware>(err: ethers::contract::ContractError<M>) -> ContractError {
    ContractError::Call(err.to_string())
}

#[async_trait]
impl NftContractClient for EthersNftContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenId>, ContractError> {
        self.reader
            .get_tokens_by_owner(owner)
            .call()
            .await
            .map_err(call_error)
    }

    async fn get_public_data(&self, token_id: TokenId) -> Result<PublicTokenData, ContractError> {
        let (name, description, image_url, owner, exists) = self
            .reader
            .get_public_data(token_id)
            .call()
            .await
            .map_err(call_error)?;

        Ok(PublicTokenData {
            name,
            description,
            image_url,
            owner,
            exists,
        })
    }

    async fn get_rarity(&self, token_id: TokenId) -> Result<CiphertextHandle, ContractError> {
        let handle = self.reader.get_rarity(token_id).call().await.map_err(call_error)?;
        Ok(CiphertextHandle::from(handle))
    }

    async fn get_power(&self, token_id: TokenId) -> Result<CiphertextHandle, ContractError> {
        let handle = self.reader.get_power(token_id).call().await.map_err(call_error)?;
        Ok(CiphertextHandle::from(handle))
    }

    async fn get_is_legendary(&self, token_id: TokenId) -> Result<CiphertextHandle, ContractError> {
        let handle = self
            .reader
            .get_is_legendary(token_id)
            .call()
            .await
            .map_err(call_error)?;
        Ok(CiphertextHandle::from(handle))
    }

    async fn total_supply(&self) -> Result<U256, ContractError> {
        self.reader.total_supply().call().await.map_err(call_error)
    }

    async fn send_mint(&self, request: &MintRequest) -> Result<H256, ContractError> {
        let writer = self.writer.as_ref().ok_or(ContractError::NoSigner)?;

        let call = writer.mint(
            request.owner,
            request.name.clone(),
            request.description.clone(),
            request.image_url.clone(),
            request.rarity.into(),
            request.power.into(),
            request.is_legendary.into(),
            request.input_proof.clone(),
        );

        let pending = call
            .send()
            .await
            .map_err(|e| ContractError::Submission(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!(tx_hash = ?tx_hash, "mint transaction broadcast");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<MintReceipt, ContractError> {
        let receipt = PendingTransaction::new(tx_hash, &*self.provider)
            .confirmations(self.confirmations)
            .await
            .map_err(|e| ContractError::Submission(e.to_string()))?
            .ok_or(ContractError::Dropped(tx_hash))?;

        if receipt.status != Some(U64::from(1)) {
            return Err(ContractError::Reverted(tx_hash));
        }

        Ok(MintReceipt {
            tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt.gas_used,
        })
    }
}
