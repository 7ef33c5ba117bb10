// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wallet Signer Capability
//!
//! The holder's wallet signs decryption authorizations. Browser wallets,
//! hardware wallets and local keys all fit behind [`WalletSigner`];
//! [`LocalWalletSigner`] adapts an `ethers` [`LocalWallet`].

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes};

use crate::fhe::AuthorizationPayload;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SignerError {
    #[error("User rejected the signature request: {0}")]
    Rejected(String),

    #[error("Signing failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address of the signing identity
    fn address(&self) -> Address;

    /// Sign an EIP-712 authorization, returning the 65-byte signature
    async fn sign_typed_data(&self, payload: &AuthorizationPayload) -> Result<Bytes, SignerError>;
}

/// [`WalletSigner`] backed by a local private key
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    wallet: LocalWallet,
}

impl LocalWalletSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }

    pub fn from_private_key(private_key: &str, chain_id: u64) -> anyhow::Result<Self> {
        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| anyhow::anyhow!("Invalid private key: {}", e))?
            .with_chain_id(chain_id);
        Ok(Self::new(wallet))
    }

    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }
}

#[async_trait]
impl WalletSigner for LocalWalletSigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn sign_typed_data(&self, payload: &AuthorizationPayload) -> Result<Bytes, SignerError> {
        let signature = self
            .wallet
            .sign_typed_data(payload.typed_data())
            .await
            .map_err(|e| SignerError::Failed(e.to_string()))?;
        Ok(Bytes::from(signature.to_vec()))
    }
}
