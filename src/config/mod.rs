// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client Configuration
//!
//! Settings come from `PRIVATE_NFT_*` environment variables (a `.env` file
//! is honoured) or from a TOML file. The credential validity window has no
//! default: it must be configured explicitly.

pub mod deployments;

pub use deployments::{Deployment, DeploymentRegistry, HARDHAT_CHAIN_ID, SEPOLIA_CHAIN_ID};

use anyhow::{anyhow, Context, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::crypto::CredentialSealer;
use crate::session::{
    CredentialStore, DecryptionSessionManager, FileCredentialStore, InMemoryCredentialStore,
};

const ENV_PREFIX: &str = "PRIVATE_NFT_";

#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub credential_store_path: Option<PathBuf>,
    #[serde(default)]
    pub credential_store_secret: Option<String>,
    pub credential_validity_days: u32,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("credential_store_path", &self.credential_store_path)
            .field(
                "credential_store_secret",
                &self.credential_store_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("credential_validity_days", &self.credential_validity_days)
            .field("contract_address", &self.contract_address)
            .finish()
    }
}

impl ClientConfig {
    /// Load from the process environment after reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load from variables resolved by `lookup`, keyed by full variable name
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|value| !value.trim().is_empty())
        };
        let required = |name: &str| {
            var(name).ok_or_else(|| anyhow!("{}{} must be set", ENV_PREFIX, name))
        };

        let chain_id = required("CHAIN_ID")?
            .parse::<u64>()
            .with_context(|| format!("{}CHAIN_ID is not a number", ENV_PREFIX))?;
        let credential_validity_days = required("CREDENTIAL_VALIDITY_DAYS")?
            .parse::<u32>()
            .with_context(|| format!("{}CREDENTIAL_VALIDITY_DAYS is not a number", ENV_PREFIX))?;
        let contract_address = var("CONTRACT_ADDRESS")
            .map(|addr| Address::from_str(&addr))
            .transpose()
            .with_context(|| format!("{}CONTRACT_ADDRESS is not an address", ENV_PREFIX))?;

        let config = ClientConfig {
            rpc_url: required("RPC_URL")?,
            chain_id,
            private_key: var("PRIVATE_KEY"),
            credential_store_path: var("CREDENTIAL_STORE_PATH").map(PathBuf::from),
            credential_store_secret: var("CREDENTIAL_STORE_SECRET"),
            credential_validity_days,
            contract_address,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content).context("Invalid config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(anyhow!("rpc_url must not be empty"));
        }
        if self.credential_validity_days == 0 {
            return Err(anyhow!("credential_validity_days must be at least 1"));
        }
        if let Some(key) = &self.private_key {
            let hex_key = key.strip_prefix("0x").unwrap_or(key);
            if hex_key.len() != 64 || hex::decode(hex_key).is_err() {
                return Err(anyhow!("private_key must be 32 bytes of hex"));
            }
        }
        if matches!(&self.credential_store_secret, Some(secret) if secret.is_empty()) {
            return Err(anyhow!("credential_store_secret must not be empty"));
        }
        Ok(())
    }

    /// PrivateNFT address for the configured chain, if deployed there
    pub fn resolve_contract(&self, registry: &DeploymentRegistry) -> Option<Address> {
        registry.resolve(self.chain_id, self.contract_address)
    }

    /// File store under `credential_store_path`, otherwise in-memory
    pub fn credential_store(&self) -> Result<Arc<dyn CredentialStore>> {
        let Some(path) = &self.credential_store_path else {
            info!("Using in-memory credential store");
            return Ok(Arc::new(InMemoryCredentialStore::new()));
        };

        let mut store = FileCredentialStore::new(path);
        if let Some(secret) = &self.credential_store_secret {
            let sealer = CredentialSealer::from_secret(secret.as_bytes())
                .map_err(|e| anyhow!("Failed to derive credential sealing key: {}", e))?;
            store = store.with_sealer(sealer);
        }
        info!(
            path = %path.display(),
            sealed = self.credential_store_secret.is_some(),
            "Using file credential store"
        );
        Ok(Arc::new(store))
    }

    pub fn session_manager(&self) -> Result<DecryptionSessionManager> {
        DecryptionSessionManager::new(self.credential_store()?, self.credential_validity_days)
            .map_err(|e| anyhow!("{}", e))
    }
}
