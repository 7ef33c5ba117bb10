// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const HARDHAT_CHAIN_ID: u64 = 31337;
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// Where the PrivateNFT contract lives on one chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub chain_id: u64,
    pub chain_name: String,
    pub address: Address,
}

impl Deployment {
    pub fn hardhat() -> Self {
        Deployment {
            chain_id: HARDHAT_CHAIN_ID,
            chain_name: "Hardhat Local".to_string(),
            address: std::env::var("PRIVATE_NFT_HARDHAT_ADDRESS")
                .ok()
                .and_then(|addr| Address::from_str(&addr).ok())
                // First deployment from the default Hardhat account
                .unwrap_or_else(|| Address::from(hardhat_default_address())),
        }
    }

    pub fn sepolia() -> Self {
        Deployment {
            chain_id: SEPOLIA_CHAIN_ID,
            chain_name: "Sepolia".to_string(),
            address: std::env::var("PRIVATE_NFT_SEPOLIA_ADDRESS")
                .ok()
                .and_then(|addr| Address::from_str(&addr).ok())
                .unwrap_or_else(Address::zero),
        }
    }

    /// Zero address means the contract was never deployed on this chain
    pub fn is_deployed(&self) -> bool {
        !self.address.is_zero()
    }
}

fn hardhat_default_address() -> [u8; 20] {
    [
        0x4b, 0x44, 0x09, 0x84, 0xe8, 0xc8, 0x42, 0x1d, 0x96, 0xdd, 0x62, 0x05, 0xc3, 0xa3, 0xdf,
        0x8b, 0x18, 0x85, 0xfe, 0x2e,
    ]
}

pub struct DeploymentRegistry {
    deployments: HashMap<u64, Deployment>,
}

impl DeploymentRegistry {
    pub fn new() -> Self {
        let mut deployments = HashMap::new();
        deployments.insert(HARDHAT_CHAIN_ID, Deployment::hardhat());
        deployments.insert(SEPOLIA_CHAIN_ID, Deployment::sepolia());
        DeploymentRegistry { deployments }
    }

    pub fn empty() -> Self {
        DeploymentRegistry {
            deployments: HashMap::new(),
        }
    }

    pub fn insert(&mut self, deployment: Deployment) {
        self.deployments.insert(deployment.chain_id, deployment);
    }

    pub fn get(&self, chain_id: u64) -> Option<&Deployment> {
        self.deployments.get(&chain_id)
    }

    /// Contract address to use on `chain_id`. An explicit override wins;
    /// otherwise only a non-zero registered address counts.
    pub fn resolve(&self, chain_id: u64, override_address: Option<Address>) -> Option<Address> {
        if let Some(address) = override_address.filter(|a| !a.is_zero()) {
            return Some(address);
        }
        self.get(chain_id)
            .filter(|d| d.is_deployed())
            .map(|d| d.address)
    }

    pub fn list_supported_chains(&self) -> Vec<u64> {
        let mut chains: Vec<u64> = self.deployments.keys().cloned().collect();
        chains.sort_unstable();
        chains
    }
}

impl Default for DeploymentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
