// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use std::sync::Arc;
use tracing::info;

use crate::config::{ClientConfig, DeploymentRegistry};
use crate::contracts::EthersNftContract;
use crate::orchestrator::{Capabilities, NftOrchestrator, NftSnapshot};
use crate::wallet::LocalWalletSigner;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the loaded snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Load owned tokens and the total supply for the configured wallet
pub async fn list_tokens(config: &ClientConfig, args: ListArgs) -> Result<()> {
    let private_key = config
        .private_key
        .as_deref()
        .ok_or_else(|| anyhow!("Private key required. Set PRIVATE_NFT_PRIVATE_KEY or private_key"))?;
    let signer = LocalWalletSigner::from_private_key(private_key, config.chain_id)?;

    let registry = DeploymentRegistry::new();
    let address = config.resolve_contract(&registry).ok_or_else(|| {
        anyhow!(
            "PrivateNFT is not deployed on chain {}. Set a contract address override",
            config.chain_id
        )
    })?;
    let contract =
        EthersNftContract::connect(&config.rpc_url, config.chain_id, address, None).await?;

    let orchestrator = NftOrchestrator::with_capabilities(
        Arc::new(config.session_manager()?),
        Capabilities {
            engine: None,
            signer: Some(Arc::new(signer)),
            contract: Some(Arc::new(contract)),
        },
    );
    orchestrator.load().await?;

    let snapshot = orchestrator.snapshot().await;
    info!(owned = snapshot.owned_tokens.len(), "tokens listed");
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_snapshot(&snapshot));
    }
    Ok(())
}

fn render_snapshot(snapshot: &NftSnapshot) -> String {
    let mut out = String::new();
    if let Some(address) = snapshot.contract_address {
        out.push_str(&format!("Contract:     {:?}\n", address));
    }
    out.push_str(&format!("Total supply: {}\n", snapshot.total_supply));
    out.push_str(&format!("Owned:        {}\n", snapshot.owned_tokens.len()));
    for token_id in &snapshot.owned_tokens {
        match snapshot.public_data(*token_id) {
            Some(data) => out.push_str(&format!("  #{:<6} {}\n", token_id, data.name)),
            None => out.push_str(&format!("  #{}\n", token_id)),
        }
    }
    out
}
