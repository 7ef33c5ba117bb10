// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use clap::Args;
use ethers::types::Address;

use crate::config::{ClientConfig, DeploymentRegistry};
use crate::session::manager::unix_now;
use crate::session::{CacheKey, ContractScope, SessionCredential};
use crate::wallet::{LocalWalletSigner, WalletSigner};

/// Arguments for the credentials command
#[derive(Args, Debug)]
pub struct CredentialsArgs {
    /// Credential holder (defaults to the configured wallet)
    #[arg(long)]
    pub user: Option<Address>,

    /// Contract in the scope; repeat for multi-contract sessions
    /// (defaults to the deployment for the configured chain)
    #[arg(long = "contract")]
    pub contracts: Vec<Address>,
}

/// Look up the cached credential for a scope in the configured store
pub async fn show_credential(config: &ClientConfig, args: CredentialsArgs) -> Result<()> {
    if config.credential_store_path.is_none() {
        return Err(anyhow!(
            "No credential store path configured; in-memory sessions do not outlive the process"
        ));
    }

    let user = match args.user {
        Some(user) => user,
        None => {
            let key = config
                .private_key
                .as_deref()
                .ok_or_else(|| anyhow!("Pass --user or configure a private key"))?;
            LocalWalletSigner::from_private_key(key, config.chain_id)?.address()
        }
    };
    let contracts = if args.contracts.is_empty() {
        let address = config
            .resolve_contract(&DeploymentRegistry::new())
            .ok_or_else(|| anyhow!("Pass --contract; no deployment on chain {}", config.chain_id))?;
        vec![address]
    } else {
        args.contracts
    };
    let scope = ContractScope::new(&contracts)?;
    let key = CacheKey::new(user, &scope);

    let store = config.credential_store()?;
    let credential = store.get(key.as_str()).await?;
    println!("{}", describe(&key, credential.as_ref(), unix_now()));
    Ok(())
}

fn describe(key: &CacheKey, credential: Option<&SessionCredential>, now: u64) -> String {
    let Some(credential) = credential else {
        return format!("{}: no cached credential", key);
    };
    let expires_at = credential.expires_at();
    let expiry = Utc
        .timestamp_opt(expires_at as i64, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| expires_at.to_string());
    let status = if credential.is_valid_at(now) {
        "valid"
    } else {
        "expired"
    };
    format!(
        "{}: {} (contracts: {}, expires {})",
        key,
        status,
        credential.scoped_contracts.len(),
        expiry
    )
}
