// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod credentials;
pub mod tokens;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ClientConfig;

/// Private NFT client CLI
#[derive(Parser, Debug)]
#[command(name = "private-nft-cli")]
#[command(version)]
#[command(about = "Inspect PrivateNFT tokens and cached decryption sessions", long_about = None)]
pub struct Cli {
    /// TOML config file (defaults to PRIVATE_NFT_* environment variables)
    #[arg(long, global = true, env = "PRIVATE_NFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tokens owned by the configured wallet
    List(tokens::ListArgs),

    /// Show the cached decryption credential for a contract scope
    Credentials(credentials::CredentialsArgs),
}

impl Cli {
    pub fn load_config(&self) -> Result<ClientConfig> {
        match &self.config {
            Some(path) => ClientConfig::from_toml_file(path),
            None => ClientConfig::from_env(),
        }
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    match cli.command {
        Commands::List(args) => tokens::list_tokens(&config, args).await,
        Commands::Credentials(args) => credentials::show_credential(&config, args).await,
    }
}
