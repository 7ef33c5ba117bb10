// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::Address;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use super::error::OperationError;
use super::events::{OperationKind, OrchestratorEvent};
use super::guard::OperationFlag;
use super::state::{
    DecryptedAttributes, EncryptedAttributes, NftMetadata, NftSnapshot, OrchestratorState,
};
use crate::contracts::{ContractError, MintReceipt, MintRequest, NftContractClient, TokenId};
use crate::fhe::{CiphertextHandle, ClearValue, FheEngine, HandleContractPair, PlaintextValue};
use crate::input::encrypt_values;
use crate::session::DecryptionSessionManager;
use crate::wallet::WalletSigner;

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// External capabilities the orchestrator works with. Any of them may be
/// absent, e.g. before the wallet connects or on a chain without a
/// deployment.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub engine: Option<Arc<dyn FheEngine>>,
    pub signer: Option<Arc<dyn WalletSigner>>,
    pub contract: Option<Arc<dyn NftContractClient>>,
}

pub struct NftOrchestrator {
    capabilities: RwLock<Capabilities>,
    sessions: Arc<DecryptionSessionManager>,
    state: RwLock<OrchestratorState>,
    loading: OperationFlag,
    minting: OperationFlag,
    decrypting: OperationFlag,
    events: broadcast::Sender<OrchestratorEvent>,
}

impl NftOrchestrator {
    pub fn new(sessions: Arc<DecryptionSessionManager>) -> Self {
        Self::with_capabilities(sessions, Capabilities::default())
    }

    pub fn with_capabilities(
        sessions: Arc<DecryptionSessionManager>,
        capabilities: Capabilities,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            capabilities: RwLock::new(capabilities),
            sessions,
            state: RwLock::new(OrchestratorState::default()),
            loading: OperationFlag::default(),
            minting: OperationFlag::default(),
            decrypting: OperationFlag::default(),
            events,
        }
    }

    pub async fn set_engine(&self, engine: Option<Arc<dyn FheEngine>>) {
        self.capabilities.write().await.engine = engine;
    }

    pub async fn set_signer(&self, signer: Option<Arc<dyn WalletSigner>>) {
        self.capabilities.write().await.signer = signer;
    }

    /// Swap the contract client, e.g. after a chain switch. Loaded tokens
    /// belong to the previous deployment and are cleared; loads and
    /// decryptions still running against it will not commit.
    pub async fn set_contract(&self, contract: Option<Arc<dyn NftContractClient>>) {
        // Lock order: capabilities, then state
        let mut capabilities = self.capabilities.write().await;
        let old = capabilities.contract.as_ref().map(|c| c.address());
        let new = contract.as_ref().map(|c| c.address());
        capabilities.contract = contract;
        if old != new {
            self.state.write().await.reset_for_new_contract();
            debug!(?old, ?new, "contract changed, state cleared");
        }
    }

    /// Capabilities plus the state generation and load epoch they belong to
    async fn begin(&self) -> (Capabilities, u64, u64) {
        let capabilities = self.capabilities.read().await;
        let state = self.state.read().await;
        (capabilities.clone(), state.generation, state.load_epoch)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.events.subscribe()
    }

    pub fn sessions(&self) -> &Arc<DecryptionSessionManager> {
        &self.sessions
    }

    pub async fn contract_address(&self) -> Option<Address> {
        self.capabilities
            .read()
            .await
            .contract
            .as_ref()
            .map(|c| c.address())
    }

    pub async fn is_deployed(&self) -> bool {
        self.contract_address()
            .await
            .map_or(false, |address| !address.is_zero())
    }

    pub async fn can_mint(&self) -> bool {
        let caps = self.capabilities.read().await;
        caps.contract.is_some()
            && caps.engine.is_some()
            && caps.signer.is_some()
            && !self.minting.is_running()
    }

    pub async fn can_load(&self) -> bool {
        let caps = self.capabilities.read().await;
        caps.contract.is_some() && caps.signer.is_some()
    }

    pub async fn can_decrypt(&self) -> bool {
        let caps = self.capabilities.read().await;
        caps.contract.is_some()
            && caps.engine.is_some()
            && caps.signer.is_some()
            && !self.decrypting.is_running()
    }

    pub async fn message(&self) -> String {
        self.state.read().await.message.clone()
    }

    pub async fn snapshot(&self) -> NftSnapshot {
        let capabilities = self.capabilities.read().await;
        let state = self.state.read().await;
        NftSnapshot {
            contract_address: capabilities.contract.as_ref().map(|c| c.address()),
            owned_tokens: state.owned_tokens.clone(),
            tokens: state.tokens.clone(),
            total_supply: state.total_supply,
            has_loaded_once: state.has_loaded_once,
            is_loading: self.loading.is_running(),
            is_minting: self.minting.is_running(),
            is_decrypting: self.decrypting.is_running(),
            message: state.message.clone(),
        }
    }

    /// Load once as soon as the capabilities allow it
    pub async fn ensure_loaded(&self) -> Result<(), OperationError> {
        let loaded = self.state.read().await.has_loaded_once;
        if loaded || !self.can_load().await {
            return Ok(());
        }
        self.load().await.map(|_| ())
    }

    /// Encrypt the private attributes of `metadata`, submit the mint and
    /// reload owned tokens on success.
    pub async fn mint(&self, metadata: NftMetadata) -> Result<MintReceipt, OperationError> {
        let Some(_guard) = self.minting.try_acquire() else {
            return Err(self
                .precondition(OperationKind::Mint, "mint already in progress", true)
                .await);
        };

        let caps = self.capabilities.read().await.clone();
        let (Some(engine), Some(signer), Some(contract)) = (caps.engine, caps.signer, caps.contract)
        else {
            return Err(self
                .precondition(
                    OperationKind::Mint,
                    "minting requires an FHE engine, a signer and a deployed contract",
                    true,
                )
                .await);
        };
        if let Err(reason) = metadata.validate() {
            return Err(self.precondition(OperationKind::Mint, &reason, true).await);
        }

        self.emit(OrchestratorEvent::OperationStarted {
            operation: OperationKind::Mint,
        });
        self.set_message("Starting NFT mint...").await;

        match self.run_mint(engine, signer, contract, &metadata).await {
            Ok(receipt) => {
                let gas_used = receipt
                    .gas_used
                    .map(|gas| gas.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                self.state.write().await.invalidate_loaded();
                self.set_message(format!("NFT minted successfully! Gas used: {}", gas_used))
                    .await;
                self.emit(OrchestratorEvent::TokenMinted {
                    receipt: receipt.clone(),
                });

                if let Err(e) = self.load().await {
                    debug!("reload after mint did not complete: {}", e);
                }
                Ok(receipt)
            }
            Err(e) => {
                self.fail(OperationKind::Mint, "Error minting NFT".to_string(), &e)
                    .await;
                Err(e)
            }
        }
    }

    async fn run_mint(
        &self,
        engine: Arc<dyn FheEngine>,
        signer: Arc<dyn WalletSigner>,
        contract: Arc<dyn NftContractClient>,
        metadata: &NftMetadata,
    ) -> Result<MintReceipt, OperationError> {
        let owner = signer.address();

        self.set_message("Encrypting private attributes...").await;
        let values = [
            PlaintextValue::u32(metadata.rarity),
            PlaintextValue::u32(metadata.power),
            PlaintextValue::bool(metadata.is_legendary),
        ];
        let batch = encrypt_values(Some(&engine), contract.address(), owner, &values).await?;
        let [rarity, power, is_legendary]: [CiphertextHandle; 3] =
            batch.handles.try_into().map_err(|handles: Vec<CiphertextHandle>| {
                OperationError::EncryptionFailed(format!("expected 3 handles, got {}", handles.len()))
            })?;

        self.set_message("Sending mint transaction...").await;
        let request = MintRequest {
            owner,
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            image_url: metadata.image_url.clone(),
            rarity,
            power,
            is_legendary,
            input_proof: batch.input_proof,
        };
        let tx_hash = contract
            .send_mint(&request)
            .await
            .map_err(|e| OperationError::SubmissionFailed(e.to_string()))?;

        self.set_message(format!("Waiting for transaction: {:?}", tx_hash))
            .await;
        contract
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| OperationError::SubmissionFailed(e.to_string()))
    }

    /// Refresh owned token ids, their public data and the total supply.
    /// Nothing is committed unless every read succeeds.
    pub async fn load(&self) -> Result<Vec<TokenId>, OperationError> {
        let Some(_guard) = self.loading.try_acquire() else {
            return Err(self
                .precondition(OperationKind::Load, "load already in progress", false)
                .await);
        };

        let (caps, generation, load_epoch) = self.begin().await;
        let (Some(signer), Some(contract)) = (caps.signer, caps.contract) else {
            return Err(self
                .precondition(
                    OperationKind::Load,
                    "loading requires a signer and a deployed contract",
                    true,
                )
                .await);
        };

        self.emit(OrchestratorEvent::OperationStarted {
            operation: OperationKind::Load,
        });

        match self
            .run_load(signer.address(), contract.as_ref(), generation, load_epoch)
            .await
        {
            Ok((owned, total_supply)) => {
                self.set_message(format!("Loaded {} NFTs", owned.len())).await;
                self.emit(OrchestratorEvent::TokensLoaded {
                    owned: owned.clone(),
                    total_supply,
                });
                Ok(owned)
            }
            Err(e) => {
                self.fail(OperationKind::Load, "Error loading NFTs".to_string(), &e)
                    .await;
                Err(e)
            }
        }
    }

    async fn run_load(
        &self,
        owner: Address,
        contract: &dyn NftContractClient,
        generation: u64,
        load_epoch: u64,
    ) -> Result<(Vec<TokenId>, TokenId), OperationError> {
        let rpc_error = |e: ContractError| OperationError::SubmissionFailed(e.to_string());

        let owned = contract.get_tokens_by_owner(owner).await.map_err(rpc_error)?;
        let public = try_join_all(owned.iter().map(|&token_id| async move {
            contract
                .get_public_data(token_id)
                .await
                .map(|data| (token_id, data))
        }))
        .await
        .map_err(rpc_error)?;
        let total_supply = contract.total_supply().await.map_err(rpc_error)?;

        let committed = self.state.write().await.apply_load(
            generation,
            load_epoch,
            owned.clone(),
            public,
            total_supply,
        );
        if !committed {
            return Err(OperationError::SubmissionFailed(
                "contract changed while loading".to_string(),
            ));
        }
        info!(owner = ?owner, owned = owned.len(), total_supply = %total_supply, "owned tokens loaded");
        Ok((owned, total_supply))
    }

    /// Decrypt the private attributes of `token_id`. A token that already
    /// has a plaintext mirror is returned from state without touching the
    /// engine or the contract.
    pub async fn decrypt(&self, token_id: TokenId) -> Result<DecryptedAttributes, OperationError> {
        if let Some(existing) = self.state.read().await.decrypted(token_id).cloned() {
            return Ok(existing);
        }

        let Some(_guard) = self.decrypting.try_acquire() else {
            return Err(self
                .precondition(OperationKind::Decrypt, "decryption already in progress", false)
                .await);
        };

        let (caps, generation, _) = self.begin().await;
        let (Some(engine), Some(signer), Some(contract)) = (caps.engine, caps.signer, caps.contract)
        else {
            return Err(self
                .precondition(
                    OperationKind::Decrypt,
                    "decryption requires an FHE engine, a signer and a deployed contract",
                    true,
                )
                .await);
        };

        self.emit(OrchestratorEvent::OperationStarted {
            operation: OperationKind::Decrypt,
        });
        self.set_message(format!("Starting decryption for NFT #{}...", token_id))
            .await;

        match self
            .run_decrypt(token_id, engine, signer, contract, generation)
            .await
        {
            Ok(attributes) => {
                self.set_message(format!(
                    "NFT #{} private data decrypted successfully!",
                    token_id
                ))
                .await;
                self.emit(OrchestratorEvent::TokenDecrypted {
                    token_id,
                    attributes: attributes.clone(),
                });
                Ok(attributes)
            }
            Err(e) => {
                let context = match &e {
                    OperationError::SigningDenied(_) => {
                        "Unable to create decryption signature".to_string()
                    }
                    _ => format!("Error decrypting NFT #{}", token_id),
                };
                self.fail(OperationKind::Decrypt, context, &e).await;
                Err(e)
            }
        }
    }

    async fn run_decrypt(
        &self,
        token_id: TokenId,
        engine: Arc<dyn FheEngine>,
        signer: Arc<dyn WalletSigner>,
        contract: Arc<dyn NftContractClient>,
        generation: u64,
    ) -> Result<DecryptedAttributes, OperationError> {
        let contract_address = contract.address();
        let (rarity, power, is_legendary) = tokio::try_join!(
            contract.get_rarity(token_id),
            contract.get_power(token_id),
            contract.get_is_legendary(token_id),
        )
        .map_err(|e| OperationError::DecryptionFailed(format!("cannot read handles: {}", e)))?;
        let encrypted = EncryptedAttributes {
            rarity,
            power,
            is_legendary,
        };

        let credential = self
            .sessions
            .get_or_create(engine.clone(), signer, &[contract_address])
            .await?;

        self.set_message("Decrypting private attributes...").await;
        let pairs = [rarity, power, is_legendary].map(|handle| HandleContractPair {
            handle,
            contract_address,
        });
        let clear = engine
            .user_decrypt(&pairs, &credential)
            .await
            .map_err(|e| OperationError::DecryptionFailed(e.to_string()))?;

        let attributes = decode_attributes(token_id, &encrypted, &clear)?;
        let committed = self.state.write().await.apply_decrypt(
            generation,
            token_id,
            encrypted,
            attributes.clone(),
        );
        if !committed {
            return Err(OperationError::DecryptionFailed(
                "contract changed while decrypting".to_string(),
            ));
        }
        Ok(attributes)
    }

    async fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.state.write().await.message = message.clone();
        self.emit(OrchestratorEvent::StatusChanged { message });
    }

    async fn precondition(
        &self,
        operation: OperationKind,
        reason: &str,
        announce: bool,
    ) -> OperationError {
        debug!(?operation, "operation skipped: {}", reason);
        if announce {
            let verb = match operation {
                OperationKind::Mint => "mint",
                OperationKind::Load => "load NFTs",
                OperationKind::Decrypt => "decrypt",
            };
            self.set_message(format!("Cannot {}: {}", verb, reason)).await;
        }
        OperationError::PreconditionNotMet(reason.to_string())
    }

    async fn fail(&self, operation: OperationKind, context: String, error: &OperationError) {
        warn!(?operation, kind = ?error.kind(), "{}: {}", context, error);
        let message = format!("{}: {}", context, error);
        self.state.write().await.message = message.clone();
        self.emit(OrchestratorEvent::StatusChanged { message });
        self.emit(OrchestratorEvent::OperationFailed {
            operation,
            kind: error.kind(),
            reason: error.to_string(),
        });
    }

    fn emit(&self, event: OrchestratorEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

/// Map engine cleartexts back onto (rarity, power, legendary)
fn decode_attributes(
    token_id: TokenId,
    encrypted: &EncryptedAttributes,
    clear: &HashMap<CiphertextHandle, ClearValue>,
) -> Result<DecryptedAttributes, OperationError> {
    Ok(DecryptedAttributes {
        token_id: token_id.to_string(),
        rarity: clear_integer(clear, &encrypted.rarity, "rarity")?,
        power: clear_integer(clear, &encrypted.power, "power")?,
        // Only the boolean true sentinel counts as legendary
        is_legendary: *clear_value(clear, &encrypted.is_legendary, "legendary")?
            == ClearValue::TRUE,
    })
}

fn clear_value<'a>(
    clear: &'a HashMap<CiphertextHandle, ClearValue>,
    handle: &CiphertextHandle,
    field: &str,
) -> Result<&'a ClearValue, OperationError> {
    clear.get(handle).ok_or_else(|| {
        OperationError::DecryptionFailed(format!("engine returned no value for {}", field))
    })
}

fn clear_integer(
    clear: &HashMap<CiphertextHandle, ClearValue>,
    handle: &CiphertextHandle,
    field: &str,
) -> Result<String, OperationError> {
    clear_value(clear, handle, field)?
        .to_decimal_string()
        .ok_or_else(|| OperationError::DecryptionFailed(format!("{} is not an integer", field)))
}
