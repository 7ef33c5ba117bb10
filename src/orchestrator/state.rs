// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::contracts::{PublicTokenData, TokenId};
use crate::fhe::CiphertextHandle;

pub const MAX_RARITY: u32 = 100;
pub const MAX_POWER: u32 = 1000;

/// Everything needed to mint one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub rarity: u32,
    pub power: u32,
    pub is_legendary: bool,
}

impl NftMetadata {
    /// Rejects what the minting form would not submit
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !(1..=MAX_RARITY).contains(&self.rarity) {
            return Err(format!("rarity must be between 1 and {}", MAX_RARITY));
        }
        if !(1..=MAX_POWER).contains(&self.power) {
            return Err(format!("power must be between 1 and {}", MAX_POWER));
        }
        Ok(())
    }

    /// Quick-start templates
    pub fn presets() -> Vec<NftMetadata> {
        vec![
            NftMetadata {
                name: "Mystic Dragon".to_string(),
                description: "A legendary dragon with ancient wisdom and powerful magic".to_string(),
                image_url: "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400&q=80"
                    .to_string(),
                rarity: 95,
                power: 850,
                is_legendary: true,
            },
            NftMetadata {
                name: "Enchanted Sword".to_string(),
                description: "A blade forged in starfire with cutting through dimensions".to_string(),
                image_url: "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400&q=80"
                    .to_string(),
                rarity: 80,
                power: 650,
                is_legendary: false,
            },
            NftMetadata {
                name: "Crystal of Power".to_string(),
                description: "A mysterious crystal that amplifies magical abilities".to_string(),
                image_url: "https://images.unsplash.com/photo-1578269174936-2709b6aeb913?w=400&q=80"
                    .to_string(),
                rarity: 70,
                power: 400,
                is_legendary: false,
            },
        ]
    }
}

/// On-chain handles of a token's private attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedAttributes {
    pub rarity: CiphertextHandle,
    pub power: CiphertextHandle,
    pub is_legendary: CiphertextHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RarityTier {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Plaintext mirror of a token's private attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedAttributes {
    pub token_id: String,
    pub rarity: String,
    pub power: String,
    pub is_legendary: bool,
}

impl DecryptedAttributes {
    pub fn rarity_tier(&self) -> Option<RarityTier> {
        let rarity: u64 = self.rarity.parse().ok()?;
        Some(match rarity {
            90..=u64::MAX => RarityTier::Legendary,
            70..=89 => RarityTier::Epic,
            50..=69 => RarityTier::Rare,
            _ => RarityTier::Common,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub token_id: TokenId,
    pub public: Option<PublicTokenData>,
    pub encrypted: Option<EncryptedAttributes>,
    pub decrypted: Option<DecryptedAttributes>,
}

impl TokenRecord {
    pub fn new(token_id: TokenId) -> Self {
        Self {
            token_id,
            public: None,
            encrypted: None,
            decrypted: None,
        }
    }
}

/// Mutable state owned by the orchestrator. Only the orchestrator writes to
/// it, and each operation commits its results in one write.
///
/// `generation` changes whenever the contract is swapped and `load_epoch`
/// whenever a mint makes the owned list out of date. Operations record both
/// when they start; a commit from an older generation is dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrchestratorState {
    pub owned_tokens: Vec<TokenId>,
    pub tokens: BTreeMap<TokenId, TokenRecord>,
    pub total_supply: U256,
    pub has_loaded_once: bool,
    pub message: String,
    pub generation: u64,
    pub load_epoch: u64,
}

impl OrchestratorState {
    pub fn decrypted(&self, token_id: TokenId) -> Option<&DecryptedAttributes> {
        self.tokens
            .get(&token_id)
            .and_then(|record| record.decrypted.as_ref())
    }

    /// Forget everything that belonged to the previous contract
    pub fn reset_for_new_contract(&mut self) {
        *self = OrchestratorState {
            message: std::mem::take(&mut self.message),
            generation: self.generation.wrapping_add(1),
            load_epoch: self.load_epoch,
            ..OrchestratorState::default()
        };
    }

    /// Owned tokens changed on chain; the next load must not be skipped
    pub fn invalidate_loaded(&mut self) {
        self.has_loaded_once = false;
        self.load_epoch = self.load_epoch.wrapping_add(1);
    }

    /// Replace the public view after a successful load. Decrypted mirrors of
    /// known tokens survive; records neither owned nor decrypted are pruned.
    /// Returns `false` without touching anything when the load started
    /// against a contract that has since been swapped out.
    pub fn apply_load(
        &mut self,
        generation: u64,
        load_epoch: u64,
        owned: Vec<TokenId>,
        public: Vec<(TokenId, PublicTokenData)>,
        total_supply: U256,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        let mut public: BTreeMap<TokenId, PublicTokenData> = public.into_iter().collect();
        self.tokens
            .retain(|token_id, record| owned.contains(token_id) || record.decrypted.is_some());
        for record in self.tokens.values_mut() {
            record.public = public.remove(&record.token_id);
        }
        for (token_id, data) in public {
            let mut record = TokenRecord::new(token_id);
            record.public = Some(data);
            self.tokens.insert(token_id, record);
        }

        self.owned_tokens = owned;
        self.total_supply = total_supply;
        // A mint that finished mid-load leaves the list stale
        self.has_loaded_once = load_epoch == self.load_epoch;
        true
    }

    /// Store a token's handles and plaintext mirror. Returns `false` for a
    /// result decrypted under a contract that has since been swapped out.
    pub fn apply_decrypt(
        &mut self,
        generation: u64,
        token_id: TokenId,
        encrypted: EncryptedAttributes,
        decrypted: DecryptedAttributes,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        let record = self
            .tokens
            .entry(token_id)
            .or_insert_with(|| TokenRecord::new(token_id));
        record.encrypted = Some(encrypted);
        record.decrypted = Some(decrypted);
        true
    }
}

/// Read-only copy of the orchestrator's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftSnapshot {
    pub contract_address: Option<Address>,
    pub owned_tokens: Vec<TokenId>,
    pub tokens: BTreeMap<TokenId, TokenRecord>,
    pub total_supply: U256,
    pub has_loaded_once: bool,
    pub is_loading: bool,
    pub is_minting: bool,
    pub is_decrypting: bool,
    pub message: String,
}

impl NftSnapshot {
    pub fn token(&self, token_id: TokenId) -> Option<&TokenRecord> {
        self.tokens.get(&token_id)
    }

    pub fn public_data(&self, token_id: TokenId) -> Option<&PublicTokenData> {
        self.token(token_id).and_then(|record| record.public.as_ref())
    }

    pub fn decrypted(&self, token_id: TokenId) -> Option<&DecryptedAttributes> {
        self.token(token_id).and_then(|record| record.decrypted.as_ref())
    }
}
