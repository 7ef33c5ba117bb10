// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::{Address, Bytes};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tiny_keccak::{Hasher, Keccak};

use super::error::SessionError;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Canonical, non-empty set of contract addresses a credential covers.
///
/// Addresses are kept sorted and deduplicated, so two scopes built from the
/// same addresses in any order compare equal and hash to the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct ContractScope(Vec<Address>);

impl ContractScope {
    pub fn new(addresses: &[Address]) -> Result<Self, SessionError> {
        Self::try_from(addresses.to_vec())
    }

    pub fn single(address: Address) -> Self {
        Self(vec![address])
    }

    pub fn addresses(&self) -> &[Address] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.binary_search(address).is_ok()
    }

    /// Keccak-256 over the concatenated 20-byte addresses
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Keccak::v256();
        for address in &self.0 {
            hasher.update(address.as_bytes());
        }
        let mut out = [0u8; 32];
        hasher.finalize(&mut out);
        out
    }
}

impl TryFrom<Vec<Address>> for ContractScope {
    type Error = SessionError;

    fn try_from(mut addresses: Vec<Address>) -> Result<Self, Self::Error> {
        if addresses.is_empty() {
            return Err(SessionError::EmptyScope);
        }
        addresses.sort();
        addresses.dedup();
        Ok(Self(addresses))
    }
}

impl From<ContractScope> for Vec<Address> {
    fn from(scope: ContractScope) -> Self {
        scope.0
    }
}

/// Deterministic storage key for a (user, contract scope) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(user: Address, scope: &ContractScope) -> Self {
        Self(format!(
            "{}:{}",
            to_checksum(&user, None),
            hex::encode(scope.digest())
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Time-bounded, contract-scoped authorization to decrypt handles.
///
/// Credentials are never mutated; an expired one is replaced wholesale.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredential {
    pub ephemeral_public_key: Bytes,
    pub ephemeral_private_key: Bytes,
    pub authorization_signature: Bytes,
    pub scoped_contracts: ContractScope,
    pub user_address: Address,
    /// Unix seconds at signing time
    pub issued_at: u64,
    pub validity_days: u32,
}

impl SessionCredential {
    pub fn expires_at(&self) -> u64 {
        self.issued_at
            .saturating_add(u64::from(self.validity_days).saturating_mul(SECONDS_PER_DAY))
    }

    pub fn is_valid_at(&self, now: u64) -> bool {
        now < self.expires_at()
    }

    pub fn check_fresh(&self, now: u64) -> Result<(), SessionError> {
        if self.is_valid_at(now) {
            Ok(())
        } else {
            Err(SessionError::CredentialExpired {
                expired_at: self.expires_at(),
            })
        }
    }

    /// Exact scope match; a credential for a superset is not reused.
    pub fn matches(&self, user: Address, scope: &ContractScope) -> bool {
        self.user_address == user && &self.scoped_contracts == scope
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.user_address, &self.scoped_contracts)
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("ephemeral_public_key", &self.ephemeral_public_key)
            .field("ephemeral_private_key", &"<redacted>")
            .field("authorization_signature", &self.authorization_signature)
            .field("scoped_contracts", &self.scoped_contracts)
            .field("user_address", &self.user_address)
            .field("issued_at", &self.issued_at)
            .field("validity_days", &self.validity_days)
            .finish()
    }
}
