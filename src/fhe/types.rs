// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Value types exchanged with the FHE engine.

use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Opaque 32-byte reference to an encrypted value held on-chain
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CiphertextHandle([u8; 32]);

impl CiphertextHandle {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for CiphertextHandle {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<CiphertextHandle> for [u8; 32] {
    fn from(handle: CiphertextHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextHandle({})", self.to_hex())
    }
}

impl FromStr for CiphertextHandle {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CiphertextHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A plaintext value queued for encryption, tagged with its declared width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlaintextValue {
    Bool { value: bool },
    Uint { bits: u16, value: U256 },
}

impl PlaintextValue {
    pub const SUPPORTED_UINT_BITS: [u16; 6] = [8, 16, 32, 64, 128, 256];

    pub fn bool(value: bool) -> Self {
        Self::Bool { value }
    }

    pub fn u8(value: u8) -> Self {
        Self::uint(8, U256::from(value))
    }

    pub fn u16(value: u16) -> Self {
        Self::uint(16, U256::from(value))
    }

    pub fn u32(value: u32) -> Self {
        Self::uint(32, U256::from(value))
    }

    pub fn u64(value: u64) -> Self {
        Self::uint(64, U256::from(value))
    }

    pub fn u128(value: u128) -> Self {
        Self::uint(128, U256::from(value))
    }

    pub fn u256(value: U256) -> Self {
        Self::uint(256, value)
    }

    /// Unchecked constructor; `fits_declared_width` reports whether the value
    /// is actually representable.
    pub fn uint(bits: u16, value: U256) -> Self {
        Self::Uint { bits, value }
    }

    /// Bits this value occupies in an encrypted batch. Booleans are packed
    /// into two bits by the engine.
    pub fn encrypted_bits(&self) -> u32 {
        match self {
            Self::Bool { .. } => 2,
            Self::Uint { bits, .. } => u32::from(*bits),
        }
    }

    pub fn fits_declared_width(&self) -> bool {
        match self {
            Self::Bool { .. } => true,
            Self::Uint { bits, value } => {
                if !Self::SUPPORTED_UINT_BITS.contains(bits) {
                    return false;
                }
                *bits == 256 || value.bits() <= usize::from(*bits)
            }
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Self::Bool { .. } => "ebool".to_string(),
            Self::Uint { bits, .. } => format!("euint{}", bits),
        }
    }
}

/// Cleartext as returned by the engine's user decryption.
///
/// Booleans are not guaranteed to come back as native booleans, so callers
/// compare against [`ClearValue::TRUE`] instead of testing truthiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ClearValue {
    Bool(bool),
    Uint(U256),
    Bytes(Bytes),
}

impl ClearValue {
    pub const TRUE: ClearValue = ClearValue::Bool(true);

    /// Decimal rendering for integer cleartexts
    pub fn to_decimal_string(&self) -> Option<String> {
        match self {
            ClearValue::Uint(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

/// Ephemeral keypair bound to one session credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralKeypair {
    pub public_key: Bytes,
    pub private_key: Bytes,
}

impl fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Result of encrypting one batch: one handle per input plus a single proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBatch {
    pub handles: Vec<CiphertextHandle>,
    pub input_proof: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleContractPair {
    pub handle: CiphertextHandle,
    pub contract_address: Address,
}

/// EIP-712 typed data the wallet signs to authorize user decryption
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationPayload(pub TypedData);

impl AuthorizationPayload {
    pub fn typed_data(&self) -> &TypedData {
        &self.0
    }
}

impl From<TypedData> for AuthorizationPayload {
    fn from(typed_data: TypedData) -> Self {
        Self(typed_data)
    }
}
