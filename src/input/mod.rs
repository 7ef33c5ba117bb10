// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encrypted Input Builder
//!
//! Assembles plaintext values into one encrypted submission: one ciphertext
//! handle per value, in the order the values were added, plus a single
//! validity proof for the whole batch. Encryption is single-shot; retries are
//! the caller's decision.

use ethers::types::Address;
use std::sync::Arc;
use tracing::debug;

use crate::fhe::{EncryptedBatch, FheEngine, PlaintextValue};

/// Upper bound on the total encrypted bit width of one batch
pub const MAX_BATCH_BITS: u32 = 2048;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("FHE engine is not initialized")]
    EngineUnavailable,

    #[error("Batch is empty")]
    EmptyBatch,

    #[error("Value #{index} does not fit {type_name}")]
    ValueOutOfRange { index: usize, type_name: String },

    #[error("Batch needs {bits} bits, limit is {limit}")]
    BatchTooLarge { bits: u32, limit: u32 },

    #[error("Engine returned {actual} handles for {expected} values")]
    HandleCountMismatch { expected: usize, actual: usize },

    #[error("Engine rejected batch: {0}")]
    Engine(String),
}

/// Encrypt `values` for `contract` on behalf of `user`.
///
/// Values are submitted exactly as given: no reordering, no deduplication.
pub async fn encrypt_values(
    engine: Option<&Arc<dyn FheEngine>>,
    contract: Address,
    user: Address,
    values: &[PlaintextValue],
) -> Result<EncryptedBatch, InputError> {
    let engine = engine.ok_or(InputError::EngineUnavailable)?;
    validate(values)?;

    let batch = engine
        .encrypt_batch(contract, user, values)
        .await
        .map_err(|e| InputError::Engine(e.to_string()))?;

    if batch.handles.len() != values.len() {
        return Err(InputError::HandleCountMismatch {
            expected: values.len(),
            actual: batch.handles.len(),
        });
    }

    debug!(
        contract = ?contract,
        handles = batch.handles.len(),
        proof_len = batch.input_proof.len(),
        "encrypted input batch"
    );
    Ok(batch)
}

fn validate(values: &[PlaintextValue]) -> Result<(), InputError> {
    if values.is_empty() {
        return Err(InputError::EmptyBatch);
    }

    for (index, value) in values.iter().enumerate() {
        if !value.fits_declared_width() {
            return Err(InputError::ValueOutOfRange {
                index,
                type_name: value.type_name(),
            });
        }
    }

    let bits: u32 = values.iter().map(PlaintextValue::encrypted_bits).sum();
    if bits > MAX_BATCH_BITS {
        return Err(InputError::BatchTooLarge {
            bits,
            limit: MAX_BATCH_BITS,
        });
    }

    Ok(())
}

/// Fluent builder over [`encrypt_values`]
///
/// # Example
///
/// ```ignore
/// let batch = EncryptedInputBuilder::new(Some(engine), contract, user)
///     .add_u32(95)
///     .add_u32(850)
///     .add_bool(true)
///     .encrypt()
///     .await?;
/// ```
pub struct EncryptedInputBuilder {
    engine: Option<Arc<dyn FheEngine>>,
    contract: Address,
    user: Address,
    values: Vec<PlaintextValue>,
}

impl EncryptedInputBuilder {
    pub fn new(engine: Option<Arc<dyn FheEngine>>, contract: Address, user: Address) -> Self {
        Self {
            engine,
            contract,
            user,
            values: Vec::new(),
        }
    }

    pub fn add(mut self, value: PlaintextValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn add_bool(self, value: bool) -> Self {
        self.add(PlaintextValue::bool(value))
    }

    pub fn add_u8(self, value: u8) -> Self {
        self.add(PlaintextValue::u8(value))
    }

    pub fn add_u16(self, value: u16) -> Self {
        self.add(PlaintextValue::u16(value))
    }

    pub fn add_u32(self, value: u32) -> Self {
        self.add(PlaintextValue::u32(value))
    }

    pub fn add_u64(self, value: u64) -> Self {
        self.add(PlaintextValue::u64(value))
    }

    pub fn values(&self) -> &[PlaintextValue] {
        &self.values
    }

    pub async fn encrypt(self) -> Result<EncryptedBatch, InputError> {
        encrypt_values(self.engine.as_ref(), self.contract, self.user, &self.values).await
    }
}
