// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Errors raised while sealing or opening session material at rest.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The store secret was unusable (empty, or HKDF refused it)
    KeyDerivationFailed { reason: String },

    /// Nonce had the wrong length; XChaCha20 requires 24 bytes
    InvalidNonce {
        expected_size: usize,
        actual_size: usize,
    },

    /// AEAD encryption failed
    SealFailed { reason: String },

    /// AEAD authentication failed (wrong secret, wrong AAD, tampered data)
    OpenFailed { reason: String },
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::KeyDerivationFailed { reason } => {
                write!(f, "Key derivation failed: {}", reason)
            }
            CryptoError::InvalidNonce {
                expected_size,
                actual_size,
            } => write!(
                f,
                "Invalid nonce size: expected {} bytes, got {} bytes",
                expected_size, actual_size
            ),
            CryptoError::SealFailed { reason } => write!(f, "Sealing failed: {}", reason),
            CryptoError::OpenFailed { reason } => write!(f, "Opening sealed box failed: {}", reason),
        }
    }
}

impl std::error::Error for CryptoError {}
