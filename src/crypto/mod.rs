// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! At-Rest Protection for Session Material
//!
//! Session credentials carry an ephemeral private key. When a credential
//! store secret is configured, the file store seals that key before it
//! touches disk:
//!
//! - **Key derivation**: HKDF-SHA256 from the configured secret
//! - **Sealing**: XChaCha20-Poly1305 with a random 24-byte nonce
//! - **Binding**: the credential's cache key is the AAD, so a sealed key
//!   copied under another cache key fails to open

pub mod error;
pub mod sealing;

pub use error::CryptoError;
pub use sealing::{CredentialSealer, SealedBox};
