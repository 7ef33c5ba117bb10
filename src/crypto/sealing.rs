// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sealing of ephemeral private keys with XChaCha20-Poly1305.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use ethers::types::Bytes;
use hkdf::Hkdf;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::error::CryptoError;

const NONCE_SIZE: usize = 24;
const HKDF_SALT: &[u8] = b"private-nft-client/credential-store";
const HKDF_INFO: &[u8] = b"ephemeral-key-sealing/v1";

/// Nonce and ciphertext (with appended 16-byte tag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBox {
    pub nonce: Bytes,
    pub ciphertext: Bytes,
}

#[derive(Clone)]
pub struct CredentialSealer {
    key: [u8; 32],
}

impl CredentialSealer {
    /// Derive the sealing key from a configured secret
    pub fn from_secret(secret: &[u8]) -> Result<Self, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::KeyDerivationFailed {
                reason: "secret is empty".to_string(),
            });
        }

        let hkdf = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret);
        let mut key = [0u8; 32];
        hkdf.expand(HKDF_INFO, &mut key)
            .map_err(|e| CryptoError::KeyDerivationFailed {
                reason: e.to_string(),
            })?;

        Ok(Self { key })
    }

    /// Seal `plaintext` under a fresh random nonce, authenticating `aad`
    pub fn seal(&self, plaintext: &[u8], aad: &[u8]) -> Result<SealedBox, CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher()
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|e| CryptoError::SealFailed {
                reason: e.to_string(),
            })?;

        Ok(SealedBox {
            nonce: Bytes::from(nonce.to_vec()),
            ciphertext: Bytes::from(ciphertext),
        })
    }

    pub fn open(&self, sealed: &SealedBox, aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.nonce.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidNonce {
                expected_size: NONCE_SIZE,
                actual_size: sealed.nonce.len(),
            });
        }

        self.cipher()
            .decrypt(
                XNonce::from_slice(&sealed.nonce),
                Payload {
                    msg: &sealed.ciphertext,
                    aad,
                },
            )
            .map_err(|e| CryptoError::OpenFailed {
                reason: e.to_string(),
            })
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(&self.key))
    }
}
