// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use ethers::types::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::credential::SessionCredential;
use super::error::SessionError;
use super::store::CredentialStore;
use crate::crypto::{CredentialSealer, SealedBox};

/// On-disk envelope for one credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    key: String,
    credential: SessionCredential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sealed_private_key: Option<SealedBox>,
}

/// File-backed credential store, one JSON file per cache key.
///
/// Writes go through a temp file and a rename. Entries that cannot be read
/// back (corrupt JSON, wrong key, unsealable private key) are reported as
/// absent so the session manager regenerates and overwrites them.
pub struct FileCredentialStore {
    base_path: PathBuf,
    sealer: Option<CredentialSealer>,
}

impl FileCredentialStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            sealer: None,
        }
    }

    /// Seal ephemeral private keys at rest with `sealer`
    pub fn with_sealer(mut self, sealer: CredentialSealer) -> Self {
        self.sealer = Some(sealer);
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.base_path
            .join("credentials")
            .join(format!("{}.json", file_name))
    }

    fn decode(&self, key: &str, stored: StoredCredential) -> Option<SessionCredential> {
        if stored.key != key {
            warn!(
                key = %key,
                stored_key = %stored.key,
                "credential file holds a different key, ignoring"
            );
            return None;
        }

        let mut credential = stored.credential;
        match (stored.sealed_private_key, &self.sealer) {
            (Some(sealed), Some(sealer)) => match sealer.open(&sealed, key.as_bytes()) {
                Ok(private_key) => {
                    credential.ephemeral_private_key = Bytes::from(private_key);
                    Some(credential)
                }
                Err(e) => {
                    warn!(key = %key, "cannot open sealed private key: {}", e);
                    None
                }
            },
            (Some(_), None) => {
                warn!(key = %key, "credential is sealed but no store secret is configured");
                None
            }
            (None, _) => Some(credential),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SessionCredential>, SessionError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).await?;
        match serde_json::from_str::<StoredCredential>(&contents) {
            Ok(stored) => Ok(self.decode(key, stored)),
            Err(e) => {
                warn!(path = ?path, "corrupt credential file: {}", e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, credential: &SessionCredential) -> Result<(), SessionError> {
        let path = self.entry_path(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let mut credential = credential.clone();
        let sealed_private_key = match &self.sealer {
            Some(sealer) => {
                let sealed = sealer
                    .seal(&credential.ephemeral_private_key, key.as_bytes())
                    .map_err(|e| SessionError::Storage(e.to_string()))?;
                credential.ephemeral_private_key = Bytes::default();
                Some(sealed)
            }
            None => None,
        };

        let stored = StoredCredential {
            key: key.to_string(),
            credential,
            sealed_private_key,
        };
        let json = serde_json::to_string_pretty(&stored)?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!(key = %key, path = ?path, "credential persisted");
        Ok(())
    }
}
