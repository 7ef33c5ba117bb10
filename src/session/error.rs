// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
/// Errors produced while obtaining a session credential.
///
/// Values are shared between every caller awaiting the same in-flight
/// creation, so they carry rendered reasons and are `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Authorization signature denied: {0}")]
    SigningDenied(String),

    /// Internal: a cached credential has passed its validity window
    #[error("Credential expired at {expired_at}")]
    CredentialExpired { expired_at: u64 },

    #[error("Contract scope must contain at least one address")]
    EmptyScope,

    #[error("Credential validity must be at least one day, got {0}")]
    InvalidValidityWindow(u32),

    #[error("FHE engine error: {0}")]
    Engine(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Storage(format!("serialization error: {}", err))
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(format!("io error: {}", err))
    }
}
