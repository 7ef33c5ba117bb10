// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

use crate::input::InputError;
use crate::session::SessionError;

/// Discriminant of [`OperationError`] for programmatic callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    PreconditionNotMet,
    SigningDenied,
    EncryptionFailed,
    SubmissionFailed,
    DecryptionFailed,
}

/// Terminal outcome of a failed mint, load or decrypt invocation.
///
/// Nothing here is retried by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// The operation was not started: already running, or a capability or
    /// input is missing. State is untouched.
    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),

    #[error("Decryption authorization was not signed: {0}")]
    SigningDenied(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
}

impl OperationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OperationError::PreconditionNotMet(_) => ErrorKind::PreconditionNotMet,
            OperationError::SigningDenied(_) => ErrorKind::SigningDenied,
            OperationError::EncryptionFailed(_) => ErrorKind::EncryptionFailed,
            OperationError::SubmissionFailed(_) => ErrorKind::SubmissionFailed,
            OperationError::DecryptionFailed(_) => ErrorKind::DecryptionFailed,
        }
    }

    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::PreconditionNotMet
    }
}

impl From<InputError> for OperationError {
    fn from(err: InputError) -> Self {
        OperationError::EncryptionFailed(err.to_string())
    }
}

impl From<SessionError> for OperationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::SigningDenied(reason) => OperationError::SigningDenied(reason),
            other => {
                OperationError::DecryptionFailed(format!("unable to obtain credential: {}", other))
            }
        }
    }
}
