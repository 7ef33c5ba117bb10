// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-operation mutual exclusion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Running flag for one operation kind
#[derive(Debug, Clone, Default)]
pub(crate) struct OperationFlag(Arc<AtomicBool>);

impl OperationFlag {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Claim the flag; `None` when the operation is already running.
    pub fn try_acquire(&self) -> Option<OperationGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| OperationGuard(self.0.clone()))
    }
}

/// Clears its flag when dropped, on success, error and unwinding alike
#[derive(Debug)]
pub(crate) struct OperationGuard(Arc<AtomicBool>);

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
