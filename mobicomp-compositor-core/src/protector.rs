//! Re-entrancy guard for blocking waits.
//!
//! A thread about to block on another thread first takes the protector. If
//! it is already held, somebody further up is blocked too and waiting could
//! deadlock, so the caller skips the wait and retries later.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared by every compositor of one screen manager.
#[derive(Debug, Clone, Default)]
pub struct DeadlockProtector {
    held: Arc<AtomicBool>,
}

/// Releases the protector when dropped.
#[derive(Debug)]
pub struct ProtectorGuard {
    held: Arc<AtomicBool>,
}

impl DeadlockProtector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the protector, or returns `None` if it is already held.
    pub fn acquire(&self) -> Option<ProtectorGuard> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProtectorGuard { held: self.held.clone() })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl Drop for ProtectorGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
