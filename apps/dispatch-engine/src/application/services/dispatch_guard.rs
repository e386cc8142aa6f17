//! Dispatch guard.
//!
//! Ensures at most one execution task is ever launched per
//! (master order, account) pair within a process.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::domain::shared::{AccountId, MasterOrderId};

/// In-memory set of claimed (master, account) pairs.
///
/// Not restart-safe: claims are lost when the process exits.
#[derive(Debug, Default)]
pub struct DispatchGuard {
    claimed: Mutex<HashSet<(MasterOrderId, AccountId)>>,
}

impl DispatchGuard {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the pair. Returns false if it was already claimed.
    pub fn try_claim(&self, master_id: &MasterOrderId, account_id: &AccountId) -> bool {
        self.claimed
            .lock()
            .insert((master_id.clone(), account_id.clone()))
    }

    /// Whether the pair has been claimed.
    #[must_use]
    pub fn is_claimed(&self, master_id: &MasterOrderId, account_id: &AccountId) -> bool {
        self.claimed
            .lock()
            .contains(&(master_id.clone(), account_id.clone()))
    }

    /// Number of claimed pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.lock().len()
    }

    /// Whether nothing has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.lock().is_empty()
    }
}
