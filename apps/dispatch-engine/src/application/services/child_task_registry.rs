//! Child Task Registry
//!
//! Cancellation handles for running child execution tasks. Every child
//! token is derived from one root token, so shutting down the root stops
//! every in-flight simulation.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::shared::{ChildOrderId, MasterOrderId};

#[derive(Debug, Default)]
struct Inner {
    tokens: HashMap<ChildOrderId, CancellationToken>,
    by_master: HashMap<MasterOrderId, Vec<ChildOrderId>>,
}

/// Tracks the cancellation token of each running child task.
#[derive(Debug)]
pub struct ChildTaskRegistry {
    root: CancellationToken,
    inner: Mutex<Inner>,
}

impl ChildTaskRegistry {
    /// Create a registry whose tokens are children of `root`.
    #[must_use]
    pub fn new(root: CancellationToken) -> Self {
        Self {
            root,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register a child task and return its token.
    pub fn register(&self, master_id: &MasterOrderId, child_id: &ChildOrderId) -> CancellationToken {
        let token = self.root.child_token();
        let mut inner = self.inner.lock();
        inner.tokens.insert(child_id.clone(), token.clone());
        inner
            .by_master
            .entry(master_id.clone())
            .or_default()
            .push(child_id.clone());
        token
    }

    /// Forget a finished task.
    pub fn complete(&self, master_id: &MasterOrderId, child_id: &ChildOrderId) {
        let mut inner = self.inner.lock();
        inner.tokens.remove(child_id);
        if let Some(children) = inner.by_master.get_mut(master_id) {
            children.retain(|id| id != child_id);
            if children.is_empty() {
                inner.by_master.remove(master_id);
            }
        }
    }

    /// Signal one child task. Returns false if it is not running.
    pub fn cancel_child(&self, child_id: &ChildOrderId) -> bool {
        match self.inner.lock().tokens.get(child_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Signal every running task of a master. Returns how many were signalled.
    pub fn cancel_master(&self, master_id: &MasterOrderId) -> usize {
        let inner = self.inner.lock();
        let Some(children) = inner.by_master.get(master_id) else {
            return 0;
        };
        children
            .iter()
            .filter_map(|id| inner.tokens.get(id))
            .inspect(|token| token.cancel())
            .count()
    }

    /// Whether a task for the child is running.
    #[must_use]
    pub fn is_running(&self, child_id: &ChildOrderId) -> bool {
        self.inner.lock().tokens.contains_key(child_id)
    }

    /// Number of running tasks.
    #[must_use]
    pub fn running(&self) -> usize {
        self.inner.lock().tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_child_signals_only_that_child() {
        let registry = ChildTaskRegistry::new(CancellationToken::new());
        let master = MasterOrderId::new("m-1");
        let a = registry.register(&master, &ChildOrderId::new("c-1"));
        let b = registry.register(&master, &ChildOrderId::new("c-2"));

        assert!(registry.cancel_child(&ChildOrderId::new("c-1")));
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
        assert!(!registry.cancel_child(&ChildOrderId::new("unknown")));
    }

    #[test]
    fn cancel_master_signals_all_children() {
        let registry = ChildTaskRegistry::new(CancellationToken::new());
        let master = MasterOrderId::new("m-1");
        let a = registry.register(&master, &ChildOrderId::new("c-1"));
        let b = registry.register(&master, &ChildOrderId::new("c-2"));
        let other = registry.register(&MasterOrderId::new("m-2"), &ChildOrderId::new("c-3"));

        assert_eq!(registry.cancel_master(&master), 2);
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(!other.is_cancelled());
    }

    #[test]
    fn complete_forgets_task() {
        let registry = ChildTaskRegistry::new(CancellationToken::new());
        let master = MasterOrderId::new("m-1");
        let child = ChildOrderId::new("c-1");
        registry.register(&master, &child);
        assert!(registry.is_running(&child));

        registry.complete(&master, &child);
        assert!(!registry.is_running(&child));
        assert_eq!(registry.cancel_master(&master), 0);
        assert_eq!(registry.running(), 0);
    }

    #[test]
    fn root_shutdown_reaches_every_task() {
        let root = CancellationToken::new();
        let registry = ChildTaskRegistry::new(root.clone());
        let token = registry.register(&MasterOrderId::new("m-1"), &ChildOrderId::new("c-1"));

        root.cancel();
        assert!(token.is_cancelled());
    }
}
