//! Presence Registry
//!
//! Tracks which accounts currently hold a live real-time connection. An
//! account is online while its entry exists and its last heartbeat is no
//! older than the TTL; connecting counts as a heartbeat. A background
//! sweeper evicts stale entries. State is in-memory only and empty after a
//! restart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::shared::{AccountId, ConnectionId};
use crate::observability::update_online_accounts;

#[derive(Debug)]
struct PresenceEntry {
    last_heartbeat: Instant,
    connections: HashSet<ConnectionId>,
}

impl PresenceEntry {
    fn new(now: Instant) -> Self {
        Self {
            last_heartbeat: now,
            connections: HashSet::new(),
        }
    }

    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) <= ttl
    }
}

/// TTL-based registry of online accounts.
#[derive(Debug)]
pub struct PresenceRegistry {
    ttl: Duration,
    entries: Mutex<HashMap<AccountId, PresenceEntry>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Heartbeat TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a connection. Returns true if the account was offline before.
    pub fn mark_online(&self, account_id: &AccountId, connection_id: ConnectionId) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let was_online = entries
            .get(account_id)
            .is_some_and(|e| e.is_fresh(now, self.ttl));
        let entry = entries
            .entry(account_id.clone())
            .or_insert_with(|| PresenceEntry::new(now));
        entry.last_heartbeat = now;
        entry.connections.insert(connection_id);
        !was_online
    }

    /// Drop a connection. Returns true if the entry was removed.
    ///
    /// Removing the last connection removes the entry; unknown connections
    /// are ignored.
    pub fn mark_offline(&self, account_id: &AccountId, connection_id: &ConnectionId) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(account_id) else {
            return false;
        };
        if !entry.connections.remove(connection_id) {
            return false;
        }
        if entry.connections.is_empty() {
            entries.remove(account_id);
            return true;
        }
        false
    }

    /// Refresh the heartbeat, creating a heartbeat-only entry if needed.
    pub fn heartbeat(&self, account_id: &AccountId) {
        let now = Instant::now();
        self.entries
            .lock()
            .entry(account_id.clone())
            .or_insert_with(|| PresenceEntry::new(now))
            .last_heartbeat = now;
    }

    /// Whether the account has a fresh heartbeat.
    #[must_use]
    pub fn is_online(&self, account_id: &AccountId) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .get(account_id)
            .is_some_and(|e| e.is_fresh(now, self.ttl))
    }

    /// Every account with a fresh heartbeat.
    #[must_use]
    pub fn online_set(&self) -> HashSet<AccountId> {
        let now = Instant::now();
        self.entries
            .lock()
            .iter()
            .filter(|(_, e)| e.is_fresh(now, self.ttl))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Evict stale entries and return the evicted accounts.
    pub fn sweep(&self) -> Vec<AccountId> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let stale: Vec<AccountId> = entries
            .iter()
            .filter(|(_, e)| !e.is_fresh(now, self.ttl))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            entries.remove(id);
        }
        update_online_accounts(entries.len());
        stale
    }

    /// Run [`sweep`](Self::sweep) every `interval` until `shutdown` fires.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = registry.sweep();
                        if !evicted.is_empty() {
                            tracing::debug!(count = evicted.len(), "Evicted stale presence entries");
                        }
                    }
                    () = shutdown.cancelled() => {
                        tracing::debug!("Presence sweeper stopped");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(12);

    fn acc(id: &str) -> AccountId {
        AccountId::new(id)
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[tokio::test(start_paused = true)]
    async fn connect_marks_online() {
        let registry = PresenceRegistry::new(TTL);
        assert!(registry.mark_online(&acc("a"), conn("c1")));
        assert!(registry.is_online(&acc("a")));
        assert!(!registry.mark_online(&acc("a"), conn("c2")));
        assert_eq!(registry.online_set(), HashSet::from([acc("a")]));
    }

    #[tokio::test(start_paused = true)]
    async fn last_connection_removes_entry() {
        let registry = PresenceRegistry::new(TTL);
        registry.mark_online(&acc("a"), conn("c1"));
        registry.mark_online(&acc("a"), conn("c2"));

        assert!(!registry.mark_offline(&acc("a"), &conn("c1")));
        assert!(registry.is_online(&acc("a")));
        assert!(registry.mark_offline(&acc("a"), &conn("c2")));
        assert!(!registry.is_online(&acc("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_connection_is_ignored() {
        let registry = PresenceRegistry::new(TTL);
        registry.mark_online(&acc("a"), conn("c1"));
        assert!(!registry.mark_offline(&acc("a"), &conn("other")));
        assert!(!registry.mark_offline(&acc("b"), &conn("c1")));
        assert!(registry.is_online(&acc("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_expires_after_ttl() {
        let registry = PresenceRegistry::new(TTL);
        registry.mark_online(&acc("a"), conn("c1"));

        tokio::time::advance(TTL).await;
        assert!(registry.is_online(&acc("a")));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!registry.is_online(&acc("a")));
        assert!(registry.online_set().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_refreshes_and_creates() {
        let registry = PresenceRegistry::new(TTL);
        registry.heartbeat(&acc("ghost"));
        assert!(registry.is_online(&acc("ghost")));

        registry.mark_online(&acc("a"), conn("c1"));
        tokio::time::advance(Duration::from_secs(10)).await;
        registry.heartbeat(&acc("a"));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(registry.is_online(&acc("a")));
        assert!(!registry.is_online(&acc("ghost")));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_evicts_stale_entries() {
        let registry = PresenceRegistry::new(TTL);
        registry.mark_online(&acc("old"), conn("c1"));
        tokio::time::advance(Duration::from_secs(13)).await;
        registry.mark_online(&acc("new"), conn("c2"));

        assert_eq!(registry.sweep(), vec![acc("old")]);
        assert!(registry.is_online(&acc("new")));
        // Reconnecting after eviction starts fresh
        assert!(registry.mark_online(&acc("old"), conn("c3")));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_until_shutdown() {
        let registry = Arc::new(PresenceRegistry::new(TTL));
        let shutdown = CancellationToken::new();
        let handle = registry.spawn_sweeper(Duration::from_secs(4), shutdown.clone());

        registry.mark_online(&acc("a"), conn("c1"));
        tokio::time::sleep(Duration::from_secs(17)).await;
        assert!(registry.entries.lock().is_empty());

        shutdown.cancel();
        handle.await.unwrap();
    }
}
