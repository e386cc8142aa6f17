//! Connection Hub
//!
//! Maps socket lifecycle callbacks onto the presence registry and tells
//! roster watchers about it.

use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{EventEnvelope, EventPublisherPort, Topic};
use crate::application::services::PresenceRegistry;
use crate::domain::shared::{AccountId, ConnectionId};

/// Event name of a roster change.
pub const ROSTER_CHANGED_EVENT: &str = "presence.roster.changed";

/// Body of a `presence.roster.changed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterChanged {
    /// Account whose connection changed.
    pub account_id: AccountId,
    /// Whether that account is online after the change.
    pub online: bool,
    /// Every online account, sorted.
    pub roster: Vec<AccountId>,
}

/// Adapter between connection callbacks and [`PresenceRegistry`].
#[derive(Debug)]
pub struct ConnectionHub<E: EventPublisherPort> {
    presence: Arc<PresenceRegistry>,
    publisher: Arc<E>,
}

impl<E: EventPublisherPort> ConnectionHub<E> {
    /// Create a hub over a shared registry.
    pub const fn new(presence: Arc<PresenceRegistry>, publisher: Arc<E>) -> Self {
        Self {
            presence,
            publisher,
        }
    }

    /// A socket for `account_id` opened.
    pub async fn on_connect(&self, account_id: &AccountId, connection_id: ConnectionId) {
        let came_online = self.presence.mark_online(account_id, connection_id);
        if came_online {
            tracing::info!(account_id = %account_id, "Account online");
        }
        self.publish_roster(account_id).await;
    }

    /// A socket for `account_id` closed.
    pub async fn on_disconnect(&self, account_id: &AccountId, connection_id: &ConnectionId) {
        if self.presence.mark_offline(account_id, connection_id) {
            tracing::info!(account_id = %account_id, "Account offline");
        }
        self.publish_roster(account_id).await;
    }

    /// Keep-alive from an account.
    pub fn on_heartbeat(&self, account_id: &AccountId) {
        self.presence.heartbeat(account_id);
    }

    /// Online accounts, sorted.
    #[must_use]
    pub fn roster(&self) -> Vec<AccountId> {
        let mut roster: Vec<AccountId> = self.presence.online_set().into_iter().collect();
        roster.sort();
        roster
    }

    async fn publish_roster(&self, account_id: &AccountId) {
        let body = RosterChanged {
            account_id: account_id.clone(),
            online: self.presence.is_online(account_id),
            roster: self.roster(),
        };
        let payload = match serde_json::to_value(&body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode roster");
                return;
            }
        };
        let envelope = EventEnvelope::new(Topic::PresenceRoster, ROSTER_CHANGED_EVENT, payload);
        if let Err(e) = self.publisher.publish(envelope).await {
            tracing::warn!(error = %e, "Failed to publish roster change");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::realtime::BroadcastEventPublisher;
    use std::time::Duration;

    fn hub() -> (ConnectionHub<BroadcastEventPublisher>, Arc<BroadcastEventPublisher>) {
        let publisher = Arc::new(BroadcastEventPublisher::new(16));
        let presence = Arc::new(PresenceRegistry::new(Duration::from_secs(12)));
        (ConnectionHub::new(presence, Arc::clone(&publisher)), publisher)
    }

    #[tokio::test]
    async fn connect_publishes_roster() {
        let (hub, publisher) = hub();
        let mut sub = publisher.subscribe_topic(Topic::PresenceRoster);

        hub.on_connect(&AccountId::new("b"), ConnectionId::new("c-1")).await;
        hub.on_connect(&AccountId::new("a"), ConnectionId::new("c-2")).await;

        let first = sub.recv().await.unwrap();
        assert_eq!(first.event_name, ROSTER_CHANGED_EVENT);
        assert_eq!(first.payload["account_id"], "b");
        assert_eq!(first.payload["online"], true);

        let second = sub.recv().await.unwrap();
        assert_eq!(second.payload["roster"], serde_json::json!(["a", "b"]));
    }

    #[tokio::test]
    async fn account_stays_online_until_last_socket_closes() {
        let (hub, publisher) = hub();
        let mut sub = publisher.subscribe_topic(Topic::PresenceRoster);
        let account = AccountId::new("a");

        hub.on_connect(&account, ConnectionId::new("c-1")).await;
        hub.on_connect(&account, ConnectionId::new("c-2")).await;
        hub.on_disconnect(&account, &ConnectionId::new("c-1")).await;
        assert_eq!(hub.roster(), vec![account.clone()]);

        hub.on_disconnect(&account, &ConnectionId::new("c-2")).await;
        assert!(hub.roster().is_empty());

        let mut last = None;
        for _ in 0..4 {
            last = sub.recv().await;
        }
        assert_eq!(last.unwrap().payload["online"], false);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_keeps_account_online() {
        let (hub, _publisher) = hub();
        let account = AccountId::new("a");
        hub.on_heartbeat(&account);
        tokio::time::advance(Duration::from_secs(10)).await;
        hub.on_heartbeat(&account);
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(hub.roster(), vec![account]);
    }
}
