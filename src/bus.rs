//! Change notification bus
//!
//! Cursors subscribe to the address they were queried from. A mutation calls
//! [`ChangeBus::notify_change`] with the address it touched, and every live
//! subscription on a related address (the same address, an ancestor or a
//! descendant) is marked stale. Nothing is pushed: holders re-run their
//! query when they see the flag.
//!
//! The bus only holds weak references, so dropping a cursor is enough to
//! end its subscription. Dead entries are pruned on every subscribe and
//! notify.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::Notify;
use crate::uri::ContentUri;

#[derive(Default)]
struct ObserverState {
    stale: AtomicBool,
    version: AtomicU64,
    wake: Notify,
}

impl ObserverState {
    fn invalidate(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
        self.stale.store(true, Ordering::Release);
        self.wake.notify_waiters();
    }
}

struct Entry {
    uri: ContentUri,
    state: Weak<ObserverState>,
}

/// Process-wide registry of address subscriptions. Cloning shares the
/// registry.
#[derive(Clone, Default)]
pub struct ChangeBus {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register interest in `uri`. The subscription lives as long as the
    /// returned handle.
    pub fn subscribe(&self, uri: &ContentUri) -> Subscription {
        let state = Arc::new(ObserverState::default());
        let mut entries = self.entries();
        entries.retain(|e| e.state.strong_count() > 0);
        entries.push(Entry {
            uri: uri.clone(),
            state: Arc::downgrade(&state),
        });
        Subscription {
            uri: uri.clone(),
            state,
        }
    }

    /// Mark every live subscription related to `uri` as stale.
    ///
    /// Returns the number of subscriptions invalidated. Never blocks on the
    /// subscribers themselves.
    pub fn notify_change(&self, uri: &ContentUri) -> usize {
        let targets: Vec<Arc<ObserverState>> = {
            let mut entries = self.entries();
            entries.retain(|e| e.state.strong_count() > 0);
            entries
                .iter()
                .filter(|e| e.uri.is_related_to(uri))
                .filter_map(|e| e.state.upgrade())
                .collect()
        };

        for state in &targets {
            state.invalidate();
        }
        tracing::debug!("notify_change {} -> {} subscriber(s)", uri, targets.len());
        targets.len()
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        let mut entries = self.entries();
        entries.retain(|e| e.state.strong_count() > 0);
        entries.len()
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("entries", &self.entries().len())
            .finish()
    }
}

/// Handle for one subscription. Dropping it unsubscribes.
pub struct Subscription {
    uri: ContentUri,
    state: Arc<ObserverState>,
}

impl Subscription {
    /// Address this subscription watches
    pub fn uri(&self) -> &ContentUri {
        &self.uri
    }

    /// True once a related change has been notified
    pub fn is_stale(&self) -> bool {
        self.state.stale.load(Ordering::Acquire)
    }

    /// Number of notifications received so far
    pub fn version(&self) -> u64 {
        self.state.version.load(Ordering::Acquire)
    }

    /// Clear the stale flag, keeping the subscription
    pub fn mark_fresh(&self) {
        self.state.stale.store(false, Ordering::Release);
    }

    /// Wait until the subscription is stale. Returns immediately if it
    /// already is.
    pub async fn changed(&self) {
        loop {
            let notified = self.state.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_stale() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("uri", &self.uri.to_uri_string())
            .field("stale", &self.is_stale())
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_exact_and_ancestor_notification() {
        let bus = ChangeBus::new();
        let list = bus.subscribe(&ContentUri::fruits());
        let detail = bus.subscribe(&ContentUri::fruit(1));
        let other = bus.subscribe(&ContentUri::fruit(2));

        assert_eq!(bus.notify_change(&ContentUri::fruit(1)), 2);
        assert!(list.is_stale());
        assert!(detail.is_stale());
        assert!(!other.is_stale());
    }

    #[test]
    fn test_collection_change_reaches_items() {
        let bus = ChangeBus::new();
        let detail = bus.subscribe(&ContentUri::fruit(5));
        bus.notify_change(&ContentUri::fruits());
        assert!(detail.is_stale());
        assert_eq!(detail.version(), 1);
    }

    #[test]
    fn test_unrelated_authority_ignored() {
        let bus = ChangeBus::new();
        let list = bus.subscribe(&ContentUri::fruits());
        let foreign = ContentUri::parse("content://elsewhere/fruits").unwrap();
        assert_eq!(bus.notify_change(&foreign), 0);
        assert!(!list.is_stale());
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let bus = ChangeBus::new();
        let kept = bus.subscribe(&ContentUri::fruits());
        {
            let _gone = bus.subscribe(&ContentUri::fruits());
            assert_eq!(bus.subscriber_count(), 2);
        }
        assert_eq!(bus.notify_change(&ContentUri::fruits()), 1);
        assert_eq!(bus.subscriber_count(), 1);
        drop(kept);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_mark_fresh_keeps_subscription() {
        let bus = ChangeBus::new();
        let list = bus.subscribe(&ContentUri::fruits());
        bus.notify_change(&ContentUri::fruits());
        list.mark_fresh();
        assert!(!list.is_stale());
        bus.notify_change(&ContentUri::fruit(3));
        assert!(list.is_stale());
        assert_eq!(list.version(), 2);
    }

    #[tokio::test]
    async fn test_changed_wakes_waiter() {
        let bus = ChangeBus::new();
        let list = bus.subscribe(&ContentUri::fruits());

        let notifier = bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            notifier.notify_change(&ContentUri::fruit(9));
        });

        tokio::time::timeout(Duration::from_secs(5), list.changed())
            .await
            .expect("subscription should be notified");
        assert!(list.is_stale());
    }
}
