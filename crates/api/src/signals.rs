//! # Change signals
//!
//! The single refresh path for every view. Local mutations and change
//! notifications from the backend both end up in [`ChangeSignals::publish`],
//! which drops the affected cached views and fans the event out to
//! connected browsers so they refetch.

use coachline_core::query::ChangeEvent;
use tokio::sync::broadcast;
use tracing::debug;

use crate::cache::ViewCache;

#[derive(Clone)]
pub struct ChangeSignals {
    cache: ViewCache,
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeSignals {
    pub fn new(cache: ViewCache, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { cache, tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let dropped = self.cache.invalidate_table(event.table);
        debug!(table = event.table.name(), record = ?event.record_id, dropped, "change published");
        // No subscribers is fine; the cache has already been invalidated.
        let _ = self.tx.send(event);
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = ChangeEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}
