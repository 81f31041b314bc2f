//! # View cache
//!
//! Per-user cache of computed screen views keyed by [`QueryKey`]. Entries
//! expire after a freshness window and are dropped as soon as a change to
//! one of their source tables is published.

use std::{
    any::Any,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use coachline_core::{errors::CoachResult, query::{QueryKey, Table}};
use dashmap::DashMap;
use tracing::trace;
use uuid::Uuid;

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    stored_at: Instant,
}

#[derive(Clone)]
pub struct ViewCache {
    entries: Arc<DashMap<(Uuid, QueryKey), Entry>>,
    /// Bumped on every invalidation so a fetch that raced one is not stored.
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl ViewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Returns the cached view for `(user_id, key)` or computes and stores it.
    pub async fn get_or_fetch<T, F, Fut>(&self, user_id: Uuid, key: QueryKey, fetch: F) -> CoachResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = CoachResult<T>>,
    {
        if let Some(hit) = self.lookup::<T>(user_id, key) {
            trace!(%user_id, ?key, "view cache hit");
            return Ok(hit);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let value = fetch().await?;
        if self.generation.load(Ordering::Acquire) == generation {
            self.purge_expired();
            self.entries.insert(
                (user_id, key),
                Entry {
                    value: Arc::new(value.clone()),
                    stored_at: Instant::now(),
                },
            );
        }
        Ok(value)
    }

    fn lookup<T: Clone + 'static>(&self, user_id: Uuid, key: QueryKey) -> Option<T> {
        let cache_key = (user_id, key);
        let fresh = {
            let entry = self.entries.get(&cache_key)?;
            if entry.stored_at.elapsed() <= self.ttl {
                entry.value.downcast_ref::<T>().cloned()
            } else {
                None
            }
        };
        if fresh.is_none() {
            self.entries.remove(&cache_key);
        }
        fresh
    }

    /// Drops every expired entry, including those of users who never read
    /// them again. Runs whenever a new view is stored.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
        before.saturating_sub(self.entries.len())
    }

        pub fn invalidate(&self, user_id: Uuid, key: QueryKey) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.remove(&(user_id, key));
    }

    /// Drops every entry, for any user, whose view reads from `table`.
    pub fn invalidate_table(&self, table: Table) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let before = self.entries.len();
        self.entries.retain(|(_, key), _| !key.depends_on(table));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl Future<Output = CoachResult<String>> {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value.to_string())
        }
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let user = Uuid::new_v4();

        let first = cache
            .get_or_fetch(user, QueryKey::Templates, || counting_fetch(&calls, "a"))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(user, QueryKey::Templates, || counting_fetch(&calls, "b"))
            .await
            .unwrap();

        assert_eq!(first, "a");
        assert_eq!(second, "a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn table_change_drops_dependent_views_for_all_users() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        for user in [alice, bob] {
            cache
                .get_or_fetch(user, QueryKey::PendingRequests, || counting_fetch(&calls, "x"))
                .await
                .unwrap();
        }
        cache
            .get_or_fetch(alice, QueryKey::Templates, || counting_fetch(&calls, "t"))
            .await
            .unwrap();

        assert_eq!(cache.invalidate_table(Table::Bookings), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let cache = ViewCache::new(Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));
        let user = Uuid::new_v4();

        for _ in 0..2 {
            cache
                .get_or_fetch(user, QueryKey::Profile, || counting_fetch(&calls, "p"))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn storing_a_view_drops_other_users_expired_entries() {
        let cache = ViewCache::new(Duration::from_millis(100));
        let calls = Arc::new(AtomicUsize::new(0));
        let (gone, active) = (Uuid::new_v4(), Uuid::new_v4());

        cache
            .get_or_fetch(gone, QueryKey::Lesson(Uuid::new_v4()), || counting_fetch(&calls, "l"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        cache
            .get_or_fetch(active, QueryKey::Profile, || counting_fetch(&calls, "p"))
            .await
            .unwrap();

        assert_eq!(cache.len(), 1);
    }

        #[tokio::test]
    async fn fetch_racing_an_invalidation_is_not_stored() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let user = Uuid::new_v4();

        let racing = cache.clone();
        cache
            .get_or_fetch(user, QueryKey::Openings, || async move {
                racing.invalidate_table(Table::Openings);
                Ok::<_, coachline_core::errors::CoachError>(1u32)
            })
            .await
            .unwrap();

        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let user = Uuid::new_v4();

        let result: CoachResult<u32> = cache
            .get_or_fetch(user, QueryKey::Players, || async {
                Err(coachline_core::errors::CoachError::NotFound("x".into()))
            })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
