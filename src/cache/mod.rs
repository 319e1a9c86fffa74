//! In-memory snapshot cache.
//!
//! Holds assembled league snapshots for a fixed time-to-live. Capacity is
//! bounded; inserting past it evicts the entry inserted longest ago. All access
//! goes through a single async mutex.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::models::{LeagueId, LeagueStatisticsSnapshot};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CAPACITY: usize = 10;

struct CacheEntry {
    snapshot: Arc<LeagueStatisticsSnapshot>,
    inserted_at: Instant,
    /// Breaks ties between entries inserted at the same instant.
    sequence: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<LeagueId, CacheEntry>,
    next_sequence: u64,
}

/// Time- and capacity-bounded cache of league snapshots.
pub struct ResultCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    capacity: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ResultCache {
    /// Create a cache. A capacity of zero is treated as one.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fetch a live snapshot. Expired entries are removed and reported as absent.
    pub async fn get(&self, league_id: LeagueId) -> Option<Arc<LeagueStatisticsSnapshot>> {
        let mut state = self.state.lock().await;

        let expired = match state.entries.get(&league_id) {
            None => return None,
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
        };

        if expired {
            debug!("Cache entry for league {} expired", league_id);
            state.entries.remove(&league_id);
            return None;
        }

        state
            .entries
            .get(&league_id)
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Store a snapshot, replacing any existing entry for the league.
    pub async fn put(&self, league_id: LeagueId, snapshot: Arc<LeagueStatisticsSnapshot>) {
        let mut state = self.state.lock().await;

        if !state.entries.contains_key(&league_id) && state.entries.len() >= self.capacity {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.inserted_at, entry.sequence))
                .map(|(id, _)| *id);

            if let Some(oldest) = oldest {
                debug!("Cache full, evicting league {}", oldest);
                state.entries.remove(&oldest);
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(
            league_id,
            CacheEntry {
                snapshot,
                inserted_at: Instant::now(),
                sequence,
            },
        );
    }

    /// Drop the entry for one league.
    pub async fn invalidate(&self, league_id: LeagueId) -> bool {
        self.state.lock().await.entries.remove(&league_id).is_some()
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, league_id: LeagueId) -> bool {
        self.state.lock().await.entries.contains_key(&league_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(id: u64) -> Arc<LeagueStatisticsSnapshot> {
        Arc::new(LeagueStatisticsSnapshot {
            league_id: LeagueId::new(id),
            league_name: format!("League {id}"),
            generated_at: Utc::now(),
            records: Vec::new(),
            manager_statistics: Vec::new(),
            head_to_head_records: Vec::new(),
            chip_summary: Vec::new(),
            members: Vec::new(),
            dropped_members: Vec::new(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_returns_inserted_snapshot() {
        let cache = ResultCache::default();
        let inserted = snapshot(1);

        cache.put(LeagueId::new(1), Arc::clone(&inserted)).await;
        let fetched = cache.get(LeagueId::new(1)).await.unwrap();

        assert!(Arc::ptr_eq(&inserted, &fetched));
        assert!(cache.get(LeagueId::new(2)).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = ResultCache::new(Duration::from_secs(300), 10);
        cache.put(LeagueId::new(1), snapshot(1)).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get(LeagueId::new(1)).await.is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(LeagueId::new(1)).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_evicts_oldest_insertion() {
        let cache = ResultCache::new(Duration::from_secs(300), 3);

        for id in 1..=3 {
            cache.put(LeagueId::new(id), snapshot(id)).await;
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        // Reading does not refresh insertion order.
        assert!(cache.get(LeagueId::new(1)).await.is_some());

        cache.put(LeagueId::new(4), snapshot(4)).await;

        assert_eq!(cache.len().await, 3);
        assert!(!cache.contains(LeagueId::new(1)).await);
        for id in 2..=4 {
            assert!(cache.contains(LeagueId::new(id)).await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_instant_inserts_evict_first_inserted() {
        let cache = ResultCache::new(Duration::from_secs(300), 2);

        cache.put(LeagueId::new(1), snapshot(1)).await;
        cache.put(LeagueId::new(2), snapshot(2)).await;
        cache.put(LeagueId::new(3), snapshot(3)).await;

        assert!(!cache.contains(LeagueId::new(1)).await);
        assert!(cache.contains(LeagueId::new(2)).await);
        assert!(cache.contains(LeagueId::new(3)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_existing_key_does_not_evict() {
        let cache = ResultCache::new(Duration::from_secs(300), 2);
        cache.put(LeagueId::new(1), snapshot(1)).await;
        cache.put(LeagueId::new(2), snapshot(2)).await;

        let replacement = snapshot(1);
        cache.put(LeagueId::new(1), Arc::clone(&replacement)).await;

        assert_eq!(cache.len().await, 2);
        let fetched = cache.get(LeagueId::new(1)).await.unwrap();
        assert!(Arc::ptr_eq(&replacement, &fetched));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_and_clear() {
        let cache = ResultCache::default();
        cache.put(LeagueId::new(1), snapshot(1)).await;
        cache.put(LeagueId::new(2), snapshot(2)).await;

        assert!(cache.invalidate(LeagueId::new(1)).await);
        assert!(!cache.invalidate(LeagueId::new(1)).await);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_puts_are_serialized() {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(300), 5));

        let mut handles = Vec::new();
        for id in 1..=20u64 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.put(LeagueId::new(id), snapshot(id)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await, 5);
    }
}
