//! Per-session memo of filter results.
//!
//! Recomputation is always correct without it; a memo only spares the
//! filter pass when a session revisits a selection. A memo belongs to one
//! session and is keyed by (dataset snapshot, filter fingerprint).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let memo = FilterMemo::new(&config.memo);
//! let filtered = memo.get_or_apply(&catalog, &spec);
//! ```

use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::MemoConfig;
use crate::filter;
use crate::types::{FilterSpec, Relation};

const DEFAULT_CAPACITY: usize = 64;

/// Memo key: snapshot id plus filter fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    snapshot_id: String,
    fingerprint: String,
}

/// Filter results of one session.
pub struct FilterMemo {
    cache: Option<RwLock<LruCache<MemoKey, Arc<Relation>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FilterMemo {
    /// Create a memo. A disabled config yields a pass-through memo.
    pub fn new(config: &MemoConfig) -> Self {
        let cache = config.enabled.then(|| {
            let size = NonZeroUsize::new(config.max_entries)
                .or(NonZeroUsize::new(DEFAULT_CAPACITY))
                .unwrap_or(NonZeroUsize::MIN);
            RwLock::new(LruCache::new(size))
        });

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Filter the catalog relation, reusing a memoized result when present.
    pub fn get_or_apply(&self, catalog: &Catalog, spec: &FilterSpec) -> Arc<Relation> {
        let Some(cache) = &self.cache else {
            return Arc::new(filter::apply(catalog.relation(), spec));
        };

        let key = MemoKey {
            snapshot_id: catalog.snapshot().snapshot_id.clone(),
            fingerprint: spec.fingerprint(),
        };

        // `get` promotes the entry, so it needs the write lock.
        if let Some(hit) = cache.write().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(hit);
        }

        let filtered = Arc::new(filter::apply(catalog.relation(), spec));
        cache.write().put(key, Arc::clone(&filtered));
        self.misses.fetch_add(1, Ordering::Relaxed);
        filtered
    }

    /// Memo statistics. `None` when memoization is disabled.
    pub fn stats(&self) -> Option<MemoStats> {
        self.cache.as_ref().map(|cache| {
            let cache = cache.read();
            MemoStats {
                len: cache.len(),
                cap: cache.cap().get(),
                hits: self.hits.load(Ordering::Relaxed),
                misses: self.misses.load(Ordering::Relaxed),
            }
        })
    }

    /// Drop all memoized results.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }
}

/// Memo statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoStats {
    /// Current number of entries.
    pub len: usize,
    /// Maximum capacity.
    pub cap: usize,
    /// Lookups served from the memo.
    pub hits: u64,
    /// Lookups that ran the filter.
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySource;
    use crate::types::PublicationRecord;

    fn catalog() -> Catalog {
        let source = InMemorySource::new()
            .with_record(PublicationRecord::new("b1", "P1", 1620))
            .with_record(PublicationRecord::new("b2", "P2", 1680));
        Catalog::from_source(&source).unwrap()
    }

    #[test]
    fn test_repeat_selection_hits() {
        let catalog = catalog();
        let memo = FilterMemo::new(&MemoConfig::default());
        let spec = FilterSpec::new(1600, 1650);

        let first = memo.get_or_apply(&catalog, &spec);
        let second = memo.get_or_apply(&catalog, &spec);

        assert!(Arc::ptr_eq(&first, &second));
        let stats = memo.stats().unwrap();
        assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
    }

    #[test]
    fn test_counters_across_threads() {
        let catalog = Arc::new(catalog());
        let memo = Arc::new(FilterMemo::new(&MemoConfig::default()));
        let spec = FilterSpec::new(1600, 1650);
        memo.get_or_apply(&catalog, &spec);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (catalog, memo, spec) = (Arc::clone(&catalog), Arc::clone(&memo), spec.clone());
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        memo.get_or_apply(&catalog, &spec);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = memo.stats().unwrap();
        assert_eq!((stats.hits, stats.misses), (100, 1));
    }

    #[test]
    fn test_memo_matches_direct_filter() {
        let catalog = catalog();
        let memo = FilterMemo::new(&MemoConfig::default());
        let spec = FilterSpec::new(1650, 1700);
        assert_eq!(*memo.get_or_apply(&catalog, &spec), filter::apply(catalog.relation(), &spec));
    }

    #[test]
    fn test_capacity_evicts() {
        let catalog = catalog();
        let memo = FilterMemo::new(&MemoConfig {
            enabled: true,
            max_entries: 1,
        });
        memo.get_or_apply(&catalog, &FilterSpec::new(1600, 1650));
        memo.get_or_apply(&catalog, &FilterSpec::new(1600, 1700));
        assert_eq!(memo.stats().unwrap().len, 1);

        memo.clear();
        assert_eq!(memo.stats().unwrap().len, 0);
    }

    #[test]
    fn test_disabled_passes_through() {
        let catalog = catalog();
        let memo = FilterMemo::new(&MemoConfig {
            enabled: false,
            max_entries: 10,
        });
        assert_eq!(memo.get_or_apply(&catalog, &FilterSpec::new(1600, 1700)).len(), 2);
        assert!(memo.stats().is_none());
    }
}
