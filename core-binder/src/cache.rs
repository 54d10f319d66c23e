//! Bounded, size-aware LRU cache of display values.
//!
//! Caches map an [`ItemId`] to an already computed title, subtitle or
//! artwork. Capacity is a total weight: text caches count entries with
//! [`UnitWeigher`], artwork caches count either images or decoded bytes
//! (with [`ArtworkWeigher`]). Inserting past capacity evicts least recently used
//! entries until the total fits again.
//!
//! The cache is synchronous and internally locked. `bind` serves hits from
//! the UI thread while fetch tasks insert from runtime workers, so it is
//! shared through an `Arc`.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bridge_traits::{artwork::Artwork, library::ItemId};
use core_runtime::config::ArtworkCapacity;
use lru::LruCache;
use tracing::trace;

use crate::error::{BinderError, Result};

/// Computes the weight of a cached value.
pub trait Weigher<V>: Send + Sync {
    fn weigh(&self, value: &V) -> usize;
}

/// Every entry weighs 1, so capacity is an entry count.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeigher;

impl<V> Weigher<V> for UnitWeigher {
    fn weigh(&self, _value: &V) -> usize {
        1
    }
}

/// Artwork weighs its decoded pixel buffer, so capacity is a byte budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtworkWeigher;

impl Weigher<Artwork> for ArtworkWeigher {
    fn weigh(&self, value: &Artwork) -> usize {
        value.byte_count()
    }
}

/// Counters describing cache usage since creation (or the last `clear`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub weight: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

struct Entry<V> {
    value: V,
    weight: usize,
}

struct State<V> {
    entries: LruCache<ItemId, Entry<V>>,
    weight: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Fixed-capacity LRU cache keyed by [`ItemId`].
pub struct BoundedCache<V> {
    state: Mutex<State<V>>,
    weigher: Box<dyn Weigher<V>>,
    capacity: NonZeroUsize,
}

/// Cache of titles or subtitles.
pub type TextCache = BoundedCache<String>;

/// Cache of decoded artwork.
pub type ArtworkCache = BoundedCache<Artwork>;

impl<V: Clone + Send + 'static> BoundedCache<V> {
    /// Cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`BinderError::InvalidArgument`] when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_weigher(capacity, UnitWeigher)
    }

    /// Cache whose total weight, as computed by `weigher`, stays within `capacity`.
    pub fn with_weigher(capacity: usize, weigher: impl Weigher<V> + 'static) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| BinderError::invalid("capacity", "cache capacity must be greater than 0"))?;

        Ok(Self {
            state: Mutex::new(State {
                entries: LruCache::unbounded(),
                weight: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            weigher: Box::new(weigher),
            capacity,
        })
    }

    fn lock(&self) -> MutexGuard<'_, State<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&self, key: &ItemId) -> Option<V> {
        let mut state = self.lock();
        let found = state.entries.get(key).map(|entry| entry.value.clone());
        match found {
            Some(value) => {
                state.hits += 1;
                Some(value)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Look up `key` without touching recency or statistics.
    pub fn peek(&self, key: &ItemId) -> Option<V> {
        self.lock().entries.peek(key).map(|entry| entry.value.clone())
    }

    pub fn contains(&self, key: &ItemId) -> bool {
        self.lock().entries.contains(key)
    }

    /// Insert or replace `key`, then evict least recently used entries
    /// until the total weight fits.
    ///
    /// A value heavier than the whole capacity is not stored and the cache
    /// is left unchanged. Returns whether the value was stored.
    pub fn put(&self, key: ItemId, value: V) -> bool {
        let weight = self.weigher.weigh(&value);
        let capacity = self.capacity.get();
        if weight > capacity {
            trace!(key = %key, weight, capacity, "Value exceeds cache capacity; not cached");
            return false;
        }

        let mut state = self.lock();
        if let Some(previous) = state.entries.pop(&key) {
            state.weight -= previous.weight;
        }
        state.entries.put(key, Entry { value, weight });
        state.weight += weight;

        while state.weight > capacity {
            match state.entries.pop_lru() {
                Some((evicted, entry)) => {
                    state.weight -= entry.weight;
                    state.evictions += 1;
                    trace!(key = %evicted, weight = entry.weight, "Evicted cache entry");
                }
                None => break,
            }
        }
        true
    }

    pub fn remove(&self, key: &ItemId) -> Option<V> {
        let mut state = self.lock();
        let entry = state.entries.pop(key)?;
        state.weight -= entry.weight;
        Some(entry.value)
    }

    /// Drop every entry and reset statistics.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.weight = 0;
        state.hits = 0;
        state.misses = 0;
        state.evictions = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Current total weight.
    pub fn weight(&self) -> usize {
        self.lock().weight
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            entries: state.entries.len(),
            weight: state.weight,
            capacity: self.capacity.get(),
        }
    }
}

impl BoundedCache<Artwork> {
    /// Artwork cache bounded by total decoded bytes.
    pub fn with_byte_capacity(bytes: usize) -> Result<Self> {
        Self::with_weigher(bytes, ArtworkWeigher)
    }

    /// Artwork cache bounded by image count, however large each image is.
    pub fn with_entry_capacity(entries: usize) -> Result<Self> {
        Self::with_weigher(entries, UnitWeigher)
    }

    pub fn from_capacity(capacity: ArtworkCapacity) -> Result<Self> {
        match capacity {
            ArtworkCapacity::Entries(entries) => Self::with_entry_capacity(entries),
            ArtworkCapacity::Bytes(bytes) => Self::with_byte_capacity(bytes),
        }
    }
}

impl<V> fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("BoundedCache")
            .field("entries", &state.entries.len())
            .field("weight", &state.weight)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(key: &str) -> ItemId {
        ItemId::new(key)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = TextCache::new(0);
        assert!(matches!(
            result,
            Err(BinderError::InvalidArgument { ref field, .. }) if field == "capacity"
        ));
        assert!(ArtworkCache::with_byte_capacity(0).is_err());
    }

    #[test]
    fn test_lru_eviction_order() {
        let cache = TextCache::new(2).unwrap();
        cache.put(id("a"), "A".to_string());
        cache.put(id("b"), "B".to_string());
        cache.put(id("c"), "C".to_string());

        assert!(!cache.contains(&id("a")));
        assert!(cache.contains(&id("b")));
        assert!(cache.contains(&id("c")));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_promotes_entry() {
        let cache = TextCache::new(2).unwrap();
        cache.put(id("a"), "A".to_string());
        cache.put(id("b"), "B".to_string());

        assert_eq!(cache.get(&id("a")), Some("A".to_string()));
        cache.put(id("c"), "C".to_string());

        assert!(cache.contains(&id("a")));
        assert!(!cache.contains(&id("b")));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let cache = TextCache::new(2).unwrap();
        cache.put(id("a"), "A".to_string());
        cache.put(id("b"), "B".to_string());

        assert_eq!(cache.peek(&id("a")), Some("A".to_string()));
        cache.put(id("c"), "C".to_string());

        assert!(!cache.contains(&id("a")));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_replace_keeps_weight_consistent() {
        let cache = TextCache::new(3).unwrap();
        cache.put(id("a"), "A".to_string());
        cache.put(id("a"), "A2".to_string());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.weight(), 1);
        assert_eq!(cache.get(&id("a")), Some("A2".to_string()));
    }

    #[test]
    fn test_byte_weighted_eviction() {
        // 10x10 RGBA = 400 bytes each
        let cache = ArtworkCache::with_byte_capacity(1_000).unwrap();
        let art = || Artwork::solid(10, 10, [0, 0, 0, 255]);

        cache.put(id("a"), art());
        cache.put(id("b"), art());
        assert_eq!(cache.weight(), 800);

        cache.get(&id("a"));
        cache.put(id("c"), art());

        assert_eq!(cache.weight(), 800);
        assert!(cache.contains(&id("a")));
        assert!(!cache.contains(&id("b")));
        assert!(cache.contains(&id("c")));

        // A large image pushes out as many entries as needed
        cache.put(id("big"), Artwork::solid(15, 15, [0, 0, 0, 255]));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.weight(), 900);
        assert_eq!(cache.stats().evictions, 3);
    }

    #[test]
    fn test_oversized_value_not_stored() {
        let cache = ArtworkCache::with_byte_capacity(100).unwrap();
        cache.put(id("small"), Artwork::solid(5, 5, [0, 0, 0, 255]));

        let stored = cache.put(id("huge"), Artwork::solid(50, 50, [0, 0, 0, 255]));

        assert!(!stored);
        assert!(!cache.contains(&id("huge")));
        assert!(cache.contains(&id("small")));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_entry_capacity_ignores_image_size() {
        let cache = ArtworkCache::from_capacity(ArtworkCapacity::Entries(2)).unwrap();

        // 500x500 RGBA is a million bytes; it still counts as one entry
        assert!(cache.put(id("a"), Artwork::solid(500, 500, [0, 0, 0, 255])));
        assert!(cache.put(id("b"), Artwork::solid(1, 1, [0, 0, 0, 255])));
        assert_eq!(cache.weight(), 2);

        cache.put(id("c"), Artwork::solid(400, 400, [0, 0, 0, 255]));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&id("a")));
        assert!(cache.contains(&id("c")));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = TextCache::new(5).unwrap();
        cache.put(id("a"), "A".to_string());
        cache.put(id("b"), "B".to_string());
        cache.get(&id("a"));
        cache.get(&id("zzz"));

        assert_eq!(cache.remove(&id("a")), Some("A".to_string()));
        assert_eq!(cache.remove(&id("a")), None);
        assert_eq!(cache.weight(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats {
            capacity: 5,
            ..CacheStats::default()
        });
    }

    #[test]
    fn test_stats_counts_hits_and_misses() {
        let cache = TextCache::new(5).unwrap();
        cache.put(id("a"), "A".to_string());

        cache.get(&id("a"));
        cache.get(&id("a"));
        cache.get(&id("missing"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.capacity, 5);
        assert!((stats.hit_ratio() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;

        let cache = Arc::new(TextCache::new(1_000).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.put(id(&format!("{}-{}", t, i)), format!("v{}", i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 400);
        assert_eq!(cache.weight(), 400);
    }
}
