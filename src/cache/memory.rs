//! Bounded in-memory tier with insertion-order eviction.
//!
//! Eviction order is the order keys were first inserted. Reads never promote
//! a key, so an entry that is read constantly is still evicted once
//! `capacity` newer keys have arrived after it. Re-inserting a key that is
//! already cached replaces its value in place without changing its position.

use super::CacheKey;
use crate::imaging::RasterImage;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default capacity of the grid-thumbnail tier.
pub const PREVIEW_CAPACITY: usize = 100;

/// Default capacity of the full-resolution tier.
pub const FULL_CAPACITY: usize = 30;

#[derive(Debug, Default)]
struct Entries {
    images: HashMap<CacheKey, Arc<RasterImage>>,
    /// Keys oldest-first. Always holds exactly the keys of `images`.
    order: VecDeque<CacheKey>,
}

/// Thread-safe bounded cache of decoded rasters.
///
/// Every operation takes the single tier lock for the duration of a map
/// lookup or insert; cached images are handed out as `Arc` clones so the
/// critical section never copies pixels.
#[derive(Debug)]
pub struct MemoryCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl MemoryCache {
    /// Create a tier holding at most `capacity` images (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn preview() -> Self {
        Self::new(PREVIEW_CAPACITY)
    }

    pub fn full() -> Self {
        Self::new(FULL_CAPACITY)
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // A panic while holding the lock cannot leave `images` and `order`
        // out of step: both are updated after all fallible work is done.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached image for `key`, or `None` on a miss. Never blocks on I/O.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<RasterImage>> {
        self.lock().images.get(key).cloned()
    }

    /// Insert `image` under `key`, evicting the oldest-inserted key when the
    /// tier is full. Returns the evicted key, if any.
    pub fn put(&self, key: CacheKey, image: Arc<RasterImage>) -> Option<CacheKey> {
        let mut entries = self.lock();
        if let Some(slot) = entries.images.get_mut(&key) {
            *slot = image;
            return None;
        }

        let evicted = if entries.order.len() >= self.capacity {
            let oldest = entries.order.pop_front();
            if let Some(oldest) = &oldest {
                entries.images.remove(oldest);
            }
            oldest
        } else {
            None
        };

        entries.order.push_back(key.clone());
        entries.images.insert(key, image);
        evicted
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().images.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached keys, oldest-inserted first.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.lock().order.iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.images.clear();
        entries.order.clear();
    }
}
