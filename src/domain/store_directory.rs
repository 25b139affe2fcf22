use std::num::NonZeroUsize;

use basket_optimizer_sdk::StoreKey;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 256;

/// Display metadata for a store; never used for optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Bounded lookup of store metadata by [`StoreKey`]
#[derive(Debug)]
pub struct StoreDirectory {
    entries: Mutex<LruCache<StoreKey, StoreMetadata>>,
}

impl Default for StoreDirectory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl StoreDirectory {
    /// A capacity of 0 is treated as 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn insert(&self, key: StoreKey, metadata: StoreMetadata) {
        self.entries.lock().put(key, metadata);
    }

    pub fn extend(&self, stores: impl IntoIterator<Item = (StoreKey, StoreMetadata)>) {
        let mut entries = self.entries.lock();
        for (key, metadata) in stores {
            entries.put(key, metadata);
        }
    }

    pub fn get(&self, key: &StoreKey) -> Option<StoreMetadata> {
        self.entries.lock().get(key).cloned()
    }

    /// Name to show for `key`, or `fallback` when the store is unknown
    pub fn display_name(&self, key: &StoreKey, fallback: &str) -> String {
        self.get(key)
            .map(|m| m.name)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
