//! Tagged cache for Shop API reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, warn};
use vendure_storefront_core::CacheTag;

use crate::vendure::types::{Collection, Product, SearchResults};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Option<Box<Product>>),
    Products(Vec<Product>),
    Collection(Option<Box<Collection>>),
    Collections(Vec<Collection>),
    Search(Box<SearchResults>),
}

/// A cached value together with the tags it was fetched under.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub tags: Vec<CacheTag>,
    pub value: CacheValue,
}

/// Revalidation counters captured before a fetch.
///
/// A response fetched under an older generation of one of its tags is not
/// cached, since the tag was revalidated while the request was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    collections: u64,
    products: u64,
    cart: u64,
}

impl Generation {
    const fn of(self, tag: CacheTag) -> u64 {
        match tag {
            CacheTag::Collections => self.collections,
            CacheTag::Products => self.products,
            CacheTag::Cart => self.cart,
        }
    }
}

#[derive(Default)]
struct TagCounters {
    collections: AtomicU64,
    products: AtomicU64,
    cart: AtomicU64,
}

impl TagCounters {
    const fn counter(&self, tag: CacheTag) -> &AtomicU64 {
        match tag {
            CacheTag::Collections => &self.collections,
            CacheTag::Products => &self.products,
            CacheTag::Cart => &self.cart,
        }
    }

    fn snapshot(&self) -> Generation {
        Generation {
            collections: self.collections.load(Ordering::SeqCst),
            products: self.products.load(Ordering::SeqCst),
            cart: self.cart.load(Ordering::SeqCst),
        }
    }
}

/// In-memory response cache where entries can be dropped by tag.
#[derive(Clone)]
pub struct TagCache {
    entries: Cache<String, CachedEntry>,
    generations: Arc<TagCounters>,
}

impl TagCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();

        Self {
            entries,
            generations: Arc::default(),
        }
    }

    /// Cache key for an operation and its variables.
    pub fn key<V: Serialize>(operation: &str, variables: &V) -> String {
        let variables = serde_json::to_string(variables).unwrap_or_default();
        format!("{operation}:{variables}")
    }

    pub async fn get(&self, key: &str) -> Option<CacheValue> {
        let entry = self.entries.get(key).await?;
        debug!(key, "Cache hit");
        Some(entry.value)
    }

    /// Current tag generations. Take this before fetching a value to insert.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generations.snapshot()
    }

    fn revalidated_since(&self, tags: &[CacheTag], fetched_at: Generation) -> bool {
        let current = self.generations.snapshot();
        tags.iter().any(|&tag| current.of(tag) != fetched_at.of(tag))
    }

    /// Cache a value fetched at `fetched_at`.
    ///
    /// Nothing is cached if one of `tags` was revalidated since then.
    pub async fn insert(
        &self,
        key: String,
        tags: &[CacheTag],
        fetched_at: Generation,
        value: CacheValue,
    ) {
        if self.revalidated_since(tags, fetched_at) {
            debug!(key, "Tag revalidated during fetch, not caching");
            return;
        }

        self.entries
            .insert(
                key.clone(),
                CachedEntry {
                    tags: tags.to_vec(),
                    value,
                },
            )
            .await;

        // A revalidation between the check and the insert may have missed the entry
        if self.revalidated_since(tags, fetched_at) {
            self.entries.invalidate(&key).await;
        }
    }

    /// Drop every entry carrying `tag`.
    ///
    /// Entries are hidden from reads immediately and evicted in the background.
    /// Fetches already in flight for the tag will not be cached.
    pub fn revalidate_tag(&self, tag: CacheTag) {
        self.generations.counter(tag).fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self
            .entries
            .invalidate_entries_if(move |_key, entry| entry.tags.contains(&tag))
        {
            warn!(tag = %tag, error = %e, "Tag invalidation failed, clearing cache");
            self.entries.invalidate_all();
        }
    }

    /// Drop all entries.
    pub async fn invalidate_all(&self) {
        for tag in [CacheTag::Collections, CacheTag::Products, CacheTag::Cart] {
            self.generations.counter(tag).fetch_add(1, Ordering::SeqCst);
        }
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}
