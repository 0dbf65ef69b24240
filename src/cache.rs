//! Memoisation of expensive per-page lookups.
//!
//! Caches have no expiry. They are emptied wholesale when a reload publishes a
//! new configuration generation, and every entry belongs to exactly one
//! generation: reads and writes made against an older or newer generation
//! than the cache’s own miss or are dropped, so a key never mixes values from
//! two configurations.

use crate::{
    family::WikiIndividual,
    lru_limiter::{ByMemoryUsage, CacheWeight},
    page::WikiPage,
};
use parking_lot::Mutex;
use schnellru::{ByLength, Limiter, LruMap};
use std::sync::Arc;

/// The identity of a resolved page.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PageKey {
    /// The edition, compared structurally.
    pub wiki: Arc<WikiIndividual>,
    /// The page name or, for suggestions, the typed prefix.
    pub page_name: String,
}

impl PageKey {
    /// Creates a new key.
    pub fn new(wiki: &Arc<WikiIndividual>, page_name: impl Into<String>) -> Self {
        Self {
            wiki: Arc::clone(wiki),
            page_name: page_name.into(),
        }
    }
}

impl From<&WikiPage> for PageKey {
    fn from(page: &WikiPage) -> Self {
        Self::new(&page.wiki, page.page_name.as_str())
    }
}

impl CacheWeight for PageKey {
    fn cache_weight(&self) -> usize {
        // The edition is shared with the configuration, only the pointer counts
        core::mem::size_of::<Arc<WikiIndividual>>() + self.page_name.cache_weight()
    }
}

/// The introduction of an article, shown before the article is opened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageExcerpt {
    /// The display title of the article.
    pub title: String,
    /// The plain-text excerpt.
    pub text: String,
    /// The URL of the lead image, if any.
    pub image_url: Option<String>,
}

impl CacheWeight for PageExcerpt {
    fn cache_weight(&self) -> usize {
        self.title.cache_weight() + self.text.cache_weight() + self.image_url.cache_weight()
    }
}

/// The mutable part of a cache.
struct CacheState<V, L: Limiter<PageKey, V>> {
    /// The configuration generation of every entry in `map`.
    generation: u64,
    /// The entries.
    map: LruMap<PageKey, V, L>,
}

/// A generation-tagged LRU cache keyed by page.
pub struct LookupCache<V, L: Limiter<PageKey, V>> {
    /// The name used in log messages.
    name: &'static str,
    /// The entries.
    state: Mutex<CacheState<V, L>>,
}

/// Page name suggestions by edition and typed prefix.
pub type PageNameSuggestionCache = LookupCache<Arc<[String]>, ByLength>;

/// Article excerpts by resolved page.
pub type PageExcerptCache = LookupCache<Arc<PageExcerpt>, ByMemoryUsage>;

impl PageNameSuggestionCache {
    /// Creates a suggestion cache. With `max_entries`, the least recently
    /// used lists are evicted beyond that count.
    pub fn with_max_entries(max_entries: Option<u32>) -> Self {
        Self::new("page_name_suggestions", ByLength::new(max_entries.unwrap_or(u32::MAX)))
    }
}

impl PageExcerptCache {
    /// Creates an excerpt cache. With `max_bytes`, the least recently used
    /// excerpts are evicted beyond about that much memory.
    pub fn with_max_bytes(max_bytes: Option<usize>) -> Self {
        Self::new("page_excerpts", ByMemoryUsage::new(max_bytes.unwrap_or(usize::MAX)))
    }
}

impl<V, L> LookupCache<V, L>
where
    V: Clone,
    L: for<'a> Limiter<PageKey, V, KeyToInsert<'a> = PageKey>,
{
    /// Creates an empty cache at generation 0.
    pub fn new(name: &'static str, limiter: L) -> Self {
        Self {
            name,
            state: Mutex::new(CacheState {
                generation: 0,
                map: LruMap::new(limiter),
            }),
        }
    }

    /// The configuration generation the cache currently holds.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Gets a value cached under the given configuration generation.
    pub fn get(&self, generation: u64, key: &PageKey) -> Option<V> {
        let mut state = self.state.lock();
        if state.generation == generation {
            state.map.get(key).cloned()
        } else {
            None
        }
    }

    /// Caches a value computed under the given configuration generation.
    /// Returns false, and drops the value, if the cache has moved to another
    /// generation or the value does not fit.
    pub fn put(&self, generation: u64, key: PageKey, value: V) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            log::trace!(
                "{}: dropping value from generation {generation}, cache is at {}",
                self.name,
                state.generation
            );
            return false;
        }

        let inserted = state.map.insert(key, value);
        if !inserted {
            log::debug!("{}: value too large to cache", self.name);
        }
        inserted
    }

    /// Gets a cached value, or calls `fetch` and caches what it returns.
    ///
    /// The lock is not held while fetching. A fetch which returns `None`
    /// (failed or abandoned) leaves the key absent.
    pub fn get_or_fetch<F>(&self, generation: u64, key: PageKey, fetch: F) -> Option<V>
    where
        F: FnOnce(&PageKey) -> Option<V>,
    {
        if let Some(value) = self.get(generation, &key) {
            log::trace!("{}: hit for {}", self.name, key.page_name);
            return Some(value);
        }

        log::trace!("{}: miss for {}", self.name, key.page_name);
        let value = fetch(&key)?;
        self.put(generation, key, value.clone());
        Some(value)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.state.lock().map.clear();
    }

    /// Removes every entry and moves the cache to a new generation.
    pub fn reset(&self, generation: u64) {
        let mut state = self.state.lock();
        state.map.clear();
        state.generation = generation;
        log::debug!("{}: reset to generation {generation}", self.name);
    }

    /// The number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().map.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.state.lock().map.is_empty()
    }
}

impl<V, L: Limiter<PageKey, V>> core::fmt::Debug for LookupCache<V, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LookupCache")
            .field("name", &self.name)
            .field("generation", &state.generation)
            .field("len", &state.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn key(page_name: &str) -> PageKey {
        let snapshot = test_support::snapshot();
        let family = snapshot.registry().get_family_by_namespace("minecraft").unwrap();
        PageKey::new(family.get_main_language_wiki(), page_name)
    }

    fn excerpt(text: &str) -> Arc<PageExcerpt> {
        Arc::new(PageExcerpt {
            title: "Stone".into(),
            text: text.into(),
            image_url: None,
        })
    }

    #[test]
    fn clear_forgets_everything() {
        let cache = PageExcerptCache::with_max_bytes(None);
        cache.put(0, key("Stone"), excerpt("Stone is a block."));
        assert_eq!(cache.get(0, &key("Stone")).unwrap().text, "Stone is a block.");

        cache.clear();
        assert!(cache.get(0, &key("Stone")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn structural_keys() {
        let cache = PageNameSuggestionCache::with_max_entries(None);
        let names = Arc::from(vec!["Stone".to_string(), "Stonecutter".to_string()]);
        cache.put(0, key("Sto"), names);

        let other_snapshot_key = key("Sto");
        assert_eq!(cache.get(0, &other_snapshot_key).map(|names| names.len()), Some(2));
        assert!(cache.get(0, &key("Gra")).is_none());
    }

    #[test]
    fn generations_do_not_mix() {
        let cache = PageExcerptCache::with_max_bytes(None);
        cache.reset(1);
        assert!(cache.put(1, key("Stone"), excerpt("old")));

        cache.reset(2);
        assert!(cache.get(2, &key("Stone")).is_none(), "reset should clear");
        assert!(
            !cache.put(1, key("Stone"), excerpt("late")),
            "a late write from the old generation should be dropped"
        );
        assert!(cache.get(1, &key("Stone")).is_none());
        assert!(cache.get(2, &key("Stone")).is_none());
    }

    #[test]
    fn late_fetch_after_reset() {
        let cache = PageExcerptCache::with_max_bytes(None);
        cache.reset(1);
        let value = cache.get_or_fetch(1, key("Stone"), |_| {
            cache.reset(2);
            Some(excerpt("from generation 1"))
        });
        assert_eq!(value.unwrap().text, "from generation 1");
        assert!(
            cache.get(2, &key("Stone")).is_none(),
            "a fetch that finishes after a reload should not populate the new generation"
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_fetch() {
        let cache = PageExcerptCache::with_max_bytes(None);
        let mut calls = 0;
        for _ in 0..2 {
            let value = cache.get_or_fetch(0, key("Stone"), |_| {
                calls += 1;
                Some(excerpt("fetched"))
            });
            assert_eq!(value.unwrap().text, "fetched");
        }
        assert_eq!(calls, 1, "second lookup should hit the cache");

        assert!(cache.get_or_fetch(0, key("Grass"), |_| None).is_none());
        assert!(cache.get(0, &key("Grass")).is_none(), "abandoned fetch should leave no entry");
    }

    #[test]
    fn unbounded_by_default() {
        let cache = PageNameSuggestionCache::with_max_entries(None);
        for index in 0..300 {
            assert!(cache.put(0, key(&format!("p{index}")), Arc::from(Vec::new())));
        }
        assert_eq!(cache.len(), 300);
        assert!(cache.get(0, &key("p0")).is_some(), "nothing is evicted between reloads");

        let cache = PageExcerptCache::with_max_bytes(None);
        for index in 0..300 {
            assert!(cache.put(0, key(&format!("p{index}")), excerpt(&"x".repeat(1024))));
        }
        assert_eq!(cache.len(), 300);
    }

    #[test]
    fn optional_limits() {
        let cache = PageNameSuggestionCache::with_max_entries(Some(2));
        for prefix in ["a", "b", "c"] {
            cache.put(0, key(prefix), Arc::from(Vec::new()));
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(0, &key("a")).is_none());

        let cache = PageExcerptCache::with_max_bytes(Some(64));
        assert!(!cache.put(0, key("Stone"), excerpt(&"x".repeat(1024))));
        assert!(cache.is_empty());
    }
}
