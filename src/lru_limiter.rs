//! A limiter for [`schnellru`] which bounds a cache by the approximate heap
//! size of its keys and values.

/// The approximate number of bytes a cached item keeps alive.
pub trait CacheWeight {
    /// Returns the approximate size of `self`, in bytes.
    fn cache_weight(&self) -> usize;
}

impl CacheWeight for String {
    #[inline]
    fn cache_weight(&self) -> usize {
        core::mem::size_of::<Self>() + self.len()
    }
}

impl<T: CacheWeight + ?Sized> CacheWeight for std::sync::Arc<T> {
    #[inline]
    fn cache_weight(&self) -> usize {
        core::mem::size_of::<Self>() + T::cache_weight(self)
    }
}

impl<T: CacheWeight> CacheWeight for [T] {
    fn cache_weight(&self) -> usize {
        self.iter().map(CacheWeight::cache_weight).sum()
    }
}

impl<T: CacheWeight> CacheWeight for Option<T> {
    #[inline]
    fn cache_weight(&self) -> usize {
        self.as_ref().map_or(0, CacheWeight::cache_weight)
    }
}

/// A limiter for a map which is limited by memory usage.
#[derive(Copy, Clone, Debug)]
pub struct ByMemoryUsage {
    /// Bytes used by the keys and values currently in the map.
    heap_size: usize,
    /// Maximum allowed usage.
    max_bytes: usize,
}

impl ByMemoryUsage {
    /// Creates a new memory usage limiter with a given limit in bytes.
    pub const fn new(max_bytes: usize) -> Self {
        Self {
            heap_size: 0,
            max_bytes,
        }
    }

    /// Bytes used by the keys and values currently in the map.
    #[inline]
    pub fn heap_usage(&self) -> usize {
        self.heap_size
    }
}

impl<K: CacheWeight, V: CacheWeight> schnellru::Limiter<K, V> for ByMemoryUsage {
    type KeyToInsert<'a> = K;
    type LinkType = u32;

    #[inline]
    fn is_over_the_limit(&self, _: usize) -> bool {
        self.heap_size > self.max_bytes
    }

    #[inline]
    fn on_insert(&mut self, _: usize, key: K, value: V) -> Option<(K, V)> {
        let size = key.cache_weight() + value.cache_weight();
        (size <= self.max_bytes).then(|| {
            self.heap_size += size;
            (key, value)
        })
    }

    #[inline]
    fn on_replace(
        &mut self,
        _: usize,
        old_key: &mut K,
        _: K,
        old_value: &mut V,
        new_value: &mut V,
    ) -> bool {
        let new_size = old_key.cache_weight() + new_value.cache_weight();
        if new_size <= self.max_bytes {
            let old_size = old_key.cache_weight() + old_value.cache_weight();
            self.heap_size = self.heap_size - old_size + new_size;
            true
        } else {
            false
        }
    }

    #[inline]
    fn on_removed(&mut self, key: &mut K, value: &mut V) {
        self.heap_size -= key.cache_weight() + value.cache_weight();
    }

    #[inline]
    fn on_cleared(&mut self) {
        self.heap_size = 0;
    }

    #[inline]
    fn on_grow(&mut self, _: usize) -> bool {
        true
    }
}
