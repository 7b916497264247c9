// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the [`LookupCache`], a fixed-capacity FIFO cache
//! of resolved address lists.

use std::num::NonZeroUsize;

use lru::LruCache;

/// The capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 5;

/// A fixed-capacity cache mapping domains to their last-resolved
/// address lists.
///
/// Eviction is strictly first-in, first-out: when the cache is full, the
/// entry that was put earliest is dropped, regardless of how recently
/// it was read. This is an [`LruCache`] that is only ever read with
/// [`LruCache::peek`], so its recency order is the order of puts.
#[derive(Debug)]
pub struct LookupCache {
    /// `None` when the capacity is zero and caching is disabled.
    entries: Option<LruCache<String, Vec<String>>>,
}

impl LookupCache {
    /// Creates an empty cache holding at most `capacity` entries. A
    /// capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    /// Returns the cached addresses of `domain`, if any. This never
    /// changes the eviction order.
    pub fn get(&self, domain: &str) -> Option<&[String]> {
        self.entries.as_ref()?.peek(domain).map(Vec::as_slice)
    }

    /// Caches `addresses` for `domain`. If the cache is full, the oldest
    /// entry is evicted first. Putting a domain that is already cached
    /// replaces its addresses and makes it the newest entry.
    pub fn put(&mut self, domain: &str, addresses: Vec<String>) {
        if let Some(entries) = self.entries.as_mut() {
            entries.push(domain.to_owned(), addresses);
        }
    }

    /// Drops the entry for `domain`. Does nothing if it isn't cached.
    pub fn remove(&mut self, domain: &str) {
        if let Some(entries) = self.entries.as_mut() {
            entries.pop(domain);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.cap().get())
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(a: &str) -> Vec<String> {
        vec![a.to_owned()]
    }

    #[test]
    fn evicts_first_inserted_when_over_capacity() {
        let mut cache = LookupCache::new(DEFAULT_CAPACITY);
        for i in 0..=DEFAULT_CAPACITY {
            cache.put(&format!("d{i}.test"), addrs("10.0.0.1"));
        }
        assert_eq!(cache.len(), DEFAULT_CAPACITY);
        assert_eq!(cache.get("d0.test"), None);
        for i in 1..=DEFAULT_CAPACITY {
            assert!(cache.get(&format!("d{i}.test")).is_some());
        }
    }

    #[test]
    fn get_does_not_refresh_position() {
        let mut cache = LookupCache::new(2);
        cache.put("a.test", addrs("10.0.0.1"));
        cache.put("b.test", addrs("10.0.0.2"));
        assert!(cache.get("a.test").is_some());
        cache.put("c.test", addrs("10.0.0.3"));
        assert_eq!(cache.get("a.test"), None);
        assert!(cache.get("b.test").is_some());
    }

    #[test]
    fn re_put_replaces_value_and_makes_it_newest() {
        let mut cache = LookupCache::new(2);
        cache.put("a.test", addrs("10.0.0.1"));
        cache.put("a.test", addrs("10.0.0.9"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a.test"), Some(&addrs("10.0.0.9")[..]));

        // a.test is now the newest entry, so b.test goes first.
        cache.put("b.test", addrs("10.0.0.2"));
        cache.put("a.test", addrs("10.0.0.1"));
        cache.put("c.test", addrs("10.0.0.3"));
        assert_eq!(cache.get("b.test"), None);
        assert!(cache.get("a.test").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn remove_deletes_entry_and_is_a_no_op_when_absent() {
        let mut cache = LookupCache::new(2);
        cache.put("a.test", addrs("10.0.0.1"));
        cache.remove("a.test");
        cache.remove("missing.test");
        assert!(cache.is_empty());

        // The freed slot is reusable without evicting anything.
        cache.put("b.test", addrs("10.0.0.2"));
        cache.put("c.test", addrs("10.0.0.3"));
        assert!(cache.get("b.test").is_some());
        assert!(cache.get("c.test").is_some());
    }

    #[test]
    fn zero_capacity_caches_nothing() {
        let mut cache = LookupCache::new(0);
        cache.put("a.test", addrs("10.0.0.1"));
        assert_eq!(cache.get("a.test"), None);
        assert_eq!(cache.capacity(), 0);
        assert!(cache.is_empty());
    }
}
