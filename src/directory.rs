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

//! Implementation of the [`Directory`], which pairs a [`DomainTree`]
//! with its [`LookupCache`].

use log::debug;

use crate::cache::LookupCache;
use crate::family::Family;
use crate::tree::{DomainTree, RemoveError, Removed};

/// The records of one address family together with the cache in front
/// of them.
///
/// Every mutation of the tree through a `Directory` drops the affected
/// domain from the cache, so a cached address list is never older than
/// the tree's contents.
#[derive(Debug)]
pub struct Directory {
    family: Family,
    tree: DomainTree,
    cache: LookupCache,
}

/// The outcome of [`Directory::query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryOutcome {
    /// The addresses were served from the cache.
    CacheHit(Vec<String>),

    /// The addresses were read from the tree (and are now cached).
    Found(Vec<String>),

    /// The domain has no records.
    NotFound,
}

impl QueryOutcome {
    /// Returns the addresses found, regardless of where they came from.
    pub fn addresses(&self) -> Option<&[String]> {
        match self {
            Self::CacheHit(addresses) | Self::Found(addresses) => Some(addresses),
            Self::NotFound => None,
        }
    }
}

impl Directory {
    /// Creates an empty `Directory` whose cache holds at most
    /// `cache_capacity` domains.
    pub fn new(family: Family, cache_capacity: usize) -> Self {
        Self::with_tree(family, DomainTree::new(), cache_capacity)
    }

    /// Creates a `Directory` over an already-populated tree (e.g. one
    /// filled by [`load`](crate::load)). The cache starts out empty.
    pub fn with_tree(family: Family, tree: DomainTree, cache_capacity: usize) -> Self {
        Self {
            family,
            tree,
            cache: LookupCache::new(cache_capacity),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn tree(&self) -> &DomainTree {
        &self.tree
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Looks up `domain`, consulting the cache first. On a cache miss
    /// that the tree can answer, the answer is cached.
    pub fn query(&mut self, domain: &str) -> QueryOutcome {
        if let Some(cached) = self.cache.get(domain) {
            debug!(
                "Cache hit for {} ({}): {}",
                domain,
                self.family.record_type(),
                cached.join(", "),
            );
            return QueryOutcome::CacheHit(cached.to_vec());
        }

        match self.tree.query(domain) {
            Some(records) => {
                let records = records.to_vec();
                debug!(
                    "Cache miss for {} ({}): {}",
                    domain,
                    self.family.record_type(),
                    records.join(", "),
                );
                self.cache.put(domain, records.clone());
                QueryOutcome::Found(records)
            }
            None => QueryOutcome::NotFound,
        }
    }

    /// Adds `address` to `domain`'s records.
    pub fn insert(&mut self, domain: &str, address: &str) {
        self.cache.remove(domain);
        self.tree.insert(domain, address);
    }

    /// Removes one address, or all addresses if `address` is `None`,
    /// from `domain`. See [`DomainTree::remove`].
    pub fn remove(&mut self, domain: &str, address: Option<&str>) -> Result<Removed, RemoveError> {
        self.cache.remove(domain);
        self.tree.remove(domain, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(Family::Ipv4, 5)
    }

    #[test]
    fn repeat_query_is_served_from_cache() {
        let mut dir = directory();
        dir.insert("example.com", "1.2.3.4");
        let first = dir.query("example.com");
        let second = dir.query("example.com");
        assert_eq!(first, QueryOutcome::Found(vec!["1.2.3.4".to_owned()]));
        assert_eq!(second, QueryOutcome::CacheHit(vec!["1.2.3.4".to_owned()]));
        assert_eq!(first.addresses(), second.addresses());
    }

    #[test]
    fn misses_are_not_cached() {
        let mut dir = directory();
        assert_eq!(dir.query("nowhere.test"), QueryOutcome::NotFound);
        assert!(dir.cache().is_empty());
    }

    #[test]
    fn insert_invalidates_cached_entry() {
        let mut dir = directory();
        dir.insert("example.com", "1.1.1.1");
        dir.query("example.com");
        dir.insert("example.com", "2.2.2.2");
        assert_eq!(
            dir.query("example.com"),
            QueryOutcome::Found(vec!["1.1.1.1".to_owned(), "2.2.2.2".to_owned()])
        );
    }

    #[test]
    fn remove_invalidates_cached_entry() {
        let mut dir = directory();
        dir.insert("example.com", "1.1.1.1");
        dir.query("example.com");
        assert_eq!(dir.remove("example.com", None), Ok(Removed::All));
        assert_eq!(dir.query("example.com"), QueryOutcome::NotFound);
    }

    #[test]
    fn remove_of_missing_domain_still_reports_not_found() {
        let mut dir = directory();
        assert_eq!(
            dir.remove("example.com", Some("1.1.1.1")),
            Err(RemoveError::DomainNotFound)
        );
    }
}
