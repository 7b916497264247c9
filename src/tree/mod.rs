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

//! The [`DomainTree`], which maps domain names to address records.
//!
//! A domain is stored by walking from the root through one node per
//! label, most significant label first. So `www.example.com` lives at
//! the node reached through `com`, then `example`, then `www`, and all
//! subdomains of `example.com` share that domain's node as an ancestor.
//!
//! Nodes are created lazily along the path of an insertion and are
//! never deleted. A node whose records have all been removed simply
//! stays in the tree, empty; queries treat it the same as a missing
//! node.

use std::fmt;

use slab::Slab;

mod node;

use node::{Iter, Node};

/// The key of the root node in the arena. It is always the first node
/// inserted.
const ROOT: usize = 0;

/// A tree of domain names and their address records.
///
/// The records at a node form an ordered multiset: they are kept in
/// insertion order, and inserting the same address twice stores it
/// twice. Removing a specific address deletes only its first
/// occurrence.
#[derive(Clone, Debug)]
pub struct DomainTree {
    nodes: Slab<Node>,
}

/// A successful outcome of [`DomainTree::remove`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Removed {
    /// All records of the domain were cleared.
    All,

    /// One occurrence of the given address was removed.
    One,
}

/// Errors returned by [`DomainTree::remove`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RemoveError {
    DomainNotFound,
    AddressNotFound,
}

impl DomainTree {
    /// Creates a new, empty `DomainTree`.
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = nodes.insert(Node::new("", None));
        debug_assert_eq!(root, ROOT);
        Self { nodes }
    }

    /// Adds `address` to the records of `domain`, creating any missing
    /// nodes along the way. This always succeeds.
    pub fn insert(&mut self, domain: &str, address: impl Into<String>) {
        let key = self.find_or_create(domain);
        self.nodes[key].records.push(address.into());
    }

    /// Returns the records of `domain`, or `None` if the domain has no
    /// node or its node holds no records.
    pub fn query(&self, domain: &str) -> Option<&[String]> {
        self.find(domain)
            .map(|key| self.nodes[key].records.as_slice())
            .filter(|records| !records.is_empty())
    }

    /// Removes records from `domain`. If `address` is `None`, all of the
    /// domain's records are cleared (its subdomains are untouched);
    /// otherwise the first occurrence of `address` is removed.
    pub fn remove(&mut self, domain: &str, address: Option<&str>) -> Result<Removed, RemoveError> {
        let key = self.find(domain).ok_or(RemoveError::DomainNotFound)?;
        let records = &mut self.nodes[key].records;
        match address {
            None => {
                records.clear();
                Ok(Removed::All)
            }
            Some(address) => {
                let index = records
                    .iter()
                    .position(|r| r == address)
                    .ok_or(RemoveError::AddressNotFound)?;
                records.remove(index);
                Ok(Removed::One)
            }
        }
    }

    /// Returns an iterator over every domain that holds at least one
    /// record, along with its records. Domains are produced by a
    /// depth-first traversal, so a domain always precedes its
    /// subdomains.
    pub fn iter(&self) -> Records {
        Records {
            tree: self,
            inner: Iter::new(&self.nodes, ROOT),
        }
    }

    /// Collects [`DomainTree::iter`] into owned pairs.
    pub fn list_all(&self) -> Vec<(String, Vec<String>)> {
        self.iter()
            .map(|(domain, records)| (domain, records.to_vec()))
            .collect()
    }

    /// Returns whether no domain in the tree holds any records.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|(_, node)| node.records.is_empty())
    }

    /// Returns the total number of records in the tree.
    pub fn record_count(&self) -> usize {
        self.nodes.iter().map(|(_, node)| node.records.len()).sum()
    }

    /// Splits `domain` into labels, most significant first.
    fn labels(domain: &str) -> impl Iterator<Item = &str> {
        domain.split('.').rev()
    }

    fn find(&self, domain: &str) -> Option<usize> {
        let mut key = ROOT;
        for label in Self::labels(domain) {
            key = *self.nodes[key].children.get(label)?;
        }
        Some(key)
    }

    fn find_or_create(&mut self, domain: &str) -> usize {
        let mut key = ROOT;
        for label in Self::labels(domain) {
            key = match self.nodes[key].children.get(label) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.insert(Node::new(label, Some(key)));
                    self.nodes[key].children.insert(label.into(), child);
                    child
                }
            };
        }
        key
    }

    /// Reconstructs the domain name of the node at `key` by following
    /// parent links back to the root.
    fn domain_of(&self, key: usize) -> String {
        let mut labels = Vec::new();
        let mut current = key;
        while let Some(parent) = self.nodes[current].parent {
            labels.push(&*self.nodes[current].label);
            current = parent;
        }
        labels.join(".")
    }
}

impl Default for DomainTree {
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the populated domains of a [`DomainTree`]. See
/// [`DomainTree::iter`].
pub struct Records<'a> {
    tree: &'a DomainTree,
    inner: Iter<'a>,
}

impl<'a> Iterator for Records<'a> {
    type Item = (String, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find(|(_, node)| !node.records.is_empty())
            .map(|(key, node)| (self.tree.domain_of(key), node.records.as_slice()))
    }
}

impl fmt::Display for RemoveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::DomainNotFound => f.write_str("the domain is not in the tree"),
            Self::AddressNotFound => f.write_str("the address is not recorded for the domain"),
        }
    }
}

impl std::error::Error for RemoveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_query_round_trips() {
        let mut tree = DomainTree::new();
        tree.insert("example.com", "1.2.3.4");
        assert_eq!(tree.query("example.com"), Some(&["1.2.3.4".to_owned()][..]));
    }

    #[test]
    fn labels_are_stored_most_significant_first() {
        let mut tree = DomainTree::new();
        tree.insert("a.b.c", "10.0.0.1");
        let c = tree.nodes[ROOT].children["c"];
        let b = tree.nodes[c].children["b"];
        let a = tree.nodes[b].children["a"];
        assert_eq!(tree.nodes[a].records, ["10.0.0.1"]);
        assert_eq!(tree.domain_of(a), "a.b.c");
    }

    #[test]
    fn query_of_missing_domain_is_none() {
        let mut tree = DomainTree::new();
        tree.insert("b.a.com", "10.0.0.2");
        assert_eq!(tree.query("c.a.com"), None);
        assert_eq!(tree.query("org"), None);
    }

    #[test]
    fn query_of_intermediate_node_is_none() {
        let mut tree = DomainTree::new();
        tree.insert("b.a.com", "10.0.0.2");
        assert_eq!(tree.query("a.com"), None);
    }

    #[test]
    fn subdomains_do_not_share_records() {
        let mut tree = DomainTree::new();
        tree.insert("a.com", "10.0.0.1");
        tree.insert("b.a.com", "10.0.0.2");
        assert_eq!(tree.query("b.a.com"), Some(&["10.0.0.2".to_owned()][..]));
        assert_eq!(tree.query("a.com"), Some(&["10.0.0.1".to_owned()][..]));
    }

    #[test]
    fn remove_specific_address_leaves_the_other() {
        let mut tree = DomainTree::new();
        tree.insert("example.com", "1.1.1.1");
        tree.insert("example.com", "2.2.2.2");
        assert_eq!(tree.remove("example.com", Some("1.1.1.1")), Ok(Removed::One));
        assert_eq!(tree.query("example.com"), Some(&["2.2.2.2".to_owned()][..]));
    }

    #[test]
    fn remove_all_empties_domain_but_keeps_subdomains() {
        let mut tree = DomainTree::new();
        tree.insert("a.com", "10.0.0.1");
        tree.insert("a.com", "10.0.0.3");
        tree.insert("b.a.com", "10.0.0.2");
        assert_eq!(tree.remove("a.com", None), Ok(Removed::All));
        assert_eq!(tree.query("a.com"), None);
        assert!(tree.query("b.a.com").is_some());
    }

    #[test]
    fn remove_reports_missing_domain_and_address() {
        let mut tree = DomainTree::new();
        tree.insert("example.com", "1.1.1.1");
        assert_eq!(
            tree.remove("other.com", None),
            Err(RemoveError::DomainNotFound)
        );
        assert_eq!(
            tree.remove("example.com", Some("9.9.9.9")),
            Err(RemoveError::AddressNotFound)
        );
    }

    #[test]
    fn duplicate_inserts_are_independent_entries() {
        let mut tree = DomainTree::new();
        tree.insert("example.com", "1.1.1.1");
        tree.insert("example.com", "1.1.1.1");
        tree.remove("example.com", Some("1.1.1.1")).unwrap();
        assert_eq!(tree.query("example.com"), Some(&["1.1.1.1".to_owned()][..]));
        assert_eq!(tree.record_count(), 1);
    }

    #[test]
    fn list_all_reconstructs_every_populated_domain() {
        let mut tree = DomainTree::new();
        tree.insert("a.com", "10.0.0.1");
        tree.insert("b.a.com", "10.0.0.2");
        tree.insert("x.org", "10.0.0.3");
        tree.insert("y.x.org", "10.0.0.4");
        tree.remove("x.org", None).unwrap();

        let mut listing = tree.list_all();
        listing.sort();
        assert_eq!(
            listing,
            [
                ("a.com".to_owned(), vec!["10.0.0.1".to_owned()]),
                ("b.a.com".to_owned(), vec!["10.0.0.2".to_owned()]),
                ("y.x.org".to_owned(), vec!["10.0.0.4".to_owned()]),
            ]
        );
    }

    #[test]
    fn empty_tree_lists_nothing() {
        let mut tree = DomainTree::new();
        assert!(tree.is_empty());
        assert!(tree.list_all().is_empty());
        tree.insert("a.com", "10.0.0.1");
        tree.remove("a.com", None).unwrap();
        assert!(tree.is_empty());
        assert!(tree.list_all().is_empty());
    }
}
