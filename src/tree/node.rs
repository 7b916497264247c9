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

//! The [`Node`] structure, representing a node in a
//! [`DomainTree`](super::DomainTree), and an iterator over a subtree of
//! nodes.

use std::collections::HashMap;
use std::iter::FusedIterator;
use std::vec;

use slab::Slab;

/// A node in the domain tree.
///
/// Nodes live in an arena (a [`Slab`]) and refer to each other by their
/// keys in that arena. Since nodes are never removed, keys are handed
/// out in creation order, which [`Node::children_in_creation_order`]
/// relies on.
#[derive(Clone, Debug)]
pub struct Node {
    /// The label of the edge leading to this node from its parent. This
    /// is empty for the root.
    pub label: Box<str>,
    pub parent: Option<usize>,
    pub children: HashMap<Box<str>, usize>,
    pub records: Vec<String>,
}

impl Node {
    /// Creates a new `Node` with no records and no children.
    pub fn new(label: &str, parent: Option<usize>) -> Self {
        Self {
            label: label.into(),
            parent,
            children: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Returns the keys of this node's children, oldest first.
    pub fn children_in_creation_order(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.children.values().copied().collect();
        keys.sort_unstable();
        keys
    }
}

////////////////////////////////////////////////////////////////////////
// NODE ITERATOR                                                      //
////////////////////////////////////////////////////////////////////////

/// A depth-first, pre-order iterator over a [`Node`] and its
/// descendants. Each item is the node's key along with the node.
pub struct Iter<'a> {
    nodes: &'a Slab<Node>,
    state: IterState,
}

/// The internal state of an [`Iter`].
enum IterState {
    /// The next action is to return the node with this key.
    Node { key: usize, stack: IterStack },

    /// The next action is to begin processing the next unprocessed
    /// child of the current node.
    Children {
        children: vec::IntoIter<usize>,
        stack: IterStack,
    },

    /// Iteration is complete.
    Finished,
}

type IterStack = Vec<vec::IntoIter<usize>>;

impl<'a> Iter<'a> {
    /// Creates a new `Iter` over the subtree rooted at `start`.
    pub fn new(nodes: &'a Slab<Node>, start: usize) -> Self {
        Self {
            nodes,
            state: IterState::Node {
                key: start,
                stack: Vec::new(),
            },
        }
    }

    /// Acts on the current state of the iterator. Returns the next
    /// value to return from [`Iterator::next`], or `None` if the state
    /// transition did not produce a new value. In the latter case, this
    /// method should be called repeatedly until it produces a value.
    fn execute_state_machine(&mut self) -> Option<Option<(usize, &'a Node)>> {
        let previous_state = std::mem::replace(&mut self.state, IterState::Finished);
        match previous_state {
            IterState::Node { key, stack } => {
                let nodes = self.nodes;
                let node = &nodes[key];
                self.state = IterState::Children {
                    children: node.children_in_creation_order().into_iter(),
                    stack,
                };
                Some(Some((key, node)))
            }
            IterState::Children {
                mut children,
                mut stack,
            } => {
                if let Some(next_child) = children.next() {
                    stack.push(children);
                    self.state = IterState::Node {
                        key: next_child,
                        stack,
                    };
                    None
                } else if let Some(parent) = stack.pop() {
                    self.state = IterState::Children {
                        children: parent,
                        stack,
                    };
                    None
                } else {
                    Some(None)
                }
            }
            IterState::Finished => Some(None),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(result) = self.execute_state_machine() {
                return result;
            }
        }
    }
}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds root -> {com -> {a, b}, org}.
    fn small_arena() -> Slab<Node> {
        let mut nodes = Slab::new();
        let root = nodes.insert(Node::new("", None));
        for (label, parent) in [("com", root), ("org", root)] {
            let key = nodes.insert(Node::new(label, Some(parent)));
            nodes[parent].children.insert(label.into(), key);
        }
        let com = nodes[root].children["com"];
        for label in ["a", "b"] {
            let key = nodes.insert(Node::new(label, Some(com)));
            nodes[com].children.insert(label.into(), key);
        }
        nodes
    }

    #[test]
    fn iter_visits_every_node_once_in_pre_order() {
        let nodes = small_arena();
        let labels: Vec<&str> = Iter::new(&nodes, 0).map(|(_, n)| &*n.label).collect();
        assert_eq!(labels, ["", "com", "a", "b", "org"]);
    }

    #[test]
    fn iter_over_subtree_stays_in_subtree() {
        let nodes = small_arena();
        let com = nodes[0].children["com"];
        assert_eq!(Iter::new(&nodes, com).count(), 3);
    }
}
