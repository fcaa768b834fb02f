//! Disjoint-set forest used to split candidate solutions into connected pieces.

use std::collections::HashMap;
use std::hash::Hash;

use itertools::Itertools;

/// Disjoint sets over arbitrary keys, with path compression and no rank heuristic.
///
/// Keys are registered the first time they are mentioned.
#[derive(Clone, Debug)]
pub struct UnionFind<K> {
    index: HashMap<K, usize>,
    keys: Vec<K>,
    parent: Vec<usize>,
}

impl<K> Default for UnionFind<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            keys: Vec::new(),
            parent: Vec::new(),
        }
    }
}

impl<K> UnionFind<K>
where
    K: Hash + Eq + Clone,
{
    /// An empty partition.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, key: K) -> usize {
        if let Some(slot) = self.index.get(&key) {
            return *slot;
        }

        let slot = self.keys.len();
        self.index.insert(key.clone(), slot);
        self.keys.push(key);
        self.parent.push(slot);
        slot
    }

    fn root(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // compress the path just walked
        let mut at = slot;
        while self.parent[at] != root {
            let next = self.parent[at];
            self.parent[at] = root;
            at = next;
        }

        root
    }

    /// Register `key` as a singleton if it has not been seen before.
    pub fn add(&mut self, key: K) {
        self.slot(key);
    }

    /// Merge the sets containing `a` and `b`. The root of `a` ends up pointing at the root of `b`.
    pub fn union(&mut self, a: K, b: K) {
        let (a, b) = (self.slot(a), self.slot(b));
        let (root_a, root_b) = (self.root(a), self.root(b));
        if root_a != root_b {
            self.parent[root_a] = root_b;
        }
    }

    /// The representative of the set containing `key`, or `None` if `key` was never mentioned.
    pub fn find(&mut self, key: &K) -> Option<K> {
        let slot = *self.index.get(key)?;
        let root = self.root(slot);
        Some(self.keys[root].clone())
    }

    /// Number of keys mentioned so far.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key has been mentioned yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The current partition, one group per set; every mentioned key appears in exactly one group.
    pub fn classes(&mut self) -> Vec<Vec<K>> {
        let roots = (0..self.keys.len()).map(|slot| self.root(slot)).collect_vec();

        let mut groups: HashMap<usize, Vec<K>> = HashMap::new();
        for (slot, root) in roots.into_iter().enumerate() {
            groups.entry(root).or_default().push(self.keys[slot].clone());
        }

        groups.into_values().collect_vec()
    }
}
