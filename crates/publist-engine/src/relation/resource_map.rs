//! Adjacency map over resource ids.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use petgraph::graphmap::DiGraphMap;
use publist_core::types::ResourceId;

/// Maps a resource to the set of resources it leads to.
///
/// Depending on the stage this holds direct relations, reachability or the
/// final "publish together with" sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    entries: BTreeMap<ResourceId, BTreeSet<ResourceId>>,
}

impl ResourceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the values of a key, returning the previous ones.
    pub fn insert(
        &mut self,
        key: ResourceId,
        values: BTreeSet<ResourceId>,
    ) -> Option<BTreeSet<ResourceId>> {
        self.entries.insert(key, values)
    }

    /// Returns the values of a key.
    pub fn get(&self, key: &ResourceId) -> Option<&BTreeSet<ResourceId>> {
        self.entries.get(key)
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &ResourceId) -> Option<BTreeSet<ResourceId>> {
        self.entries.remove(key)
    }

    /// Returns whether a key is present.
    pub fn contains_key(&self, key: &ResourceId) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over the keys in id order.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceId> {
        self.entries.keys()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, ResourceId, BTreeSet<ResourceId>> {
        self.entries.iter()
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the total number of key/value pairs.
    pub fn edge_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Returns the union of all value sets.
    pub fn all_values(&self) -> BTreeSet<ResourceId> {
        self.entries.values().flatten().copied().collect()
    }

    /// Returns every id that occurs as a key or a value.
    pub fn all_ids(&self) -> BTreeSet<ResourceId> {
        let mut ids = self.all_values();
        ids.extend(self.entries.keys().copied());
        ids
    }

    /// Builds a directed graph with one edge per key/value pair.
    ///
    /// Self loops are skipped; keys without values become isolated nodes.
    pub fn to_graph(&self) -> DiGraphMap<ResourceId, ()> {
        let mut graph = DiGraphMap::with_capacity(self.len(), self.edge_count());
        for (key, values) in &self.entries {
            graph.add_node(*key);
            for value in values.iter().filter(|value| *value != key) {
                graph.add_edge(*key, *value, ());
            }
        }
        graph
    }
}

impl Extend<(ResourceId, BTreeSet<ResourceId>)> for ResourceMap {
    fn extend<I: IntoIterator<Item = (ResourceId, BTreeSet<ResourceId>)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<(ResourceId, BTreeSet<ResourceId>)> for ResourceMap {
    fn from_iter<I: IntoIterator<Item = (ResourceId, BTreeSet<ResourceId>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResourceMap {
    type IntoIter = btree_map::IntoIter<ResourceId, BTreeSet<ResourceId>>;
    type Item = (ResourceId, BTreeSet<ResourceId>);

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
