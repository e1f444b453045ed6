//! Street name → node-pair index.
//!
//! A street is a named logical road backed by one or more directed edges.
//! The index keeps every `(from, to)` pair registered for a street in load
//! order (a multiset: the same pair may appear twice if the source data
//! lists it twice).

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use rq_core::NodeId;

/// Dense index of a street name inside a [`StreetIndex`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StreetId(pub u32);

impl StreetId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Street name → ordered `(from, to)` node pairs.
#[derive(Clone, Debug, Default)]
pub struct StreetIndex {
    names:   Vec<String>,
    by_name: FxHashMap<String, StreetId>,
    pairs:   Vec<Vec<(NodeId, NodeId)>>,
}

impl StreetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, registering it if unseen.
    pub fn intern(&mut self, name: &str) -> StreetId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = StreetId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.by_name.insert(name.to_owned(), id);
        self.pairs.push(Vec::new());
        id
    }

    /// Append a node pair to a street.
    pub fn push_pair(&mut self, street: StreetId, from: NodeId, to: NodeId) {
        self.pairs[street.index()].push((from, to));
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<StreetId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: StreetId) -> &str {
        &self.names[id.index()]
    }

    /// All street names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn pairs(&self, name: &str) -> Option<&[(NodeId, NodeId)]> {
        self.id(name).map(|id| self.pairs[id.index()].as_slice())
    }

    /// The first registered pair of a street (used for the start == end
    /// short-circuit).
    pub fn first_pair(&self, name: &str) -> Option<(NodeId, NodeId)> {
        self.pairs(name).and_then(|p| p.first().copied())
    }

    /// Every node touching the street, ordered by `NodeId` so iteration is
    /// deterministic.
    pub fn nodes(&self, name: &str) -> Option<BTreeSet<NodeId>> {
        self.pairs(name).map(|pairs| {
            pairs.iter().flat_map(|&(a, b)| [a, b]).collect()
        })
    }

    /// Up to `limit` street names that contain `query` or are contained in
    /// it, compared case-insensitively.  Used by callers to build "did you
    /// mean" hints after an unknown-street error.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.to_lowercase();
        self.names
            .iter()
            .filter(|name| {
                let hay = name.to_lowercase();
                hay.contains(&needle) || needle.contains(&hay)
            })
            .take(limit)
            .cloned()
            .collect()
    }
}
