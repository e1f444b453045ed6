//! Street network representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges use **Compressed Sparse Row (CSR)** format: the outgoing
//! edges of node `n` are the `EdgeId`s `node_out_start[n] .. node_out_start[n+1]`.
//! A second CSR (`node_in_start` + `in_edges`) lists incoming edges so that
//! backward searches (distances *to* a target, backward reachability
//! frontiers) are contiguous scans as well.
//!
//! The graph has no parallel edges: adding `(u, v)` twice keeps the last
//! attributes.  At build time it is restricted to its largest weakly
//! connected component; the remaining fragments are discarded.

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use rq_core::{EdgeId, NodeId, TrafficState};

use crate::street::{StreetId, StreetIndex};
use crate::traffic::{SensorReading, TrafficClassifier};
use crate::{NetworkError, NetworkResult};

/// A node with more than this many incident edges is a bottleneck.
pub const BOTTLENECK_CONNECTIVITY: u32 = 3;

// ── StreetNetwork ─────────────────────────────────────────────────────────────

/// Directed street graph with per-edge traffic state.
///
/// Only traffic states are mutable after [`StreetNetworkBuilder::build`];
/// topology, lengths, and speeds are fixed.
#[derive(Clone, Debug)]
pub struct StreetNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    node_labels: Vec<String>,
    label_index: FxHashMap<String, NodeId>,

    /// In-degree + out-degree, indexed by `NodeId`.
    pub connectivity: Vec<u32>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,
    /// Length = `node_count + 1`.
    pub node_in_start: Vec<u32>,
    /// Edge ids grouped by destination node.
    pub in_edges: Vec<EdgeId>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    pub edge_street: Vec<StreetId>,
    /// Length in metres.
    pub edge_length: Vec<f64>,
    /// Speed limit in metres per second.
    pub edge_speed: Vec<f64>,
    pub edge_traffic: Vec<TrafficState>,
    edge_external_id: Vec<String>,

    edge_lookup: FxHashMap<(NodeId, NodeId), EdgeId>,
    external_index: FxHashMap<String, Vec<EdgeId>>,
    streets: StreetIndex,
}

impl StreetNetwork {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_labels.is_empty()
    }

    pub fn streets(&self) -> &StreetIndex {
        &self.streets
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count() as u32).map(NodeId)
    }

    // ── Node attributes ───────────────────────────────────────────────────

    /// Original label of a node as it appeared in the source data.
    pub fn label(&self, node: NodeId) -> &str {
        &self.node_labels[node.index()]
    }

    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.label_index.get(label).copied()
    }

    #[inline]
    pub fn connectivity(&self, node: NodeId) -> u32 {
        self.connectivity[node.index()]
    }

    #[inline]
    pub fn is_bottleneck(&self, node: NodeId) -> bool {
        self.connectivity(node) > BOTTLENECK_CONNECTIVITY
    }

    pub fn bottleneck_count(&self) -> usize {
        self.connectivity.iter().filter(|&&c| c > BOTTLENECK_CONNECTIVITY).count()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_in_start[node.index()] as usize;
        let end   = self.node_in_start[node.index() + 1] as usize;
        self.in_edges[start..end].iter().copied()
    }

    #[inline]
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node).map(|e| self.edge_to[e.index()])
    }

    #[inline]
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges(node).map(|e| self.edge_from[e.index()])
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        (self.node_out_start[node.index() + 1] - self.node_out_start[node.index()]) as usize
    }

    /// The directed edge `from → to`, if any.
    #[inline]
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.edge_lookup.get(&(from, to)).copied()
    }

    // ── Edge attributes ───────────────────────────────────────────────────

    pub fn street_name(&self, edge: EdgeId) -> &str {
        self.streets.name(self.edge_street[edge.index()])
    }

    pub fn external_id(&self, edge: EdgeId) -> &str {
        &self.edge_external_id[edge.index()]
    }

    #[inline]
    pub fn traffic(&self, edge: EdgeId) -> TrafficState {
        self.edge_traffic[edge.index()]
    }

    /// Estimated traversal time in seconds under the current traffic state:
    /// `length / speed × (1 + 0.25 × ordinal)`.
    #[inline]
    pub fn travel_time(&self, edge: EdgeId) -> f64 {
        let i = edge.index();
        self.edge_length[i] / self.edge_speed[i] * self.edge_traffic[i].time_multiplier()
    }

    // ── Traffic updates ───────────────────────────────────────────────────

    pub fn set_traffic(&mut self, edge: EdgeId, state: TrafficState) {
        self.edge_traffic[edge.index()] = state;
    }

    /// Set the traffic state of every edge carrying `external_id`.
    ///
    /// Returns the number of graph edges touched (0 for unknown ids).
    pub fn update_traffic(&mut self, external_id: &str, state: TrafficState) -> usize {
        let Some(edges) = self.external_index.get(external_id) else {
            return 0;
        };
        for &e in edges {
            self.edge_traffic[e.index()] = state;
        }
        edges.len()
    }

    /// Classify and apply a batch of sensor readings in one pass.
    ///
    /// Readings for unknown edge ids are skipped.  Returns the number of
    /// graph edges touched.
    pub fn apply_readings(&mut self, readings: &[SensorReading], classifier: &TrafficClassifier) -> usize {
        let mut touched = 0;
        for reading in readings {
            let state = classifier.classify(reading);
            touched += self.update_traffic(&reading.edge_id, state);
        }
        debug!(readings = readings.len(), touched, "applied traffic readings");
        touched
    }
}

// ── StreetNetworkBuilder ──────────────────────────────────────────────────────

/// Construct a [`StreetNetwork`] incrementally, then call [`build`](Self::build).
///
/// Nodes are created on first mention of their label.
///
/// # Example
///
/// ```
/// use rq_network::StreetNetworkBuilder;
///
/// let mut b = StreetNetworkBuilder::new();
/// b.add_edge("e1", "A", "B", "Main St", 120.0, 13.89).unwrap();
/// b.add_edge("e2", "B", "C", "Main St", 80.0, 13.89).unwrap();
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 3);
/// assert_eq!(net.streets().len(), 1);
/// ```
#[derive(Default)]
pub struct StreetNetworkBuilder {
    labels:      Vec<String>,
    label_index: FxHashMap<String, NodeId>,
    raw_edges:   Vec<RawEdge>,
}

struct RawEdge {
    external_id: String,
    from:        NodeId,
    to:          NodeId,
    street:      String,
    length:      f64,
    speed:       f64,
}

impl StreetNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `label`, returning the existing id if it was seen before.
    pub fn node(&mut self, label: &str) -> NodeId {
        if let Some(&id) = self.label_index.get(label) {
            return id;
        }
        let id = NodeId(self.labels.len() as u32);
        self.labels.push(label.to_owned());
        self.label_index.insert(label.to_owned(), id);
        id
    }

    /// Add a **directed** street segment.
    ///
    /// - `external_id`: identifier used by the traffic feed; several graph
    ///   edges may share one.
    /// - `length`: metres; `speed`: metres per second.  Both must be
    ///   positive and finite.
    pub fn add_edge(
        &mut self,
        external_id: &str,
        from:        &str,
        to:          &str,
        street:      &str,
        length:      f64,
        speed:       f64,
    ) -> NetworkResult<()> {
        check_positive(external_id, "length", length)?;
        check_positive(external_id, "speed", speed)?;
        let from = self.node(from);
        let to   = self.node(to);
        self.raw_edges.push(RawEdge {
            external_id: external_id.to_owned(),
            from,
            to,
            street: street.to_owned(),
            length,
            speed,
        });
        Ok(())
    }

    /// Convenience: add the segment in **both directions** under one
    /// external id.
    pub fn add_two_way(
        &mut self,
        external_id: &str,
        a:           &str,
        b:           &str,
        street:      &str,
        length:      f64,
        speed:       f64,
    ) -> NetworkResult<()> {
        self.add_edge(external_id, a, b, street, length, speed)?;
        self.add_edge(external_id, b, a, street, length, speed)
    }

    pub fn node_count(&self) -> usize { self.labels.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`StreetNetwork`] restricted to the
    /// largest weakly connected component.
    ///
    /// Fails with [`NetworkError::Empty`] if no edges were added.
    pub fn build(self) -> NetworkResult<StreetNetwork> {
        if self.raw_edges.is_empty() {
            return Err(NetworkError::Empty);
        }

        // ── Collapse parallel edges (last attributes win, first slot kept) ─
        let mut slot_of: FxHashMap<(NodeId, NodeId), usize> = FxHashMap::default();
        let mut unique: Vec<usize> = Vec::with_capacity(self.raw_edges.len());
        for (i, e) in self.raw_edges.iter().enumerate() {
            match slot_of.get(&(e.from, e.to)) {
                Some(&slot) => unique[slot] = i,
                None => {
                    slot_of.insert((e.from, e.to), unique.len());
                    unique.push(i);
                }
            }
        }

        // ── Largest weakly connected component ────────────────────────────
        let old_count = self.labels.len();
        let mut components = DisjointSet::new(old_count);
        for &i in &unique {
            let e = &self.raw_edges[i];
            components.union(e.from.index(), e.to.index());
        }
        let keep_root = components.largest_root();

        let mut remap = vec![NodeId::INVALID; old_count];
        let mut node_labels = Vec::new();
        for (old, label) in self.labels.into_iter().enumerate() {
            if components.find(old) == keep_root {
                remap[old] = NodeId(node_labels.len() as u32);
                node_labels.push(label);
            }
        }
        let node_count = node_labels.len();
        let pruned = old_count - node_count;
        let label_index: FxHashMap<String, NodeId> = node_labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), NodeId(i as u32)))
            .collect();

        // ── Street index (every surviving raw pair, in load order) ────────
        let mut streets = StreetIndex::new();
        for e in &self.raw_edges {
            let (from, to) = (remap[e.from.index()], remap[e.to.index()]);
            if from.is_valid() && to.is_valid() {
                let id = streets.intern(&e.street);
                streets.push_pair(id, from, to);
            }
        }

        // ── Surviving edges, sorted by source for CSR ─────────────────────
        let mut kept: Vec<&RawEdge> = unique
            .iter()
            .map(|&i| &self.raw_edges[i])
            .filter(|e| remap[e.from.index()].is_valid())
            .collect();
        kept.sort_by_key(|e| remap[e.from.index()]);
        let edge_count = kept.len();

        let edge_from: Vec<NodeId> = kept.iter().map(|e| remap[e.from.index()]).collect();
        let edge_to:   Vec<NodeId> = kept.iter().map(|e| remap[e.to.index()]).collect();
        let edge_street: Vec<StreetId> = kept
            .iter()
            .map(|e| streets.intern(&e.street))
            .collect();
        let edge_length: Vec<f64> = kept.iter().map(|e| e.length).collect();
        let edge_speed:  Vec<f64> = kept.iter().map(|e| e.speed).collect();
        let edge_external_id: Vec<String> = kept.iter().map(|e| e.external_id.clone()).collect();
        let edge_traffic = vec![TrafficState::Light; edge_count];

        // Out CSR row pointer.
        let mut node_out_start = vec![0u32; node_count + 1];
        for from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        // In CSR: count by destination, then scatter edge ids.
        let mut node_in_start = vec![0u32; node_count + 1];
        for to in &edge_to {
            node_in_start[to.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_in_start[i] += node_in_start[i - 1];
        }
        let mut cursor: Vec<u32> = node_in_start[..node_count].to_vec();
        let mut in_edges = vec![EdgeId::INVALID; edge_count];
        for (i, to) in edge_to.iter().enumerate() {
            let slot = &mut cursor[to.index()];
            in_edges[*slot as usize] = EdgeId(i as u32);
            *slot += 1;
        }

        let connectivity: Vec<u32> = (0..node_count)
            .map(|n| {
                (node_out_start[n + 1] - node_out_start[n]) + (node_in_start[n + 1] - node_in_start[n])
            })
            .collect();

        let mut edge_lookup = FxHashMap::default();
        let mut external_index: FxHashMap<String, Vec<EdgeId>> = FxHashMap::default();
        for i in 0..edge_count {
            let id = EdgeId(i as u32);
            edge_lookup.insert((edge_from[i], edge_to[i]), id);
            external_index.entry(edge_external_id[i].clone()).or_default().push(id);
        }

        let net = StreetNetwork {
            node_labels,
            label_index,
            connectivity,
            node_out_start,
            node_in_start,
            in_edges,
            edge_from,
            edge_to,
            edge_street,
            edge_length,
            edge_speed,
            edge_traffic,
            edge_external_id,
            edge_lookup,
            external_index,
            streets,
        };

        if pruned > 0 {
            debug!(pruned, "discarded nodes outside the largest weakly connected component");
        }
        info!(
            nodes = net.node_count(),
            edges = net.edge_count(),
            streets = net.streets.len(),
            bottlenecks = net.bottleneck_count(),
            "street network built"
        );
        Ok(net)
    }
}

fn check_positive(edge_id: &str, field: &'static str, value: f64) -> NetworkResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidAttribute { edge_id: edge_id.to_owned(), field, value })
    }
}

// ── Union-find for component pruning ──────────────────────────────────────────

struct DisjointSet {
    parent: Vec<usize>,
    size:   Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), size: vec![1; n] }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }

    /// Root of the largest set; ties go to the set containing the lowest
    /// element so the choice is stable across runs.
    fn largest_root(&mut self) -> usize {
        let mut best: Option<(usize, usize)> = None;
        for x in 0..self.parent.len() {
            let root = self.find(x);
            let size = self.size[root];
            if best.is_none_or(|(_, s)| size > s) {
                best = Some((root, size));
            }
        }
        best.map_or(0, |(root, _)| root)
    }
}
