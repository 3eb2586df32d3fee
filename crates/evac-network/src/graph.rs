//! Per-mode directed graph representation and builder.
//!
//! # Data layout
//!
//! Each mode graph uses **Compressed Sparse Row (CSR)** format for
//! outgoing edges.  Given a `NodeId n`, its outgoing edges occupy:
//!
//! ```text
//! EdgeId( node_out_start[n] .. node_out_start[n+1] )
//! ```
//!
//! Edge arrays are sorted by `(source, target)` and indexed by `EdgeId`,
//! so iterating a node's outgoing edges is a contiguous scan and finding
//! the edge `u → v` is a binary search within that slice.
//!
//! The node id space is shared by every mode graph of a network; `members`
//! records which of those nodes belong to this particular graph.

use evac_core::{EdgeId, NodeId};

// ── ModeGraph ─────────────────────────────────────────────────────────────────

/// Directed graph for one travel mode.
///
/// Edge length and slope are fixed at construction.  Do not construct
/// directly; use [`ModeGraphBuilder`].
#[derive(Clone, Debug)]
pub struct ModeGraph {
    /// `true` for nodes that belong to this graph.  Length = network node count.
    pub members: Vec<bool>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each edge.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres (always positive).
    pub edge_length_m: Vec<f64>,

    /// Non-negative slope of each edge.
    pub edge_slope: Vec<f64>,
}

impl ModeGraph {
    /// A graph with `node_count` slots and no members or edges.
    pub fn empty(node_count: usize) -> Self {
        ModeGraphBuilder::new(node_count).build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    /// Size of the shared node id space (not the member count).
    pub fn node_count(&self) -> usize {
        self.members.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.iter().filter(|&&m| m).count()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.get(node.index()).copied().unwrap_or(false)
    }

    /// Member nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| NodeId(i as u32))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    /// Empty for nodes outside the id space.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let (start, end) = self.out_range(node);
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let (start, end) = self.out_range(node);
        end - start
    }

    /// The edge `from → to`, if present.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let (start, end) = self.out_range(from);
        self.edge_to[start..end]
            .binary_search(&to)
            .ok()
            .map(|offset| EdgeId((start + offset) as u32))
    }

    #[inline]
    pub fn length(&self, edge: EdgeId) -> f64 {
        self.edge_length_m[edge.index()]
    }

    #[inline]
    pub fn slope(&self, edge: EdgeId) -> f64 {
        self.edge_slope[edge.index()]
    }

    #[inline]
    pub fn endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        (self.edge_from[edge.index()], self.edge_to[edge.index()])
    }

    #[inline]
    fn out_range(&self, node: NodeId) -> (usize, usize) {
        if node.index() >= self.node_count() {
            return (0, 0);
        }
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start, end)
    }
}

// ── ModeGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`ModeGraph`] incrementally, then call [`build`](Self::build).
///
/// Edges may be added in any order.  `build()` sorts them by source and
/// target, drops parallel duplicates (keeping the shortest), and constructs
/// the CSR arrays.
///
/// # Example
///
/// ```
/// use evac_core::NodeId;
/// use evac_network::ModeGraphBuilder;
///
/// let mut b = ModeGraphBuilder::new(2);
/// b.add_road(NodeId(0), NodeId(1), 120.0, 0.05);
/// let g = b.build();
/// assert_eq!(g.edge_count(), 2); // bidirectional
/// assert!(g.find_edge(NodeId(1), NodeId(0)).is_some());
/// ```
pub struct ModeGraphBuilder {
    members:   Vec<bool>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
    slope:    f64,
}

impl ModeGraphBuilder {
    /// A builder over a node id space of `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self { members: vec![false; node_count], raw_edges: Vec::new() }
    }

    /// Mark `node` as a member even if it has no edges.
    pub fn add_node(&mut self, node: NodeId) {
        self.members[node.index()] = true;
    }

    /// Add a **directed** edge; both endpoints become members.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64, slope: f64) {
        self.members[from.index()] = true;
        self.members[to.index()] = true;
        self.raw_edges.push(RawEdge { from, to, length_m, slope });
    }

    /// Convenience: add edges in **both directions**.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64, slope: f64) {
        self.add_directed_edge(a, b, length_m, slope);
        self.add_directed_edge(b, a, length_m, slope);
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Consume the builder and produce a [`ModeGraph`].
    pub fn build(self) -> ModeGraph {
        let node_count = self.members.len();

        let mut raw = self.raw_edges;
        raw.sort_by(|a, b| {
            (a.from, a.to)
                .cmp(&(b.from, b.to))
                .then(a.length_m.total_cmp(&b.length_m))
        });
        // After sorting, the first of each (from, to) run is the shortest.
        raw.dedup_by(|later, first| later.from == first.from && later.to == first.to);

        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.length_m).collect();
        let edge_slope:    Vec<f64>    = raw.iter().map(|e| e.slope).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, raw.len());

        ModeGraph {
            members: self.members,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_slope,
        }
    }
}
