//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Agents plan through the [`Router`] trait so a different search (A*,
//! contraction hierarchies) can be swapped in without touching the agent
//! state machine.  Edge weights come from the caller as a closure; an edge
//! for which the closure returns `None` is treated as absent.  This is how
//! agents exclude edges they believe are blocked without copying the graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use evac_core::{EdgeId, NodeId};

use crate::graph::ModeGraph;
use crate::{NetworkError, NetworkResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the node sequence from source to
/// destination (both inclusive) and its total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes:      Vec<NodeId>,
    pub total_cost: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() < 2
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable least-cost search.
///
/// Implementations must be `Send + Sync` so agents can plan concurrently
/// under the `parallel` feature of `evac-sim`.
pub trait Router: Send + Sync {
    /// Least-cost route from `from` to `to` over `graph`.
    ///
    /// `from == to` yields a single-node route.  Returns
    /// [`NetworkError::NoRoute`] when `to` is unreachable and
    /// [`NetworkError::NodeNotFound`] when either endpoint is not a member.
    fn route(
        &self,
        graph:  &ModeGraph,
        from:   NodeId,
        to:     NodeId,
        weight: &dyn Fn(EdgeId) -> Option<f64>,
    ) -> NetworkResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over a CSR mode graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        graph:  &ModeGraph,
        from:   NodeId,
        to:     NodeId,
        weight: &dyn Fn(EdgeId) -> Option<f64>,
    ) -> NetworkResult<Route> {
        dijkstra(graph, from, to, weight)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Min-heap entry.  Ordering is reversed so `BinaryHeap` pops the lowest
/// cost first; ties break on `NodeId` for deterministic results.
#[derive(PartialEq)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(
    graph:  &ModeGraph,
    from:   NodeId,
    to:     NodeId,
    weight: &dyn Fn(EdgeId) -> Option<f64>,
) -> NetworkResult<Route> {
    for n in [from, to] {
        if !graph.contains(n) {
            return Err(NetworkError::NodeNotFound(n));
        }
    }
    if from == to {
        return Ok(Route { nodes: vec![from], total_cost: 0.0 });
    }

    let n = graph.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(Frontier { cost: 0.0, node: from });

    while let Some(Frontier { cost, node }) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, cost));
        }
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let Some(w) = weight(edge) else { continue };
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + w;

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Frontier { cost: new_cost, node: neighbor });
            }
        }
    }

    Err(NetworkError::NoRoute { from, to })
}

fn reconstruct(
    graph:      &ModeGraph,
    prev_edge:  &[EdgeId],
    from:       NodeId,
    to:         NodeId,
    total_cost: f64,
) -> Route {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        cur = graph.edge_from[e.index()];
        nodes.push(cur);
    }
    nodes.reverse();
    Route { nodes, total_cost }
}
