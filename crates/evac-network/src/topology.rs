//! Topology sources: the provider seam and the synthetic grid fallback.
//!
//! A [`GraphProvider`] supplies node positions plus per-mode edge lists.
//! [`Topology::from_provided`] validates that data, reduces each mode to
//! its largest weakly connected component, and builds the CSR graphs.
//! When no provider is configured, or it fails, the network model uses
//! [`synthetic_grid`] instead.

use evac_core::{GeoPoint, GridConfig, ModeTable, NodeId, Point2, TravelMode};

use crate::graph::{ModeGraph, ModeGraphBuilder};
use crate::{NetworkError, NetworkResult};

// ── Provided data ─────────────────────────────────────────────────────────────

/// One node as delivered by a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvidedNode {
    /// Projected planar position in metres.
    pub pos: Point2,
    /// Geographic position, when the provider knows it.  Enables metric
    /// geocoding.
    pub geo: Option<GeoPoint>,
}

/// One directed edge as delivered by a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvidedEdge {
    pub from:     NodeId,
    pub to:       NodeId,
    pub length_m: f64,
    /// `None` derives the slope proxy from the endpoint positions.
    pub slope:    Option<f64>,
}

/// The nodes and edges of one travel mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModeTopology {
    /// Member nodes; endpoints of `edges` are added implicitly.
    pub nodes: Vec<NodeId>,
    pub edges: Vec<ProvidedEdge>,
}

/// Everything a provider delivers.  `NodeId(i)` refers to `nodes[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProvidedNetwork {
    pub nodes: Vec<ProvidedNode>,
    pub modes: ModeTable<ModeTopology>,
}

/// External source of path-network topology.
pub trait GraphProvider {
    fn provide(&self) -> NetworkResult<ProvidedNetwork>;
}

/// A provider that hands out a pre-built network.  Useful for scenarios and
/// tests that need a hand-crafted topology.
#[derive(Clone, Debug)]
pub struct StaticGraphProvider(pub ProvidedNetwork);

impl GraphProvider for StaticGraphProvider {
    fn provide(&self) -> NetworkResult<ProvidedNetwork> {
        Ok(self.0.clone())
    }
}

// ── Synthetic grid ────────────────────────────────────────────────────────────

/// A `size × size` bidirectional grid shared by both modes.
///
/// Node `(i, j)` has id `i * size + j` and position
/// `(i * spacing, j * spacing)`; every edge has length `spacing` and the
/// configured slope.
pub fn synthetic_grid(cfg: &GridConfig) -> ProvidedNetwork {
    let size = cfg.size;
    let id = |i: usize, j: usize| NodeId((i * size + j) as u32);

    let nodes: Vec<ProvidedNode> = (0..size)
        .flat_map(|i| (0..size).map(move |j| (i, j)))
        .map(|(i, j)| ProvidedNode {
            pos: Point2::new(i as f64 * cfg.spacing_m, j as f64 * cfg.spacing_m),
            geo: None,
        })
        .collect();

    let mut edges = Vec::with_capacity(4 * size * size);
    let mut road = |a: NodeId, b: NodeId| {
        for (from, to) in [(a, b), (b, a)] {
            edges.push(ProvidedEdge { from, to, length_m: cfg.spacing_m, slope: Some(cfg.slope) });
        }
    };
    for i in 0..size {
        for j in 0..size {
            if i + 1 < size {
                road(id(i, j), id(i + 1, j));
            }
            if j + 1 < size {
                road(id(i, j), id(i, j + 1));
            }
        }
    }

    let all: Vec<NodeId> = (0..nodes.len()).map(|i| NodeId(i as u32)).collect();
    let walk = ModeTopology { nodes: all.clone(), edges: edges.clone() };
    let drive = ModeTopology { nodes: all, edges };
    ProvidedNetwork { nodes, modes: ModeTable::new(walk, drive) }
}

// ── Topology ──────────────────────────────────────────────────────────────────

/// Validated, component-reduced topology ready for hazard initialisation.
#[derive(Clone, Debug)]
pub struct Topology {
    pub positions: Vec<Point2>,
    /// Present only when every node has a geographic position.
    pub geo:       Option<Vec<GeoPoint>>,
    pub graphs:    ModeTable<ModeGraph>,
}

impl Topology {
    /// Validate provider output and build per-mode graphs.
    ///
    /// # Errors
    ///
    /// [`NetworkError::Provider`] for an empty network, edges referencing
    /// unknown nodes, non-positive lengths, or negative slopes.
    pub fn from_provided(provided: ProvidedNetwork) -> NetworkResult<Topology> {
        let node_count = provided.nodes.len();
        if node_count == 0 {
            return Err(NetworkError::Provider("provider returned no nodes".into()));
        }

        let positions: Vec<Point2> = provided.nodes.iter().map(|n| n.pos).collect();
        let geo: Option<Vec<GeoPoint>> = provided.nodes.iter().map(|n| n.geo).collect();

        let mut graphs = ModeTable::new(ModeGraph::empty(0), ModeGraph::empty(0));
        for mode in TravelMode::ALL {
            graphs[mode] = build_mode(mode, &provided.modes[mode], &positions)?;
        }
        Ok(Topology { positions, geo, graphs })
    }
}

fn build_mode(mode: TravelMode, topo: &ModeTopology, positions: &[Point2]) -> NetworkResult<ModeGraph> {
    let node_count = positions.len();
    let known = |n: NodeId| n.index() < node_count;

    for &n in &topo.nodes {
        if !known(n) {
            return Err(NetworkError::Provider(format!("{mode} graph references unknown {n}")));
        }
    }
    for e in &topo.edges {
        if !known(e.from) || !known(e.to) {
            return Err(NetworkError::Provider(format!(
                "{mode} edge {} -> {} references an unknown node", e.from, e.to
            )));
        }
        if !(e.length_m > 0.0 && e.length_m.is_finite()) {
            return Err(NetworkError::Provider(format!(
                "{mode} edge {} -> {} has non-positive length {}", e.from, e.to, e.length_m
            )));
        }
        if e.slope.is_some_and(|s| !(s >= 0.0 && s.is_finite())) {
            return Err(NetworkError::Provider(format!(
                "{mode} edge {} -> {} has a negative slope", e.from, e.to
            )));
        }
    }

    let keep = largest_component(node_count, topo);

    let mut b = ModeGraphBuilder::new(node_count);
    for &n in &topo.nodes {
        if keep[n.index()] {
            b.add_node(n);
        }
    }
    for e in &topo.edges {
        if keep[e.from.index()] && keep[e.to.index()] {
            let slope = e
                .slope
                .unwrap_or_else(|| positions[e.from.index()].slope_to(positions[e.to.index()]));
            b.add_directed_edge(e.from, e.to, e.length_m, slope);
        }
    }
    Ok(b.build())
}

/// Membership mask of the largest weakly connected component.
///
/// Ties go to the component containing the lowest node id.
fn largest_component(node_count: usize, topo: &ModeTopology) -> Vec<bool> {
    let mut parent: Vec<usize> = (0..node_count).collect();
    let mut member = vec![false; node_count];

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for &n in &topo.nodes {
        member[n.index()] = true;
    }
    for e in &topo.edges {
        member[e.from.index()] = true;
        member[e.to.index()] = true;
        let a = find(&mut parent, e.from.index());
        let b = find(&mut parent, e.to.index());
        if a != b {
            parent[a.max(b)] = a.min(b);
        }
    }

    let mut size = vec![0usize; node_count];
    let mut best: Option<usize> = None;
    for i in 0..node_count {
        if member[i] {
            let root = find(&mut parent, i);
            size[root] += 1;
        }
    }
    for i in 0..node_count {
        if member[i] && find(&mut parent, i) == i && best.is_none_or(|b| size[i] > size[b]) {
            best = Some(i);
        }
    }

    match best {
        None => member,
        Some(root) => (0..node_count)
            .map(|i| member[i] && find(&mut parent, i) == root)
            .collect(),
    }
}
