//! Nearest-node lookups.
//!
//! Two R-tree indexes back the network model:
//!
//! - [`PlanarIndex`] over projected node positions.  Serves the
//!   observation-radius query and the non-metric geocoding fallback.
//! - [`GeoIndex`] over drive-node latitude/longitude, built only when the
//!   topology provider supplied geographic positions.  Reports haversine
//!   metres.
//!
//! An external [`Geocoder`] can be injected into the model and takes
//! precedence over both.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use evac_core::{GeoPoint, NodeId, Point2};

/// Result of snapping a coordinate to the network.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snap {
    pub node:      NodeId,
    pub distance:  f64,
    /// `true` when `distance` is in metres.  Fallback snaps compare
    /// geographic degrees against projected metres, so their distance is
    /// only useful for ranking.
    pub is_metric: bool,
}

/// External geocoding collaborator.
pub trait Geocoder: Send + Sync {
    /// The drive-network node nearest to `point`, with its distance.
    fn nearest_node_with_distance(&self, point: GeoPoint) -> Option<Snap>;
}

// ── R-tree entries ────────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d0 = self.point[0] - point[0];
        let d1 = self.point[1] - point[1];
        d0 * d0 + d1 * d1
    }
}

// ── PlanarIndex ───────────────────────────────────────────────────────────────

/// R-tree over projected `[x, y]` node positions.
pub(crate) struct PlanarIndex(RTree<NodeEntry>);

impl PlanarIndex {
    pub(crate) fn new(positions: &[Point2]) -> Self {
        let entries = positions
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry { point: [p.x, p.y], id: NodeId(i as u32) })
            .collect();
        PlanarIndex(RTree::bulk_load(entries))
    }

    /// All nodes within `radius` (inclusive) of `center`, ascending by id.
    pub(crate) fn within(&self, center: Point2, radius: f64) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .0
            .locate_within_distance([center.x, center.y], radius * radius)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Nearest node accepted by `accept`, with its Euclidean distance.
    pub(crate) fn nearest_where(
        &self,
        point: [f64; 2],
        accept: impl Fn(NodeId) -> bool,
    ) -> Option<(NodeId, f64)> {
        self.0
            .nearest_neighbor_iter_with_distance_2(&point)
            .find(|(e, _)| accept(e.id))
            .map(|(e, d2)| (e.id, d2.sqrt()))
    }
}

// ── GeoIndex ──────────────────────────────────────────────────────────────────

/// Candidates re-ranked by haversine after the R-tree query.
const GEO_CANDIDATES: usize = 8;

/// R-tree over drive nodes in a local equirectangular frame: `[lat, lon *
/// cos(ref_lat)]`, with `ref_lat` the mean indexed latitude.  Reports
/// haversine metres.
pub(crate) struct GeoIndex {
    tree:      RTree<NodeEntry>,
    coords:    Vec<GeoPoint>,
    lon_scale: f64,
}

impl GeoIndex {
    /// Index `geo[i]` for every node `i` accepted by `include`.
    pub(crate) fn new(geo: &[GeoPoint], include: impl Fn(NodeId) -> bool) -> Self {
        let members: Vec<(NodeId, GeoPoint)> = geo
            .iter()
            .enumerate()
            .map(|(i, g)| (NodeId(i as u32), *g))
            .filter(|(id, _)| include(*id))
            .collect();
        let ref_lat = if members.is_empty() {
            0.0
        } else {
            members.iter().map(|(_, g)| g.lat).sum::<f64>() / members.len() as f64
        };
        let lon_scale = ref_lat.to_radians().cos();
        let entries = members
            .into_iter()
            .map(|(id, g)| NodeEntry { point: [g.lat, g.lon * lon_scale], id })
            .collect();
        GeoIndex { tree: RTree::bulk_load(entries), coords: geo.to_vec(), lon_scale }
    }
}

impl Geocoder for GeoIndex {
    /// The closest few nodes in the scaled frame, re-ranked by haversine.
    fn nearest_node_with_distance(&self, point: GeoPoint) -> Option<Snap> {
        self.tree
            .nearest_neighbor_iter(&[point.lat, point.lon * self.lon_scale])
            .take(GEO_CANDIDATES)
            .map(|e| (e.id, point.distance_m(self.coords[e.id.index()])))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(node, distance)| Snap { node, distance, is_metric: true })
    }
}
