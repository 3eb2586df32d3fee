//! Shuttle route construction.
//!
//! Feed geometry is noisy: polylines wander outside campus, carry far more
//! points than the network has nodes, and may snap to nodes that are not
//! adjacent.  [`RouteBuilder`] filters, downsamples, snaps, and
//! deduplicates it into a node sequence a shuttle can follow, and falls
//! back to a synthetic loop when nothing usable remains.

use evac_core::{FeedConfig, GeoPoint, NodeId, SimRng, TravelMode};
use evac_network::{NetworkModel, Router};

use crate::{FeedData, FeedStop};

/// Where a route's node sequence came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteOrigin {
    Feed,
    Synthetic,
}

/// A feed stop record snapped to the network.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitStop {
    pub position: GeoPoint,
    pub name:     String,
    pub node:     NodeId,
}

/// A cyclic route over the drive graph plus its stop nodes.  Immutable once
/// built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShuttleRoute {
    pub nodes:        Vec<NodeId>,
    /// Nodes at which a shuttle dwells.  Need not lie on `nodes`.
    pub stops:        Vec<NodeId>,
    /// The feed stop records behind `stops` (empty for synthetic routes).
    pub stop_records: Vec<TransitStop>,
    pub origin:       RouteOrigin,
}

impl ShuttleRoute {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

// ── RouteBuilder ──────────────────────────────────────────────────────────────

/// Builds [`ShuttleRoute`]s from feed data and the network.
pub struct RouteBuilder<'a> {
    config: &'a FeedConfig,
}

impl<'a> RouteBuilder<'a> {
    pub fn new(config: &'a FeedConfig) -> Self {
        Self { config }
    }

    /// The first feed polyline that yields at least two nodes, with the
    /// snapped feed stops; otherwise a synthetic loop.
    pub fn build(
        &self,
        feed:   &FeedData,
        net:    &NetworkModel,
        router: &dyn Router,
        rng:    &mut SimRng,
    ) -> ShuttleRoute {
        let route = match self.route_from_feed(&feed.polylines, net) {
            Some(nodes) => {
                let stop_records = self.snap_stops(&feed.stops, net);
                ShuttleRoute {
                    nodes,
                    stops: stop_records.iter().map(|s| s.node).collect(),
                    stop_records,
                    origin: RouteOrigin::Feed,
                }
            }
            None => self.synthetic(net, router, rng),
        };
        tracing::info!(
            nodes = route.nodes.len(),
            stops = route.stops.len(),
            "shuttle route built ({:?})",
            route.origin
        );
        route
    }

    /// Snap `point` to the nearest drive node.  Metric snaps farther than
    /// `snap_max_m` are rejected; non-metric ones never are.
    fn snap(&self, point: GeoPoint, net: &NetworkModel) -> Option<NodeId> {
        let snap = net.nearest_node_with_distance(point)?;
        if snap.is_metric && snap.distance > self.config.snap_max_m {
            return None;
        }
        Some(snap.node)
    }

    fn in_radius(&self, point: GeoPoint) -> bool {
        point.within_radius(self.config.center, self.config.radius_m)
    }

    /// Radius filter, stride downsample, snap, and drop consecutive
    /// repeats.  `None` if no polyline reaches two nodes.
    pub fn route_from_feed(
        &self,
        polylines: &[Vec<GeoPoint>],
        net:       &NetworkModel,
    ) -> Option<Vec<NodeId>> {
        let stride = self.config.sample_stride.max(1);
        polylines.iter().find_map(|line| {
            let mut nodes: Vec<NodeId> = line
                .iter()
                .copied()
                .filter(|&p| self.in_radius(p))
                .step_by(stride)
                .filter_map(|p| self.snap(p, net))
                .collect();
            nodes.dedup();
            (nodes.len() >= 2).then_some(nodes)
        })
    }

    /// In-radius feed stops that snap within the threshold.
    pub fn snap_stops(&self, stops: &[FeedStop], net: &NetworkModel) -> Vec<TransitStop> {
        stops
            .iter()
            .filter(|s| self.in_radius(s.position))
            .filter_map(|s| {
                let node = self.snap(s.position, net)?;
                Some(TransitStop { position: s.position, name: s.name.clone(), node })
            })
            .collect()
    }

    /// A loop over `synthetic_stops` random drive nodes, stitched with
    /// shortest paths by length.  Unreachable consecutive pairs are
    /// skipped.  Empty if the drive graph has fewer than two nodes.
    pub fn synthetic(&self, net: &NetworkModel, router: &dyn Router, rng: &mut SimRng) -> ShuttleRoute {
        let drive: Vec<NodeId> = net.graph(TravelMode::Drive).nodes().collect();
        let mut route = ShuttleRoute {
            nodes:        Vec::new(),
            stops:        Vec::new(),
            stop_records: Vec::new(),
            origin:       RouteOrigin::Synthetic,
        };
        if drive.len() < 2 {
            tracing::warn!("drive graph too small for a synthetic shuttle loop");
            return route;
        }

        let stops = rng.sample(&drive, self.config.synthetic_stops);
        let n = stops.len();
        for i in 0..n {
            let (a, b) = (stops[i], stops[(i + 1) % n]);
            match net.shortest_route(router, TravelMode::Drive, a, b) {
                Ok(path) => {
                    let skip = usize::from(route.nodes.last() == path.nodes.first());
                    route.nodes.extend(path.nodes.into_iter().skip(skip));
                }
                Err(e) => tracing::debug!("synthetic loop skips {a} -> {b}: {e}"),
            }
        }
        // The closing leg ends where the loop began.
        if route.nodes.len() > 1 && route.nodes.first() == route.nodes.last() {
            route.nodes.pop();
        }
        route.stops = stops;
        route
    }
}
