//! Unit tests for evac-network.
//!
//! All tests use the synthetic grid or hand-crafted provider data, so none
//! needs network access or map files.

#[cfg(test)]
mod helpers {
    use evac_core::{EvacConfig, GridConfig, HazardConfig, ModeTable, NodeId, Point2, SimRng};

    use crate::{
        GraphProvider, ModeTopology, NetworkModel, ProvidedEdge, ProvidedNetwork, ProvidedNode,
        StaticGraphProvider,
    };

    /// Config for a hazard-free `size × size` grid with 10 m spacing.
    pub fn grid_config(size: usize) -> EvacConfig {
        EvacConfig {
            grid: GridConfig { size, spacing_m: 10.0, slope: 0.0 },
            hazards: HazardConfig {
                block_probability: 0.0,
                snow_min: 0.0,
                snow_max: 0.0,
                ..HazardConfig::default()
            },
            observation_error: ModeTable::new(0.0, 0.0),
            ..EvacConfig::default()
        }
    }

    pub fn grid_model(size: usize) -> NetworkModel {
        let cfg = grid_config(size);
        NetworkModel::build(None, &cfg, &mut SimRng::new(cfg.seed))
    }

    pub fn node(i: usize, j: usize, size: usize) -> NodeId {
        NodeId((i * size + j) as u32)
    }

    /// Five nodes on a line at x = 0, 10, 20, 100, 110.
    ///
    /// Walk: 0-1-2 and 3-4 as two components.  Drive: only 3-4.
    pub fn split_network() -> ProvidedNetwork {
        let xs = [0.0, 10.0, 20.0, 100.0, 110.0];
        let nodes = xs
            .iter()
            .map(|&x| ProvidedNode { pos: Point2::new(x, 0.0), geo: None })
            .collect();
        let road = |a: u32, b: u32, len: f64| {
            [
                ProvidedEdge { from: NodeId(a), to: NodeId(b), length_m: len, slope: None },
                ProvidedEdge { from: NodeId(b), to: NodeId(a), length_m: len, slope: None },
            ]
        };
        let walk = ModeTopology {
            nodes: vec![],
            edges: [road(0, 1, 10.0), road(1, 2, 10.0), road(3, 4, 10.0)].concat(),
        };
        let drive = ModeTopology { nodes: vec![], edges: road(3, 4, 10.0).to_vec() };
        ProvidedNetwork { nodes, modes: ModeTable::new(walk, drive) }
    }

    pub struct FailingProvider;

    impl GraphProvider for FailingProvider {
        fn provide(&self) -> crate::NetworkResult<ProvidedNetwork> {
            Err(crate::NetworkError::Provider("offline".into()))
        }
    }

    pub fn static_provider(net: ProvidedNetwork) -> StaticGraphProvider {
        StaticGraphProvider(net)
    }
}

// ── Graph & builder ───────────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use evac_core::NodeId;

    use crate::ModeGraphBuilder;

    #[test]
    fn empty_build() {
        let g = ModeGraphBuilder::new(3).build();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.member_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.out_edges(NodeId(1)).count(), 0);
    }

    #[test]
    fn csr_is_sorted_by_source() {
        let mut b = ModeGraphBuilder::new(3);
        b.add_directed_edge(NodeId(2), NodeId(0), 5.0, 0.0);
        b.add_directed_edge(NodeId(0), NodeId(2), 5.0, 0.0);
        b.add_directed_edge(NodeId(0), NodeId(1), 5.0, 0.0);
        let g = b.build();

        assert_eq!(g.out_degree(NodeId(0)), 2);
        assert_eq!(g.out_degree(NodeId(1)), 0);
        assert_eq!(g.out_degree(NodeId(2)), 1);
        for e in g.out_edges(NodeId(0)) {
            assert_eq!(g.edge_from[e.index()], NodeId(0));
        }
        let targets: Vec<_> = g.out_edges(NodeId(0)).map(|e| g.edge_to[e.index()]).collect();
        assert_eq!(targets, vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn parallel_edges_keep_shortest() {
        let mut b = ModeGraphBuilder::new(2);
        b.add_directed_edge(NodeId(0), NodeId(1), 30.0, 0.0);
        b.add_directed_edge(NodeId(0), NodeId(1), 10.0, 0.2);
        let g = b.build();
        assert_eq!(g.edge_count(), 1);
        let e = g.find_edge(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(g.length(e), 10.0);
        assert_eq!(g.slope(e), 0.2);
    }

    #[test]
    fn find_edge_is_directed() {
        let mut b = ModeGraphBuilder::new(2);
        b.add_directed_edge(NodeId(0), NodeId(1), 10.0, 0.0);
        let g = b.build();
        assert!(g.find_edge(NodeId(0), NodeId(1)).is_some());
        assert!(g.find_edge(NodeId(1), NodeId(0)).is_none());
        assert!(g.find_edge(NodeId(9), NodeId(0)).is_none());
    }

    #[test]
    fn membership_without_edges() {
        let mut b = ModeGraphBuilder::new(4);
        b.add_node(NodeId(3));
        let g = b.build();
        assert!(g.contains(NodeId(3)));
        assert!(!g.contains(NodeId(0)));
        assert!(!g.contains(NodeId(99)));
        assert_eq!(g.nodes().collect::<Vec<_>>(), vec![NodeId(3)]);
    }
}

// ── Topology ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod topology {
    use evac_core::{GridConfig, NodeId, Point2, TravelMode};

    use crate::topology::Topology;
    use crate::{NetworkError, ProvidedEdge, synthetic_grid};

    #[test]
    fn grid_shape() {
        let net = synthetic_grid(&GridConfig { size: 3, spacing_m: 50.0, slope: 0.1 });
        assert_eq!(net.nodes.len(), 9);
        // 2 * (3 * 2) undirected roads * 2 directions.
        assert_eq!(net.modes.walk.edges.len(), 24);
        assert_eq!(net.modes.walk, net.modes.drive);
        assert_eq!(net.nodes[5].pos, Point2::new(50.0, 100.0));
    }

    #[test]
    fn largest_component_kept() {
        let topo = Topology::from_provided(super::helpers::split_network()).unwrap();
        let walk = &topo.graphs[TravelMode::Walk];
        assert_eq!(walk.nodes().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(walk.edge_count(), 4);

        let drive = &topo.graphs[TravelMode::Drive];
        assert_eq!(drive.nodes().collect::<Vec<_>>(), vec![NodeId(3), NodeId(4)]);
    }

    #[test]
    fn slope_proxy_from_positions() {
        let mut net = super::helpers::split_network();
        // Lift node 1 so the 0 -> 1 edge gains a vertical component.
        net.nodes[1].pos = Point2::new(0.0, 10.0);
        let topo = Topology::from_provided(net).unwrap();
        let walk = &topo.graphs[TravelMode::Walk];
        let e = walk.find_edge(NodeId(0), NodeId(1)).unwrap();
        assert!((walk.slope(e) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_network() {
        let err = Topology::from_provided(Default::default()).unwrap_err();
        assert!(matches!(err, NetworkError::Provider(_)));
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let mut net = super::helpers::split_network();
        net.modes.walk.edges.push(ProvidedEdge {
            from: NodeId(0), to: NodeId(42), length_m: 1.0, slope: None,
        });
        assert!(Topology::from_provided(net).is_err());
    }

    #[test]
    fn rejects_non_positive_length() {
        let mut net = super::helpers::split_network();
        net.modes.drive.edges[0].length_m = 0.0;
        assert!(Topology::from_provided(net).is_err());
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use evac_core::{NodeId, TravelMode};

    use crate::{DijkstraRouter, NetworkError, Router};
    use super::helpers::{grid_model, node};

    #[test]
    fn corner_to_corner_on_grid() {
        let m = grid_model(4);
        let g = m.graph(TravelMode::Walk);
        let route = DijkstraRouter
            .route(g, node(0, 0, 4), node(3, 3, 4), &|e| Some(g.length(e)))
            .unwrap();
        assert_eq!(route.edge_count(), 6);
        assert!((route.total_cost - 60.0).abs() < 1e-9);
        assert_eq!(route.nodes.first(), Some(&node(0, 0, 4)));
        assert_eq!(route.nodes.last(), Some(&node(3, 3, 4)));
    }

    #[test]
    fn same_node_is_trivial() {
        let m = grid_model(2);
        let g = m.graph(TravelMode::Walk);
        let route = DijkstraRouter.route(g, NodeId(1), NodeId(1), &|_| Some(1.0)).unwrap();
        assert!(route.is_trivial());
        assert_eq!(route.total_cost, 0.0);
    }

    #[test]
    fn excluded_edges_are_avoided() {
        let m = grid_model(2);
        let g = m.graph(TravelMode::Walk);
        // Block 0 -> 1; the only other way to 1 is 0 -> 2 -> 3 -> 1.
        let banned = g.find_edge(NodeId(0), NodeId(1)).unwrap();
        let route = DijkstraRouter
            .route(g, NodeId(0), NodeId(1), &|e| (e != banned).then(|| g.length(e)))
            .unwrap();
        assert_eq!(route.nodes, vec![NodeId(0), NodeId(2), NodeId(3), NodeId(1)]);
    }

    #[test]
    fn fully_excluded_is_no_route() {
        let m = grid_model(3);
        let g = m.graph(TravelMode::Walk);
        let err = DijkstraRouter.route(g, NodeId(0), NodeId(8), &|_| None).unwrap_err();
        assert!(matches!(err, NetworkError::NoRoute { .. }));
    }

    #[test]
    fn unknown_node() {
        let m = grid_model(2);
        let g = m.graph(TravelMode::Walk);
        let err = DijkstraRouter.route(g, NodeId(0), NodeId(40), &|_| Some(1.0)).unwrap_err();
        assert!(matches!(err, NetworkError::NodeNotFound(NodeId(40))));
    }
}

// ── Cost ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cost {
    use evac_core::{ModeTable, NodeId, Point2, SimRng, TravelMode};

    use crate::{
        ModeTopology, NetworkModel, ProvidedEdge, ProvidedNetwork, ProvidedNode, StaticGraphProvider,
    };
    use super::helpers::grid_config;

    #[test]
    fn plain_length_without_hazards() {
        let m = super::helpers::grid_model(3);
        assert_eq!(m.cost(NodeId(0), NodeId(1), TravelMode::Walk), Some(10.0));
        assert_eq!(m.cost(NodeId(0), NodeId(4), TravelMode::Walk), None);
    }

    #[test]
    fn snow_and_slope_weighting() {
        let mut cfg = grid_config(2);
        cfg.grid.slope = 0.5;
        let mut m = NetworkModel::build(None, &cfg, &mut SimRng::new(1));
        m.set_ground_truth(TravelMode::Walk, NodeId(0), NodeId(1), false, 2.0).unwrap();
        // 10 * (1 + 1.2 * 2 + 0.6 * 0.5)
        let c = m.cost(NodeId(0), NodeId(1), TravelMode::Walk).unwrap();
        assert!((c - 37.0).abs() < 1e-9, "got {c}");
    }

    #[test]
    fn cost_never_below_length() {
        let mut cfg = grid_config(5);
        cfg.hazards.snow_max = 3.0;
        cfg.grid.slope = 0.2;
        let m = NetworkModel::build(None, &cfg, &mut SimRng::new(7));
        for mode in TravelMode::ALL {
            let g = m.graph(mode);
            for e in 0..g.edge_count() {
                let e = evac_core::EdgeId(e as u32);
                assert!(m.edge_cost(mode, e) >= g.length(e));
            }
        }
    }

    /// Two nodes joined by a 10 m road of the given slope in both modes.
    fn sloped_edge_model(slope: f64) -> NetworkModel {
        let road = [
            ProvidedEdge { from: NodeId(0), to: NodeId(1), length_m: 10.0, slope: Some(slope) },
            ProvidedEdge { from: NodeId(1), to: NodeId(0), length_m: 10.0, slope: Some(slope) },
        ];
        let nodes = vec![
            ProvidedNode { pos: Point2::new(0.0, 0.0), geo: None },
            ProvidedNode { pos: Point2::new(10.0, 0.0), geo: None },
        ];
        let topo = || ModeTopology { nodes: vec![], edges: road.to_vec() };
        let provider = StaticGraphProvider(ProvidedNetwork { nodes, modes: ModeTable::new(topo(), topo()) });
        NetworkModel::build(Some(&provider), &grid_config(2), &mut SimRng::new(0))
    }

    fn cost_at(m: &mut NetworkModel, mode: TravelMode, snow: f64) -> f64 {
        m.set_ground_truth(mode, NodeId(0), NodeId(1), false, snow).unwrap();
        m.cost(NodeId(0), NodeId(1), mode).unwrap()
    }

    #[test]
    fn cost_monotone_in_snow_and_slope() {
        let mut rng = SimRng::new(11);
        for _ in 0..200 {
            let snow = rng.uniform(0.0, 5.0);
            let slope = rng.uniform(0.0, 1.0);
            let more_snow = snow + rng.uniform(0.0, 2.0);
            let more_slope = slope + rng.uniform(0.0, 0.5);

            for mode in TravelMode::ALL {
                let mut base = sloped_edge_model(slope);
                let c = cost_at(&mut base, mode, snow);
                let c_snow = cost_at(&mut base, mode, more_snow);
                assert!(c_snow >= c, "{mode}: snow {snow} -> {more_snow} gave {c} -> {c_snow}");

                let mut steeper = sloped_edge_model(more_slope);
                let c_slope = cost_at(&mut steeper, mode, snow);
                assert!(c_slope >= c, "{mode}: slope {slope} -> {more_slope} gave {c} -> {c_slope}");
            }
        }
    }

    #[test]
    fn override_unknown_edge_fails() {
        let mut m = super::helpers::grid_model(2);
        assert!(m.set_ground_truth(TravelMode::Walk, NodeId(0), NodeId(3), true, 0.0).is_err());
    }
}

// ── Observation & blocking ────────────────────────────────────────────────────

#[cfg(test)]
mod observe {
    use std::collections::HashMap;

    use evac_core::{AgentId, AgentRng, EdgeId, ModeTable, NodeId, SimRng, TravelMode};

    use crate::{BeliefView, EdgeObservation, NetworkModel};
    use super::helpers::{grid_config, grid_model};

    struct MapBelief(HashMap<EdgeId, EdgeObservation>);

    impl BeliefView for MapBelief {
        fn lookup(&self, edge: EdgeId) -> Option<&EdgeObservation> {
            self.0.get(&edge)
        }
    }

    #[test]
    fn radius_limits_sources() {
        let mut cfg = grid_config(5);
        cfg.observation_radius_m = 10.0;
        let m = NetworkModel::build(None, &cfg, &mut SimRng::new(0));
        let mut rng = AgentRng::new(0, AgentId(0));

        // Corner node 0 sees itself plus neighbours 1 and 5.
        let obs = m.observe(NodeId(0), TravelMode::Walk, &mut rng);
        let g = m.graph(TravelMode::Walk);
        let mut sources: Vec<NodeId> = obs.iter().map(|(e, _)| g.edge_from[e.index()]).collect();
        sources.dedup();
        assert_eq!(sources, vec![NodeId(0), NodeId(1), NodeId(5)]);
        // 2 + 3 + 3 outgoing edges.
        assert_eq!(obs.len(), 8);
    }

    #[test]
    fn observations_ordered_by_edge() {
        let m = grid_model(4);
        let mut rng = AgentRng::new(0, AgentId(0));
        let obs = m.observe(NodeId(5), TravelMode::Drive, &mut rng);
        assert!(obs.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn zero_error_matches_ground_truth() {
        let mut cfg = grid_config(4);
        cfg.hazards.block_probability = 0.5;
        cfg.observation_radius_m = 1_000.0;
        let m = NetworkModel::build(None, &cfg, &mut SimRng::new(11));
        let mut rng = AgentRng::new(11, AgentId(3));
        let a = m.observe(NodeId(0), TravelMode::Walk, &mut rng);
        let b = m.observe(NodeId(0), TravelMode::Walk, &mut rng);
        assert_eq!(a, b);
        for (e, o) in &a {
            assert_eq!(o.blocked, m.hazards(TravelMode::Walk).is_blocked(*e));
        }
    }

    #[test]
    fn full_error_inverts_every_flag() {
        let mut cfg = grid_config(3);
        cfg.observation_error = ModeTable::new(1.0, 0.0);
        cfg.observation_radius_m = 1_000.0;
        let m = NetworkModel::build(None, &cfg, &mut SimRng::new(5));
        let mut rng = AgentRng::new(5, AgentId(0));
        let obs = m.observe(NodeId(4), TravelMode::Walk, &mut rng);
        assert!(!obs.is_empty());
        assert!(obs.iter().all(|(_, o)| o.blocked));
    }

    #[test]
    fn unknown_belief_is_open() {
        let mut m = grid_model(2);
        m.set_ground_truth(TravelMode::Walk, NodeId(0), NodeId(1), true, 0.0).unwrap();
        let empty = MapBelief(HashMap::new());
        assert!(!m.is_blocked(NodeId(0), NodeId(1), TravelMode::Walk, &empty));
        assert!(m.is_blocked_truth(NodeId(0), NodeId(1), TravelMode::Walk));
    }

    #[test]
    fn belief_decides_blocking() {
        let m = grid_model(2);
        let e = m.edge(TravelMode::Walk, NodeId(0), NodeId(1)).unwrap();
        let mut map = HashMap::new();
        map.insert(e, EdgeObservation { blocked: true, snow_depth: 0.0, slope: 0.0 });
        let belief = MapBelief(map);
        assert!(m.is_blocked(NodeId(0), NodeId(1), TravelMode::Walk, &belief));
        assert!(!m.is_blocked_truth(NodeId(0), NodeId(1), TravelMode::Walk));
        // Non-existent edge is never blocked.
        assert!(!m.is_blocked(NodeId(0), NodeId(3), TravelMode::Walk, &belief));
    }
}

// ── Model construction ────────────────────────────────────────────────────────

#[cfg(test)]
mod model {
    use evac_core::{NodeId, Point2, SimRng, TravelMode};

    use crate::{NetworkModel, TopologyOrigin};
    use super::helpers::{FailingProvider, grid_config, split_network, static_provider};

    #[test]
    fn no_provider_uses_grid() {
        let m = super::helpers::grid_model(3);
        assert_eq!(m.origin(), TopologyOrigin::SyntheticGrid);
        assert_eq!(m.node_count(), 9);
    }

    #[test]
    fn failing_provider_falls_back() {
        let cfg = grid_config(3);
        let m = NetworkModel::build(Some(&FailingProvider), &cfg, &mut SimRng::new(0));
        assert_eq!(m.origin(), TopologyOrigin::SyntheticGrid);
        assert_eq!(m.graph(TravelMode::Drive).edge_count(), 24);
    }

    #[test]
    fn static_provider_used() {
        let cfg = grid_config(3);
        let p = static_provider(split_network());
        let m = NetworkModel::build(Some(&p), &cfg, &mut SimRng::new(0));
        assert_eq!(m.origin(), TopologyOrigin::Provider);
        assert_eq!(m.node_count(), 5);
    }

    #[test]
    fn shelters_are_walk_nodes() {
        let mut cfg = grid_config(3);
        cfg.shelter_count = 4;
        let p = static_provider(split_network());
        let m = NetworkModel::build(Some(&p), &cfg, &mut SimRng::new(0));
        // Only three nodes survive in the walk graph.
        assert_eq!(m.shelters(), &[NodeId(0), NodeId(1), NodeId(2)]);
        assert!(m.is_shelter(NodeId(1)));
    }

    #[test]
    fn set_shelters_rejects_non_walk_node() {
        let cfg = grid_config(3);
        let p = static_provider(split_network());
        let mut m = NetworkModel::build(Some(&p), &cfg, &mut SimRng::new(0));
        assert!(m.set_shelters(vec![NodeId(4)]).is_err());
        m.set_shelters(vec![NodeId(2), NodeId(0), NodeId(2)]).unwrap();
        assert_eq!(m.shelters(), &[NodeId(0), NodeId(2)]);
    }

    #[test]
    fn same_seed_same_hazards() {
        let mut cfg = grid_config(5);
        cfg.hazards.block_probability = 0.3;
        cfg.hazards.snow_max = 1.0;
        let a = NetworkModel::build(None, &cfg, &mut SimRng::new(99));
        let b = NetworkModel::build(None, &cfg, &mut SimRng::new(99));
        assert_eq!(a.shelters(), b.shelters());
        for mode in TravelMode::ALL {
            let g = a.graph(mode);
            for e in 0..g.edge_count() {
                let e = evac_core::EdgeId(e as u32);
                assert_eq!(a.hazards(mode).is_blocked(e), b.hazards(mode).is_blocked(e));
                assert_eq!(a.hazards(mode).snow_depth(e), b.hazards(mode).snow_depth(e));
            }
        }
    }

    #[test]
    fn interpolate_along_edge() {
        let m = super::helpers::grid_model(2);
        let e = m.edge(TravelMode::Walk, NodeId(0), NodeId(1)).unwrap();
        // Node 1 sits at (0, 10).
        let p = m.interpolate(TravelMode::Walk, NodeId(0), Some(e), 2.5);
        assert_eq!(p, Point2::new(0.0, 2.5));
        assert_eq!(m.interpolate(TravelMode::Walk, NodeId(1), None, 7.0), Point2::new(0.0, 10.0));
        // Overshoot clamps to the target.
        assert_eq!(m.interpolate(TravelMode::Walk, NodeId(0), Some(e), 50.0), Point2::new(0.0, 10.0));
    }
}

// ── Geocoding ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod geocode {
    use evac_core::{GeoPoint, NodeId, SimRng};

    use crate::{Geocoder, NetworkModel, ProvidedNode, Snap};
    use super::helpers::{grid_config, grid_model, split_network, static_provider};

    struct Fixed(NodeId);

    impl Geocoder for Fixed {
        fn nearest_node_with_distance(&self, _: GeoPoint) -> Option<Snap> {
            Some(Snap { node: self.0, distance: 1.0, is_metric: true })
        }
    }

    #[test]
    fn planar_fallback_is_not_metric() {
        let m = grid_model(3);
        // (lat, lon) = (11, 19) compares as planar (19, 11) → node (2, 1).
        let snap = m.nearest_node_with_distance(GeoPoint::new(11.0, 19.0)).unwrap();
        assert_eq!(snap.node, NodeId(7));
        assert!(!snap.is_metric);
    }

    #[test]
    fn fallback_only_returns_drive_nodes() {
        let cfg = grid_config(3);
        let p = static_provider(split_network());
        let m = NetworkModel::build(Some(&p), &cfg, &mut SimRng::new(0));
        // Closest planar node is 0, but only 3 and 4 are drive nodes.
        assert_eq!(m.nearest_node(GeoPoint::new(0.0, 0.0)), Some(NodeId(3)));
    }

    #[test]
    fn geographic_index_is_metric() {
        let mut net = split_network();
        for (i, n) in net.nodes.iter_mut().enumerate() {
            *n = ProvidedNode {
                pos: n.pos,
                geo: Some(GeoPoint::new(40.76 + i as f64 * 0.001, -111.84)),
            };
        }
        let cfg = grid_config(3);
        let m = NetworkModel::build(Some(&static_provider(net)), &cfg, &mut SimRng::new(0));
        let snap = m.nearest_node_with_distance(GeoPoint::new(40.7641, -111.84)).unwrap();
        assert_eq!(snap.node, NodeId(4));
        assert!(snap.is_metric);
        assert!(snap.distance < 20.0, "got {}", snap.distance);
    }

    #[test]
    fn geographic_snap_ranks_by_metres() {
        // Drive nodes 3 and 4: one 0.001° north (~111 m), one 0.0012° east
        // (~101 m at this latitude).  Degree distance would pick the north one.
        let origin = GeoPoint::new(40.7649, -111.8421);
        let mut net = split_network();
        for (i, n) in net.nodes.iter_mut().enumerate() {
            let geo = match i {
                3 => GeoPoint::new(origin.lat + 0.001, origin.lon),
                4 => GeoPoint::new(origin.lat, origin.lon + 0.0012),
                _ => GeoPoint::new(origin.lat + 1.0, origin.lon + i as f64),
            };
            *n = ProvidedNode { pos: n.pos, geo: Some(geo) };
        }
        let cfg = grid_config(3);
        let m = NetworkModel::build(Some(&static_provider(net)), &cfg, &mut SimRng::new(0));
        let snap = m.nearest_node_with_distance(origin).unwrap();
        assert_eq!(snap.node, NodeId(4));
        assert!((snap.distance - 101.1).abs() < 1.0, "got {}", snap.distance);
        assert!(snap.is_metric);
    }

    #[test]
    fn external_geocoder_takes_precedence() {
        let m = grid_model(3).with_geocoder(Box::new(Fixed(NodeId(2))));
        assert_eq!(m.nearest_node(GeoPoint::new(0.0, 0.0)), Some(NodeId(2)));
    }
}

// ── Shelters ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod shelter {
    use evac_core::{NodeId, SimRng};

    use crate::select_shelters;

    #[test]
    fn count_is_capped() {
        let nodes: Vec<NodeId> = (0..3).map(NodeId).collect();
        let s = select_shelters(&nodes, 10, &mut SimRng::new(1));
        assert_eq!(s, nodes);
    }

    #[test]
    fn distinct_and_sorted() {
        let nodes: Vec<NodeId> = (0..50).map(NodeId).collect();
        let s = select_shelters(&nodes, 6, &mut SimRng::new(2));
        assert_eq!(s.len(), 6);
        assert!(s.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_input() {
        assert!(select_shelters(&[], 6, &mut SimRng::new(3)).is_empty());
    }
}
