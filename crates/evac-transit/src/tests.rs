//! Unit tests for evac-transit.

#[cfg(test)]
mod helpers {
    use evac_core::{EvacConfig, FeedConfig, GeoPoint, HazardConfig, ModeTable, NodeId, Point2, SimRng};
    use evac_network::{
        ModeTopology, NetworkModel, ProvidedEdge, ProvidedNetwork, ProvidedNode, StaticGraphProvider,
    };

    pub const CENTER: GeoPoint = GeoPoint { lat: 40.764_936_8, lon: -111.842_102_1 };

    /// Geographic position of line node `i`: 0.001° (~111 m) north steps.
    pub fn geo(i: u32) -> GeoPoint {
        GeoPoint::new(CENTER.lat + f64::from(i) * 0.001, CENTER.lon)
    }

    pub fn feed_config() -> FeedConfig {
        FeedConfig {
            url: Some("http://feed.test/routes".into()),
            sample_stride: 1,
            ..FeedConfig::default()
        }
    }

    fn hazard_free() -> EvacConfig {
        EvacConfig {
            hazards: HazardConfig { block_probability: 0.0, snow_max: 0.0, ..HazardConfig::default() },
            observation_error: ModeTable::new(0.0, 0.0),
            ..EvacConfig::default()
        }
    }

    /// Five nodes on a north-south line with geographic positions; both
    /// modes connect consecutive nodes in both directions.
    pub fn line_model() -> NetworkModel {
        let nodes = (0..5)
            .map(|i| ProvidedNode { pos: Point2::new(0.0, f64::from(i) * 111.0), geo: Some(geo(i)) })
            .collect();
        let edges: Vec<ProvidedEdge> = (0..4u32)
            .flat_map(|i| {
                [(i, i + 1), (i + 1, i)].map(|(a, b)| ProvidedEdge {
                    from: NodeId(a), to: NodeId(b), length_m: 111.0, slope: None,
                })
            })
            .collect();
        let topo = ModeTopology { nodes: vec![], edges };
        let provider = StaticGraphProvider(ProvidedNetwork {
            nodes,
            modes: ModeTable::new(topo.clone(), topo),
        });
        NetworkModel::build(Some(&provider), &hazard_free(), &mut SimRng::new(1))
    }

    /// Synthetic grid without geographic positions.
    pub fn grid_model(size: usize) -> NetworkModel {
        let mut cfg = hazard_free();
        cfg.grid.size = size;
        cfg.grid.spacing_m = 10.0;
        NetworkModel::build(None, &cfg, &mut SimRng::new(2))
    }
}

// ── Polyline codec ────────────────────────────────────────────────────────────

#[cfg(test)]
mod polyline {
    use crate::{TransitError, decode_polyline};

    #[test]
    fn reference_example() {
        let pts = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
        assert_eq!(pts.len(), expected.len());
        for (p, (lat, lon)) in pts.iter().zip(expected) {
            assert!((p.lat - lat).abs() < 1e-9, "lat {}", p.lat);
            assert!((p.lon - lon).abs() < 1e-9, "lon {}", p.lon);
        }
    }

    #[test]
    fn empty_input() {
        assert!(decode_polyline("").unwrap().is_empty());
    }

    #[test]
    fn latitude_without_longitude() {
        // "_p~iF" is a complete latitude value on its own.
        let err = decode_polyline("_p~iF").unwrap_err();
        assert!(matches!(err, TransitError::TruncatedPolyline(5)));
    }

    #[test]
    fn unterminated_value() {
        // '_' has the continuation bit set.
        assert!(matches!(decode_polyline("_").unwrap_err(), TransitError::TruncatedPolyline(1)));
    }

    #[test]
    fn invalid_character() {
        let err = decode_polyline("_p~iF ps|U").unwrap_err();
        assert!(matches!(err, TransitError::InvalidPolyline { ch: ' ', offset: 5 }));
    }

    #[test]
    fn overlong_value_rejected() {
        // Twelve continuation chunks: far wider than any coordinate delta.
        let garbage = format!("{}C", "~".repeat(12)).repeat(8);
        let err = decode_polyline(&garbage).unwrap_err();
        assert!(matches!(err, TransitError::PolylineOutOfRange(7)), "{err}");
    }

    #[test]
    fn latitude_beyond_pole_rejected() {
        // 95.0, 0.0
        let err = decode_polyline("_uybQ?").unwrap_err();
        assert!(matches!(err, TransitError::PolylineOutOfRange(5)), "{err}");
    }

    #[test]
    fn bad_polyline_falls_back_to_stops() {
        let payload = serde_json::json!({"Routes": [{
            "EncodedPolyline": "~~~~~~~~~~~~C~~~~~~~~~~~~C",
            "Stops": [
                {"Latitude": 40.0, "Longitude": -111.0},
                {"Latitude": 40.001, "Longitude": -111.0},
            ],
        }]});
        let routes = crate::extract_routes(&payload);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].len(), 2);
    }
}

// ── Payload parsing ───────────────────────────────────────────────────────────

#[cfg(test)]
mod payload {
    use serde_json::json;

    use evac_core::GeoPoint;

    use crate::{FeedData, extract_routes, extract_stops, parse_payload};

    #[test]
    fn plain_json() {
        let v = parse_payload(r#" {"Routes": []} "#).unwrap();
        assert!(v["Routes"].is_array());
    }

    #[test]
    fn jsonp_wrapper_is_stripped() {
        let v = parse_payload(r#"jQuery123({"Routes": [{"Stops": []}]});"#).unwrap();
        assert_eq!(v["Routes"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_payload("callback()").is_err());
        assert!(parse_payload("{not json}").is_err());
    }

    #[test]
    fn encoded_polyline_preferred() {
        let v = json!({
            "Routes": [{
                "EncodedPolyline": "_p~iF~ps|U_ulLnnqC",
                "Stops": [{ "Latitude": 1.0, "Longitude": 2.0 }]
            }]
        });
        let routes = extract_routes(&v);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].len(), 2);
    }

    #[test]
    fn bad_encoding_falls_back_to_stops() {
        let v = json!({
            "routes": [{
                "EncodedLine": "_",
                "Stops": [
                    { "Latitude": 40.1, "Longitude": -111.1 },
                    { "Latitude": 40.2 },
                    { "Latitude": "40.3", "Longitude": "-111.3" }
                ]
            }]
        });
        let routes = extract_routes(&v);
        assert_eq!(routes, vec![vec![GeoPoint::new(40.1, -111.1), GeoPoint::new(40.3, -111.3)]]);
    }

    #[test]
    fn pre_decoded_polyline() {
        let v = json!([{ "polyline": [[40.0, -111.0], { "lat": 40.5, "lon": -111.5 }] }]);
        let routes = extract_routes(&v);
        assert_eq!(routes, vec![vec![GeoPoint::new(40.0, -111.0), GeoPoint::new(40.5, -111.5)]]);
    }

    #[test]
    fn route_list_key_order() {
        let v = json!({
            "Routes": "not a list",
            "data": [{ "Stops": [{ "Latitude": 1.0, "Longitude": 1.0 }] }]
        });
        assert_eq!(extract_routes(&v).len(), 1);
        assert!(extract_routes(&json!({ "other": [] })).is_empty());
        assert!(extract_routes(&json!(42)).is_empty());
    }

    #[test]
    fn stop_names() {
        let v = json!({
            "Routes": [
                { "Stops": [
                    { "Latitude": 1.0, "Longitude": 1.0, "Name": "", "StopName": "Union" },
                    { "Latitude": 2.0, "Longitude": 2.0, "Description": "Library" },
                    { "Latitude": 3.0, "Longitude": 3.0 },
                    { "Longitude": 4.0, "Name": "no latitude" }
                ]},
                "not a route"
            ]
        });
        let names: Vec<String> = extract_stops(&v).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Union", "Library", ""]);
    }

    #[test]
    fn from_body_collects_both() {
        let body = r#"cb({"Routes":[{"EncodedPolyline":"_p~iF~ps|U","Stops":[{"Latitude":1,"Longitude":2,"Name":"A"}]}]})"#;
        let data = FeedData::from_body(body).unwrap();
        assert_eq!(data.polylines.len(), 1);
        assert_eq!(data.stops.len(), 1);
        assert_eq!(data.stops[0].position, GeoPoint::new(1.0, 2.0));
    }
}

// ── Feed loading ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod load {
    use evac_core::FeedConfig;

    use crate::{FeedData, StaticFeedSource, fetch_shuttle_stops};
    use super::helpers::{CENTER, feed_config, geo};

    fn body() -> String {
        format!(
            r#"cb({{"Routes":[{{"Stops":[
                {{"Latitude":{},"Longitude":{},"Name":"near"}},
                {{"Latitude":{},"Longitude":{},"Name":"far"}}
            ]}}]}})"#,
            geo(1).lat, geo(1).lon, CENTER.lat + 1.0, CENTER.lon
        )
    }

    #[test]
    fn fetch_failure_is_empty() {
        let data = FeedData::load(&StaticFeedSource(None), &feed_config());
        assert!(data.is_empty());
    }

    #[test]
    fn malformed_payload_is_empty() {
        let src = StaticFeedSource(Some("<html>503</html>".into()));
        assert!(FeedData::load(&src, &feed_config()).is_empty());
    }

    #[test]
    fn missing_url_skips_fetch() {
        let cfg = FeedConfig { url: None, ..feed_config() };
        let src = StaticFeedSource(Some(body()));
        assert!(FeedData::load(&src, &cfg).is_empty());
    }

    #[test]
    fn stops_filtered_by_radius() {
        let src = StaticFeedSource(Some(body()));
        let stops = fetch_shuttle_stops(&src, &feed_config(), CENTER, 1_200.0);
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].name, "near");
    }
}

// ── RouteBuilder ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use evac_core::{GeoPoint, NodeId, SimRng, TravelMode};
    use evac_network::DijkstraRouter;

    use crate::{FeedData, FeedStop, RouteBuilder, RouteOrigin};
    use super::helpers::{CENTER, feed_config, geo, grid_model, line_model};

    #[test]
    fn snapped_route_dedups_consecutive_nodes() {
        let net = line_model();
        let cfg = feed_config();
        let line = vec![geo(0), geo(1), geo(1), geo(2), geo(3), geo(3)];
        let nodes = RouteBuilder::new(&cfg).route_from_feed(&[line], &net).unwrap();
        assert_eq!(nodes, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn stride_downsamples_before_snapping() {
        let net = line_model();
        let cfg = evac_core::FeedConfig { sample_stride: 2, ..feed_config() };
        let line: Vec<GeoPoint> = (0..5).map(geo).collect();
        let nodes = RouteBuilder::new(&cfg).route_from_feed(&[line], &net).unwrap();
        assert_eq!(nodes, vec![NodeId(0), NodeId(2), NodeId(4)]);
    }

    #[test]
    fn first_qualifying_polyline_wins() {
        let net = line_model();
        let cfg = feed_config();
        let outside = vec![GeoPoint::new(CENTER.lat + 1.0, CENTER.lon); 3];
        let single = vec![geo(2), geo(2)];
        let good = vec![geo(4), geo(3)];
        let also_good = vec![geo(0), geo(1)];
        let nodes = RouteBuilder::new(&cfg)
            .route_from_feed(&[outside, single, good, also_good], &net)
            .unwrap();
        assert_eq!(nodes, vec![NodeId(4), NodeId(3)]);
    }

    #[test]
    fn metric_snap_threshold_drops_points() {
        let net = line_model();
        let cfg = evac_core::FeedConfig { snap_max_m: 50.0, ..feed_config() };
        // ~0.002° of longitude is ~170 m east of the line.
        let off = |i| GeoPoint::new(geo(i).lat, geo(i).lon + 0.002);
        let line = vec![geo(0), off(1), geo(2)];
        let nodes = RouteBuilder::new(&cfg).route_from_feed(&[line], &net).unwrap();
        assert_eq!(nodes, vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn non_metric_snaps_never_rejected() {
        let net = grid_model(3);
        let cfg = evac_core::FeedConfig {
            center: GeoPoint::new(0.0, 0.0),
            radius_m: 1.0e7,
            snap_max_m: 1.0,
            ..feed_config()
        };
        // Projected fallback compares (lon, lat) against planar metres.
        let line = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 10.0), GeoPoint::new(0.0, 55.0)];
        let nodes = RouteBuilder::new(&cfg).route_from_feed(&[line], &net).unwrap();
        assert_eq!(nodes, vec![NodeId(0), NodeId(3), NodeId(6)]);
    }

    #[test]
    fn feed_route_carries_snapped_stops() {
        let net = line_model();
        let cfg = feed_config();
        let feed = FeedData {
            polylines: vec![vec![geo(0), geo(1), geo(2)]],
            stops: vec![
                FeedStop { position: geo(1), name: "Union".into() },
                FeedStop { position: GeoPoint::new(CENTER.lat + 1.0, CENTER.lon), name: "far".into() },
            ],
        };
        let route = RouteBuilder::new(&cfg).build(&feed, &net, &DijkstraRouter, &mut SimRng::new(0));
        assert_eq!(route.origin, RouteOrigin::Feed);
        assert_eq!(route.nodes.len(), 3);
        assert_eq!(route.stops, vec![NodeId(1)]);
        assert_eq!(route.stop_records[0].name, "Union");
    }

    #[test]
    fn empty_feed_gives_synthetic_loop() {
        let net = grid_model(4);
        let cfg = feed_config();
        let route = RouteBuilder::new(&cfg)
            .build(&FeedData::default(), &net, &DijkstraRouter, &mut SimRng::new(5));
        assert_eq!(route.origin, RouteOrigin::Synthetic);
        assert_eq!(route.stops.len(), cfg.synthetic_stops);
        assert!(route.stop_records.is_empty());

        // Every consecutive pair, including the wrap-around, is a drive edge.
        let g = net.graph(TravelMode::Drive);
        let n = route.nodes.len();
        assert!(n >= cfg.synthetic_stops);
        for i in 0..n {
            let (a, b) = (route.nodes[i], route.nodes[(i + 1) % n]);
            assert!(g.find_edge(a, b).is_some(), "{a} -> {b} is not an edge");
        }
        for s in &route.stops {
            assert!(route.nodes.contains(s));
        }
    }

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let net = grid_model(5);
        let cfg = feed_config();
        let b = RouteBuilder::new(&cfg);
        let r1 = b.synthetic(&net, &DijkstraRouter, &mut SimRng::new(9));
        let r2 = b.synthetic(&net, &DijkstraRouter, &mut SimRng::new(9));
        assert_eq!(r1, r2);
    }

    #[test]
    fn tiny_drive_graph_gives_empty_route() {
        let net = grid_model(1);
        let cfg = feed_config();
        let route = RouteBuilder::new(&cfg).synthetic(&net, &DijkstraRouter, &mut SimRng::new(0));
        assert!(route.is_empty());
    }
}
