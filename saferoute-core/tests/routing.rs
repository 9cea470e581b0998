use geo::{Destination, Distance, Geodesic, Point, point};
use saferoute_core::prelude::*;

fn lit_sidewalk() -> EdgeAttributes {
    EdgeAttributes::new()
        .with("lit", "yes")
        .with("sidewalk", "both")
}

fn geodesic_length(graph_nodes: &[(StreetNodeId, f64, f64)], a: StreetNodeId, b: StreetNodeId) -> f64 {
    let position = |id: StreetNodeId| {
        let &(_, lon, lat) = graph_nodes.iter().find(|n| n.0 == id).unwrap();
        Point::new(lon, lat)
    };
    Geodesic.distance(position(a), position(b))
}

/// Two ways from 1 to 4: a short main road through 2 and a longer lit
/// residential detour through 3.
///
/// ```text
///   1 --- 2 --- 4      (primary, unlit)
///    \         /
///     `-- 3 --'        (residential, lit, sidewalks)
/// ```
fn detour_graph() -> StreetGraph {
    let nodes = [
        (1, 34.7700, 32.0800),
        (2, 34.7720, 32.0800),
        (3, 34.7720, 32.0785),
        (4, 34.7740, 32.0800),
    ];
    let mut builder = StreetGraphBuilder::new();
    for &(id, lon, lat) in &nodes {
        builder.add_node(id, lon, lat).unwrap();
    }

    let main_road = EdgeAttributes::new().with("highway", "primary");
    let quiet_street = lit_sidewalk().with("highway", "residential");
    for (a, b, tags) in [
        (1, 2, main_road.clone()),
        (2, 4, main_road),
        (1, 3, quiet_street.clone()),
        (3, 4, quiet_street),
    ] {
        builder
            .add_street(a, b, geodesic_length(&nodes, a, b), tags)
            .unwrap();
    }
    builder.build()
}

#[test]
fn parallel_edges_pick_per_variant() {
    let mut builder = StreetGraphBuilder::new();
    builder.add_node(1, 34.7700, 32.0800).unwrap();
    builder.add_node(2, 34.7710, 32.0800).unwrap();
    builder.add_edge(1, 2, 120.0, lit_sidewalk()).unwrap();
    builder.add_edge(1, 2, 100.0, EdgeAttributes::new()).unwrap();
    let graph = builder.build();

    let pair = route(&graph, 1, 2).unwrap();
    let shortest = pair.shortest.unwrap();
    let safest = pair.safest.unwrap();

    assert!((shortest.distance_km() - 0.1).abs() < 1e-12);
    assert_eq!(shortest.safety_weight(), 1.0);
    assert!((safest.distance_km() - 0.12).abs() < 1e-12);
    assert!((safest.safety_weight() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn safest_route_takes_the_lit_detour() {
    let graph = detour_graph();
    let pair = route(&graph, 1, 4).unwrap();
    let shortest = pair.shortest.unwrap();
    let safest = pair.safest.unwrap();

    assert_eq!(shortest.nodes(), &[1, 2, 4]);
    assert_eq!(safest.nodes(), &[1, 3, 4]);
    assert_eq!(shortest.route_index(), 0);
    assert_eq!(safest.route_index(), 1);

    assert!(safest.distance_km() >= shortest.distance_km());
    assert!(safest.safety_weight() <= shortest.safety_weight());
    assert!((safest.safety_weight() - 0.5).abs() < 1e-12);
}

#[test]
fn route_geometry_follows_nodes() {
    let graph = detour_graph();
    let shortest = route(&graph, 1, 4).unwrap().shortest.unwrap();

    assert_eq!(
        shortest.coordinates(),
        vec![(34.7700, 32.0800), (34.7720, 32.0800), (34.7740, 32.0800)]
    );
    let expected_km = Geodesic.distance(point!(x: 34.7700, y: 32.0800), point!(x: 34.7740, y: 32.0800)) / 1000.0;
    assert!((shortest.distance_km() - expected_km).abs() < 1e-6);
}

#[test]
fn same_origin_and_destination() {
    let graph = detour_graph();
    let pair = route(&graph, 2, 2).unwrap();
    let shortest = pair.shortest.unwrap();
    assert_eq!(shortest.coordinates().len(), 2);
    assert_eq!(shortest.distance_km(), 0.0);
}

#[test]
fn unknown_node_is_fatal() {
    let graph = detour_graph();
    assert_eq!(route(&graph, 1, 99), Err(RoutingError::NodeNotFound(99)));
}

#[test]
fn disconnected_nodes_fail_per_variant() {
    let mut builder = StreetGraphBuilder::new();
    builder.add_node(1, 34.77, 32.08).unwrap();
    builder.add_node(2, 34.78, 32.08).unwrap();
    builder.add_node(3, 34.79, 32.08).unwrap();
    builder.add_street(1, 2, 900.0, EdgeAttributes::new()).unwrap();
    let graph = builder.build();

    let pair = route(&graph, 1, 3).unwrap();
    assert!(matches!(
        pair.shortest,
        Err(RoutingError::NoPathExists { from: 1, to: 3, variant: RouteVariant::Shortest })
    ));
    assert!(matches!(
        pair.safest,
        Err(RoutingError::NoPathExists { variant: RouteVariant::Safest, .. })
    ));
    assert_eq!(pair.routes().count(), 0);
}

#[test]
fn one_way_edges_are_respected() {
    let mut builder = StreetGraphBuilder::new();
    builder.add_node(1, 34.77, 32.08).unwrap();
    builder.add_node(2, 34.78, 32.08).unwrap();
    builder.add_edge(1, 2, 900.0, EdgeAttributes::new()).unwrap();
    let graph = builder.build();

    assert!(route(&graph, 1, 2).unwrap().shortest.is_ok());
    assert!(route(&graph, 2, 1).unwrap().shortest.is_err());
}

#[test]
fn routing_is_deterministic() {
    let graph = detour_graph();
    let first = route(&graph, 4, 1).unwrap();
    for _ in 0..20 {
        assert_eq!(route(&graph, 4, 1).unwrap(), first);
    }
}

#[test]
fn endpoints_snap_to_nearest_nodes() {
    let graph = detour_graph();
    let router = DualPathRouter::new(&graph, SafetyScorer::default());

    let pair = router
        .route_between_points(&point!(x: 34.77001, y: 32.08001), &point!(x: 34.77399, y: 32.07999), 100.0)
        .unwrap();
    assert_eq!(pair.shortest.unwrap().nodes(), &[1, 2, 4]);

    let far_away = router.route_between_points(&point!(x: 34.80, y: 32.10), &point!(x: 34.774, y: 32.08), 100.0);
    assert!(matches!(far_away, Err(RoutingError::NoSnapCandidate { .. })));
}

#[test]
fn route_exports_as_geojson_feature() {
    let graph = detour_graph();
    let safest = route(&graph, 1, 4).unwrap().safest.unwrap();
    let feature = safest.to_feature(None).unwrap();

    assert_eq!(feature.property("route_index").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(feature.property("variant").and_then(|v| v.as_str()), Some("safest"));
    assert!(feature.geometry.is_some());
}

#[test]
fn snapping_ranks_candidates_by_ground_distance() {
    // At 32°N a degree of longitude is shorter than a degree of latitude, so
    // the node 90 m east lies further away in lon/lat degrees than the one
    // 100 m north.
    let origin = point!(x: 34.7700, y: 32.0800);
    let east = Geodesic.destination(origin, 90.0, 90.0);
    let north = Geodesic.destination(origin, 0.0, 100.0);

    let mut builder = StreetGraphBuilder::new();
    builder.add_node(1, east.x(), east.y()).unwrap();
    builder.add_node(2, north.x(), north.y()).unwrap();
    builder
        .add_street(1, 2, Geodesic.distance(east, north), EdgeAttributes::new())
        .unwrap();
    let graph = builder.build();

    let (nearest, distance) = graph.nearest_node(&origin).unwrap();
    assert_eq!(nearest, graph.node_index(1).unwrap());
    assert!((distance - 90.0).abs() < 1e-6);

    assert_eq!(graph.snap(&origin, 95.0).unwrap(), graph.node_index(1).unwrap());
}
