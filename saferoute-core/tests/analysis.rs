use geo::{Distance, Geodesic, LineString, Point, line_string};
use saferoute_core::analysis::{DataQualityWarning, LightingSplit, MetricsAggregator};
use saferoute_core::prelude::*;

/// Walking route along Dizengoff street, lon/lat
const STREET: [(f64, f64); 8] = [
    (34.770606, 32.081301),
    (34.770740, 32.081562),
    (34.771088, 32.082280),
    (34.771816, 32.083775),
    (34.772351, 32.084823),
    (34.772704, 32.085574),
    (34.773219, 32.087301),
    (34.773520, 32.088608),
];

fn street_graph(length_scale: f64) -> StreetGraph {
    let mut builder = StreetGraphBuilder::new();
    for (id, &(lon, lat)) in STREET.iter().enumerate() {
        builder.add_node(id as StreetNodeId, lon, lat).unwrap();
    }
    for (id, pair) in STREET.windows(2).enumerate() {
        let length = Geodesic.distance(Point::from(pair[0]), Point::from(pair[1]));
        builder
            .add_street(
                id as StreetNodeId,
                id as StreetNodeId + 1,
                length * length_scale,
                EdgeAttributes::new().with("highway", "residential"),
            )
            .unwrap();
    }
    builder.build()
}

fn street_route(length_scale: f64) -> Route {
    let graph = street_graph(length_scale);
    route(&graph, 0, STREET.len() as StreetNodeId - 1)
        .unwrap()
        .shortest
        .unwrap()
}

fn points(category: FeatureCategory, coords: impl IntoIterator<Item = (f64, f64)>) -> FeatureSet {
    FeatureSet::new(
        category,
        coords
            .into_iter()
            .map(|c| Feature::new(Point::from(c)))
            .collect(),
    )
}

fn empty_features() -> CategoryFeatures {
    FeatureCategory::ALL
        .into_iter()
        .map(FeatureSet::empty)
        .collect()
}

#[test]
fn fully_lit_route() {
    let route = street_route(1.0);
    let mut features = empty_features();
    // a light about 5 m east of every vertex
    features.insert(points(
        FeatureCategory::Light,
        STREET.iter().map(|&(lon, lat)| (lon + 0.00005, lat)),
    ));

    let metrics = ProximityAnalyzer::default().analyze(&route, &features);

    let lit = metrics.lit_distance_km().unwrap();
    assert!((lit - route.distance_km()).abs() < 1e-3);
    assert_eq!(metrics.dark_distance_km(), Some(0.0));
    assert_eq!(metrics.dark_to_lit_ratio(), Some(DarkToLitRatio::Value(0.0)));
    assert!(metrics.warnings.is_empty());
}

#[test]
fn route_without_features() {
    let route = street_route(1.0);
    let metrics = ProximityAnalyzer::default().analyze(&route, &empty_features());

    assert_eq!(metrics.shelter_count, Metric::Available(0));
    assert_eq!(metrics.hazards.near_construction, Metric::Available(false));
    assert_eq!(metrics.hazards.near_night_work, Metric::Available(false));
    assert_eq!(metrics.hazards.near_road_work, Metric::Available(false));
    assert_eq!(metrics.hazards.on_walking_street, Metric::Available(false));
    assert_eq!(metrics.dark_to_lit_ratio(), Some(DarkToLitRatio::Infinite));

    let dark = metrics.dark_distance_km().unwrap();
    assert!((dark - route.distance_km()).abs() < 1e-3);
}

#[test]
fn partially_lit_route_reconciles() {
    let route = street_route(1.0);
    let mut features = empty_features();
    // only the first two vertices have a light
    features.insert(points(
        FeatureCategory::Light,
        [(34.770620, 32.081310), (34.770750, 32.081570)],
    ));

    let metrics = ProximityAnalyzer::default().analyze(&route, &features);
    let lighting = metrics.lighting.available().unwrap();

    assert!(lighting.lit_distance_km > 0.0);
    assert!(lighting.dark_distance_km > lighting.lit_distance_km);
    assert!((lighting.lit_distance_km + lighting.dark_distance_km - route.distance_km()).abs() < 1e-3);
    match lighting.dark_to_lit_ratio {
        DarkToLitRatio::Value(ratio) => {
            let expected = lighting.dark_distance_km / lighting.lit_distance_km;
            assert!((ratio - expected).abs() <= 0.005);
        }
        other => panic!("unexpected ratio {other:?}"),
    }
}

#[test]
fn shelters_and_hazards_near_the_route() {
    let route = street_route(1.0);
    let mut features = empty_features();
    let (lon, lat) = STREET[3];
    features.insert(points(
        FeatureCategory::Shelter,
        // ~11 m, ~11 m and ~110 m from the street
        [(lon + 0.0001, lat), (lon - 0.0001, lat + 0.00002), (lon + 0.0012, lat)],
    ));
    features.insert(points(FeatureCategory::Construction, [(lon, lat + 0.00005)]));
    features.insert(points(FeatureCategory::RoadWork, [(lon + 0.003, lat)]));

    // a pedestrian street crossing the route between vertices 4 and 5
    let (x4, y4) = STREET[4];
    let (x5, y5) = STREET[5];
    let mid = ((x4 + x5) / 2.0, (y4 + y5) / 2.0);
    let crossing: LineString<f64> = line_string![
        (x: mid.0 - 0.001, y: mid.1),
        (x: mid.0 + 0.001, y: mid.1),
    ];
    features.insert(FeatureSet::new(
        FeatureCategory::WalkingStreet,
        vec![Feature::new(crossing)],
    ));

    let metrics = ProximityAnalyzer::default().analyze(&route, &features);
    assert_eq!(metrics.shelter_count, Metric::Available(2));
    assert_eq!(metrics.hazards.near_construction, Metric::Available(true));
    assert_eq!(metrics.hazards.near_road_work, Metric::Available(false));
    assert_eq!(metrics.hazards.on_walking_street, Metric::Available(true));
}

#[test]
fn failed_category_does_not_block_others() {
    let route = street_route(1.0);
    let mut features = empty_features();
    features.mark_unavailable(FeatureCategory::Shelter, "layer 592 timed out");

    let metrics = ProximityAnalyzer::default().analyze(&route, &features);
    assert_eq!(
        metrics.shelter_count,
        Metric::Unavailable {
            reason: "layer 592 timed out".to_string()
        }
    );
    assert!(metrics.lighting.is_available());
    assert_eq!(metrics.hazards.near_construction, Metric::Available(false));
}

#[test]
fn length_mismatch_is_reported_not_fatal() {
    // edges claim 20% more length than the geometry covers
    let route = street_route(1.2);
    let metrics = ProximityAnalyzer::default().analyze(&route, &empty_features());

    assert!(matches!(
        metrics.warnings.as_slice(),
        [DataQualityWarning::GeometryReconciliationMismatch { .. }]
    ));
    assert!(metrics.lighting.is_available());
}

#[test]
fn analysis_is_deterministic() {
    let route = street_route(1.0);
    let mut features = empty_features();
    features.insert(points(FeatureCategory::Light, [(34.7718, 32.0838)]));
    features.insert(points(FeatureCategory::Shelter, [(34.7723, 32.0848)]));

    let analyzer = ProximityAnalyzer::default();
    let first = analyzer.analyze(&route, &features);
    let parallel = analyzer.analyze_all(&[(&route, &features), (&route, &features)]);
    assert!(parallel.iter().all(|m| *m == first));
}

#[test]
fn zero_length_route_has_undefined_ratio() {
    let graph = street_graph(1.0);
    let route = route(&graph, 3, 3).unwrap().safest.unwrap();
    let metrics = ProximityAnalyzer::default().analyze(&route, &empty_features());
    assert_eq!(metrics.dark_to_lit_ratio(), Some(DarkToLitRatio::Undefined));
    assert_eq!(metrics.route_index, 1);
}

#[test]
fn metrics_serialize_for_the_narrative_step() {
    let route = street_route(1.0);
    let mut features = empty_features();
    features.mark_unavailable(FeatureCategory::NightWork, "layer 858 unreachable");
    let record = ProximityAnalyzer::default().analyze(&route, &features);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["route_index"], 0);
    assert_eq!(json["lighting"]["dark_to_lit_ratio"], "infinite");
    assert_eq!(json["shelter_count"], 0);
    assert_eq!(json["near_construction"], false);
    assert_eq!(json["near_night_work"]["status"], "unavailable");
}

#[test]
fn aggregator_applies_its_tolerance() {
    let route = street_route(1.0);
    let half = route.distance_km() / 2.0;
    let split = LightingSplit {
        lit_km: half,
        dark_km: half + 0.0005,
    };
    let hazards = HazardFlags {
        near_construction: Metric::Available(false),
        near_night_work: Metric::Available(false),
        near_road_work: Metric::Available(true),
        on_walking_street: Metric::unavailable("layer 659 unreachable"),
    };

    let relaxed = MetricsAggregator::new(1e-3).aggregate(
        &route,
        Metric::Available(split),
        Metric::Available(3),
        hazards.clone(),
    );
    assert!(relaxed.warnings.is_empty());
    assert_eq!(relaxed.dark_to_lit_ratio(), Some(DarkToLitRatio::Value(1.0)));
    assert_eq!(relaxed.hazards, hazards);

    let strict = MetricsAggregator::new(1e-4).aggregate(
        &route,
        Metric::Available(split),
        Metric::Available(3),
        hazards,
    );
    assert_eq!(strict.warnings.len(), 1);
}
