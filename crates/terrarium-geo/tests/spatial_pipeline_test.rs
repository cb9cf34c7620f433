//! Integration tests for the local geometry pipeline
//!
//! This test suite verifies that:
//! - GeoJSON regions parse, measure and reshape end to end
//! - Reshaped squares always enclose the original bounding box
//! - Local shapes survive a GeoJSON round trip

use geo::{BoundingRect, Contains, Geometry as GeoGeometry, Point, Polygon};
use proptest::prelude::*;
use terrarium_core::models::{AreaUnit, Distance};
use terrarium_geo::*;

const UNIT_SQUARE: &str =
    r#"{"features":[{"geometry":{"coordinates":[[[0,0],[0,1],[1,1],[1,0],[0,0]]]}}]}"#;

fn as_polygon(geometry: &terrarium_core::models::Geometry) -> Polygon {
    match to_geo_geometry(geometry) {
        GeoGeometry::Polygon(polygon) => polygon,
        other => panic!("expected polygon, got {:?}", other),
    }
}

#[test]
fn test_unit_square_scenario() {
    let geometry = parse_geometry(UNIT_SQUARE).unwrap();
    let polygon = as_polygon(&geometry);
    assert_eq!(polygon.exterior().0.len(), 5);

    let measure = area(&polygon);
    let expected = 6_378_137.0_f64.powi(2) * 1.0_f64.to_radians() * 1.0_f64.to_radians().sin();
    assert!((measure.get(AreaUnit::SquareMeters) - (expected * 1000.0).round() / 1000.0).abs() < 1.0);

    let json = serde_json::to_value(measure).unwrap();
    for unit in AreaUnit::ALL {
        assert!(json.get(unit.label()).is_some(), "missing {}", unit.label());
    }

    let c = centroid(&polygon).unwrap();
    assert!((c.longitude - 0.5).abs() < 1e-12);
    assert!((c.latitude - 0.5).abs() < 1e-12);
}

#[test]
fn test_point_document_reshapes_to_square() {
    let doc = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},
        "geometry":{"type":"Point","coordinates":[77.5946,12.9716]}}]}"#;
    let shape = to_local_shape(doc).unwrap();
    let square = reshape_to_square(&shape, Distance::kilometers(2.5)).unwrap();
    assert!(square.contains(&Point::new(77.5946, 12.9716)));

    // A 5 km square is roughly 25 square kilometres
    let measured = area(&square).get(AreaUnit::SquareKilometers);
    assert!((measured - 25.0).abs() < 0.5, "area was {}", measured);

    let out = from_local_shape(&GeoGeometry::Polygon(square)).unwrap();
    assert!(parse_geometry(&out).is_ok());
}

#[test]
fn test_reshaped_region_is_fully_covered_by_itself() {
    let region = as_polygon(&bounding_box_geometry(77.5, 12.9, 77.6, 13.0).unwrap());
    let square = reshape_polygon(&region).unwrap();
    let candidates = vec![
        Candidate::new("square", square.clone()),
        Candidate::new("region", region.clone()),
    ];

    let retained = filter_full_coverage(candidates, &square, CoveragePredicate::exact());
    assert_eq!(retained.len(), 1);
    assert_eq!(retained[0].id, "square");
}

fn rectangle() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-170.0..170.0f64, -80.0..80.0f64, 0.001..5.0f64, 0.001..5.0f64)
}

proptest! {
    #[test]
    fn prop_polygon_square_spans_bbox_diagonal((west, south, width, height) in rectangle()) {
        let region = as_polygon(&bounding_box_geometry(west, south, west + width, south + height).unwrap());
        let square = reshape_polygon(&region).unwrap();
        let bounds = square.bounding_rect().unwrap();
        let diagonal = width.hypot(height);

        prop_assert!((bounds.width() - diagonal).abs() < 1e-9);
        prop_assert!((bounds.height() - diagonal).abs() < 1e-9);
        prop_assert!(bounds.min().x <= west && bounds.max().x >= west + width);
        prop_assert!(bounds.min().y <= south && bounds.max().y >= south + height);
    }

    #[test]
    fn prop_point_square_contains_point(lon in -179.0..179.0f64, lat in -80.0..80.0f64, km in 0.1..50.0f64) {
        let point = Point::new(lon, lat);
        let square = reshape_point(&point, Distance::kilometers(km)).unwrap();
        prop_assert!(square.contains(&point));
    }

    #[test]
    fn prop_local_shape_roundtrip(lon in -179.0..179.0f64, lat in -89.0..89.0f64) {
        let shape = GeoGeometry::Point(Point::new(lon, lat));
        let out = from_local_shape(&shape).unwrap();
        prop_assert_eq!(to_local_shape(&out).unwrap(), shape);
    }
}
