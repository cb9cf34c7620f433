//! GeoJSON document handling
//!
//! Only the first feature of a document is read. [`parse_geometry`] further
//! keeps only the first coordinate ring of that feature; additional features
//! and rings are ignored.

use geo::Geometry as GeoGeometry;
use serde_json::Value;

use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::models::Geometry;

use crate::models::{geo_kind, to_geo_geometry};
use crate::validation::validate_geometry;

fn missing_key(key: &str) -> TerrariumError {
    TerrariumError::geometry_parse(format!("corrupt geojson. missing key: '{}'", key))
}

fn missing_feature() -> TerrariumError {
    TerrariumError::geometry_parse("corrupt geojson. missing feature or coordinates")
}

/// The geometry object of the first feature in a document
fn first_feature_geometry(document: &Value) -> Result<&Value> {
    let features = document.get("features").ok_or_else(|| missing_key("features"))?;
    let feature = features.get(0).ok_or_else(missing_feature)?;
    feature.get("geometry").ok_or_else(|| missing_key("geometry"))
}

fn parse_position(value: &Value) -> Result<[f64; 2]> {
    let position = value.as_array().ok_or_else(|| {
        TerrariumError::geometry_parse(format!("position must be an array, found {}", value))
    })?;
    match (position.first().and_then(Value::as_f64), position.get(1).and_then(Value::as_f64)) {
        (Some(x), Some(y)) => Ok([x, y]),
        _ => Err(TerrariumError::geometry_parse(format!(
            "position must hold two numbers, found {}",
            value
        ))),
    }
}

/// Parse a GeoJSON string into a polygon from the first ring of its first feature
pub fn parse_geometry(geojson: &str) -> Result<Geometry> {
    let document: Value = serde_json::from_str(geojson)
        .map_err(|e| TerrariumError::geometry_parse(format!("invalid json. {}", e)))?;
    parse_geometry_value(&document)
}

/// Parse an already-decoded GeoJSON document, see [`parse_geometry`]
pub fn parse_geometry_value(document: &Value) -> Result<Geometry> {
    let geometry = first_feature_geometry(document)?;
    let coordinates = geometry.get("coordinates").ok_or_else(|| missing_key("coordinates"))?;
    let ring = coordinates.get(0).and_then(Value::as_array).ok_or_else(missing_feature)?;

    let mut ring = ring.iter().map(parse_position).collect::<Result<Vec<_>>>()?;

    // The platform accepts open rings, close them here so validation sees a proper ring
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }

    let polygon = Geometry::polygon(vec![ring]);
    let validation = validate_geometry(&polygon);
    if !validation.is_valid {
        return Err(TerrariumError::geometry_parse(format!(
            "invalid polygon. {}",
            validation.first_reason().unwrap_or("invalid ring")
        )));
    }

    Ok(polygon)
}

/// Build an axis-aligned rectangular polygon from four bounds in degrees
pub fn bounding_box_geometry(west: f64, south: f64, east: f64, north: f64) -> Result<Geometry> {
    let finite = [west, south, east, north].iter().all(|v| v.is_finite());
    if !finite || west >= east || south >= north {
        return Err(TerrariumError::InvalidArgument {
            operation: "construct bounding box".to_string(),
            reason: format!(
                "bounds must be finite with west < east and south < north, got ({}, {}, {}, {})",
                west, south, east, north
            ),
        });
    }
    Ok(Geometry::bbox(west, south, east, north))
}

/// Parse the first feature of a GeoJSON string into a local `geo` shape.
///
/// A geometry without a `type` member is read as a polygon ring, the same
/// way [`parse_geometry`] reads it.
pub fn to_local_shape(geojson: &str) -> Result<GeoGeometry> {
    let document: Value = serde_json::from_str(geojson)
        .map_err(|e| TerrariumError::geometry_parse(format!("invalid json. {}", e)))?;
    let geometry = first_feature_geometry(&document)?;

    if geometry.get("type").is_none() {
        return Ok(to_geo_geometry(&parse_geometry_value(&document)?));
    }

    let geometry = geojson::Geometry::from_json_value(geometry.clone()).map_err(|e| {
        TerrariumError::geometry_parse(format!("could not construct geometry. {}", e))
    })?;

    GeoGeometry::<f64>::try_from(geometry.value).map_err(|e| {
        TerrariumError::geometry_parse(format!("could not construct geometry. {}", e))
    })
}

/// Serialize a point, line-string or polygon into a single-feature GeoJSON collection
pub fn from_local_shape(shape: &GeoGeometry) -> Result<String> {
    match shape {
        GeoGeometry::Point(_) | GeoGeometry::LineString(_) | GeoGeometry::Polygon(_) => {}
        other => {
            return Err(TerrariumError::UnsupportedShape { kind: geo_kind(other).to_string() })
        }
    }

    let feature = geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(shape))),
        id: None,
        properties: Some(serde_json::Map::new()),
        foreign_members: None,
    };
    let collection =
        geojson::FeatureCollection { bbox: None, features: vec![feature], foreign_members: None };

    Ok(serde_json::to_string(&collection)?)
}

/// Wrap a canonical geometry into a single-feature GeoJSON collection value
pub fn feature_collection(geometry: &Geometry) -> Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {},
                "geometry": geometry.to_geojson(),
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str =
        r#"{"features":[{"geometry":{"coordinates":[[[0,0],[0,1],[1,1],[1,0],[0,0]]]}}]}"#;

    #[test]
    fn test_parse_unit_square() {
        let polygon = parse_geometry(SQUARE).unwrap();
        let ring = polygon.exterior().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[1], [0.0, 1.0]);
    }

    #[test]
    fn test_parse_closes_open_ring() {
        let doc = r#"{"features":[{"geometry":{"coordinates":[[[0,0],[0,1],[1,1],[1,0]]]}}]}"#;
        let polygon = parse_geometry(doc).unwrap();
        let ring = polygon.exterior().unwrap();
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_parse_keeps_first_feature_only() {
        let doc = r#"{"features":[
            {"geometry":{"coordinates":[[[0,0],[0,1],[1,1],[0,0]]]}},
            {"geometry":{"coordinates":[[[5,5],[5,6],[6,6],[5,5]]]}}
        ]}"#;
        let polygon = parse_geometry(doc).unwrap();
        assert_eq!(polygon.exterior().unwrap()[0], [0.0, 0.0]);
    }

    #[test]
    fn test_parse_ignores_altitude() {
        let doc = r#"{"features":[{"geometry":{"coordinates":[[[0,0,9],[0,1,9],[1,1,9],[0,0,9]]]}}]}"#;
        assert!(parse_geometry(doc).is_ok());
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("not json", "invalid json"),
            (r#"{"type":"FeatureCollection"}"#, "missing key: 'features'"),
            (r#"{"features":[]}"#, "missing feature"),
            (r#"{"features":[{}]}"#, "missing key: 'geometry'"),
            (r#"{"features":[{"geometry":{}}]}"#, "missing key: 'coordinates'"),
            (r#"{"features":[{"geometry":{"coordinates":[]}}]}"#, "missing feature"),
            (r#"{"features":[{"geometry":{"coordinates":[[[0,0],[1,1]]]}}]}"#, "at least 4"),
        ];

        for (doc, expected) in cases {
            match parse_geometry(doc) {
                Err(TerrariumError::GeometryParse { reason }) => {
                    assert!(reason.contains(expected), "{} -> {}", doc, reason)
                }
                other => panic!("expected parse error for {}, got {:?}", doc, other),
            }
        }
    }

    #[test]
    fn test_bounding_box() {
        let bbox = bounding_box_geometry(77.5, 12.9, 77.6, 13.0).unwrap();
        assert_eq!(bbox.exterior().unwrap()[0], [77.5, 12.9]);
        assert!(bounding_box_geometry(1.0, 0.0, 0.0, 1.0).is_err());
        assert!(bounding_box_geometry(0.0, 0.0, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_local_shape_roundtrip() {
        let doc = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},
            "geometry":{"type":"LineString","coordinates":[[0.0,0.0],[2.0,1.0]]}}]}"#;
        let shape = to_local_shape(doc).unwrap();
        assert!(matches!(shape, GeoGeometry::LineString(_)));

        let out = from_local_shape(&shape).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["properties"], serde_json::json!({}));
        assert_eq!(value["features"][0]["geometry"]["type"], "LineString");
        assert_eq!(to_local_shape(&out).unwrap(), shape);
    }

    #[test]
    fn test_from_local_shape_rejects_multi() {
        let multi = GeoGeometry::MultiPoint(geo::MultiPoint::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        match from_local_shape(&multi) {
            Err(TerrariumError::UnsupportedShape { kind }) => assert_eq!(kind, "MultiPoint"),
            other => panic!("expected unsupported shape, got {:?}", other),
        }
    }

    #[test]
    fn test_untyped_polygon_roundtrips_through_local_shape() {
        let canonical = parse_geometry(SQUARE).unwrap();

        let shape = to_local_shape(SQUARE).unwrap();
        assert!(matches!(shape, GeoGeometry::Polygon(_)));

        let out = from_local_shape(&shape).unwrap();
        let back = parse_geometry(&out).unwrap();
        assert_eq!(back.exterior(), canonical.exterior());
        assert_eq!(to_local_shape(&out).unwrap(), shape);
    }

    #[test]
    fn test_untyped_geometry_errors_like_parse_geometry() {
        let doc = r#"{"features":[{"geometry":{"coordinates":[[[0,0],[1,1]]]}}]}"#;
        assert!(matches!(to_local_shape(doc), Err(TerrariumError::GeometryParse { .. })));
    }

    #[test]
    fn test_feature_collection_envelope() {
        let value = feature_collection(&Geometry::point(1.0, 2.0));
        assert_eq!(value["features"][0]["geometry"]["coordinates"], serde_json::json!([1.0, 2.0]));
    }
}
