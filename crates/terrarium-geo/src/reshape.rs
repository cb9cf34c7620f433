//! Square reshaping of acquisition regions
//!
//! Every supported shape is turned into an axis-aligned square polygon in
//! lon/lat degrees: polygons and line-strings through their bounding box,
//! points through a metric buffer in a local projection.

use geo::{BoundingRect, Coord, Geometry as GeoGeometry, LineString, Point, Polygon, Rect};
use tracing::debug;

use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::models::Distance;

use crate::models::geo_kind;
use crate::transform::LocalProjection;

/// Buffer applied around a point when no explicit distance is given
pub const DEFAULT_POINT_BUFFER_KM: f64 = 2.5;

/// Square of half-side `half` centred on `center`, closed and counter-clockwise
fn square(center: Coord, half: f64) -> Polygon {
    Rect::new(
        Coord { x: center.x - half, y: center.y - half },
        Coord { x: center.x + half, y: center.y + half },
    )
    .to_polygon()
}

fn square_around_bounds(operation: &str, bounds: Option<Rect>) -> Result<Polygon> {
    let bounds = bounds.ok_or_else(|| TerrariumError::InvalidArgument {
        operation: operation.to_string(),
        reason: "shape has no coordinates".to_string(),
    })?;

    let diagonal = bounds.width().hypot(bounds.height());
    if !diagonal.is_finite() || diagonal <= 0.0 {
        return Err(TerrariumError::InvalidArgument {
            operation: operation.to_string(),
            reason: format!("shape has no spatial extent (diagonal {})", diagonal),
        });
    }

    Ok(square(bounds.center(), diagonal / 2.0))
}

/// Reshape a polygon into the square centred on its bounding box whose
/// half-side is half the bounding-box diagonal.
pub fn reshape_polygon(polygon: &Polygon) -> Result<Polygon> {
    square_around_bounds("reshape polygon", polygon.bounding_rect())
}

/// Reshape a line-string through its envelope, see [`reshape_polygon`]
pub fn reshape_linestring(line: &LineString) -> Result<Polygon> {
    square_around_bounds("reshape linestring", line.bounding_rect())
}

/// Reshape a point into a square of half-side `buffer` metres around it.
///
/// The square is built in an azimuthal-equidistant projection centred on the
/// point and projected back to lon/lat, so its sides are true distances.
pub fn reshape_point(point: &Point, buffer: Distance) -> Result<Polygon> {
    let half = buffer.to_meters();
    if !half.is_finite() || half <= 0.0 {
        return Err(TerrariumError::InvalidArgument {
            operation: "reshape point".to_string(),
            reason: format!("buffer must be a positive distance, got {} m", half),
        });
    }

    let projection = LocalProjection::azimuthal_equidistant(*point)?;
    let local = square(Coord { x: 0.0, y: 0.0 }, half);
    projection.polygon_to_lon_lat(&local)
}

/// Reshape any supported shape into a square polygon.
///
/// Points use `point_buffer` (see [`DEFAULT_POINT_BUFFER_KM`]); other shape
/// kinds fail with a shape-type error.
pub fn reshape_to_square(shape: &GeoGeometry, point_buffer: Distance) -> Result<Polygon> {
    debug!(kind = geo_kind(shape), "Reshaping shape to square");
    match shape {
        GeoGeometry::Polygon(polygon) => reshape_polygon(polygon),
        GeoGeometry::Point(point) => reshape_point(point, point_buffer),
        GeoGeometry::LineString(line) => reshape_linestring(line),
        other => Err(TerrariumError::ShapeType {
            operation: "reshape geometry".to_string(),
            kind: geo_kind(other).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Contains};

    fn default_buffer() -> Distance {
        Distance::kilometers(DEFAULT_POINT_BUFFER_KM)
    }

    #[test]
    fn test_reshape_rectangle() {
        let rect = polygon![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 3.0), (x: 0.0, y: 3.0)];
        let reshaped = reshape_polygon(&rect).unwrap();
        let bounds = reshaped.bounding_rect().unwrap();

        // Diagonal of the 4x3 box is 5, so the square spans 5 on each side
        assert!((bounds.width() - 5.0).abs() < 1e-12);
        assert!((bounds.height() - 5.0).abs() < 1e-12);
        assert_eq!(bounds.center(), Coord { x: 2.0, y: 1.5 });
        assert!(reshaped.contains(&rect));
    }

    #[test]
    fn test_reshape_linestring_uses_envelope() {
        let line = LineString::from(vec![(10.0, 10.0), (11.0, 12.0), (12.0, 10.5)]);
        let reshaped = reshape_linestring(&line).unwrap();
        let bounds = reshaped.bounding_rect().unwrap();
        let diagonal = 2.0_f64.hypot(2.0);
        assert!((bounds.width() - diagonal).abs() < 1e-12);
        assert_eq!(bounds.center(), Coord { x: 11.0, y: 11.0 });
    }

    #[test]
    fn test_reshape_horizontal_linestring() {
        let line = LineString::from(vec![(0.0, 5.0), (2.0, 5.0)]);
        let bounds = reshape_linestring(&line).unwrap().bounding_rect().unwrap();
        assert!((bounds.width() - 2.0).abs() < 1e-12);
        assert!((bounds.height() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_reshape_point() {
        let point = Point::new(77.5946, 12.9716);
        let reshaped = reshape_point(&point, default_buffer()).unwrap();
        assert_eq!(reshaped.exterior().0.len(), 5);
        assert!(reshaped.contains(&point));

        let bounds = reshaped.bounding_rect().unwrap();
        // 5 km of latitude is ~0.045 degrees
        assert!((bounds.height() - 0.0452).abs() < 1e-3);
        assert!((bounds.center().x - point.x()).abs() < 1e-6);
    }

    #[test]
    fn test_reshape_point_rejects_empty_buffer() {
        let point = Point::new(0.0, 0.0);
        assert!(reshape_point(&point, Distance::meters(0.0)).is_err());
    }

    #[test]
    fn test_reshape_dispatch() {
        let point = GeoGeometry::Point(Point::new(0.0, 0.0));
        assert!(reshape_to_square(&point, default_buffer()).is_ok());

        let multi = GeoGeometry::MultiPoint(geo::MultiPoint::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        match reshape_to_square(&multi, default_buffer()) {
            Err(TerrariumError::ShapeType { kind, .. }) => assert_eq!(kind, "MultiPoint"),
            other => panic!("expected shape type error, got {:?}", other),
        }
    }
}
