//! Geodesic area and centroid measurements

use geo::{Centroid as _, ChamberlainDuquetteArea, Geometry as GeoGeometry, Polygon};

use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::models::{AreaMeasure, Centroid};

use crate::models::geo_kind;

/// Geodesic area of a polygon in square meters.
///
/// Uses the spherical ring-area formula of Chamberlain and Duquette on the
/// WGS84 equatorial radius; interior rings are subtracted.
pub fn geodesic_area(polygon: &Polygon) -> f64 {
    polygon.chamberlain_duquette_unsigned_area()
}

/// Area of a polygon in every supported unit, rounded to 3 decimals
pub fn area(polygon: &Polygon) -> AreaMeasure {
    AreaMeasure::from_square_meters(geodesic_area(polygon))
}

/// Area of an arbitrary shape, which must be a polygon
pub fn area_of_shape(shape: &GeoGeometry) -> Result<AreaMeasure> {
    match shape {
        GeoGeometry::Polygon(polygon) => Ok(area(polygon)),
        other => Err(TerrariumError::ShapeType {
            operation: "calculate area".to_string(),
            kind: geo_kind(other).to_string(),
        }),
    }
}

/// Planar centroid of a polygon
pub fn centroid(polygon: &Polygon) -> Result<Centroid> {
    let point = polygon.centroid().ok_or_else(|| TerrariumError::InvalidArgument {
        operation: "generate centroid".to_string(),
        reason: "polygon is empty".to_string(),
    })?;
    Ok(Centroid { longitude: point.x(), latitude: point.y() })
}

/// Centroid of an arbitrary shape, which must be a polygon
pub fn centroid_of_shape(shape: &GeoGeometry) -> Result<Centroid> {
    match shape {
        GeoGeometry::Polygon(polygon) => centroid(polygon),
        other => Err(TerrariumError::ShapeType {
            operation: "generate centroid".to_string(),
            kind: geo_kind(other).to_string(),
        }),
    }
}
