//! Local metric projections for buffering around a point

use geo::{Coord, LineString, Point, Polygon};
use proj::Proj;

use terrarium_core::error::{Result, TerrariumError};

const GEOGRAPHIC: &str = "+proj=longlat +datum=WGS84 +no_defs";

fn projection_error(reason: impl std::fmt::Display) -> TerrariumError {
    TerrariumError::Projection { operation: "reshape point".to_string(), reason: reason.to_string() }
}

/// An azimuthal-equidistant projection centred on a point, mapping metric
/// offsets from the centre back to longitude/latitude.
pub struct LocalProjection {
    center: Point,
    inverse: Proj,
}

impl LocalProjection {
    /// Build the projection centred on `center` (longitude, latitude)
    pub fn azimuthal_equidistant(center: Point) -> Result<Self> {
        if !center.x().is_finite() || !center.y().is_finite() {
            return Err(projection_error(format!(
                "center ({}, {}) is not a finite coordinate",
                center.x(),
                center.y()
            )));
        }

        let definition = format!(
            "+proj=aeqd +lat_0={} +lon_0={} +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs",
            center.y(),
            center.x()
        );

        let inverse = Proj::new_known_crs(&definition, GEOGRAPHIC, None).map_err(|e| {
            projection_error(format!("could not construct projection {}: {}", definition, e))
        })?;

        Ok(Self { center, inverse })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Convert a metric offset from the centre into longitude/latitude
    pub fn to_lon_lat(&self, offset: Coord) -> Result<Coord> {
        let (x, y) = self.inverse.convert((offset.x, offset.y)).map_err(projection_error)?;
        Ok(Coord { x, y })
    }

    /// Convert every vertex of a polygon in metric offsets into longitude/latitude
    pub fn polygon_to_lon_lat(&self, polygon: &Polygon) -> Result<Polygon> {
        let ring = |line: &LineString| -> Result<LineString> {
            line.coords().map(|c| self.to_lon_lat(*c)).collect::<Result<Vec<_>>>().map(LineString::new)
        };

        let exterior = ring(polygon.exterior())?;
        let interiors = polygon.interiors().iter().map(ring).collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}
