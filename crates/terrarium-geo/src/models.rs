//! Conversions between the canonical [`Geometry`] and `geo` crate shapes.

use geo::{Coord, Geometry as GeoGeometry, LineString, Polygon};

pub use terrarium_core::models::{Geometry, GeometryType};

fn to_line(coords: &[[f64; 2]]) -> LineString {
    LineString::new(coords.iter().map(|c| Coord { x: c[0], y: c[1] }).collect())
}

fn to_polygon(rings: &[Vec<[f64; 2]>]) -> Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => Polygon::new(
            to_line(exterior),
            interiors.iter().map(|ring| to_line(ring)).collect(),
        ),
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

fn from_line(line: &LineString) -> Vec<[f64; 2]> {
    line.coords().map(|c| [c.x, c.y]).collect()
}

fn from_polygon(polygon: &Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(from_line)
        .collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(to_line(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(to_polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| to_line(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| to_polygon(p)).collect()),
        ),
    }
}

/// Convert a geo::Geometry to a canonical Geometry.
///
/// Returns `None` for geometry collections, which have no canonical form.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Option<Geometry> {
    let geometry = match geom {
        GeoGeometry::Point(p) => Geometry::point(p.x(), p.y()),
        GeoGeometry::Line(l) => {
            Geometry::line_string(vec![[l.start.x, l.start.y], [l.end.x, l.end.y]])
        }
        GeoGeometry::LineString(ls) => Geometry::line_string(from_line(ls)),
        GeoGeometry::Polygon(p) => Geometry::polygon(from_polygon(p)),
        GeoGeometry::MultiPoint(mp) => {
            Geometry::MultiPoint { coordinates: mp.iter().map(|p| [p.x(), p.y()]).collect() }
        }
        GeoGeometry::MultiLineString(mls) => {
            Geometry::MultiLineString { coordinates: mls.iter().map(from_line).collect() }
        }
        GeoGeometry::MultiPolygon(mp) => {
            Geometry::MultiPolygon { coordinates: mp.iter().map(from_polygon).collect() }
        }
        GeoGeometry::Rect(r) => Geometry::polygon(from_polygon(&r.to_polygon())),
        GeoGeometry::Triangle(t) => Geometry::polygon(from_polygon(&t.to_polygon())),
        GeoGeometry::GeometryCollection(_) => return None,
    };
    Some(geometry)
}

/// Name of a geo::Geometry's kind, for error messages
pub fn geo_kind(geom: &GeoGeometry) -> &'static str {
    match geom {
        GeoGeometry::Point(_) => "Point",
        GeoGeometry::Line(_) => "Line",
        GeoGeometry::LineString(_) => "LineString",
        GeoGeometry::Polygon(_) => "Polygon",
        GeoGeometry::MultiPoint(_) => "MultiPoint",
        GeoGeometry::MultiLineString(_) => "MultiLineString",
        GeoGeometry::MultiPolygon(_) => "MultiPolygon",
        GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        GeoGeometry::Rect(_) => "Rect",
        GeoGeometry::Triangle(_) => "Triangle",
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Get the centroid as coordinates
    fn centroid_coords(&self) -> Option<[f64; 2]>;

    /// Bounds as `[west, south, east, north]`
    fn bounds(&self) -> Option<[f64; 4]>;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn centroid_coords(&self) -> Option<[f64; 2]> {
        use geo::Centroid;
        self.to_geo().centroid().map(|p| [p.x(), p.y()])
    }

    fn bounds(&self) -> Option<[f64; 4]> {
        use geo::BoundingRect;
        self.to_geo()
            .bounding_rect()
            .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
    }
}
