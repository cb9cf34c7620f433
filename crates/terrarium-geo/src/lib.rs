//! Terrarium Geo - Geometry parsing, reshaping, measurement and coverage
//!
//! This crate handles every local geometric operation: GeoJSON parsing into
//! canonical and `geo` shapes, square reshaping for acquisition regions,
//! geodesic area and centroids, and coverage scoring of image footprints.

pub mod coverage;
pub mod document;
pub mod locate;
pub mod measure;
pub mod models;
pub mod reshape;
pub mod transform;
pub mod validation;

pub use coverage::{coverage_score, filter_full_coverage, Candidate, CoveragePredicate};
pub use document::{
    bounding_box_geometry, feature_collection, from_local_shape, parse_geometry,
    parse_geometry_value, to_local_shape,
};
pub use locate::{reverse_geocode, UNKNOWN_LOCATION};
pub use measure::{area, centroid, geodesic_area};
pub use models::{from_geo_geometry, to_geo_geometry, GeometryExt};
pub use reshape::{reshape_linestring, reshape_point, reshape_polygon, reshape_to_square};
