//! Handles over remote images, collections and geometries
//!
//! Every transform returns a new handle wrapping a larger expression, the
//! receiver is never modified.

use serde_json::{json, Value};

use terrarium_core::models::{Crs, DateRange, Geometry};
use terrarium_core::temporal::millis_from_datetime;

use crate::expression::Expr;

/// Property carrying the acquisition time of an image
pub const TIME_START: &str = "system:time_start";

/// Property carrying the index of an image within its collection
pub const SYSTEM_INDEX: &str = "system:index";

/// Encode a canonical geometry as a platform geometry constructor
pub fn geometry_expr(geometry: &Geometry) -> Expr {
    let (function, coordinates) = match geometry {
        Geometry::Point { coordinates } => ("GeometryConstructors.Point", json!(coordinates)),
        Geometry::LineString { coordinates } => {
            ("GeometryConstructors.LineString", json!(coordinates))
        }
        Geometry::Polygon { coordinates } => ("GeometryConstructors.Polygon", json!(coordinates)),
        Geometry::MultiPoint { coordinates } => {
            ("GeometryConstructors.MultiPoint", json!(coordinates))
        }
        Geometry::MultiLineString { coordinates } => {
            ("GeometryConstructors.MultiLineString", json!(coordinates))
        }
        Geometry::MultiPolygon { coordinates } => {
            ("GeometryConstructors.MultiPolygon", json!(coordinates))
        }
    };

    let mut arguments = vec![("coordinates", Expr::Constant(coordinates))];
    if matches!(geometry, Geometry::Polygon { .. } | Geometry::MultiPolygon { .. }) {
        arguments.push(("evenOdd", Expr::constant(true)));
    }
    Expr::call(function, arguments)
}

/// Resampling modes for upsampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    Bilinear,
    Bicubic,
}

impl Resampling {
    fn as_str(&self) -> &'static str {
        match self {
            Resampling::Bilinear => "bilinear",
            Resampling::Bicubic => "bicubic",
        }
    }
}

/// Target spatial reference of a reprojection
#[derive(Debug, Clone, PartialEq)]
pub enum Reprojection {
    /// A fixed coordinate reference system
    Fixed(Crs),
    /// The spatial reference the image already has
    Native,
}

/// Parameters of a visualization pass; empty band or palette lists are omitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visualization {
    pub bands: &'static [&'static str],
    pub min: f64,
    pub max: f64,
    pub palette: &'static [&'static str],
}

/// An opaque, immutable reference to a remote raster
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    expr: Expr,
}

impl ImageHandle {
    pub fn from_expr(expr: Expr) -> Self {
        Self { expr }
    }

    /// Reference an image asset by its full id
    pub fn load(asset_id: &str) -> Self {
        Self::from_expr(Expr::call("Image.load", [("id", Expr::string(asset_id))]))
    }

    /// A constant image with the same value in every pixel
    pub fn constant(value: f64) -> Self {
        Self::from_expr(Expr::call("Image.constant", [("value", Expr::constant(value))]))
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }

    fn unary(&self, function: &str, argument: &str) -> Self {
        Self::from_expr(Expr::call(function, [(argument, self.expr.clone())]))
    }

    fn binary(&self, function: &str, other: &ImageHandle) -> Self {
        Self::from_expr(Expr::call(
            function,
            [("image1", self.expr.clone()), ("image2", other.expr.clone())],
        ))
    }

    pub fn select<S: AsRef<str>>(&self, bands: &[S]) -> Self {
        Self::from_expr(Expr::call(
            "Image.select",
            [("input", self.expr.clone()), ("bandSelectors", Expr::strings(bands))],
        ))
    }

    pub fn rename<S: AsRef<str>>(&self, names: &[S]) -> Self {
        Self::from_expr(Expr::call(
            "Image.rename",
            [("input", self.expr.clone()), ("names", Expr::strings(names))],
        ))
    }

    pub fn add(&self, other: &ImageHandle) -> Self {
        self.binary("Image.add", other)
    }

    pub fn subtract(&self, other: &ImageHandle) -> Self {
        self.binary("Image.subtract", other)
    }

    pub fn multiply(&self, other: &ImageHandle) -> Self {
        self.binary("Image.multiply", other)
    }

    pub fn divide(&self, other: &ImageHandle) -> Self {
        self.binary("Image.divide", other)
    }

    pub fn to_float(&self) -> Self {
        self.unary("Image.toFloat", "value")
    }

    pub fn to_int(&self) -> Self {
        self.unary("Image.toInt", "value")
    }

    pub fn resample(&self, mode: Resampling) -> Self {
        Self::from_expr(Expr::call(
            "Image.resample",
            [("image", self.expr.clone()), ("mode", Expr::string(mode.as_str()))],
        ))
    }

    /// Spatial reference of the image
    pub fn projection(&self) -> Expr {
        self.unary("Image.projection", "image").into_expr()
    }

    /// Footprint of the image
    pub fn geometry(&self) -> Expr {
        self.unary("Image.geometry", "feature").into_expr()
    }

    /// Reproject at `scale` metres per pixel
    pub fn reproject(&self, target: &Reprojection, scale: Option<f64>) -> Self {
        let crs = match target {
            Reprojection::Fixed(crs) => {
                Expr::call("Projection", [("crs", Expr::string(&crs.code()))])
            }
            Reprojection::Native => self.projection(),
        };
        self.reproject_to(crs, scale)
    }

    /// Reproject onto a projection expression
    pub fn reproject_to(&self, projection: Expr, scale: Option<f64>) -> Self {
        let mut arguments = vec![("image", self.expr.clone()), ("crs", projection)];
        if let Some(scale) = scale {
            arguments.push(("scale", Expr::constant(scale)));
        }
        Self::from_expr(Expr::call("Image.reproject", arguments))
    }

    /// Median filter over a square kernel of `radius` pixels
    pub fn focal_median(&self, radius: f64) -> Self {
        Self::from_expr(Expr::call(
            "Image.focal_median",
            [
                ("image", self.expr.clone()),
                ("radius", Expr::constant(radius)),
                ("kernelType", Expr::string("square")),
            ],
        ))
    }

    pub fn visualize(&self, params: &Visualization) -> Self {
        let mut arguments = vec![
            ("image", self.expr.clone()),
            ("min", Expr::constant(params.min)),
            ("max", Expr::constant(params.max)),
        ];
        if !params.bands.is_empty() {
            arguments.push(("bands", Expr::strings(params.bands)));
        }
        if !params.palette.is_empty() {
            arguments.push(("palette", Expr::strings(params.palette)));
        }
        Self::from_expr(Expr::call("Image.visualize", arguments))
    }

    pub fn clip(&self, geometry: Expr) -> Self {
        Self::from_expr(Expr::call(
            "Image.clip",
            [("input", self.expr.clone()), ("geometry", geometry)],
        ))
    }

    /// Value of a metadata property
    pub fn property(&self, name: &str) -> Expr {
        Expr::call("Element.get", [("object", self.expr.clone()), ("property", Expr::string(name))])
    }
}

/// An opaque, immutable reference to a remote image collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionHandle {
    expr: Expr,
}

impl CollectionHandle {
    pub fn from_expr(expr: Expr) -> Self {
        Self { expr }
    }

    /// Reference a collection asset by id
    pub fn load(collection_id: &str) -> Self {
        Self::from_expr(Expr::call("ImageCollection.load", [("id", Expr::string(collection_id))]))
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    fn filter(&self, filter: Expr) -> Self {
        Self::from_expr(Expr::call(
            "Collection.filter",
            [("collection", self.expr.clone()), ("filter", filter)],
        ))
    }

    /// Keep images whose footprint intersects `geometry`
    pub fn filter_bounds(&self, geometry: &Geometry) -> Self {
        self.filter(Expr::call(
            "Filter.intersects",
            [("leftField", Expr::string(".all")), ("rightValue", geometry_expr(geometry))],
        ))
    }

    /// Keep images acquired within `range`, end exclusive
    pub fn filter_date(&self, range: &DateRange) -> Self {
        let date_range = Expr::call(
            "DateRange",
            [
                ("start", Expr::constant(millis_from_datetime(range.start))),
                ("end", Expr::constant(millis_from_datetime(range.end))),
            ],
        );
        self.filter(Expr::call(
            "Filter.dateRangeContains",
            [("leftValue", date_range), ("rightField", Expr::string(TIME_START))],
        ))
    }

    /// Apply an image transform to every image of the collection
    pub fn map(&self, algorithm: impl FnOnce(ImageHandle) -> ImageHandle) -> Self {
        self.map_expr(Expr::lambda(|image| algorithm(ImageHandle::from_expr(image)).into_expr()))
    }

    fn map_expr(&self, base_algorithm: Expr) -> Self {
        Self::from_expr(Expr::call(
            "Collection.map",
            [("collection", self.expr.clone()), ("baseAlgorithm", base_algorithm)],
        ))
    }

    /// Number of images in the collection
    pub fn size(&self) -> Expr {
        Expr::call("Collection.size", [("collection", self.expr.clone())])
    }

    pub fn first(&self) -> ImageHandle {
        ImageHandle::from_expr(Expr::call("Collection.first", [("collection", self.expr.clone())]))
    }

    /// Composite the collection, later images taking priority where they overlap
    pub fn mosaic(&self) -> ImageHandle {
        ImageHandle::from_expr(Expr::call(
            "ImageCollection.mosaic",
            [("collection", self.expr.clone())],
        ))
    }

    /// Values of a property across every image
    pub fn aggregate_array(&self, property: &str) -> Expr {
        Expr::call(
            "AggregateFeatureCollection.array",
            [("collection", self.expr.clone()), ("property", Expr::string(property))],
        )
    }

    /// Feature collection of every image footprint, tagged with its index
    pub fn footprints(&self) -> Expr {
        self.map_expr(Expr::lambda(|image| {
            let image = ImageHandle::from_expr(image);
            let metadata = Expr::Dictionary(
                [("index".to_string(), image.property(SYSTEM_INDEX))].into_iter().collect(),
            );
            Expr::call("Feature", [("geometry", image.geometry()), ("metadata", metadata)])
        }))
        .expr
    }
}

/// Decode a platform number into an integer count
pub fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_transforms_are_non_destructive() {
        let image = ImageHandle::load("COPERNICUS/S2_SR/x");
        let selected = image.select(&["B4"]);
        assert_eq!(image.expr().function_name(), Some("Image.load"));
        assert_eq!(selected.expr().function_name(), Some("Image.select"));
        assert_eq!(selected.expr().argument("input"), Some(image.expr()));
    }

    #[test]
    fn test_polygon_geometry_expr() {
        let geometry = Geometry::bbox(0.0, 0.0, 1.0, 1.0);
        let expr = geometry_expr(&geometry);
        assert_eq!(expr.function_name(), Some("GeometryConstructors.Polygon"));
        assert_eq!(
            expr.argument("coordinates"),
            Some(&Expr::Constant(json!([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]])))
        );
        assert!(geometry_expr(&Geometry::point(1.0, 2.0)).argument("evenOdd").is_none());
    }

    #[test]
    fn test_filter_date_uses_millis() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let range = DateRange::new(start, end).unwrap();
        let filtered = CollectionHandle::load("C").filter_date(&range);

        let filter = filtered.expr().argument("filter").unwrap();
        let date_range = filter.argument("leftValue").unwrap();
        assert_eq!(date_range.argument("start"), Some(&Expr::constant(1_609_459_200_000_i64)));
        assert_eq!(date_range.argument("end"), Some(&Expr::constant(1_609_545_600_000_i64)));
    }

    #[test]
    fn test_native_reprojection_references_own_projection() {
        let image = ImageHandle::load("a");
        let reprojected = image.reproject(&Reprojection::Native, Some(1.0));
        let crs = reprojected.expr().argument("crs").unwrap();
        assert_eq!(crs.function_name(), Some("Image.projection"));
        assert_eq!(crs.argument("image"), Some(image.expr()));
    }

    #[test]
    fn test_count_decoding() {
        assert_eq!(as_count(&json!(3)), Some(3));
        assert_eq!(as_count(&json!(3.0)), Some(3));
        assert_eq!(as_count(&json!("3")), None);
    }
}
