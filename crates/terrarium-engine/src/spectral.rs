//! Spectral derivations of Sentinel-2 imagery
//!
//! Both products upsample to 1 m with bicubic interpolation. NDVI is further
//! discretized into ten intensity steps and smoothed with a square median
//! filter before visualization.

use chrono::NaiveDateTime;
use tracing::debug;

use terrarium_core::error::Result;
use terrarium_core::models::{Crs, Geometry, SpectralIndex};
use terrarium_core::temporal::fractional_date_buffer;

use crate::image::{geometry_expr, ImageHandle, Reprojection, Resampling, Visualization};
use crate::palette::{NDVI_FOCAL, NDVI_RAW, S2_TRUE_COLOR, TRUE_COLOR_BANDS};
use crate::session::Session;

/// Resolution of derived products in metres per pixel
pub const SPECTRAL_SCALE: f64 = 1.0;

/// Radius in pixels of the NDVI median filter
pub const FOCAL_RADIUS: f64 = 5.0;

/// Half-width in days of the acquisition window for composites
pub const COMPOSITE_WINDOW_DAYS: f64 = 0.5;

const NIR_BAND: &str = "B8";
const RED_BAND: &str = "B4";

fn upsample(image: &ImageHandle, reprojection: &Reprojection) -> ImageHandle {
    image.resample(Resampling::Bicubic).reproject(reprojection, Some(SPECTRAL_SCALE))
}

/// True color composite of the TCI bands
pub fn true_color(image: &ImageHandle, reprojection: &Reprojection, visualize: bool) -> ImageHandle {
    let upsampled = upsample(&image.select(&TRUE_COLOR_BANDS), reprojection);
    if visualize {
        upsampled.visualize(&S2_TRUE_COLOR)
    } else {
        upsampled
    }
}

/// Unscaled NDVI, `(NIR - RED) / (NIR + RED)`, upsampled but not filtered.
///
/// Vegetated pixels fall in `[0, 1]`, matching [`NDVI_RAW`].
pub fn raw_ndvi(image: &ImageHandle, reprojection: &Reprojection, visualize: bool) -> ImageHandle {
    let nir = image.select(&[NIR_BAND]);
    let red = image.select(&[RED_BAND]);
    let index = nir.subtract(&red).divide(&nir.add(&red)).rename(&["NDVI"]);

    let upsampled = upsample(&index, reprojection);
    if visualize {
        upsampled.visualize(&NDVI_RAW)
    } else {
        upsampled
    }
}

/// Normalized difference vegetation index, `(NIR - RED) / (NIR + RED)`.
///
/// The result is scaled into `[0, 10]`, truncated to whole steps and median
/// filtered, so [`NDVI_FOCAL`] is the matching visualization.
pub fn ndvi(image: &ImageHandle, reprojection: &Reprojection, visualize: bool) -> ImageHandle {
    let focal = raw_ndvi(image, reprojection, false)
        .to_float()
        .multiply(&ImageHandle::constant(10.0))
        .to_int()
        .to_float()
        .focal_median(FOCAL_RADIUS);

    if visualize {
        focal.visualize(&NDVI_FOCAL)
    } else {
        focal
    }
}

type Derivation = fn(&ImageHandle, &Reprojection, bool) -> ImageHandle;

/// Per-image algorithm of an index and the visualization of its composite
fn derivation(index: SpectralIndex) -> (Derivation, Visualization) {
    match index {
        SpectralIndex::TrueColor => (true_color as Derivation, S2_TRUE_COLOR),
        SpectralIndex::Ndvi => (ndvi as Derivation, NDVI_FOCAL),
    }
}

/// Composite spectral image of `geometry` for the acquisitions around `date`.
///
/// Every acquisition within half a day of `date` is transformed, mosaicked
/// with later images on top, visualized, clipped to `geometry` and put back
/// into the projection of the first transformed image. Fails for any index
/// other than `TCI` or `NDVI`.
pub fn generate_spectral_image(
    session: &Session,
    date: NaiveDateTime,
    geometry: &Geometry,
    index: &str,
) -> Result<ImageHandle> {
    let index: SpectralIndex = index.parse()?;
    spectral_image(session, date, geometry, index)
}

/// Typed form of [`generate_spectral_image`]
pub fn spectral_image(
    session: &Session,
    date: NaiveDateTime,
    geometry: &Geometry,
    index: SpectralIndex,
) -> Result<ImageHandle> {
    debug!(%date, %index, "Building spectral composite");
    let window = fractional_date_buffer(date, COMPOSITE_WINDOW_DAYS)?;
    let (algorithm, visualization) = derivation(index);
    let reprojection = Reprojection::Fixed(Crs::wgs84());

    let transformed = session
        .collection()
        .filter_bounds(geometry)
        .filter_date(&window)
        .map(|image| algorithm(&image, &reprojection, false));

    Ok(transformed
        .mosaic()
        .visualize(&visualization)
        .clip(geometry_expr(geometry))
        .reproject_to(transformed.first().projection(), None))
}
