//! Resolution of the latest acquisitions over a region

use chrono::{NaiveDateTime, Utc};
use geo::{Geometry as GeoGeometry, MultiPolygon, Polygon};
use serde_json::Value;
use tracing::{debug, info};

use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::models::Geometry;
use terrarium_core::temporal::{date_buffer, date_range};
use terrarium_geo::models::geo_kind;
use terrarium_geo::{filter_full_coverage, to_geo_geometry, Candidate};

use crate::dates::extract_sorted_dates;
use crate::image::{ImageHandle, SYSTEM_INDEX};
use crate::session::Session;

/// Days searched back from now for the latest acquisition
pub const LATEST_WINDOW_DAYS: u32 = 7;

/// Days searched either side of a target date for a covering image
pub const COVERING_WINDOW_DAYS: u32 = 1;

/// Date of the latest acquisition over `geometry` in the past week
pub fn find_latest_date(session: &Session, geometry: &Geometry) -> Result<Option<NaiveDateTime>> {
    find_latest_date_before(session, geometry, Utc::now().naive_utc())
}

/// Date of the latest acquisition over `geometry` in the week before `now`.
///
/// Returns `None` when nothing was acquired in that window.
pub fn find_latest_date_before(
    session: &Session,
    geometry: &Geometry,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>> {
    let window = date_range(now, LATEST_WINDOW_DAYS, false)?;
    let collection = session.collection().filter_bounds(geometry).filter_date(&window);

    let latest = extract_sorted_dates(session, &collection)?.last().copied();
    debug!(?latest, "Resolved latest acquisition date");
    Ok(latest)
}

/// First image within a day of `date` whose footprint fully covers `geometry`.
///
/// Returns `None` when no image was acquired in the window or none of them
/// covers the region.
pub fn find_covering_image(
    session: &Session,
    date: NaiveDateTime,
    geometry: &Geometry,
) -> Result<Option<ImageHandle>> {
    let target = target_polygon(geometry)?;
    let window = date_buffer(date, COVERING_WINDOW_DAYS)?;
    let collection = session.collection().filter_bounds(geometry).filter_date(&window);

    let footprints = session.compute("generate latest image", &collection.footprints())?;
    let candidates = parse_candidates(&footprints)?;
    if candidates.is_empty() {
        debug!(%date, "No acquisitions in window");
        return Ok(None);
    }

    let covering = filter_full_coverage(candidates, &target, session.settings().coverage);
    Ok(covering.into_iter().next().map(|candidate| {
        let asset_id = session.asset_id(&candidate.id);
        info!(%asset_id, "Found covering image");
        ImageHandle::load(&asset_id)
    }))
}

/// Full asset id of an image in the configured collection
pub fn image_identifier(session: &Session, image: &ImageHandle) -> Result<String> {
    let value = session.compute("generate image identifier", &image.property(SYSTEM_INDEX))?;
    let index = value.as_str().ok_or_else(|| {
        TerrariumError::remote("generate image identifier", "image has no system index")
    })?;
    Ok(session.asset_id(index))
}

fn target_polygon(geometry: &Geometry) -> Result<Polygon> {
    match to_geo_geometry(geometry) {
        GeoGeometry::Polygon(polygon) => Ok(polygon),
        _ => Err(TerrariumError::ShapeType {
            operation: "filter coverage".to_string(),
            kind: geometry.geometry_type().to_string(),
        }),
    }
}

/// Candidates from a feature collection of footprints tagged with their index
fn parse_candidates(footprints: &Value) -> Result<Vec<Candidate>> {
    let invalid = |reason: String| TerrariumError::remote("filter coverage", reason);

    let features = footprints
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("footprints are not a feature collection".to_string()))?;

    features
        .iter()
        .map(|feature| {
            let id = feature
                .pointer("/properties/index")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("footprint has no index".to_string()))?;

            let geometry = feature
                .get("geometry")
                .cloned()
                .ok_or_else(|| invalid(format!("footprint {} has no geometry", id)))?;
            let geometry = geojson::Geometry::from_json_value(geometry)
                .map_err(|e| invalid(format!("footprint {} is not geojson. {}", id, e)))?;
            let shape = GeoGeometry::<f64>::try_from(geometry.value)
                .map_err(|e| invalid(format!("footprint {} is not geojson. {}", id, e)))?;

            let footprint = match shape {
                GeoGeometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                GeoGeometry::MultiPolygon(multi) => multi,
                other => {
                    return Err(invalid(format!(
                        "footprint {} is a {}, expected a polygon",
                        id,
                        geo_kind(&other)
                    )))
                }
            };
            Ok(Candidate::new(id, footprint))
        })
        .collect()
}
