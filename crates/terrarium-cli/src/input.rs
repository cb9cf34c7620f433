//! Parsing of region and date arguments

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;

/// Read a region argument: a path to a GeoJSON file, or the document itself
pub fn read_region(region: &str) -> Result<String> {
    let trimmed = region.trim_start();
    if trimmed.starts_with('{') {
        return Ok(region.to_string());
    }

    let path = Path::new(region);
    fs::read_to_string(path).with_context(|| format!("Failed to read region file {}", path.display()))
}

/// Parse a date as `YYYY-MM-DD` (midnight) or `YYYY-MM-DDTHH:MM:SS`
pub fn parse_date(value: &str) -> Result<NaiveDateTime> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(datetime);
        }
    }
    bail!("Invalid date '{}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS", value)
}
