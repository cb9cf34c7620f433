//! Acquisition dates of remote collections

use chrono::NaiveDateTime;
use serde_json::Value;

use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::temporal::sorted_unique_dates;

use crate::image::{CollectionHandle, TIME_START};
use crate::session::Session;

const OPERATION: &str = "generate datelist";

/// Unique acquisition dates of every image in `collection`, oldest first
pub fn extract_sorted_dates(
    session: &Session,
    collection: &CollectionHandle,
) -> Result<Vec<NaiveDateTime>> {
    let value = session.compute(OPERATION, &collection.aggregate_array(TIME_START))?;
    let timestamps = value
        .as_array()
        .ok_or_else(|| TerrariumError::remote(OPERATION, format!("expected a list, got {}", value)))?
        .iter()
        .map(timestamp_millis)
        .collect::<Result<Vec<i64>>>()?;

    sorted_unique_dates(&timestamps)
}

fn timestamp_millis(value: &Value) -> Result<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v as i64))
        .ok_or_else(|| TerrariumError::remote(OPERATION, format!("{} is not a timestamp", value)))
}
