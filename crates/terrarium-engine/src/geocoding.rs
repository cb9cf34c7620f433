//! Google Maps reverse geocoding adapter

use serde::Deserialize;
use tracing::debug;

use terrarium_core::config::GEOCODING_APIKEY_ENV;
use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::ports::Geocoder;

use crate::http::HttpBridge;

pub const GEOCODING_API: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

/// Reverse geocoder backed by the Google Maps Geocoding API
pub struct GoogleGeocoder {
    api_key: Option<String>,
    base_url: String,
    http: HttpBridge,
}

impl GoogleGeocoder {
    /// Create a geocoder; a missing key only fails once a lookup is made
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Ok(Self { api_key, base_url: GEOCODING_API.to_string(), http: HttpBridge::new()? })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Addresses from a geocoding response, most specific first
fn addresses(response: serde_json::Value) -> Result<Vec<String>> {
    let response: GeocodeResponse = serde_json::from_value(response).map_err(|e| {
        TerrariumError::Geocoding { reason: format!("invalid response. {}", e) }
    })?;

    match response.status.as_str() {
        "OK" => Ok(response.results.into_iter().map(|r| r.formatted_address).collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        status => Err(TerrariumError::Geocoding {
            reason: format!(
                "error: {} {}",
                status,
                response.error_message.unwrap_or_default()
            )
            .trim_end()
            .to_string(),
        }),
    }
}

impl Geocoder for GoogleGeocoder {
    fn reverse_geocode(&self, longitude: f64, latitude: f64) -> Result<Vec<String>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| TerrariumError::Geocoding {
            reason: format!(
                "could not setup maps client. geocoding API key is not set in {}",
                GEOCODING_APIKEY_ENV
            ),
        })?;

        debug!(longitude, latitude, "Requesting reverse geocode");
        let latlng = format!("{},{}", latitude, longitude);
        let request = self.http.client().get(&self.base_url).query(&[
            ("latlng", latlng.as_str()),
            ("key", api_key),
            ("language", "English"),
            ("location_type", "APPROXIMATE"),
            ("result_type", "administrative_area_level_2"),
        ]);

        let response = self
            .http
            .send_json("reverse geocode", request)
            .map_err(|e| TerrariumError::Geocoding { reason: format!("error: {}", e) })?;
        addresses(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_key() {
        let geocoder = GoogleGeocoder::new(None).unwrap();
        match geocoder.reverse_geocode(77.59, 12.97) {
            Err(TerrariumError::Geocoding { reason }) => assert!(reason.contains("API key")),
            other => panic!("expected geocoding error, got {:?}", other),
        }
    }

    #[test]
    fn test_addresses() {
        let response = json!({
            "status": "OK",
            "results": [
                { "formatted_address": "Bengaluru Urban, Karnataka, India" },
                { "formatted_address": "Bangalore Division, Karnataka, India" },
            ],
        });
        assert_eq!(addresses(response).unwrap()[0], "Bengaluru Urban, Karnataka, India");
        assert!(addresses(json!({ "status": "ZERO_RESULTS", "results": [] })).unwrap().is_empty());
    }

    #[test]
    fn test_denied_request() {
        let response = json!({ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." });
        match addresses(response) {
            Err(TerrariumError::Geocoding { reason }) => {
                assert!(reason.contains("REQUEST_DENIED"));
                assert!(reason.contains("invalid"));
            }
            other => panic!("expected geocoding error, got {:?}", other),
        }
    }
}
