//! Reverse geocoding of coordinates into administrative areas

use tracing::debug;

use terrarium_core::error::Result;
use terrarium_core::ports::Geocoder;

/// Address returned when a coordinate has no administrative area
pub const UNKNOWN_LOCATION: &str = "limbo";

/// Resolve the second-level administrative area containing a coordinate
pub fn reverse_geocode(geocoder: &dyn Geocoder, longitude: f64, latitude: f64) -> Result<String> {
    let addresses = geocoder.reverse_geocode(longitude, latitude)?;
    debug!(longitude, latitude, results = addresses.len(), "Reverse geocoded coordinate");

    Ok(addresses.into_iter().next().unwrap_or_else(|| UNKNOWN_LOCATION.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrarium_core::error::TerrariumError;

    struct FixedGeocoder(Option<Vec<String>>);

    impl Geocoder for FixedGeocoder {
        fn reverse_geocode(&self, _longitude: f64, _latitude: f64) -> Result<Vec<String>> {
            self.0.clone().ok_or_else(|| TerrariumError::Geocoding {
                reason: "geocoding API key is not set".to_string(),
            })
        }
    }

    #[test]
    fn test_first_address_wins() {
        let geocoder = FixedGeocoder(Some(vec![
            "Bengaluru Urban, Karnataka, India".to_string(),
            "Karnataka, India".to_string(),
        ]));
        assert_eq!(
            reverse_geocode(&geocoder, 77.59, 12.97).unwrap(),
            "Bengaluru Urban, Karnataka, India"
        );
    }

    #[test]
    fn test_empty_result_is_limbo() {
        let geocoder = FixedGeocoder(Some(vec![]));
        assert_eq!(reverse_geocode(&geocoder, 0.0, 0.0).unwrap(), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_geocoder_failure_propagates() {
        let geocoder = FixedGeocoder(None);
        assert!(matches!(
            reverse_geocode(&geocoder, 0.0, 0.0),
            Err(TerrariumError::Geocoding { .. })
        ));
    }
}
