//! Port trait definitions
//!
//! These traits define the interfaces the remote service adapters implement.
//! The imagery platform port lives with its expression types in
//! `terrarium-engine`.

use crate::error::Result;

/// Port for reverse geocoding coordinates into addresses
pub trait Geocoder: Send + Sync {
    /// Look up formatted addresses for a coordinate, most specific first
    ///
    /// # Arguments
    /// * `longitude` - Longitude in degrees
    /// * `latitude` - Latitude in degrees
    ///
    /// # Returns
    /// Formatted addresses at administrative-area-level-2 granularity, possibly empty
    fn reverse_geocode(&self, longitude: f64, latitude: f64) -> Result<Vec<String>>;
}

/// Port for retrieving secrets from a secret storage service
pub trait SecretStore: Send + Sync {
    /// Access the latest version of a secret
    ///
    /// # Arguments
    /// * `project_id` - Cloud project holding the secret
    /// * `secret_id` - Name of the secret
    ///
    /// # Returns
    /// The raw secret payload
    fn access_secret(&self, project_id: &str, secret_id: &str) -> Result<Vec<u8>>;
}
