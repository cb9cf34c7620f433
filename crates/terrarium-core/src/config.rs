use crate::error::{Result, TerrariumError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Sentinel-2 MSI Level-2A surface reflectance collection
pub const DEFAULT_COLLECTION: &str = "COPERNICUS/S2_SR";

/// Environment variable holding the geocoding API key
pub const GEOCODING_APIKEY_ENV: &str = "MAPS_GEOCODING_APIKEY";

/// Environment variable conventionally pointing at a service account key file
pub const DEFAULT_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for Terrarium
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub project_id: ConfigValue<Option<String>>,
    pub collection: ConfigValue<String>,
    pub geocoding_api_key: ConfigValue<Option<String>>,
    pub credentials_env: ConfigValue<String>,
    pub secret_id: ConfigValue<String>,
    pub max_pixels: ConfigValue<f64>,
    pub coverage_tolerance: ConfigValue<f64>,
    pub point_buffer_km: ConfigValue<f64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            project_id: ConfigValue::new(None, ConfigSource::Default),
            collection: ConfigValue::new(DEFAULT_COLLECTION.to_string(), ConfigSource::Default),
            geocoding_api_key: ConfigValue::new(None, ConfigSource::Default),
            credentials_env: ConfigValue::new(
                DEFAULT_CREDENTIALS_ENV.to_string(),
                ConfigSource::Default,
            ),
            secret_id: ConfigValue::new(
                "earthengine-credentials".to_string(),
                ConfigSource::Default,
            ),
            max_pixels: ConfigValue::new(1e10, ConfigSource::Default),
            coverage_tolerance: ConfigValue::new(0.0, ConfigSource::Default),
            point_buffer_km: ConfigValue::new(2.5, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| TerrariumError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| TerrariumError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(project_id) = file_config.project_id {
            self.project_id.update(Some(project_id), ConfigSource::File);
        }

        if let Some(collection) = file_config.collection {
            self.collection.update(collection, ConfigSource::File);
        }

        if let Some(key) = file_config.geocoding_api_key {
            self.geocoding_api_key.update(Some(key), ConfigSource::File);
        }

        if let Some(credentials_env) = file_config.credentials_env {
            self.credentials_env.update(credentials_env, ConfigSource::File);
        }

        if let Some(secret_id) = file_config.secret_id {
            self.secret_id.update(secret_id, ConfigSource::File);
        }

        if let Some(max_pixels) = file_config.max_pixels {
            self.max_pixels.update(parse_max_pixels_value(max_pixels)?, ConfigSource::File);
        }

        if let Some(tolerance) = file_config.coverage_tolerance {
            self.coverage_tolerance.update(parse_tolerance_value(tolerance)?, ConfigSource::File);
        }

        if let Some(buffer) = file_config.point_buffer_km {
            self.point_buffer_km.update(parse_buffer_value(buffer)?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // TERRARIUM_PROJECT
        if let Ok(project_id) = env::var("TERRARIUM_PROJECT") {
            self.project_id.update(Some(project_id), ConfigSource::Environment);
        }

        // TERRARIUM_COLLECTION
        if let Ok(collection) = env::var("TERRARIUM_COLLECTION") {
            self.collection.update(collection, ConfigSource::Environment);
        }

        // MAPS_GEOCODING_APIKEY
        if let Ok(key) = env::var(GEOCODING_APIKEY_ENV) {
            self.geocoding_api_key.update(Some(key), ConfigSource::Environment);
        }

        // TERRARIUM_CREDENTIALS_ENV
        if let Ok(credentials_env) = env::var("TERRARIUM_CREDENTIALS_ENV") {
            self.credentials_env.update(credentials_env, ConfigSource::Environment);
        }

        // TERRARIUM_SECRET_ID
        if let Ok(secret_id) = env::var("TERRARIUM_SECRET_ID") {
            self.secret_id.update(secret_id, ConfigSource::Environment);
        }

        // TERRARIUM_MAX_PIXELS
        if let Ok(max_pixels) = env::var("TERRARIUM_MAX_PIXELS") {
            match parse_max_pixels(&max_pixels) {
                Ok(value) => self.max_pixels.update(value, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TERRARIUM_MAX_PIXELS value '{}': expected a positive number",
                    max_pixels
                ),
            }
        }

        // TERRARIUM_COVERAGE_TOLERANCE
        if let Ok(tolerance) = env::var("TERRARIUM_COVERAGE_TOLERANCE") {
            match parse_tolerance(&tolerance) {
                Ok(value) => self.coverage_tolerance.update(value, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TERRARIUM_COVERAGE_TOLERANCE value '{}': expected a number between 0 and 100",
                    tolerance
                ),
            }
        }

        // TERRARIUM_POINT_BUFFER_KM
        if let Ok(buffer) = env::var("TERRARIUM_POINT_BUFFER_KM") {
            match parse_point_buffer(&buffer) {
                Ok(value) => self.point_buffer_km.update(value, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TERRARIUM_POINT_BUFFER_KM value '{}': expected a positive number",
                    buffer
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(project_id) = overrides.project_id {
            self.project_id.update(Some(project_id), ConfigSource::Cli);
        }

        if let Some(collection) = overrides.collection {
            self.collection.update(collection, ConfigSource::Cli);
        }

        if let Some(tolerance) = overrides.coverage_tolerance {
            self.coverage_tolerance.update(tolerance, ConfigSource::Cli);
        }

        if let Some(buffer) = overrides.point_buffer_km {
            self.point_buffer_km.update(buffer, ConfigSource::Cli);
        }
    }

    /// The configured project id, or an error naming the missing key
    pub fn require_project_id(&self) -> Result<&str> {
        self.project_id
            .value
            .as_deref()
            .ok_or_else(|| TerrariumError::ConfigMissing { key: "project_id".to_string() })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "project_id".to_string(),
            (
                self.project_id.value.clone().unwrap_or_else(|| "<unset>".to_string()),
                self.project_id.source,
            ),
        );

        map.insert(
            "collection".to_string(),
            (self.collection.value.clone(), self.collection.source),
        );

        // Never expose the key itself
        map.insert(
            "geocoding_api_key".to_string(),
            (
                if self.geocoding_api_key.value.is_some() { "<set>" } else { "<unset>" }
                    .to_string(),
                self.geocoding_api_key.source,
            ),
        );

        map.insert(
            "credentials_env".to_string(),
            (self.credentials_env.value.clone(), self.credentials_env.source),
        );

        map.insert("secret_id".to_string(), (self.secret_id.value.clone(), self.secret_id.source));

        map.insert(
            "max_pixels".to_string(),
            (format!("{:e}", self.max_pixels.value), self.max_pixels.source),
        );

        map.insert(
            "coverage_tolerance".to_string(),
            (self.coverage_tolerance.value.to_string(), self.coverage_tolerance.source),
        );

        map.insert(
            "point_buffer_km".to_string(),
            (self.point_buffer_km.value.to_string(), self.point_buffer_km.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    project_id: Option<String>,
    collection: Option<String>,
    geocoding_api_key: Option<String>,
    credentials_env: Option<String>,
    secret_id: Option<String>,
    max_pixels: Option<f64>,
    coverage_tolerance: Option<f64>,
    point_buffer_km: Option<f64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub project_id: Option<String>,
    pub collection: Option<String>,
    pub coverage_tolerance: Option<f64>,
    pub point_buffer_km: Option<f64>,
}

/// Parse an export pixel cap from string
pub fn parse_max_pixels(s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|e| TerrariumError::ConfigInvalid {
        key: "max_pixels".to_string(),
        reason: format!("Invalid pixel cap '{}': {}", s, e),
    })?;
    parse_max_pixels_value(value)
}

fn parse_max_pixels_value(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 1.0 {
        return Err(TerrariumError::ConfigInvalid {
            key: "max_pixels".to_string(),
            reason: format!("Pixel cap must be at least 1, got {}", value),
        });
    }
    Ok(value)
}

/// Parse a coverage tolerance (in percentage points) from string
pub fn parse_tolerance(s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|e| TerrariumError::ConfigInvalid {
        key: "coverage_tolerance".to_string(),
        reason: format!("Invalid tolerance '{}': {}", s, e),
    })?;
    parse_tolerance_value(value)
}

fn parse_tolerance_value(value: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&value) {
        return Err(TerrariumError::ConfigInvalid {
            key: "coverage_tolerance".to_string(),
            reason: format!("Tolerance must be between 0 and 100, got {}", value),
        });
    }
    Ok(value)
}

/// Parse a point buffer distance in kilometers from string
pub fn parse_point_buffer(s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|e| TerrariumError::ConfigInvalid {
        key: "point_buffer_km".to_string(),
        reason: format!("Invalid buffer '{}': {}", s, e),
    })?;
    parse_buffer_value(value)
}

fn parse_buffer_value(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TerrariumError::ConfigInvalid {
            key: "point_buffer_km".to_string(),
            reason: format!("Buffer must be a positive distance, got {}", value),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.collection.value, "COPERNICUS/S2_SR");
        assert_eq!(config.collection.source, ConfigSource::Default);
        assert_eq!(config.max_pixels.value, 1e10);
        assert_eq!(config.coverage_tolerance.value, 0.0);
        assert_eq!(config.point_buffer_km.value, 2.5);
        assert!(config.project_id.value.is_none());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
project_id = "geosentry"
collection = "COPERNICUS/S2_SR_HARMONIZED"
max_pixels = 1e8
coverage_tolerance = 0.001
point_buffer_km = 5.0
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.project_id.value.as_deref(), Some("geosentry"));
        assert_eq!(config.project_id.source, ConfigSource::File);
        assert_eq!(config.collection.value, "COPERNICUS/S2_SR_HARMONIZED");
        assert_eq!(config.max_pixels.value, 1e8);
        assert_eq!(config.coverage_tolerance.value, 0.001);
        assert_eq!(config.point_buffer_km.value, 5.0);
        assert_eq!(config.secret_id.source, ConfigSource::Default);
    }

    #[test]
    fn test_file_with_invalid_tolerance() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "coverage_tolerance = 150.0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(TerrariumError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            project_id: Some("cli-project".to_string()),
            coverage_tolerance: Some(0.01),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.require_project_id().unwrap(), "cli-project");
        assert_eq!(config.project_id.source, ConfigSource::Cli);
        assert_eq!(config.coverage_tolerance.value, 0.01);
        assert_eq!(config.collection.source, ConfigSource::Default);
    }

    #[test]
    fn test_require_project_id() {
        let config = LayeredConfig::with_defaults();
        assert!(matches!(
            config.require_project_id(),
            Err(TerrariumError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn test_parsers() {
        assert_eq!(parse_max_pixels("1e10").unwrap(), 1e10);
        assert!(parse_max_pixels("0").is_err());
        assert!(parse_max_pixels("lots").is_err());
        assert_eq!(parse_tolerance("0.5").unwrap(), 0.5);
        assert!(parse_tolerance("-1").is_err());
        assert_eq!(parse_point_buffer("2.5").unwrap(), 2.5);
        assert!(parse_point_buffer("0").is_err());
    }

    #[test]
    fn test_inspection_map_hides_key() {
        let mut config = LayeredConfig::with_defaults();
        config.geocoding_api_key.update(Some("secret".to_string()), ConfigSource::Cli);
        let map = config.to_inspection_map();

        let (key_value, key_source) = &map["geocoding_api_key"];
        assert_eq!(key_value, "<set>");
        assert_eq!(*key_source, ConfigSource::Cli);

        let (collection, _) = &map["collection"];
        assert_eq!(collection, "COPERNICUS/S2_SR");
    }
}
