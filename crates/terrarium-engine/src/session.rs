//! Session initialization and the session context injected into remote calls

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use terrarium_core::config::{LayeredConfig, DEFAULT_COLLECTION};
use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::ports::SecretStore;
use terrarium_geo::CoveragePredicate;

use crate::client::EarthEngineClient;
use crate::expression::Expr;
use crate::image::CollectionHandle;
use crate::ports::ImageryPlatform;
use crate::secrets::SecretManagerClient;

/// Where service-account credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Raw service-account key JSON
    KeyBytes(Vec<u8>),
    /// The latest version of a Secret Manager secret
    SecretManager { project_id: String, secret_id: String },
    /// A key file whose path is held in an environment variable
    EnvironmentFile { variable: String },
}

impl CredentialSource {
    /// Resolve the credential into service-account key bytes
    pub fn resolve(&self, secrets: &dyn SecretStore) -> Result<Vec<u8>> {
        match self {
            CredentialSource::KeyBytes(bytes) => Ok(bytes.clone()),
            CredentialSource::SecretManager { project_id, secret_id } => {
                debug!(project = %project_id, secret = %secret_id, "Fetching credentials secret");
                secrets.access_secret(project_id, secret_id).map_err(|e| {
                    TerrariumError::initialization(format!(
                        "could not fetch credentials secret '{}'. {}",
                        secret_id, e
                    ))
                })
            }
            CredentialSource::EnvironmentFile { variable } => {
                let path = env::var(variable).map_err(|_| {
                    TerrariumError::initialization(format!(
                        "environment variable {} is not set",
                        variable
                    ))
                })?;
                let path = PathBuf::from(path);
                fs::read(&path).map_err(|e| {
                    TerrariumError::initialization(format!(
                        "could not read key file {}. {}",
                        path.display(),
                        e
                    ))
                })
            }
        }
    }
}

/// Settings every remote operation reads from its session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub project_id: String,
    pub collection: String,
    pub coverage: CoveragePredicate,
    pub max_pixels: f64,
}

impl SessionSettings {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            collection: DEFAULT_COLLECTION.to_string(),
            coverage: CoveragePredicate::exact(),
            max_pixels: 1e10,
        }
    }

    /// Settings from a layered configuration, with an explicit project id
    pub fn from_config(config: &LayeredConfig, project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            collection: config.collection.value.clone(),
            coverage: CoveragePredicate::with_tolerance(config.coverage_tolerance.value),
            max_pixels: config.max_pixels.value,
        }
    }
}

/// An authenticated connection to the imagery platform.
///
/// Cheap to clone; every remote-calling operation takes one explicitly.
#[derive(Clone)]
pub struct Session {
    platform: Arc<dyn ImageryPlatform>,
    settings: SessionSettings,
}

impl Session {
    pub fn new(platform: Arc<dyn ImageryPlatform>, settings: SessionSettings) -> Self {
        Self { platform, settings }
    }

    /// Authenticate an Earth Engine client and wrap it in a session.
    ///
    /// The project comes from the configuration, falling back to the project
    /// named in the service-account key.
    pub fn connect(config: &LayeredConfig, credentials: &CredentialSource) -> Result<Self> {
        let client = EarthEngineClient::new()?;
        let secrets = SecretManagerClient::new()?;
        initialize(&client, credentials, &secrets, config.project_id.value.as_deref())?;

        let project_id = client.project_id().ok_or(TerrariumError::NotInitialized)?;
        info!(project = %project_id, collection = %config.collection.value, "Connected session");
        Ok(Self::new(Arc::new(client), SessionSettings::from_config(config, project_id)))
    }

    pub fn platform(&self) -> &dyn ImageryPlatform {
        self.platform.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn project_id(&self) -> &str {
        &self.settings.project_id
    }

    /// The configured image collection
    pub fn collection(&self) -> CollectionHandle {
        CollectionHandle::load(&self.settings.collection)
    }

    /// Full asset id of an image within the configured collection
    pub fn asset_id(&self, index: &str) -> String {
        format!("{}/{}", self.settings.collection, index)
    }

    /// Evaluate an expression, naming `operation` in any failure
    pub fn compute(&self, operation: &str, expression: &Expr) -> Result<Value> {
        debug!(operation, "Computing remote value");
        self.platform.compute_value(expression).map_err(|e| match e {
            TerrariumError::Remote { reason, .. } => TerrariumError::remote(operation, reason),
            other => other,
        })
    }
}

/// Authenticate `client` from a credential source.
///
/// An already-initialized client is left untouched and no credential is read.
pub fn initialize(
    client: &EarthEngineClient,
    credentials: &CredentialSource,
    secrets: &dyn SecretStore,
    project_id: Option<&str>,
) -> Result<()> {
    if client.is_initialized() {
        debug!("Earth Engine session already initialized");
        return Ok(());
    }

    let key = credentials.resolve(secrets)?;
    client.initialize(&key, project_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    struct StaticSecrets(Option<Vec<u8>>);

    impl SecretStore for StaticSecrets {
        fn access_secret(&self, _project_id: &str, _secret_id: &str) -> Result<Vec<u8>> {
            self.0.clone().ok_or_else(|| TerrariumError::remote("access secret", "permission denied"))
        }
    }

    #[test]
    fn test_resolve_key_bytes() {
        let source = CredentialSource::KeyBytes(b"{}".to_vec());
        assert_eq!(source.resolve(&StaticSecrets(None)).unwrap(), b"{}");
    }

    #[test]
    fn test_resolve_secret() {
        let source = CredentialSource::SecretManager {
            project_id: "p".to_string(),
            secret_id: "s".to_string(),
        };
        assert_eq!(source.resolve(&StaticSecrets(Some(b"key".to_vec()))).unwrap(), b"key");

        match source.resolve(&StaticSecrets(None)) {
            Err(TerrariumError::Initialization { reason }) => {
                assert!(reason.contains("permission denied"))
            }
            other => panic!("expected initialization error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_resolve_environment_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"k\":1}").unwrap();

        env::set_var("TERRARIUM_TEST_KEY_FILE", file.path());
        let source = CredentialSource::EnvironmentFile {
            variable: "TERRARIUM_TEST_KEY_FILE".to_string(),
        };
        assert_eq!(source.resolve(&StaticSecrets(None)).unwrap(), b"{\"k\":1}");

        env::remove_var("TERRARIUM_TEST_KEY_FILE");
        assert!(matches!(
            source.resolve(&StaticSecrets(None)),
            Err(TerrariumError::Initialization { .. })
        ));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = LayeredConfig::with_defaults();
        config.coverage_tolerance.value = 0.01;
        let settings = SessionSettings::from_config(&config, "p");
        assert_eq!(settings.collection, DEFAULT_COLLECTION);
        assert_eq!(settings.coverage.tolerance(), 0.01);
        assert_eq!(settings.max_pixels, 1e10);
    }
}
