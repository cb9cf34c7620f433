//! Secret Manager adapter, authenticated through the instance metadata server

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::debug;

use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::ports::SecretStore;

use crate::http::HttpBridge;

pub const SECRET_MANAGER_API: &str = "https://secretmanager.googleapis.com/v1";

/// Token endpoint of the default service account on the metadata server
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    data: String,
}

/// Secret Manager client for workloads running on Google Cloud
pub struct SecretManagerClient {
    base_url: String,
    metadata_url: String,
    http: HttpBridge,
}

impl SecretManagerClient {
    pub fn new() -> Result<Self> {
        Self::with_urls(SECRET_MANAGER_API, METADATA_TOKEN_URL)
    }

    pub fn with_urls(base_url: impl Into<String>, metadata_url: impl Into<String>) -> Result<Self> {
        Ok(Self { base_url: base_url.into(), metadata_url: metadata_url.into(), http: HttpBridge::new()? })
    }

    fn metadata_token(&self) -> Result<String> {
        let request = self.http.client().get(&self.metadata_url).header("Metadata-Flavor", "Google");
        let response = self.http.send_json("fetch metadata token", request)?;
        let token: MetadataToken = serde_json::from_value(response)
            .map_err(|e| TerrariumError::remote("fetch metadata token", e))?;
        Ok(token.access_token)
    }
}

/// Resource path of the latest version of a secret
pub fn latest_version_path(project_id: &str, secret_id: &str) -> String {
    format!("projects/{}/secrets/{}/versions/latest:access", project_id, secret_id)
}

/// Decode the base64 payload of an access response
fn decode_payload(response: serde_json::Value) -> Result<Vec<u8>> {
    let response: AccessSecretVersionResponse = serde_json::from_value(response)
        .map_err(|e| TerrariumError::remote("access secret", e))?;
    STANDARD
        .decode(response.payload.data)
        .map_err(|e| TerrariumError::remote("access secret", format!("payload is not base64. {}", e)))
}

impl SecretStore for SecretManagerClient {
    fn access_secret(&self, project_id: &str, secret_id: &str) -> Result<Vec<u8>> {
        let token = self.metadata_token()?;
        let url = format!("{}/{}", self.base_url, latest_version_path(project_id, secret_id));
        debug!(%url, "Accessing secret version");

        let request = self.http.client().get(url).bearer_auth(token);
        decode_payload(self.http.send_json("access secret", request)?)
    }
}
