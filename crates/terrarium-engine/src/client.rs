//! Earth Engine REST client

use std::sync::RwLock;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use terrarium_core::error::{Result, TerrariumError};

use crate::auth::{AccessToken, ServiceAccountKey, TokenResponse, JWT_BEARER_GRANT};
use crate::export::ExportRequest;
use crate::expression::Expr;
use crate::http::HttpBridge;
use crate::ports::ImageryPlatform;

/// Base URL of the Earth Engine REST API
pub const EARTH_ENGINE_API: &str = "https://earthengine.googleapis.com/v1";

/// Authenticated state of a client
struct Authorization {
    key: ServiceAccountKey,
    project_id: String,
    token: AccessToken,
}

/// Earth Engine client authenticated with a service account.
///
/// Starts uninitialized; [`EarthEngineClient::initialize`] authenticates once
/// and later calls are no-ops. The access token is refreshed from the stored
/// key whenever it nears expiry.
pub struct EarthEngineClient {
    base_url: String,
    http: HttpBridge,
    auth: RwLock<Option<Authorization>>,
}

impl EarthEngineClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(EARTH_ENGINE_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self { base_url: base_url.into(), http: HttpBridge::new()?, auth: RwLock::new(None) })
    }

    pub fn is_initialized(&self) -> bool {
        self.auth.read().map(|auth| auth.is_some()).unwrap_or(false)
    }

    /// Project the client bills requests to, once initialized
    pub fn project_id(&self) -> Option<String> {
        self.auth.read().ok()?.as_ref().map(|auth| auth.project_id.clone())
    }

    /// Authenticate with service-account key bytes.
    ///
    /// `project_id` overrides the project named in the key. Returns
    /// immediately when the client is already initialized.
    pub fn initialize(&self, key_bytes: &[u8], project_id: Option<&str>) -> Result<()> {
        let mut auth = self
            .auth
            .write()
            .map_err(|_| TerrariumError::initialization("session lock is poisoned"))?;
        if auth.is_some() {
            debug!("Earth Engine session already initialized");
            return Ok(());
        }

        let key = ServiceAccountKey::from_bytes(key_bytes)?;
        let project_id = project_id
            .map(str::to_string)
            .or_else(|| key.project_id.clone())
            .ok_or_else(|| {
                TerrariumError::initialization("no project id configured or present in the key")
            })?;

        let token = self.exchange(&key).map_err(|e| match e {
            TerrariumError::Remote { reason, .. } => TerrariumError::initialization(reason),
            other => other,
        })?;

        info!(account = %key.client_email, project = %project_id, "Initialized Earth Engine session");
        *auth = Some(Authorization { key, project_id, token });
        Ok(())
    }

    /// Exchange a signed assertion for an access token
    fn exchange(&self, key: &ServiceAccountKey) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = key.assertion(now)?;
        debug!(token_uri = %key.token_uri, "Requesting access token");

        let request = self
            .http
            .client()
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);
        let response = self.http.send_json("authenticate service account", request)?;

        let response: TokenResponse = serde_json::from_value(response).map_err(|e| {
            TerrariumError::remote("authenticate service account", format!("invalid token response. {}", e))
        })?;
        Ok(AccessToken::from_response(response, now))
    }

    /// A valid bearer token and the session project, refreshing if needed
    fn credentials(&self) -> Result<(String, String)> {
        {
            let auth = self.auth.read().map_err(|_| TerrariumError::NotInitialized)?;
            match auth.as_ref() {
                None => return Err(TerrariumError::NotInitialized),
                Some(auth) if auth.token.is_fresh(Utc::now()) => {
                    return Ok((auth.token.token.clone(), auth.project_id.clone()))
                }
                Some(_) => {}
            }
        }

        let mut auth = self.auth.write().map_err(|_| TerrariumError::NotInitialized)?;
        let auth = auth.as_mut().ok_or(TerrariumError::NotInitialized)?;
        if !auth.token.is_fresh(Utc::now()) {
            debug!("Refreshing Earth Engine access token");
            auth.token = self.exchange(&auth.key)?;
        }
        Ok((auth.token.token.clone(), auth.project_id.clone()))
    }

    fn post(&self, operation: &str, path: &str, body: &Value) -> Result<Value> {
        let (token, project_id) = self.credentials()?;
        let url = format!("{}/projects/{}/{}", self.base_url, project_id, path);
        debug!(%url, "Issuing Earth Engine request");

        let request = self.http.client().post(url).bearer_auth(token).json(body);
        self.http.send_json(operation, request)
    }
}

impl ImageryPlatform for EarthEngineClient {
    fn compute_value(&self, expression: &Expr) -> Result<Value> {
        let body = json!({ "expression": expression.encode() });
        let mut response = self.post("compute value", "value:compute", &body)?;
        response
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| TerrariumError::remote("compute value", "response has no result"))
    }

    fn start_export(&self, request: &ExportRequest) -> Result<Value> {
        self.post("create image export task", "image:export", &request.to_body())
    }

    fn get_operation(&self, name: &str) -> Result<Value> {
        let (token, _) = self.credentials()?;
        let url = format!("{}/{}", self.base_url, name);
        debug!(%url, "Fetching operation");

        let request = self.http.client().get(url).bearer_auth(token);
        self.http.send_json("check task status", request)
    }
}
