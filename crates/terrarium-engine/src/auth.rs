//! Service-account authentication for Google APIs
//!
//! A service-account key signs a short-lived RS256 JWT assertion, which the
//! OAuth2 token endpoint exchanges for a bearer access token.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use serde::Deserialize;
use serde_json::json;

use terrarium_core::error::{Result, TerrariumError};

/// OAuth2 scopes requested for Earth Engine sessions
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/earthengine",
    "https://www.googleapis.com/auth/cloud-platform",
];

/// Grant type for exchanging a signed JWT assertion
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for each assertion, the maximum Google accepts
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// A service-account key file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse raw key bytes, rejecting anything that is not a service-account key
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_slice(bytes).map_err(|e| {
            TerrariumError::initialization(format!(
                "credentials are not a service account key. {}",
                e
            ))
        })?;

        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(TerrariumError::initialization(format!(
                    "credentials are of type '{}', expected 'service_account'",
                    kind
                )));
            }
        }

        Ok(key)
    }

    /// DER bytes of the PKCS#8 private key
    fn private_key_der(&self) -> Result<Vec<u8>> {
        let body: String = self
            .private_key
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("-----"))
            .collect();

        STANDARD.decode(body).map_err(|e| {
            TerrariumError::initialization(format!("private key is not valid PEM. {}", e))
        })
    }

    /// Build a signed JWT assertion issued at `issued_at`
    pub fn assertion(&self, issued_at: DateTime<Utc>) -> Result<String> {
        let mut header = json!({ "alg": "RS256", "typ": "JWT" });
        if let Some(kid) = &self.private_key_id {
            header["kid"] = json!(kid);
        }

        let iat = issued_at.timestamp();
        let claims = json!({
            "iss": self.client_email,
            "scope": SCOPES.join(" "),
            "aud": self.token_uri,
            "iat": iat,
            "exp": iat + ASSERTION_LIFETIME_SECS,
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        );

        let key_pair = RsaKeyPair::from_pkcs8(&self.private_key_der()?).map_err(|e| {
            TerrariumError::initialization(format!("private key was rejected. {}", e))
        })?;

        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(&RSA_PKCS1_SHA256, &SystemRandom::new(), signing_input.as_bytes(), &mut signature)
            .map_err(|e| {
                TerrariumError::initialization(format!("could not sign assertion. {}", e))
            })?;

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }
}

/// Response of the OAuth2 token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// A bearer token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> Self {
        Self {
            token: response.access_token,
            expires_at: received_at + Duration::seconds(response.expires_in),
        }
    }

    /// Whether the token can still be used at `now` without refreshing
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}
