//! Blocking bridge over the async HTTP client
//!
//! Adapters expose synchronous ports but talk HTTP through reqwest, so each
//! one owns a current-thread runtime and blocks on the request futures.

use std::future::Future;

use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use terrarium_core::error::{Result, TerrariumError};

pub struct HttpBridge {
    client: reqwest::Client,
    runtime: Runtime,
}

impl HttpBridge {
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build().map_err(|e| {
            TerrariumError::remote("create async runtime", e)
        })?;
        Ok(Self { client: reqwest::Client::new(), runtime })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Send a request and decode its JSON body, failing on non-success status
    pub fn send_json(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<Value> {
        self.block_on(async {
            let response =
                request.send().await.map_err(|e| TerrariumError::remote(operation, e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TerrariumError::remote(
                    operation,
                    format!("{} {}", status, error_message(&body)),
                ));
            }

            response.json::<Value>().await.map_err(|e| {
                TerrariumError::remote(operation, format!("invalid response body. {}", e))
            })
        })
    }
}

/// Extract the message of a Google API error body, falling back to the raw text
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            error
                .get("message")
                .or_else(|| value.get("error_description"))
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
