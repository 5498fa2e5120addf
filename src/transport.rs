// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTTP transport for the Perspective API
//!
//! The client talks to the network only through [`Transport`], so tests can
//! swap in a stub that returns canned responses.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::{PerspectiveError, Result};

/// Network seam used by [`crate::Client`].
///
/// Implementations report a service rejection as
/// [`PerspectiveError::Remote`] carrying the service's message; the client
/// decides what that message means.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Check that the service accepts `token`
    async fn verify_token(&self, token: &str) -> Result<()>;

    /// POST one analyze request body and return the JSON response
    async fn analyze(&self, token: &str, body: &serde_json::Value) -> Result<serde_json::Value>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    discovery_url: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PerspectiveError::Config(format!("Failed to create HTTP client: {}", e)))?;

        // Normalize URL
        let endpoint = config
            .endpoint
            .trim_end_matches('/')
            .trim_end_matches("/comments:analyze")
            .to_string();

        Ok(Self {
            client,
            endpoint,
            discovery_url: config.discovery_url.clone(),
        })
    }

    /// Turn a non-success response into `Remote`, keeping the service message
    async fn rejection(response: reqwest::Response) -> PerspectiveError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|env| env.error.message)
            .unwrap_or(text);
        PerspectiveError::Remote { status, message }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn verify_token(&self, token: &str) -> Result<()> {
        debug!("Verifying API key against discovery document");

        let response = self
            .client
            .get(&self.discovery_url)
            .query(&[("key", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn analyze(&self, token: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/comments:analyze", self.endpoint);

        debug!("Sending analyze request to {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", token)])
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let result: serde_json::Value = response.json().await?;
        Ok(result)
    }
}
