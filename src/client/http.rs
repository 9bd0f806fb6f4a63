// Copyright (c) 2025 CData Connect Cloud Node Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP client implementation for the CData Connect Cloud API.
//!
//! This module provides a low-level HTTP client with:
//! - Connection pooling (via reqwest)
//! - Basic authentication
//! - Configurable timeouts
//!
//! Requests are sent exactly once. There is no retry or backoff.

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::normalize::remote_error_message;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Whole-request timeout, used when a request carries no timeout of its own.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_millis(30_000),
            user_agent: format!("cdata-connect-cloud-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client for communicating with CData Connect Cloud.
#[derive(Debug)]
pub struct ConnectCloudHttpClient {
    client: Client,
    auth_provider: Arc<dyn AuthProvider>,
}

impl ConnectCloudHttpClient {
    /// Creates a new HTTP client with the given configuration and auth provider.
    pub fn new(config: HttpClientConfig, auth_provider: Arc<dyn AuthProvider>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            auth_provider,
        })
    }

    /// Returns the underlying reqwest client for building requests.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the authorization header value.
    pub fn auth_header(&self) -> Result<String> {
        self.auth_provider.get_auth_header()
    }

    /// Execute an HTTP request with authentication.
    ///
    /// Non-success responses become [`Error::RemoteApi`] when the body carries
    /// an `error` payload, and [`Error::Http`] otherwise.
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        let auth_header = self.auth_header()?;
        let value: HeaderValue = auth_header
            .parse()
            .map_err(|_| Error::configuration("Credentials produce an invalid header value"))?;
        request.headers_mut().insert(AUTHORIZATION, value);

        debug!("Executing {} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::error_from_status(status, body))
    }

    fn error_from_status(status: StatusCode, body: String) -> Error {
        let remote = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| remote_error_message(&v));
        match remote {
            Some(message) => Error::remote(message),
            None => Error::Http {
                status: status.as_u16(),
                body,
            },
        }
    }
}
