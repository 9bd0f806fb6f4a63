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

//! REST client for the CData Connect Cloud API.
//!
//! Implements [`Transport`] by mapping a [`RequestSpec`] onto a reqwest request
//! against the configured base URL (`https://cloud.cdata.com/api` by default).

use crate::auth::{BasicAuth, Credentials};
use crate::client::{ConnectCloudHttpClient, HttpClientConfig, Transport};
use crate::error::{Error, Result};
use crate::request::RequestBuilder;
use crate::types::RequestSpec;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Client for the CData Connect Cloud REST endpoints.
#[derive(Debug, Clone)]
pub struct ConnectCloudClient {
    http_client: Arc<ConnectCloudHttpClient>,
    base_url: String,
}

impl ConnectCloudClient {
    /// Create a client from an existing HTTP client.
    pub fn new(http_client: Arc<ConnectCloudHttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Create a client authenticating with `credentials` over Basic auth.
    pub fn from_credentials(credentials: &Credentials, config: HttpClientConfig) -> Result<Self> {
        credentials.validate()?;
        let auth = Arc::new(BasicAuth::from_credentials(credentials));
        let http_client = Arc::new(ConnectCloudHttpClient::new(config, auth)?);
        Ok(Self::new(http_client, credentials.base_url.clone()))
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Check that the credentials are accepted by calling `GET /metadata`.
    pub async fn test_credentials(&self) -> Result<()> {
        let spec = RequestBuilder::new().build_credential_test();
        self.send(&spec).await.map(|_| ())
    }

    fn build_request(&self, spec: &RequestSpec) -> Result<reqwest::Request> {
        let url = self.url_for(&spec.path);
        let mut builder = self
            .http_client
            .inner()
            .request(spec.method.clone(), &url)
            .header(ACCEPT, "application/json");

        if !spec.query_params.is_empty() {
            builder = builder.query(&spec.query_params);
        }
        if let Some(ref body) = spec.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }
        if let Some(timeout) = spec.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| Error::transport(format!("Failed to build request: {}", e)))
    }
}

#[async_trait]
impl Transport for ConnectCloudClient {
    async fn send(&self, spec: &RequestSpec) -> Result<Value> {
        let request = self.build_request(spec)?;

        debug!(
            "Sending {} {} with {} query parameters",
            spec.method,
            spec.path,
            spec.query_params.len()
        );

        let response = self.http_client.execute(request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        decode_body(&spec.path, &body)
    }
}

/// Decode a success body. An empty body is `null`; anything else must be JSON.
fn decode_body(path: &str, body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(body).map_err(|e| {
        Error::transport(format!(
            "Failed to parse response from {}: {} - body: {}",
            path, e, body
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn create_test_client(base_url: &str) -> ConnectCloudClient {
        let credentials = Credentials::new("user@example.com", "pat").with_base_url(base_url);
        ConnectCloudClient::from_credentials(&credentials, HttpClientConfig::default()).unwrap()
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let client = create_test_client("https://cloud.cdata.com/api/");
        assert_eq!(client.base_url(), "https://cloud.cdata.com/api");
        assert_eq!(client.url_for("/query"), "https://cloud.cdata.com/api/query");
    }

    #[test]
    fn test_from_credentials_rejects_blank_token() {
        let credentials = Credentials::new("user@example.com", "");
        assert!(ConnectCloudClient::from_credentials(&credentials, HttpClientConfig::default())
            .is_err());
    }

    #[test]
    fn test_build_get_request_with_query_string() {
        let client = create_test_client("https://cloud.cdata.com/api");
        let spec = RequestSpec::get("/columns")
            .with_query_param("catalogName", Some("C"))
            .with_query_param("schemaName", Some("S"));
        let request = client.build_request(&spec).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/api/columns");
        assert_eq!(request.url().query(), Some("catalogName=C&schemaName=S"));
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_build_post_request_with_body_and_timeout() {
        let client = create_test_client("https://cloud.cdata.com/api");
        let spec = RequestSpec::post("/query", json!({"query": "SELECT 1"}))
            .with_timeout(Some(Duration::from_millis(500)));
        let request = client.build_request(&spec).unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://cloud.cdata.com/api/query");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.timeout(), Some(&Duration::from_millis(500)));
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(body).unwrap(),
            json!({"query": "SELECT 1"})
        );
    }

    #[test]
    fn test_decode_empty_body_is_null() {
        assert_eq!(decode_body("/exec", "").unwrap(), Value::Null);
        assert_eq!(decode_body("/exec", "  \n").unwrap(), Value::Null);

        let records = normalize(&decode_body("/exec", "").unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(Value::Object(records[0].clone()), json!({"data": null}));
    }

    #[test]
    fn test_decode_json_body() {
        assert_eq!(
            decode_body("/query", r#"{"results": []}"#).unwrap(),
            json!({"results": []})
        );
    }

    #[test]
    fn test_decode_non_json_body_is_transport_error() {
        let err = decode_body("/query", "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        let message = err.to_string();
        assert!(message.contains("/query"));
        assert!(message.contains("<html>gateway</html>"));
    }

    #[tokio::test]
    async fn test_credentials_accept_any_success_status() {
        let base_url = serve_once("200 OK", r#"{"catalogs": []}"#).await;
        assert!(create_test_client(&base_url).test_credentials().await.is_ok());

        let base_url = serve_once("202 Accepted", "").await;
        assert!(create_test_client(&base_url).test_credentials().await.is_ok());
    }

    #[tokio::test]
    async fn test_credentials_rejected() {
        let base_url = serve_once("401 Unauthorized", "Unauthorized").await;
        let err = create_test_client(&base_url)
            .test_credentials()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_send_non_json_success_body() {
        let base_url = serve_once("200 OK", "not json").await;
        let err = create_test_client(&base_url)
            .send(&RequestSpec::get("/catalogs"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
