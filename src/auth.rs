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

//! Credentials and authentication for CData Connect Cloud.
//!
//! Both credential profiles authenticate the same way: HTTP Basic with the
//! account email as username and a Personal Access Token (PAT) as password.
//! There is no OAuth flow and no token refresh.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

/// Base URL used when a credential record does not carry one.
pub const DEFAULT_BASE_URL: &str = "https://cloud.cdata.com/api";

/// The credential profiles a host can hand to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialProfile {
    /// `cDataConnectCloudApi`: username, access token and configurable base URL.
    CDataConnectCloudApi,
    /// `connectCloudApi`: username and token against the default base URL.
    ConnectCloudApi,
}

impl CredentialProfile {
    pub const ALL: [CredentialProfile; 2] = [Self::CDataConnectCloudApi, Self::ConnectCloudApi];

    /// Name under which the host stores this profile.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CDataConnectCloudApi => "cDataConnectCloudApi",
            Self::ConnectCloudApi => "connectCloudApi",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cDataConnectCloudApi" => Some(Self::CDataConnectCloudApi),
            "connectCloudApi" => Some(Self::ConnectCloudApi),
            _ => None,
        }
    }
}

/// A credential record as stored by the host.
///
/// The token is accepted under either `accessToken` or `token`, so one type
/// covers both profiles.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Credentials {
    pub fn new(username: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            access_token: access_token.into(),
            base_url: default_base_url(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Parse a credential record from the host's JSON representation.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let credentials: Credentials = serde_json::from_value(value)
            .map_err(|e| Error::configuration(format!("Invalid credentials: {}", e)))?;
        credentials.validate()?;
        Ok(credentials)
    }

    /// Reject records with a blank username, token or base URL.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::configuration("credentials are missing a username"));
        }
        if self.access_token.is_empty() {
            return Err(Error::configuration(
                "credentials are missing a personal access token",
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::configuration("credentials are missing a base URL"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Produces the `Authorization` header for outgoing requests.
pub trait AuthProvider: Send + Sync + std::fmt::Debug {
    fn get_auth_header(&self) -> Result<String>;
}

/// HTTP Basic authentication with a username and personal access token.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    token: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(&credentials.username, &credentials.access_token)
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthProvider for BasicAuth {
    fn get_auth_header(&self) -> Result<String> {
        if self.username.is_empty() || self.token.is_empty() {
            return Err(Error::configuration(
                "username and personal access token are required",
            ));
        }
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.token));
        Ok(format!("Basic {}", encoded))
    }
}
