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

//! An in-process [`ExecutionContext`] for running the nodes without a
//! workflow host.
//!
//! ## Options
//!
//! | Option | Description |
//! |--------|-------------|
//! | `connect_cloud.username` | Account email |
//! | `connect_cloud.access_token` | Personal access token |
//! | `connect_cloud.base_url` | API base URL (default `https://cloud.cdata.com/api`) |
//! | `connect_cloud.credentials.<profile>` | JSON credential record for one profile |
//! | `connect_cloud.http.connect_timeout_ms` | Connection timeout |
//! | `connect_cloud.http.request_timeout_ms` | Request timeout (default 30000) |
//! | `connect_cloud.log_level` | `off`, `error`, `warn`, `info`, `debug`, `trace` |
//! | `connect_cloud.log_file` | Log file path; stderr when unset |
//!
//! Each credential profile gets its own credentials and transport. The plain
//! username/token options serve every profile that has no record of its own.

use crate::auth::{CredentialProfile, Credentials, DEFAULT_BASE_URL};
use crate::client::{ConnectCloudClient, HttpClientConfig, Transport};
use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use crate::logging::{init_logging, LogConfig};
use crate::types::RequestSpec;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CREDENTIALS_PREFIX: &str = "connect_cloud.credentials.";

/// Collects options, parameters and items, then builds a [`StandaloneContext`].
#[derive(Debug, Default)]
pub struct ContextBuilder {
    username: Option<String>,
    access_token: Option<String>,
    base_url: Option<String>,
    profile_credentials: HashMap<CredentialProfile, Credentials>,

    http_config: HttpClientConfig,
    log_config: LogConfig,

    node_parameters: Map<String, Value>,
    items: Vec<Map<String, Value>>,
    transport: Option<Arc<dyn Transport>>,
    profile_transports: HashMap<CredentialProfile, Arc<dyn Transport>>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string option. Unknown keys and malformed values are rejected.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(name) = key.strip_prefix(CREDENTIALS_PREFIX) {
            let profile = Self::parse_profile(name)?;
            let record: Value = serde_json::from_str(value).map_err(|e| {
                Error::configuration(format!("invalid JSON for option '{}': {}", key, e))
            })?;
            self.profile_credentials
                .insert(profile, Credentials::from_json(record)?);
            return Ok(());
        }

        match key {
            "connect_cloud.username" => self.username = Some(value.to_string()),
            "connect_cloud.access_token" => self.access_token = Some(value.to_string()),
            "connect_cloud.base_url" => self.base_url = Some(value.to_string()),
            "connect_cloud.http.connect_timeout_ms" => {
                self.http_config.connect_timeout = Self::parse_millis(key, value)?;
            }
            "connect_cloud.http.request_timeout_ms" => {
                self.http_config.request_timeout = Self::parse_millis(key, value)?;
            }
            "connect_cloud.log_level" => self.log_config.set_level(value)?,
            "connect_cloud.log_file" => self.log_config.file = Some(value.to_string()),
            _ => return Err(Error::configuration(format!("unknown option '{}'", key))),
        }
        Ok(())
    }

    /// Read back a non-secret option.
    pub fn get_option(&self, key: &str) -> Result<String> {
        if let Some(name) = key.strip_prefix(CREDENTIALS_PREFIX) {
            let profile = Self::parse_profile(name)?;
            return self
                .profile_credentials
                .get(&profile)
                .map(|c| c.username.clone())
                .ok_or_else(|| Error::configuration(format!("option '{}' is not set", key)));
        }

        let value = match key {
            "connect_cloud.username" => self.username.clone(),
            "connect_cloud.base_url" => {
                Some(self.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
            }
            "connect_cloud.http.connect_timeout_ms" => {
                Some(self.http_config.connect_timeout.as_millis().to_string())
            }
            "connect_cloud.http.request_timeout_ms" => {
                Some(self.http_config.request_timeout.as_millis().to_string())
            }
            "connect_cloud.log_level" => self.log_config.level.clone(),
            "connect_cloud.log_file" => self.log_config.file.clone(),
            _ => return Err(Error::configuration(format!("unknown option '{}'", key))),
        };
        value.ok_or_else(|| Error::configuration(format!("option '{}' is not set", key)))
    }

    /// Use `credentials` for `profile` instead of the plain username/token options.
    pub fn with_credentials(mut self, profile: CredentialProfile, credentials: Credentials) -> Self {
        self.profile_credentials.insert(profile, credentials);
        self
    }

    /// Set a parameter shared by every item, such as `resource` or `operation`.
    pub fn with_node_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.node_parameters.insert(name.into(), value.into());
        self
    }

    /// Add one input item with its own parameters. Non-object values add an
    /// item without parameters.
    pub fn with_item(mut self, parameters: Value) -> Self {
        match parameters {
            Value::Object(map) => self.items.push(map),
            _ => self.items.push(Map::new()),
        }
        self
    }

    /// Use a custom transport for every profile instead of the HTTP client.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom transport for one profile.
    pub fn with_profile_transport(
        mut self,
        profile: CredentialProfile,
        transport: Arc<dyn Transport>,
    ) -> Self {
        self.profile_transports.insert(profile, transport);
        self
    }

    /// Validate credentials, set up logging and build the context.
    ///
    /// A context without items gets one empty item.
    pub fn build(mut self) -> Result<StandaloneContext> {
        init_logging(&self.log_config);

        let shared = self.shared_credentials()?;
        let mut profiles = HashMap::new();

        for profile in CredentialProfile::ALL {
            let credentials = match self
                .profile_credentials
                .remove(&profile)
                .or_else(|| shared.clone())
            {
                Some(credentials) => credentials,
                None if self.profile_transports.contains_key(&profile) => {
                    return Err(Error::configuration(format!(
                        "transport configured for '{}' but no credentials",
                        profile.name()
                    )));
                }
                None => continue,
            };
            credentials.validate()?;

            let transport = match self
                .profile_transports
                .remove(&profile)
                .or_else(|| self.transport.clone())
            {
                Some(transport) => transport,
                None => Arc::new(ConnectCloudClient::from_credentials(
                    &credentials,
                    self.http_config.clone(),
                )?),
            };

            debug!(
                "Profile {} authenticates as {} against {}",
                profile.name(),
                credentials.username,
                credentials.base_url
            );
            profiles.insert(
                profile,
                ProfileBinding {
                    credentials,
                    transport,
                },
            );
        }

        if profiles.is_empty() {
            return Err(Error::configuration("username not set"));
        }

        let mut items = self.items;
        if items.is_empty() {
            items.push(Map::new());
        }

        debug!(
            "Built standalone context with {} profiles and {} items",
            profiles.len(),
            items.len()
        );

        Ok(StandaloneContext {
            profiles,
            node_parameters: self.node_parameters,
            items,
        })
    }

    /// Credentials from the plain username/token options, if set.
    fn shared_credentials(&self) -> Result<Option<Credentials>> {
        let credentials = match (&self.username, &self.access_token) {
            (None, None) => return Ok(None),
            (Some(username), Some(token)) => Credentials::new(username, token),
            (None, Some(_)) => return Err(Error::configuration("username not set")),
            (Some(_), None) => return Err(Error::configuration("access_token not set")),
        };
        Ok(Some(match self.base_url {
            Some(ref base_url) => credentials.with_base_url(base_url),
            None => credentials,
        }))
    }

    fn parse_profile(name: &str) -> Result<CredentialProfile> {
        CredentialProfile::from_name(name)
            .ok_or_else(|| Error::configuration(format!("unknown credential profile '{}'", name)))
    }

    fn parse_millis(key: &str, value: &str) -> Result<Duration> {
        value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| {
                Error::configuration(format!("invalid value '{}' for option '{}'", value, key))
            })
    }
}

#[derive(Debug)]
struct ProfileBinding {
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

/// Execution context backed by in-memory parameters and one [`Transport`]
/// per credential profile.
///
/// Item parameters shadow node parameters of the same name.
#[derive(Debug)]
pub struct StandaloneContext {
    profiles: HashMap<CredentialProfile, ProfileBinding>,
    node_parameters: Map<String, Value>,
    items: Vec<Map<String, Value>>,
}

impl StandaloneContext {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    fn binding(&self, profile: CredentialProfile) -> Result<&ProfileBinding> {
        self.profiles.get(&profile).ok_or_else(|| {
            Error::configuration(format!(
                "no credentials of type '{}' are configured",
                profile.name()
            ))
        })
    }
}

#[async_trait]
impl ExecutionContext for StandaloneContext {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn get_parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.items
            .get(item_index)
            .and_then(|item| item.get(name))
            .or_else(|| self.node_parameters.get(name))
            .cloned()
    }

    fn get_credentials(&self, profile: CredentialProfile) -> Result<Credentials> {
        Ok(self.binding(profile)?.credentials.clone())
    }

    async fn perform_authenticated_request(
        &self,
        profile: CredentialProfile,
        spec: &RequestSpec,
    ) -> Result<Value> {
        self.binding(profile)?.transport.send(spec).await
    }
}
