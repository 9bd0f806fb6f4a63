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

//! The execution context a workflow host provides to the node.
//!
//! The host owns parameter storage, credential storage and the authenticated
//! HTTP helper. The node only sees them through [`ExecutionContext`].

use crate::auth::{CredentialProfile, Credentials};
use crate::error::{Error, Result};
use crate::types::RequestSpec;
use async_trait::async_trait;
use serde_json::Value;

/// Host services available to every node operation.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// Number of input items the host will iterate.
    fn item_count(&self) -> usize;

    /// Raw parameter value for an item, or `None` when it is not set.
    fn get_parameter(&self, name: &str, item_index: usize) -> Option<Value>;

    /// Credential record the host stores for `profile`.
    fn get_credentials(&self, profile: CredentialProfile) -> Result<Credentials>;

    /// Send `spec` authenticated with the credentials of `profile` and return
    /// the JSON body.
    async fn perform_authenticated_request(
        &self,
        profile: CredentialProfile,
        spec: &RequestSpec,
    ) -> Result<Value>;
}

/// Typed view over one item's parameters.
///
/// Each accessor validates its value once, so callers never cast raw JSON.
pub struct ItemParameters<'a> {
    ctx: &'a dyn ExecutionContext,
    item_index: usize,
}

impl<'a> ItemParameters<'a> {
    pub fn new(ctx: &'a dyn ExecutionContext, item_index: usize) -> Self {
        Self { ctx, item_index }
    }

    pub fn raw(&self, name: &str) -> Option<Value> {
        self.ctx
            .get_parameter(name, self.item_index)
            .filter(|v| !v.is_null())
    }

    /// Optional string; empty is the same as absent.
    pub fn string(&self, name: &str) -> Result<Option<String>> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(Error::validation(format!(
                "Parameter '{}' must be a string, got {}",
                name, other
            ))),
        }
    }

    /// Required non-empty string.
    pub fn required_string(&self, name: &str) -> Result<String> {
        self.string(name)?.ok_or_else(|| {
            Error::validation(format!("Parameter '{}' is required and must not be empty", name))
        })
    }

    pub fn bool(&self, name: &str, default: bool) -> Result<bool> {
        match self.raw(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(b),
            Some(Value::String(s)) => match s.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" | "" => Ok(false),
                _ => Err(Error::validation(format!(
                    "Parameter '{}' must be a boolean, got '{}'",
                    name, s
                ))),
            },
            Some(other) => Err(Error::validation(format!(
                "Parameter '{}' must be a boolean, got {}",
                name, other
            ))),
        }
    }
}
