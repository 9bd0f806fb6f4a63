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

//! Client implementations for communicating with CData Connect Cloud.
//!
//! This module provides:
//! - `Transport` trait: sends a [`RequestSpec`] and returns the JSON body
//! - `ConnectCloudHttpClient`: low-level authenticated HTTP client
//! - `ConnectCloudClient`: `Transport` implementation against the REST API

pub mod api;
pub mod http;

use crate::error::Result;
use crate::types::RequestSpec;
use async_trait::async_trait;
use serde_json::Value;

pub use api::ConnectCloudClient;
pub use http::{ConnectCloudHttpClient, HttpClientConfig};

/// Performs one authenticated round trip for a request.
///
/// Implementations must not retry. Errors are returned unchanged so the
/// caller's failure policy decides what happens next.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, spec: &RequestSpec) -> Result<Value>;
}
