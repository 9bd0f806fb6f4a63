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

//! CData Connect Cloud node for Rust
//!
//! This crate exposes the CData Connect Cloud SQL-over-HTTP API (query,
//! metadata discovery, batch execution, stored procedures) as operations a
//! workflow host can run once per input item.
//!
//! ## Overview
//!
//! - [`ConnectCloudNode`] - Runs the selected operation over every input item
//! - [`ConnectCloudQueryNode`] - Single-shot query node returning raw result sets
//! - [`ExecutionContext`] - Host services: parameters, credentials, authenticated requests
//! - [`RequestBuilder`] - Maps an operation and its options to a [`RequestSpec`]
//! - [`normalize()`] - Flattens `{results: [{schema, rows}]}` into records
//! - [`ConnectCloudClient`] - reqwest-backed [`Transport`] with Basic authentication
//!
//! ## Operations
//!
//! | Resource | Operation | Endpoint |
//! |----------|-----------|----------|
//! | `query` | `executeQuery` | `POST /query` |
//! | `metadata` | `getCatalogs`, `getSchemas`, `getTables`, `getColumns`, `getProcedures` | `GET /catalogs` ... |
//! | `batch` | `executeBatch` | `POST /batch` |
//! | `execute` | `executeProcedure` | `POST /exec` |
//!
//! ## Example
//!
//! ```ignore
//! use cdata_connect_cloud::{ConnectCloudNode, FailurePolicy, StandaloneContext};
//! use serde_json::json;
//!
//! let mut builder = StandaloneContext::builder();
//! builder.set_option("connect_cloud.username", "user@example.com")?;
//! builder.set_option("connect_cloud.access_token", "pat")?;
//! let ctx = builder
//!     .with_node_parameter("resource", "metadata")
//!     .with_node_parameter("operation", "getTables")
//!     .with_item(json!({"catalogName": "Salesforce1"}))
//!     .build()?;
//!
//! let records = ConnectCloudNode::new(FailurePolicy::FailFast).execute(&ctx).await?;
//! ```

pub mod auth;
pub mod client;
pub mod context;
pub mod error;
mod logging;
pub mod node;
pub mod normalize;
pub mod operation;
pub mod request;
pub mod simple_query;
pub mod standalone;
pub mod types;

// Re-export main types
pub use context::{ExecutionContext, ItemParameters};
pub use error::{Error, Result};
pub use node::{into_output_records, ConnectCloudNode, FailurePolicy, ItemResult};
pub use normalize::{classify, normalize, Normalized};
pub use operation::{Operation, OperationRequest, Resource};
pub use request::RequestBuilder;
pub use simple_query::ConnectCloudQueryNode;
pub use standalone::{ContextBuilder, StandaloneContext};

// Re-export client types for advanced users
pub use client::{ConnectCloudClient, ConnectCloudHttpClient, HttpClientConfig, Transport};

// Re-export wire types
pub use auth::{BasicAuth, CredentialProfile, Credentials};
pub use types::{DataType, QueryParameter, Record, RequestSpec};
