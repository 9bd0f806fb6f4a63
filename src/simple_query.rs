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

//! The single-shot "Connect Cloud Query" node.
//!
//! Runs one query from the parameters of item 0 using the `connectCloudApi`
//! credential and returns the raw result sets, one record per result set.
//! Parameters are passed as a ready-made JSON object rather than the
//! name/type/value collection of the main node.

use crate::auth::CredentialProfile;
use crate::context::{ExecutionContext, ItemParameters};
use crate::error::{Error, Result};
use crate::normalize::remote_error_message;
use crate::types::{Record, RequestSpec};
use serde_json::{Map, Value};
use tracing::debug;

/// Credential profile the query node authenticates with.
pub const QUERY_CREDENTIAL: CredentialProfile = CredentialProfile::ConnectCloudApi;

/// Options read from the query node's parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleQueryOptions {
    pub query: String,
    pub default_schema: Option<String>,
    pub schema_only: bool,
    pub parameters: Map<String, Value>,
}

impl SimpleQueryOptions {
    pub fn from_parameters(params: &ItemParameters<'_>) -> Result<Self> {
        Ok(Self {
            query: params.required_string("query")?,
            default_schema: params.string("defaultSchema")?,
            schema_only: params.bool("schemaOnly", false)?,
            parameters: parse_parameter_object(params.raw("parameters"))?,
        })
    }

    /// `POST /query`; optional fields are only sent when set.
    pub fn to_request(&self) -> RequestSpec {
        let mut body = Map::new();
        body.insert("query".to_string(), Value::String(self.query.clone()));
        if let Some(ref schema) = self.default_schema {
            body.insert("defaultSchema".to_string(), Value::String(schema.clone()));
        }
        if self.schema_only {
            body.insert("schemaOnly".to_string(), Value::Bool(true));
        }
        if !self.parameters.is_empty() {
            body.insert("parameters".to_string(), Value::Object(self.parameters.clone()));
        }
        RequestSpec::post("/query", Value::Object(body))
    }
}

fn parse_parameter_object(value: Option<Value>) -> Result<Map<String, Value>> {
    let parsed = match value {
        None => return Ok(Map::new()),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(Map::new()),
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map_err(|_| Error::validation("Query parameters must be valid JSON"))?,
        Some(other) => other,
    };
    match parsed {
        Value::Object(map) => Ok(map),
        other => Err(Error::validation(format!(
            "Query parameters must be a JSON object, got {}",
            other
        ))),
    }
}

/// The "Connect Cloud Query" node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectCloudQueryNode;

impl ConnectCloudQueryNode {
    pub fn new() -> Self {
        Self
    }

    /// Run the query once and return each result set as a record.
    pub async fn execute(&self, ctx: &dyn ExecutionContext) -> Result<Vec<Record>> {
        let credentials = ctx.get_credentials(QUERY_CREDENTIAL)?;
        credentials.validate()?;

        let options = SimpleQueryOptions::from_parameters(&ItemParameters::new(ctx, 0))?;
        let spec = options.to_request();
        debug!("Running query node as {}", credentials.username);

        let response = ctx
            .perform_authenticated_request(QUERY_CREDENTIAL, &spec)
            .await?;
        if let Some(message) = remote_error_message(&response) {
            return Err(Error::remote(message));
        }

        let records = match response.get("results") {
            Some(Value::Array(results)) => results.iter().cloned().map(result_record).collect(),
            _ => Vec::new(),
        };
        Ok(records)
    }
}

fn result_record(result: Value) -> Record {
    match result {
        Value::Object(map) => map,
        other => {
            let mut record = Record::new();
            record.insert("value".to_string(), other);
            record
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_object_shapes() {
        assert!(parse_parameter_object(None).unwrap().is_empty());
        assert!(parse_parameter_object(Some(json!("{}"))).unwrap().is_empty());
        assert!(parse_parameter_object(Some(json!(""))).unwrap().is_empty());

        let parsed =
            parse_parameter_object(Some(json!(r#"{"@id": {"dataType": 8, "value": "1"}}"#)))
                .unwrap();
        assert!(parsed.contains_key("@id"));

        let parsed = parse_parameter_object(Some(json!({"@x": 1}))).unwrap();
        assert_eq!(parsed.get("@x"), Some(&json!(1)));

        assert!(parse_parameter_object(Some(json!("{oops"))).is_err());
        assert!(parse_parameter_object(Some(json!("[1]"))).is_err());
    }

    #[test]
    fn test_request_body() {
        let options = SimpleQueryOptions {
            query: "SELECT 1".to_string(),
            default_schema: Some("dbo".to_string()),
            schema_only: false,
            parameters: Map::new(),
        };
        let spec = options.to_request();
        assert_eq!(spec.path, "/query");
        assert_eq!(spec.body, Some(json!({"query": "SELECT 1", "defaultSchema": "dbo"})));
    }

    #[test]
    fn test_result_record_wraps_scalars() {
        assert_eq!(Value::Object(result_record(json!(3))), json!({"value": 3}));
        assert_eq!(
            Value::Object(result_record(json!({"affectedRows": 1}))),
            json!({"affectedRows": 1})
        );
    }
}
