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

//! Resources, operations and their typed options.
//!
//! Parameters arrive from the host as loosely typed JSON. They are read and
//! validated once here, producing an [`OperationRequest`] that the request
//! builder consumes without further checks.

use crate::context::ItemParameters;
use crate::error::{Error, Result};
use crate::types::{DataType, QueryParameter};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Default advisory request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default advisory row limit.
pub const DEFAULT_MAX_ROWS: u32 = 1000;

/// Top-level grouping of operations shown to the workflow author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resource {
    #[default]
    Query,
    Metadata,
    Batch,
    Execute,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Metadata => "metadata",
            Self::Batch => "batch",
            Self::Execute => "execute",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "query" => Ok(Self::Query),
            "metadata" => Ok(Self::Metadata),
            "batch" => Ok(Self::Batch),
            "execute" => Ok(Self::Execute),
            other => Err(Error::validation(format!("Unknown resource '{}'", other))),
        }
    }

    pub fn default_operation(&self) -> Operation {
        match self {
            Self::Query => Operation::ExecuteQuery,
            Self::Metadata => Operation::GetCatalogs,
            Self::Batch => Operation::ExecuteBatch,
            Self::Execute => Operation::ExecuteProcedure,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed menu of API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ExecuteQuery,
    GetCatalogs,
    GetSchemas,
    GetTables,
    GetColumns,
    GetProcedures,
    ExecuteBatch,
    ExecuteProcedure,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::ExecuteQuery,
        Operation::GetCatalogs,
        Operation::GetSchemas,
        Operation::GetTables,
        Operation::GetColumns,
        Operation::GetProcedures,
        Operation::ExecuteBatch,
        Operation::ExecuteProcedure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecuteQuery => "executeQuery",
            Self::GetCatalogs => "getCatalogs",
            Self::GetSchemas => "getSchemas",
            Self::GetTables => "getTables",
            Self::GetColumns => "getColumns",
            Self::GetProcedures => "getProcedures",
            Self::ExecuteBatch => "executeBatch",
            Self::ExecuteProcedure => "executeProcedure",
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Self::ExecuteQuery => Resource::Query,
            Self::GetCatalogs
            | Self::GetSchemas
            | Self::GetTables
            | Self::GetColumns
            | Self::GetProcedures => Resource::Metadata,
            Self::ExecuteBatch => Resource::Batch,
            Self::ExecuteProcedure => Resource::Execute,
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == value)
            .ok_or_else(|| Error::validation(format!("Unknown operation '{}'", value)))
    }

    /// Resolve an operation name within a resource. `None` picks the
    /// resource's default operation.
    pub fn for_resource(resource: Resource, name: Option<&str>) -> Result<Self> {
        let operation = match name {
            None | Some("") => return Ok(resource.default_operation()),
            Some(name) => Self::parse(name)?,
        };
        if operation.resource() != resource {
            return Err(Error::validation(format!(
                "Operation '{}' is not available for resource '{}'",
                operation, resource
            )));
        }
        Ok(operation)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for `executeQuery`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub query: String,
    pub default_schema: Option<String>,
    pub schema_only: bool,
    pub workspace: Option<String>,
    pub parameters: Vec<QueryParameter>,
}

/// Filters for the metadata operations. Which ones apply depends on the
/// operation; the request builder ignores the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataOptions {
    pub catalog_name: Option<String>,
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub workspace: Option<String>,
}

/// Options for `executeBatch`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// JSON array text; parsed by the request builder.
    pub batch_operations: String,
    pub workspace: Option<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_operations: "[]".to_string(),
            workspace: None,
        }
    }
}

/// Options for `executeProcedure`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureOptions {
    pub procedure_name: String,
    pub parameters: Vec<QueryParameter>,
}

/// Advisory limits from the `additionalFields` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditionalFields {
    pub timeout: Duration,
    pub max_rows: u32,
}

impl Default for AdditionalFields {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl AdditionalFields {
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        let mut fields = Self::default();
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(fields);
        };
        let Value::Object(map) = value else {
            return Err(Error::validation("Parameter 'additionalFields' must be an object"));
        };
        if let Some(timeout) = map.get("timeout") {
            let millis = non_negative(timeout, "timeout")?;
            if millis == 0 {
                return Err(Error::validation("Field 'timeout' must be greater than 0"));
            }
            fields.timeout = Duration::from_millis(millis);
        }
        if let Some(max_rows) = map.get("maxRows") {
            let max_rows = non_negative(max_rows, "maxRows")?;
            fields.max_rows = u32::try_from(max_rows)
                .map_err(|_| Error::validation(format!("maxRows {} is too large", max_rows)))?;
        }
        Ok(fields)
    }
}

fn non_negative(value: &Value, name: &str) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        Error::validation(format!(
            "Field '{}' must be a non-negative integer, got {}",
            name, value
        ))
    })
}

/// A validated, fully typed request for one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    Query(QueryOptions),
    Metadata {
        operation: Operation,
        options: MetadataOptions,
    },
    Batch(BatchOptions),
    Procedure(ProcedureOptions),
}

impl OperationRequest {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Query(_) => Operation::ExecuteQuery,
            Self::Metadata { operation, .. } => *operation,
            Self::Batch(_) => Operation::ExecuteBatch,
            Self::Procedure(_) => Operation::ExecuteProcedure,
        }
    }

    /// Read and validate the parameters `operation` needs for one item.
    pub fn from_parameters(operation: Operation, params: &ItemParameters<'_>) -> Result<Self> {
        match operation {
            Operation::ExecuteQuery => Ok(Self::Query(QueryOptions {
                query: params.required_string("query")?,
                default_schema: params.string("defaultSchema")?,
                schema_only: params.bool("schemaOnly", false)?,
                workspace: params.string("workspace")?,
                parameters: parse_parameters(params.raw("parameters").as_ref())?,
            })),
            Operation::ExecuteBatch => Ok(Self::Batch(BatchOptions {
                batch_operations: batch_operations_text(params.raw("batchOperations"))?,
                workspace: params.string("workspace")?,
            })),
            Operation::ExecuteProcedure => Ok(Self::Procedure(ProcedureOptions {
                procedure_name: params.required_string("procedureName")?,
                parameters: parse_parameters(params.raw("parameters").as_ref())?,
            })),
            metadata => Ok(Self::Metadata {
                operation: metadata,
                options: MetadataOptions {
                    catalog_name: params.string("catalogName")?,
                    schema_name: params.string("schemaName")?,
                    table_name: params.string("tableName")?,
                    workspace: params.string("workspace")?,
                },
            }),
        }
    }
}

/// The host may hand over the batch either as JSON text or already parsed.
fn batch_operations_text(value: Option<Value>) -> Result<String> {
    match value {
        None => Ok(BatchOptions::default().batch_operations),
        Some(Value::String(s)) => Ok(s),
        Some(parsed @ (Value::Array(_) | Value::Object(_))) => Ok(parsed.to_string()),
        Some(other) => Err(Error::validation(format!(
            "Parameter 'batchOperations' must be JSON text, got {}",
            other
        ))),
    }
}

/// Parse the `parameters` collection.
///
/// Accepts the host's fixed-collection shape `{"parameter": [...]}` or a bare
/// array of `{name, dataType, value}` entries.
pub fn parse_parameters(value: Option<&Value>) -> Result<Vec<QueryParameter>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(Value::Object(collection)) => match collection.get("parameter") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(Error::validation(
                    "Parameter collection 'parameter' must be a list",
                ))
            }
        },
        Some(other) => {
            return Err(Error::validation(format!(
                "Parameters must be a collection, got {}",
                other
            )))
        }
    };

    entries.iter().map(parse_parameter).collect()
}

fn parse_parameter(entry: &Value) -> Result<QueryParameter> {
    let Value::Object(fields) = entry else {
        return Err(Error::validation(format!(
            "Parameter entry must be an object, got {}",
            entry
        )));
    };

    let name = match fields.get("name") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(Error::validation("Parameter name must not be empty")),
    };
    let data_type = match fields.get("dataType") {
        None | Some(Value::Null) => DataType::default(),
        Some(code) => DataType::from_value(code)?,
    };
    let value = fields
        .get("value")
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));

    Ok(QueryParameter::new(name, data_type, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_resource_mapping() {
        assert_eq!(Operation::GetColumns.resource(), Resource::Metadata);
        assert_eq!(Operation::ExecuteBatch.resource(), Resource::Batch);
        assert_eq!(Operation::GetSchemas.resource(), Resource::Metadata);
        assert_eq!(Operation::ExecuteQuery.resource(), Resource::Query);
    }

    #[test]
    fn test_operation_for_resource() {
        assert_eq!(
            Operation::for_resource(Resource::Metadata, Some("getTables")).unwrap(),
            Operation::GetTables
        );
        assert_eq!(
            Operation::for_resource(Resource::Execute, None).unwrap(),
            Operation::ExecuteProcedure
        );
        assert!(Operation::for_resource(Resource::Query, Some("getTables")).is_err());
        assert!(Operation::for_resource(Resource::Query, Some("dropTable")).is_err());
    }

    #[test]
    fn test_resource_parse() {
        assert_eq!(Resource::parse("batch").unwrap(), Resource::Batch);
        assert!(Resource::parse("admin").is_err());
        assert_eq!(Resource::default(), Resource::Query);
    }

    #[test]
    fn test_parse_parameters_fixed_collection() {
        let params = parse_parameters(Some(&json!({
            "parameter": [
                {"name": "@id", "dataType": 8, "value": "1"},
                {"name": "@when", "dataType": 15, "value": "2024-01-01"},
                {"name": "@plain"}
            ]
        })))
        .unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].data_type, DataType::Integer);
        assert_eq!(params[1].data_type, DataType::Date);
        assert_eq!(params[2].data_type, DataType::Varchar);
        assert_eq!(params[2].value, json!(""));
    }

    #[test]
    fn test_parse_parameters_empty_shapes() {
        assert!(parse_parameters(None).unwrap().is_empty());
        assert!(parse_parameters(Some(&json!({}))).unwrap().is_empty());
        assert!(parse_parameters(Some(&json!([]))).unwrap().is_empty());
    }

    #[test]
    fn test_parse_parameters_rejects_bad_entries() {
        let err = parse_parameters(Some(&json!([{"name": "@x", "dataType": 3}]))).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = parse_parameters(Some(&json!([{"name": "", "dataType": 5}]))).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(parse_parameters(Some(&json!("@x=1"))).is_err());
    }

    #[test]
    fn test_additional_fields() {
        let defaults = AdditionalFields::from_value(None).unwrap();
        assert_eq!(defaults.timeout, Duration::from_millis(30_000));
        assert_eq!(defaults.max_rows, 1000);

        let fields =
            AdditionalFields::from_value(Some(&json!({"timeout": 5000, "maxRows": "50"}))).unwrap();
        assert_eq!(fields.timeout, Duration::from_millis(5000));
        assert_eq!(fields.max_rows, 50);

        assert!(AdditionalFields::from_value(Some(&json!({"timeout": -1}))).is_err());
        assert!(AdditionalFields::from_value(Some(&json!(12))).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = AdditionalFields::from_value(Some(&json!({"timeout": 0}))).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(AdditionalFields::from_value(Some(&json!({"timeout": "0"}))).is_err());
        // maxRows 0 stays advisory
        let fields = AdditionalFields::from_value(Some(&json!({"maxRows": 0}))).unwrap();
        assert_eq!(fields.max_rows, 0);
    }

    #[test]
    fn test_batch_operations_text() {
        assert_eq!(batch_operations_text(None).unwrap(), "[]");
        assert_eq!(
            batch_operations_text(Some(json!([{"query": "SELECT 1"}]))).unwrap(),
            r#"[{"query":"SELECT 1"}]"#
        );
        assert!(batch_operations_text(Some(json!(5))).is_err());
    }
}
