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

//! Request builder for the CData Connect Cloud REST endpoints.
//!
//! | Operation | Method | Path | Query string | Body |
//! |---|---|---|---|---|
//! | executeQuery | POST | `/query` | workspace | query, defaultSchema, schemaOnly, parameters |
//! | getCatalogs | GET | `/catalogs` | workspace | |
//! | getSchemas | GET | `/schemas` | catalogName, workspace | |
//! | getTables | GET | `/tables` | catalogName, schemaName, workspace | |
//! | getColumns | GET | `/columns` | catalogName, schemaName, tableName, workspace | |
//! | getProcedures | GET | `/procedures` | catalogName, schemaName, workspace | |
//! | executeBatch | POST | `/batch` | workspace | the parsed batch array |
//! | executeProcedure | POST | `/exec` | | procedure, parameters |
//!
//! Optional strings are only sent when non-empty, and `schemaOnly` only when
//! true. Validation failures are reported before a transport is involved.

use crate::error::{Error, Result};
use crate::operation::{
    AdditionalFields, BatchOptions, MetadataOptions, Operation, OperationRequest,
    ProcedureOptions, QueryOptions,
};
use crate::types::{QueryParameter, RequestSpec};
use serde_json::{Map, Value};

/// Path used to check that credentials are accepted.
pub const CREDENTIAL_TEST_PATH: &str = "/metadata";

/// Builds [`RequestSpec`]s from validated operation options.
///
/// # Examples
///
/// ```ignore
/// let spec = RequestBuilder::new().build_metadata(
///     Operation::GetTables,
///     &MetadataOptions { catalog_name: Some("Salesforce1".into()), ..Default::default() },
/// )?;
/// assert_eq!(spec.path, "/tables");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    additional: Option<AdditionalFields>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach advisory timeout and row limit to every built request.
    pub fn with_additional_fields(mut self, fields: AdditionalFields) -> Self {
        self.additional = Some(fields);
        self
    }

    pub fn build(&self, request: &OperationRequest) -> Result<RequestSpec> {
        match request {
            OperationRequest::Query(options) => self.build_query(options),
            OperationRequest::Metadata { operation, options } => {
                self.build_metadata(*operation, options)
            }
            OperationRequest::Batch(options) => self.build_batch(options),
            OperationRequest::Procedure(options) => self.build_procedure(options),
        }
    }

    /// Build `POST /query`.
    pub fn build_query(&self, options: &QueryOptions) -> Result<RequestSpec> {
        if options.query.trim().is_empty() {
            return Err(Error::validation("SQL query must not be empty"));
        }

        let mut body = Map::new();
        body.insert("query".to_string(), Value::String(options.query.clone()));
        if let Some(schema) = non_empty(&options.default_schema) {
            body.insert("defaultSchema".to_string(), Value::String(schema.to_string()));
        }
        if options.schema_only {
            body.insert("schemaOnly".to_string(), Value::Bool(true));
        }
        if !options.parameters.is_empty() {
            body.insert(
                "parameters".to_string(),
                Value::Object(QueryParameter::to_body(&options.parameters)),
            );
        }

        let spec = RequestSpec::post("/query", Value::Object(body))
            .with_query_param("workspace", options.workspace.as_deref());
        Ok(self.finish(spec))
    }

    /// Build one of the `GET` metadata requests.
    pub fn build_metadata(
        &self,
        operation: Operation,
        options: &MetadataOptions,
    ) -> Result<RequestSpec> {
        let catalog = options.catalog_name.as_deref();
        let schema = options.schema_name.as_deref();
        let table = options.table_name.as_deref();

        let spec = match operation {
            Operation::GetCatalogs => RequestSpec::get("/catalogs"),
            Operation::GetSchemas => {
                RequestSpec::get("/schemas").with_query_param("catalogName", catalog)
            }
            Operation::GetTables => RequestSpec::get("/tables")
                .with_query_param("catalogName", catalog)
                .with_query_param("schemaName", schema),
            Operation::GetColumns => RequestSpec::get("/columns")
                .with_query_param("catalogName", catalog)
                .with_query_param("schemaName", schema)
                .with_query_param("tableName", table),
            Operation::GetProcedures => RequestSpec::get("/procedures")
                .with_query_param("catalogName", catalog)
                .with_query_param("schemaName", schema),
            other => {
                return Err(Error::validation(format!(
                    "'{}' is not a metadata operation",
                    other
                )))
            }
        };

        let spec = spec.with_query_param("workspace", options.workspace.as_deref());
        Ok(self.finish(spec))
    }

    /// Build `POST /batch`. The batch text must be a JSON array.
    pub fn build_batch(&self, options: &BatchOptions) -> Result<RequestSpec> {
        let operations: Value = serde_json::from_str(&options.batch_operations)
            .map_err(|_| Error::validation("Invalid JSON in batch operations"))?;
        if !operations.is_array() {
            return Err(Error::validation("Batch operations must be a JSON array"));
        }

        let spec = RequestSpec::post("/batch", operations)
            .with_query_param("workspace", options.workspace.as_deref());
        Ok(self.finish(spec))
    }

    /// Build `POST /exec`.
    pub fn build_procedure(&self, options: &ProcedureOptions) -> Result<RequestSpec> {
        if options.procedure_name.trim().is_empty() {
            return Err(Error::validation("Procedure name must not be empty"));
        }

        let mut body = Map::new();
        body.insert(
            "procedure".to_string(),
            Value::String(options.procedure_name.clone()),
        );
        if !options.parameters.is_empty() {
            body.insert(
                "parameters".to_string(),
                Value::Object(QueryParameter::to_body(&options.parameters)),
            );
        }

        Ok(self.finish(RequestSpec::post("/exec", Value::Object(body))))
    }

    /// Build the request used to verify credentials.
    pub fn build_credential_test(&self) -> RequestSpec {
        self.finish(RequestSpec::get(CREDENTIAL_TEST_PATH))
    }

    fn finish(&self, spec: RequestSpec) -> RequestSpec {
        match self.additional {
            Some(fields) => spec
                .with_timeout(Some(fields.timeout))
                .with_max_rows(Some(fields.max_rows)),
            None => spec,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
