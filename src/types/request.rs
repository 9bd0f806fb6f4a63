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

//! Request types sent to the CData Connect Cloud REST API.

use crate::error::{Error, Result};
use reqwest::Method;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// A fully shaped request, ready for a transport.
///
/// Built fresh for every call. `timeout` and `max_rows` are advisory: the
/// transport may honor `timeout`, and `max_rows` is never put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `/query`.
    pub path: String,
    /// Query string parameters. Optional keys are absent, never empty.
    pub query_params: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
    pub max_rows: Option<u32>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut spec = Self::new(Method::POST, path);
        spec.body = Some(body);
        spec
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: BTreeMap::new(),
            body: None,
            timeout: None,
            max_rows: None,
        }
    }

    /// Add a query string parameter unless the value is empty.
    pub fn with_query_param(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.query_params.insert(key.to_string(), v.to_string());
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_rows(mut self, max_rows: Option<u32>) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// SQL data type codes understood by the `/query` and `/exec` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    Varchar,
    Integer,
    Bigint,
    Double,
    Decimal,
    Boolean,
    Date,
    Timestamp,
}

impl DataType {
    pub const ALL: [DataType; 8] = [
        DataType::Varchar,
        DataType::Integer,
        DataType::Bigint,
        DataType::Double,
        DataType::Decimal,
        DataType::Boolean,
        DataType::Date,
        DataType::Timestamp,
    ];

    pub fn code(&self) -> u8 {
        match self {
            Self::Varchar => 5,
            Self::Integer => 8,
            Self::Bigint => 9,
            Self::Double => 11,
            Self::Decimal => 12,
            Self::Boolean => 14,
            Self::Date => 15,
            Self::Timestamp => 17,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| i64::from(t.code()) == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Varchar => "VARCHAR",
            Self::Integer => "INTEGER",
            Self::Bigint => "BIGINT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
        }
    }

    /// Read a data type from a parameter value.
    ///
    /// Accepts the integer code, a numeric string, or the type name.
    pub fn from_value(value: &Value) -> Result<Self> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().and_then(Self::from_code),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(code) => Self::from_code(code),
                Err(_) => Self::ALL
                    .into_iter()
                    .find(|t| t.name().eq_ignore_ascii_case(s.trim())),
            },
            _ => None,
        };
        parsed.ok_or_else(|| Error::validation(format!("Unsupported parameter data type: {}", value)))
    }
}

/// A named parameter bound into a query or stored procedure call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    /// Parameter name, conventionally prefixed with `@`.
    pub name: String,
    pub data_type: DataType,
    pub value: Value,
}

impl QueryParameter {
    pub fn new(name: impl Into<String>, data_type: DataType, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            data_type,
            value: value.into(),
        }
    }

    /// Build the `parameters` body field: name → `{dataType, value}`.
    pub fn to_body(parameters: &[QueryParameter]) -> Map<String, Value> {
        let mut body = Map::new();
        for param in parameters {
            let mut entry = Map::new();
            entry.insert("dataType".to_string(), Value::from(param.data_type.code()));
            entry.insert("value".to_string(), param.value.clone());
            body.insert(param.name.clone(), Value::Object(entry));
        }
        body
    }
}
