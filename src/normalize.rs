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

//! Response normalization.
//!
//! Turns the tabular JSON returned by the query, metadata, batch and exec
//! endpoints into a flat list of key-value records:
//!
//! ```text
//! {"results": [{"schema": [{"columnName": "Id"}, ...], "rows": [[1, ...], ...]}]}
//!     -> [{"Id": 1, ...}, ...]
//! ```
//!
//! Every row becomes exactly one record. A result set without `rows` becomes a
//! single summary record. A response carrying `error` fails before anything is
//! produced, and a response with no recognisable `results` is passed through
//! whole.

use crate::error::{Error, Result};
use crate::types::{ColumnDescriptor, Record};
use serde_json::{Map, Value};
use tracing::debug;

/// What a response, or one of its result sets, normalized into.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// One record per row of a result set.
    Rows(Vec<Record>),
    /// A result set without rows: `{schema, affectedRows}`, absent keys omitted.
    Summary(Record),
    /// A response without a `results` array, returned as received.
    Opaque(Value),
    /// The remote service reported an error.
    Error(String),
}

impl Normalized {
    /// Number of records this outcome contributes.
    pub fn record_count(&self) -> usize {
        match self {
            Self::Rows(records) => records.len(),
            Self::Summary(_) | Self::Opaque(_) => 1,
            Self::Error(_) => 0,
        }
    }
}

/// Classify a raw response.
///
/// Returns a single `Error` or `Opaque` outcome, or one `Rows`/`Summary`
/// outcome per result set in response order.
pub fn classify(response: &Value) -> Vec<Normalized> {
    if let Some(message) = remote_error_message(response) {
        return vec![Normalized::Error(message)];
    }

    match response.get("results") {
        Some(Value::Array(result_sets)) => result_sets.iter().map(classify_result_set).collect(),
        _ => vec![Normalized::Opaque(response.clone())],
    }
}

/// Normalize a raw response into records, failing on a remote error payload.
pub fn normalize(response: &Value) -> Result<Vec<Record>> {
    let outcomes = classify(response);
    let mut records = Vec::with_capacity(outcomes.iter().map(Normalized::record_count).sum());

    for outcome in outcomes {
        match outcome {
            Normalized::Error(message) => return Err(Error::remote(message)),
            Normalized::Rows(rows) => records.extend(rows),
            Normalized::Summary(summary) => records.push(summary),
            Normalized::Opaque(raw) => records.push(opaque_record(raw)),
        }
    }

    debug!("Normalized response into {} records", records.len());
    Ok(records)
}

/// Extract the message of a top-level `error` payload, if the response has one.
///
/// `null`, `false`, `0` and `""` count as no error.
pub fn remote_error_message(response: &Value) -> Option<String> {
    let error = response.get("error").filter(|e| is_truthy(e))?;
    let message = match error {
        Value::String(s) => s.clone(),
        Value::Object(fields) => match fields.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    };
    Some(message)
}

fn classify_result_set(result_set: &Value) -> Normalized {
    match result_set.get("rows") {
        Some(Value::Array(rows)) => {
            let schema = ColumnDescriptor::parse_schema(result_set.get("schema"));
            Normalized::Rows(rows.iter().map(|row| zip_row(&schema, row)).collect())
        }
        _ => {
            let mut summary = Map::new();
            if let Some(schema) = result_set.get("schema") {
                summary.insert("schema".to_string(), schema.clone());
            }
            if let Some(affected) = result_set.get("affectedRows") {
                summary.insert("affectedRows".to_string(), affected.clone());
            }
            Normalized::Summary(summary)
        }
    }
}

/// Zip one row against the schema by position. A scalar row is treated as a
/// one-column row.
fn zip_row(schema: &[ColumnDescriptor], row: &Value) -> Record {
    let values = match row {
        Value::Array(values) => values.as_slice(),
        single => std::slice::from_ref(single),
    };

    let mut record = Map::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        record.insert(ColumnDescriptor::key_for(schema, index), value.clone());
    }
    record
}

/// Wrap an opaque response as a record. Objects pass through unchanged.
pub fn opaque_record(raw: Value) -> Record {
    match raw {
        Value::Object(fields) => fields,
        other => {
            let mut record = Map::new();
            record.insert("data".to_string(), other);
            record
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
