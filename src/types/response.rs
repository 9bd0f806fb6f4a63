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

//! Response-side types.
//!
//! Responses stay as `serde_json::Value` until normalization so that shapes
//! the node does not understand can still be passed through untouched.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One flattened output record. Keys keep insertion (column) order.
pub type Record = Map<String, Value>;

/// Column metadata from a result set `schema` entry.
///
/// Only `columnName` matters for normalization; everything else the API
/// sends is kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnDescriptor {
    /// Parse a `schema` array. Entries that are not objects yield a descriptor
    /// without a name, keeping positions aligned with the row values.
    pub fn parse_schema(schema: Option<&Value>) -> Vec<ColumnDescriptor> {
        let Some(Value::Array(entries)) = schema else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|entry| {
                serde_json::from_value(entry.clone()).unwrap_or(ColumnDescriptor {
                    column_name: None,
                    extra: Map::new(),
                })
            })
            .collect()
    }

    /// Key for the value at `index`: the column name, or `column_<index>`.
    pub fn key_for(schema: &[ColumnDescriptor], index: usize) -> String {
        schema
            .get(index)
            .and_then(|c| c.column_name.clone())
            .unwrap_or_else(|| format!("column_{}", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_schema_keeps_extra_metadata() {
        let schema = json!([
            {"columnName": "Id", "dataTypeName": "INTEGER", "ordinal": 0},
            {"columnName": "Name"}
        ]);
        let parsed = ColumnDescriptor::parse_schema(Some(&schema));
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].column_name.as_deref(), Some("Id"));
        assert_eq!(parsed[0].extra.get("dataTypeName"), Some(&json!("INTEGER")));
    }

    #[test]
    fn test_parse_schema_missing_or_malformed() {
        assert!(ColumnDescriptor::parse_schema(None).is_empty());
        assert!(ColumnDescriptor::parse_schema(Some(&json!("nope"))).is_empty());

        let parsed = ColumnDescriptor::parse_schema(Some(&json!([42, {"columnName": "B"}])));
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].column_name.is_none());
    }

    #[test]
    fn test_key_for() {
        let schema = ColumnDescriptor::parse_schema(Some(&json!([{"columnName": "A"}, {}])));
        assert_eq!(ColumnDescriptor::key_for(&schema, 0), "A");
        assert_eq!(ColumnDescriptor::key_for(&schema, 1), "column_1");
        assert_eq!(ColumnDescriptor::key_for(&schema, 5), "column_5");
    }
}
