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

//! Type definitions for the CData Connect Cloud node.
//!
//! This module contains data structures organized by direction:
//! - `request`: the request shape handed to a transport
//! - `response`: records and column descriptors read from API responses

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::{DataType, QueryParameter, RequestSpec};
pub use response::{ColumnDescriptor, Record};
