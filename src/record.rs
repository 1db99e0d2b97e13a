//! Copyright © 2025-2026 The Htx Authors. All Rights Reserved.
//!
//! This file is part of Htx.
//! The Htx project belongs to the Htx project team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Htx Row Module
//!
//! Content rows are the fundamental data unit hydrated into templates. A row
//! is a flat, string-keyed field map as returned by the content collaborator;
//! values use `serde_json::Value` so rows can carry strings, numbers,
//! booleans, and arrays without a fixed schema.
//!
//! Rows are read-only from the engine's point of view: evaluation contexts
//! clone field values into scopes rather than mutating the row itself.

use serde_json::{Map, Value};

/// A single content row: field name to field value.
pub type HtxRow = Map<String, Value>;

/// A materialized, ordered set of rows as returned by a query.
pub type HtxRowSet = Vec<HtxRow>;

/// Renders a field value as display text.
///
/// This is the single coercion used everywhere a value reaches template
/// output: null becomes the empty string, scalars print naturally, arrays
/// join their rendered elements with `", "`, and objects fall back to
/// their JSON form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Looks up a field on a row and renders it as display text.
///
/// Missing fields resolve to the empty string; that is the form-rendering
/// substitution convention, not an error.
pub fn field_text(row: &HtxRow, name: &str) -> String {
    row.get(name).map(value_text).unwrap_or_default()
}
