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

use serde_json::{Map, Value};

use crate::record::HtxRow;

/// Chained evaluation scope.
///
/// The base scope holds the current content row's fields plus system
/// values; each `<htx:each>` iteration pushes a child scope binding the
/// loop variable, `index`, and the element's own fields. Lookups walk
/// innermost to outermost. A context is created fresh per row or
/// hydration pass and discarded afterwards.
#[derive(Clone, Debug, Default)]
pub struct HtxEvalContext {
    scopes: Vec<Map<String, Value>>,
}

impl HtxEvalContext {
    pub fn new() -> Self {
        HtxEvalContext {
            scopes: vec![Map::new()],
        }
    }

    /// Builds a context whose base scope is a content row's fields.
    pub fn from_row(row: &HtxRow) -> Self {
        HtxEvalContext {
            scopes: vec![row.clone()],
        }
    }

    /// Binds a name in the innermost scope.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.scopes
            .last_mut()
            .expect("context always has a base scope")
            .insert(name.into(), value);
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Map::new());
    }

    pub fn pop_scope(&mut self) {
        // The base scope is never popped.
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Resolves a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
