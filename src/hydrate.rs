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

//! # Hydrator
//!
//! Joins a compiled body template with content rows and the system
//! values an executor supplies, producing the final HTML fragment.
//!
//! Two modes:
//!
//! - **list**: the whole row set binds as `rows`; `<htx:each>` subtrees
//!   iterate it, and when it is empty the `<htx:none>` subtree renders
//!   instead.
//! - **single**: zero or one row; the row's fields become the base scope
//!   so bare placeholders resolve directly (empty string when absent).
//!
//! System placeholders (`__endpoint__`, `__payload__`, `__token__`,
//! `__recordId__`) come from [`HtxSystemBindings`], never from content
//! rows.

use log::debug;
use serde_json::Value;

use crate::dsl::ast::HtxNode;
use crate::errors::Result;
use crate::eval::evaluator::ROWS_EMPTY_KEY;
use crate::eval::{HtxEvalContext, HtxEvaluator};
use crate::functions::HtxFunctionRegistry;
use crate::record::{HtxRow, HtxRowSet};

/// Executor-supplied values exposed to templates as system placeholders.
#[derive(Clone, Debug, Default)]
pub struct HtxSystemBindings {
    pub endpoint: Option<String>,
    pub payload: Option<String>,
    pub token: Option<String>,
    pub record_id: Option<String>,
}

impl HtxSystemBindings {
    fn apply(&self, ctx: &mut HtxEvalContext) {
        let pairs = [
            ("endpoint", &self.endpoint),
            ("payload", &self.payload),
            ("token", &self.token),
            ("recordId", &self.record_id),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                ctx.set(name, Value::String(value.clone()));
            }
        }
    }
}

/// Binds rows and system values into evaluation contexts and renders.
#[derive(Clone, Copy, Debug)]
pub struct HtxHydrator<'a> {
    evaluator: HtxEvaluator<'a>,
}

impl<'a> HtxHydrator<'a> {
    pub fn new(functions: &'a HtxFunctionRegistry) -> Self {
        HtxHydrator {
            evaluator: HtxEvaluator::new(functions),
        }
    }

    /// List hydration: the row set binds as `rows` and the empty-set
    /// flag arms or disarms `<htx:none>` subtrees.
    pub fn hydrate_list(
        &self,
        template: &HtxNode,
        rows: &HtxRowSet,
        system: &HtxSystemBindings,
    ) -> Result<String> {
        debug!("hydrating list template over {} row(s)", rows.len());
        let mut ctx = HtxEvalContext::new();
        let items: Vec<Value> = rows.iter().map(|row| Value::Object(row.clone())).collect();
        ctx.set(ROWS_EMPTY_KEY, Value::Bool(items.is_empty()));
        ctx.set("rows", Value::Array(items));
        system.apply(&mut ctx);
        self.evaluator.render(template, &mut ctx)
    }

    /// Single hydration: the row's fields are the base scope; with no
    /// row every bare placeholder renders as the empty string.
    pub fn hydrate_single(
        &self,
        template: &HtxNode,
        row: Option<&HtxRow>,
        system: &HtxSystemBindings,
    ) -> Result<String> {
        debug!(
            "hydrating single template ({})",
            if row.is_some() { "with row" } else { "no row" }
        );
        let mut ctx = match row {
            Some(row) => HtxEvalContext::from_row(row),
            None => HtxEvalContext::new(),
        };
        system.apply(&mut ctx);
        self.evaluator.render(template, &mut ctx)
    }
}
