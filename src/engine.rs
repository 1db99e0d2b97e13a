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

//! # Engine Facade
//!
//! [`HtxEngine`] wires the extractor, parser, function registry, and a
//! collaborator into one entry point. The engine holds no per-request
//! mutable state, so one instance serves any number of concurrent
//! callers.

use std::sync::Arc;

use crate::client::HtxContentApi;
use crate::errors::Result;
use crate::executor::{HtxDocument, HtxExecutor};
use crate::functions::HtxFunctionRegistry;

#[derive(Clone)]
pub struct HtxEngine {
    api: Arc<dyn HtxContentApi>,
    functions: Arc<HtxFunctionRegistry>,
}

impl HtxEngine {
    /// Builds an engine over a collaborator, with the full builtin
    /// function library.
    pub fn new(api: Arc<dyn HtxContentApi>) -> Self {
        HtxEngine {
            api,
            functions: Arc::new(HtxFunctionRegistry::new()),
        }
    }

    /// Builds an engine with a caller-supplied registry (e.g. one with
    /// extra host functions registered).
    pub fn with_functions(api: Arc<dyn HtxContentApi>, functions: Arc<HtxFunctionRegistry>) -> Self {
        HtxEngine { api, functions }
    }

    pub fn functions(&self) -> &HtxFunctionRegistry {
        &self.functions
    }

    /// Parses a document without executing it.
    pub fn parse(&self, source: &str) -> Result<HtxDocument> {
        self.executor().parse_document(source)
    }

    /// Runs a retrieval document: query the collaborator, render the
    /// rows as HTML.
    pub fn get(&self, source: &str) -> Result<String> {
        self.executor().get(source)
    }

    /// Runs a save/update document: prepare the action, render the form.
    pub fn set(&self, source: &str) -> Result<String> {
        self.executor().set(source)
    }

    /// Runs a delete document: prepare the action, render the
    /// confirmation fragment.
    pub fn delete(&self, source: &str) -> Result<String> {
        self.executor().delete(source)
    }

    fn executor(&self) -> HtxExecutor<'_> {
        HtxExecutor::new(self.api.as_ref(), &self.functions)
    }
}
