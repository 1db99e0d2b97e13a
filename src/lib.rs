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

//! # Htx Core Library
//!
//! Htx is a hypermedia-template DSL engine: it parses documents that mix
//! HTML with `<htx:...>` directive tags, talks to a content collaborator
//! over JSON, and renders the results back into HTML fragments.
//!
//! ## Module Overview
//!
//! The library is organized into the following major modules:
//!
//! - **record**: content rows (`serde_json` maps) and display coercion
//! - **dsl**: extraction of directives/response/body templates, the
//!   expression lexer, and the template parser producing the AST
//! - **eval**: chained-scope context and the AST-walking evaluator with
//!   the language's truthiness and HTML-escaping rules
//! - **functions**: the builtin string/number/date/array function
//!   library behind an immutable registry
//! - **hydrate**: binding rows and system values into templates (list
//!   and single modes, `<htx:none>` fallback)
//! - **client**: the content-collaborator trait, DTOs, and the blocking
//!   HTTP implementation
//! - **executor**: the Get/Set/Delete operation pipelines
//! - **engine**: the facade wiring everything together
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use htx::{HtxContentClient, HtxEngine};
//!
//! let client = HtxContentClient::new("https://content.example", "tenant-key").unwrap();
//! let engine = HtxEngine::new(Arc::new(client));
//!
//! let document = r#"
//!     <htx:type value="article"/>
//!     <htx:howmany count="5"/>
//!     <htx:template mode="list">
//!       <ul><htx:each var="item" in="rows"><li>__title__</li></htx:each>
//!       <htx:none><li>No entries.</li></htx:none></ul>
//!     </htx:template>
//! "#;
//! let html = engine.get(document);
//! ```
//!
//! ## Architecture
//!
//! One request flows through a straight pipeline:
//! 1. **Extract**: directives, response templates, body template
//! 2. **Parse**: body template into an `HtxNode` tree
//! 3. **Collaborate**: query or prepare against the content service
//! 4. **Hydrate**: bind rows and action materials, walk the tree
//! 5. **Render**: escaped HTML out
//!
//! Everything shared across requests (extractor, parser, function
//! registry) is immutable, so concurrent evaluations need no locks.
//!
//! ## Error Handling
//!
//! All fallible operations return [`errors::Result`]. Syntax errors carry
//! the 1-based source line; collaborator failures propagate unmodified;
//! data-shape gaps (missing fields, empty row sets) are rendering
//! conventions, not errors.

pub mod client;
pub mod dsl;
pub mod engine;
pub mod errors;
pub mod eval;
pub mod executor;
pub mod functions;
pub mod hydrate;
pub mod record;

pub use client::{
    HtxContentApi, HtxContentClient, HtxPrepareData, HtxPrepareMeta, HtxPrepareRequest,
    HtxQueryRequest,
};
pub use dsl::{
    HtxBodyTemplate, HtxExtractor, HtxMeta, HtxMetaValue, HtxNode, HtxResponseTemplates,
    HtxTemplateParser,
};
pub use engine::HtxEngine;
pub use errors::{HtxError, Result};
pub use eval::{escape_html, is_truthy, HtxEvalContext, HtxEvaluator};
pub use executor::{HtxDocument, HtxExecutor};
pub use functions::{HtxFunctionDef, HtxFunctionRegistry, HtxParam};
pub use hydrate::{HtxHydrator, HtxSystemBindings};
pub use record::{value_text, HtxRow, HtxRowSet};
