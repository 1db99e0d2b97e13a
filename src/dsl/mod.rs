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

//! # DSL (Domain Specific Language) Module
//!
//! The front half of the Htx engine: turning raw DSL text into structured
//! data and a compiled template tree.
//!
//! ## Architecture
//!
//! - **Extract** ([extract]): splits a document into directive metadata,
//!   named response templates, and the body template, using a depth-aware
//!   tag scanner
//! - **Lexer** ([lexer]): tokenizes the expression sub-language with line
//!   tracking
//! - **Parser** ([parser]): compiles the body template into the [ast]
//!   tree: text runs, bare placeholders, output expressions, and
//!   `each`/`if` control blocks
//!
//! ## Surface syntax
//!
//! ```text
//! <htx:action>list</htx:action>
//! <htx:type value="article"/>
//! <htx:howmany count="5"/>
//! <htx:response name="success"><p>Saved.</p></htx:response>
//! <htx:template mode="list">
//!   <htx:each var="item" in="rows">
//!     <li>__title__ ({{ time_ago(item.date) }})</li>
//!   </htx:each>
//!   <htx:none><li>No entries.</li></htx:none>
//! </htx:template>
//! ```

pub mod ast;
pub mod extract;
pub mod lexer;
pub mod parser;

pub use ast::{HtxBinaryOp, HtxElseIf, HtxNode, HtxUnaryOp};
pub use extract::{
    HtxBodyTemplate, HtxExtractor, HtxMeta, HtxMetaValue, HtxResponseTemplates, HTX_TAG_PREFIX,
};
pub use parser::HtxTemplateParser;
