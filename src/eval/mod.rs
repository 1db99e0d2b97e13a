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

//! # Evaluation Module
//!
//! Execution of parsed templates: the chained-scope evaluation context
//! and the depth-first AST walker with the language's truthiness and
//! HTML-escaping rules.

pub mod context;
pub mod evaluator;

pub use context::HtxEvalContext;
pub use evaluator::{escape_html, is_truthy, HtxEvaluator};
