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

//! # Htx Error Module
//!
//! This module defines the error types and utilities used throughout the Htx
//! engine for consistent error handling and reporting.
//!
//! ## Error Categories
//!
//! - **Syntax**: Malformed directive tags, unterminated expression delimiters,
//!   unmatched block terminators; always carries the 1-based source line
//! - **Eval**: Expression evaluation failures (type coercion, bad operands)
//! - **Function**: Unknown builtin name or wrong argument arity
//! - **Collaborator**: Non-2xx results and malformed payloads from the
//!   content collaborator
//! - **Http**: Transport-level failures of a collaborator call
//! - **Serde**: Serialization/deserialization errors
//! - **Internal**: Unexpected internal failures
//!
//! Data-shape gaps (missing field, empty row set) are deliberately not
//! errors; they use the none-fallback and empty-substitution conventions
//! instead.
//!
//! No error kind is retried inside this crate; retry policy, if any,
//! belongs to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Htx.
pub type Result<T> = std::result::Result<T, HtxError>;

/// Canonical error enumeration for the Htx engine.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum HtxError {
    /// Parse-time failures in DSL text; halts the parse.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Expression evaluation failures; halts evaluation of that expression.
    #[error("evaluation error: {message}")]
    Eval { message: String },

    /// Failures raised by a builtin function (unknown name, arity, coercion).
    #[error("function '{function}' failed: {message}")]
    Function { function: String, message: String },

    /// Errors reported by the content collaborator (non-2xx, bad payload).
    #[error("collaborator error: {message}")]
    Collaborator { message: String },

    /// Transport-level HTTP failures.
    #[error("http error: {0}")]
    Http(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for HtxError {
    fn from(err: serde_json::Error) -> Self {
        HtxError::Serde(err.to_string())
    }
}

impl From<reqwest::Error> for HtxError {
    fn from(err: reqwest::Error) -> Self {
        HtxError::Http(err.to_string())
    }
}

impl HtxError {
    /// Helper to construct syntax errors with a 1-based source line.
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        HtxError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Helper to construct evaluation errors.
    pub fn eval<T: Into<String>>(message: T) -> Self {
        HtxError::Eval {
            message: message.into(),
        }
    }

    /// Helper to construct function errors.
    pub fn function(name: impl Into<String>, message: impl Into<String>) -> Self {
        HtxError::Function {
            function: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct collaborator errors.
    pub fn collaborator<T: Into<String>>(message: T) -> Self {
        HtxError::Collaborator {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HtxError::Internal(message.into())
    }
}
