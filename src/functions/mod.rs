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

//! # Builtin Function Library
//!
//! A fixed set of pure, stateless template functions grouped by domain:
//!
//! - **string**: truncate, slug, case conversions, inline markdown,
//!   replace, contains, default-fallback
//! - **number**: clamp, round, floor, ceil, number_format, percent
//! - **date**: time_ago, date_format, days_since, is_past, is_future, year
//! - **array**: count, first, last, reverse, sort, unique, slice, empty,
//!   in_list
//!
//! Every function declares its required and optional parameters with
//! default values. Calling with too few required arguments, or with more
//! arguments than declared slots, is a runtime error. Functions never
//! mutate registry or external state, which is what lets a single
//! registry be shared read-only across concurrent template evaluations.

pub mod array;
pub mod date;
pub mod number;
pub mod string;

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::{HtxError, Result};
use crate::eval::evaluator::as_number;
use crate::record::value_text;

/// A declared parameter slot: required when `default` is `None`.
#[derive(Clone, Debug)]
pub struct HtxParam {
    pub name: &'static str,
    pub default: Option<Value>,
}

impl HtxParam {
    pub fn required(name: &'static str) -> Self {
        HtxParam {
            name,
            default: None,
        }
    }

    pub fn optional(name: &'static str, default: Value) -> Self {
        HtxParam {
            name,
            default: Some(default),
        }
    }
}

/// A builtin implementation. Given the filled argument slots, it returns
/// a computed value.
pub type HtxFunctionHandler = fn(&[Value]) -> Result<Value>;

/// A registered function: name, declared parameters, implementation.
#[derive(Clone, Debug)]
pub struct HtxFunctionDef {
    pub name: &'static str,
    pub params: Vec<HtxParam>,
    pub handler: HtxFunctionHandler,
}

/// Process-wide function registry; read-only after construction.
#[derive(Debug, Default)]
pub struct HtxFunctionRegistry {
    inner: HashMap<&'static str, HtxFunctionDef>,
}

impl HtxFunctionRegistry {
    /// Builds the registry with the full builtin library.
    pub fn new() -> Self {
        let mut registry = HtxFunctionRegistry {
            inner: HashMap::new(),
        };
        string::register(&mut registry);
        number::register(&mut registry);
        date::register(&mut registry);
        array::register(&mut registry);
        registry
    }

    pub fn register(&mut self, def: HtxFunctionDef) {
        self.inner.insert(def.name, def);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Resolves a function by name and calls it, enforcing the declared
    /// arity and filling optional slots from their defaults.
    pub fn call(&self, name: &str, mut args: Vec<Value>) -> Result<Value> {
        let def = self
            .inner
            .get(name)
            .ok_or_else(|| HtxError::eval(format!("unknown function `{}`", name)))?;
        let required = def.params.iter().filter(|p| p.default.is_none()).count();
        if args.len() < required {
            return Err(HtxError::function(
                name,
                format!(
                    "expects at least {} argument(s), got {}",
                    required,
                    args.len()
                ),
            ));
        }
        if args.len() > def.params.len() {
            return Err(HtxError::function(
                name,
                format!(
                    "accepts at most {} argument(s), got {}",
                    def.params.len(),
                    args.len()
                ),
            ));
        }
        for param in def.params.iter().skip(args.len()) {
            let default = param
                .default
                .clone()
                .expect("optional parameters declare defaults");
            args.push(default);
        }
        (def.handler)(&args)
    }
}

/// Argument coercion to text; uses the display coercion, so any value
/// type is accepted.
pub(crate) fn str_arg(function: &'static str, args: &[Value], idx: usize) -> Result<String> {
    args.get(idx)
        .map(value_text)
        .ok_or_else(|| missing_arg(function, idx))
}

/// Argument coercion to a number; numbers and numeric strings only.
pub(crate) fn num_arg(function: &'static str, args: &[Value], idx: usize) -> Result<f64> {
    let value = args.get(idx).ok_or_else(|| missing_arg(function, idx))?;
    as_number(value).ok_or_else(|| {
        HtxError::function(
            function,
            format!("argument {} must be a number", idx + 1),
        )
    })
}

pub(crate) fn int_arg(function: &'static str, args: &[Value], idx: usize) -> Result<i64> {
    Ok(num_arg(function, args, idx)? as i64)
}

/// Argument coercion to an array; null counts as the empty array so a
/// missing field flows through without a hard failure.
pub(crate) fn arr_arg(function: &'static str, args: &[Value], idx: usize) -> Result<Vec<Value>> {
    let value = args.get(idx).ok_or_else(|| missing_arg(function, idx))?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.clone()),
        _ => Err(HtxError::function(
            function,
            format!("argument {} must be an array", idx + 1),
        )),
    }
}

fn missing_arg(function: &'static str, idx: usize) -> HtxError {
    HtxError::function(function, format!("missing argument {}", idx + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn too_few_arguments_is_an_error() {
        let registry = HtxFunctionRegistry::new();
        let err = registry.call("truncate", vec![json!("abc")]).unwrap_err();
        assert!(matches!(err, HtxError::Function { .. }));
    }

    #[test]
    fn excess_arguments_is_an_error() {
        let registry = HtxFunctionRegistry::new();
        let err = registry
            .call("slug", vec![json!("a"), json!("b")])
            .unwrap_err();
        assert!(matches!(err, HtxError::Function { .. }));
    }

    #[test]
    fn optional_slots_fill_from_defaults() {
        let registry = HtxFunctionRegistry::new();
        let out = registry
            .call("truncate", vec![json!("hello world"), json!(5)])
            .unwrap();
        assert_eq!(out, json!("hello..."));
    }

    #[test]
    fn unknown_function_is_an_eval_error() {
        let registry = HtxFunctionRegistry::new();
        let err = registry.call("nosuch", vec![]).unwrap_err();
        assert!(matches!(err, HtxError::Eval { .. }));
    }

    #[test]
    fn registry_lists_builtins() {
        let registry = HtxFunctionRegistry::new();
        let names = registry.names();
        for expected in ["truncate", "slug", "clamp", "time_ago", "count"] {
            assert!(names.contains(&expected), "missing builtin {}", expected);
        }
    }
}
