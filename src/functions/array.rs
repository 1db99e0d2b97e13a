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

//! Array and collection functions.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::{json, Value};

use crate::errors::Result;
use crate::eval::evaluator::as_number;
use crate::functions::{arr_arg, int_arg, str_arg, HtxFunctionDef, HtxFunctionRegistry, HtxParam};
use crate::record::value_text;

pub fn register(registry: &mut HtxFunctionRegistry) {
    registry.register(HtxFunctionDef {
        name: "count",
        params: vec![HtxParam::required("value")],
        handler: count,
    });
    registry.register(HtxFunctionDef {
        name: "first",
        params: vec![HtxParam::required("list")],
        handler: first,
    });
    registry.register(HtxFunctionDef {
        name: "last",
        params: vec![HtxParam::required("list")],
        handler: last,
    });
    registry.register(HtxFunctionDef {
        name: "reverse",
        params: vec![HtxParam::required("list")],
        handler: reverse,
    });
    registry.register(HtxFunctionDef {
        name: "sort",
        params: vec![HtxParam::required("list")],
        handler: sort,
    });
    registry.register(HtxFunctionDef {
        name: "unique",
        params: vec![HtxParam::required("list")],
        handler: unique,
    });
    registry.register(HtxFunctionDef {
        name: "slice",
        params: vec![
            HtxParam::required("list"),
            HtxParam::required("start"),
            HtxParam::optional("length", Value::Null),
        ],
        handler: slice,
    });
    registry.register(HtxFunctionDef {
        name: "empty",
        params: vec![HtxParam::required("value")],
        handler: empty,
    });
    registry.register(HtxFunctionDef {
        name: "in_list",
        params: vec![HtxParam::required("value"), HtxParam::required("list")],
        handler: in_list,
    });
}

/// Element count for arrays, character count for strings, zero for
/// everything else.
fn count(args: &[Value]) -> Result<Value> {
    let n = match &args[0] {
        Value::Array(items) => items.len(),
        Value::String(s) => s.chars().count(),
        _ => 0,
    };
    Ok(json!(n as i64))
}

fn first(args: &[Value]) -> Result<Value> {
    let items = arr_arg("first", args, 0)?;
    Ok(items.first().cloned().unwrap_or(Value::Null))
}

fn last(args: &[Value]) -> Result<Value> {
    let items = arr_arg("last", args, 0)?;
    Ok(items.last().cloned().unwrap_or(Value::Null))
}

fn reverse(args: &[Value]) -> Result<Value> {
    let mut items = arr_arg("reverse", args, 0)?;
    items.reverse();
    Ok(Value::Array(items))
}

/// Ascending sort: numeric when both sides coerce to numbers, textual
/// otherwise. The sort is stable.
fn sort(args: &[Value]) -> Result<Value> {
    let mut items = arr_arg("sort", args, 0)?;
    items.sort_by(|a, b| match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => value_text(a).cmp(&value_text(b)),
    });
    Ok(Value::Array(items))
}

/// Removes duplicates while keeping first-seen order. Identity is the
/// serialized value, so `1` and `"1"` stay distinct.
fn unique(args: &[Value]) -> Result<Value> {
    let items = arr_arg("unique", args, 0)?;
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let key = serde_json::to_string(&item).unwrap_or_default();
        if seen.insert(key) {
            out.push(item);
        }
    }
    Ok(Value::Array(out))
}

/// Sub-list starting at `start` (negative counts from the end), taking
/// `length` elements or everything that remains.
fn slice(args: &[Value]) -> Result<Value> {
    let items = arr_arg("slice", args, 0)?;
    let start = int_arg("slice", args, 1)?;
    let from = if start < 0 {
        items.len().saturating_sub(start.unsigned_abs() as usize)
    } else {
        (start as usize).min(items.len())
    };
    let take = match &args[2] {
        Value::Null => items.len() - from,
        other => as_number(other).map(|n| n.max(0.0) as usize).unwrap_or(0),
    };
    let out: Vec<Value> = items.into_iter().skip(from).take(take).collect();
    Ok(Value::Array(out))
}

/// Emptiness test: null, the empty string, and the empty array are
/// empty; every other value is not.
fn empty(args: &[Value]) -> Result<Value> {
    let is_empty = match &args[0] {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    Ok(Value::Bool(is_empty))
}

/// Membership in a comma-separated list, compared as trimmed text.
fn in_list(args: &[Value]) -> Result<Value> {
    let needle = value_text(&args[0]);
    let list = str_arg("in_list", args, 1)?;
    let found = list.split(',').any(|entry| entry.trim() == needle);
    Ok(Value::Bool(found))
}
