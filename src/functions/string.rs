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

//! String manipulation functions.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::errors::Result;
use crate::eval::evaluator::{escape_html, is_truthy};
use crate::functions::{int_arg, str_arg, HtxFunctionDef, HtxFunctionRegistry, HtxParam};

pub fn register(registry: &mut HtxFunctionRegistry) {
    registry.register(HtxFunctionDef {
        name: "truncate",
        params: vec![
            HtxParam::required("text"),
            HtxParam::required("length"),
            HtxParam::optional("suffix", json!("...")),
        ],
        handler: truncate,
    });
    registry.register(HtxFunctionDef {
        name: "slug",
        params: vec![HtxParam::required("text")],
        handler: slug,
    });
    registry.register(HtxFunctionDef {
        name: "upper",
        params: vec![HtxParam::required("text")],
        handler: upper,
    });
    registry.register(HtxFunctionDef {
        name: "lower",
        params: vec![HtxParam::required("text")],
        handler: lower,
    });
    registry.register(HtxFunctionDef {
        name: "capitalize",
        params: vec![HtxParam::required("text")],
        handler: capitalize,
    });
    registry.register(HtxFunctionDef {
        name: "markdown",
        params: vec![HtxParam::required("text")],
        handler: markdown,
    });
    registry.register(HtxFunctionDef {
        name: "replace",
        params: vec![
            HtxParam::required("text"),
            HtxParam::required("from"),
            HtxParam::required("to"),
        ],
        handler: replace,
    });
    registry.register(HtxFunctionDef {
        name: "contains",
        params: vec![HtxParam::required("text"), HtxParam::required("needle")],
        handler: contains,
    });
    registry.register(HtxFunctionDef {
        name: "default",
        params: vec![HtxParam::required("value"), HtxParam::required("fallback")],
        handler: default_fallback,
    });
}

/// Cuts `text` to at most `length` characters, appending `suffix` when
/// anything was removed. Character counts, not bytes.
fn truncate(args: &[Value]) -> Result<Value> {
    let text = str_arg("truncate", args, 0)?;
    let length = int_arg("truncate", args, 1)?.max(0) as usize;
    let suffix = str_arg("truncate", args, 2)?;
    if text.chars().count() <= length {
        return Ok(Value::String(text));
    }
    let head: String = text.chars().take(length).collect();
    Ok(Value::String(format!("{}{}", head.trim_end(), suffix)))
}

/// Lowercases and replaces every non-alphanumeric run with a single
/// hyphen. `"Hello World!"` becomes `"hello-world"`.
fn slug(args: &[Value]) -> Result<Value> {
    let text = str_arg("slug", args, 0)?;
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    Ok(Value::String(out))
}

fn upper(args: &[Value]) -> Result<Value> {
    Ok(Value::String(str_arg("upper", args, 0)?.to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value> {
    Ok(Value::String(str_arg("lower", args, 0)?.to_lowercase()))
}

/// Uppercases the first character, lowercases the rest.
fn capitalize(args: &[Value]) -> Result<Value> {
    let text = str_arg("capitalize", args, 0)?;
    let mut chars = text.chars();
    let out = match chars.next() {
        Some(first) => {
            let rest: String = chars.collect();
            format!(
                "{}{}",
                first.to_uppercase(),
                rest.to_lowercase()
            )
        }
        None => String::new(),
    };
    Ok(Value::String(out))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"))
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid regex"))
}

/// Inline-only markdown: bold, italic, code spans, links. The input is
/// HTML-escaped first, so the produced markup is the only markup.
fn markdown(args: &[Value]) -> Result<Value> {
    let text = escape_html(&str_arg("markdown", args, 0)?);
    let text = bold_re().replace_all(&text, "<strong>$1</strong>");
    let text = italic_re().replace_all(&text, "<em>$1</em>");
    let text = code_re().replace_all(&text, "<code>$1</code>");
    let text = link_re().replace_all(&text, r#"<a href="$2">$1</a>"#);
    Ok(Value::String(text.into_owned()))
}

fn replace(args: &[Value]) -> Result<Value> {
    let text = str_arg("replace", args, 0)?;
    let from = str_arg("replace", args, 1)?;
    let to = str_arg("replace", args, 2)?;
    if from.is_empty() {
        return Ok(Value::String(text));
    }
    Ok(Value::String(text.replace(&from, &to)))
}

fn contains(args: &[Value]) -> Result<Value> {
    let text = str_arg("contains", args, 0)?;
    let needle = str_arg("contains", args, 1)?;
    Ok(Value::Bool(text.contains(&needle)))
}

/// Returns the value unchanged when truthy, otherwise the fallback.
fn default_fallback(args: &[Value]) -> Result<Value> {
    if is_truthy(&args[0]) {
        Ok(args[0].clone())
    } else {
        Ok(args[1].clone())
    }
}
