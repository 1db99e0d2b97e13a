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

//! # Htx Evaluator
//!
//! Walks an [`HtxNode`] tree against an [`HtxEvalContext`], producing
//! either a computed value (literals, references, operators, function
//! calls) or a rendered string (text, outputs, loops, conditionals).
//!
//! The walk is depth-first and purely sequential. The evaluator holds
//! only a shared reference to the immutable function registry, so any
//! number of concurrent evaluations can run without synchronization.
//!
//! Escaped output HTML-escapes its value before emission; raw output
//! does not. Raw output exists for fields that carry pre-rendered HTML,
//! and inverting the two is a cross-site-scripting bug.

use serde_json::{Number, Value};

use crate::dsl::ast::{HtxBinaryOp, HtxNode, HtxUnaryOp};
use crate::errors::{HtxError, Result};
use crate::eval::context::HtxEvalContext;
use crate::functions::HtxFunctionRegistry;
use crate::record::value_text;

/// System scope key the hydrator sets when a whole-row set came back
/// empty; `<htx:none>` subtrees render only when it is truthy.
pub(crate) const ROWS_EMPTY_KEY: &str = "__rows_empty";

/// The exact truthiness table of the template language.
///
/// Falsy: null, `""`, `"0"`, `"false"`, `false`, integer `0`, float
/// `0.0`, and the empty array. Everything else is truthy, including the
/// string `"0.0"`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0" || s == "false"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// HTML-escapes `&`, `<`, `>`, `"`, and `'`.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// AST walker. Stateless apart from the shared registry reference.
#[derive(Clone, Copy, Debug)]
pub struct HtxEvaluator<'a> {
    functions: &'a HtxFunctionRegistry,
}

impl<'a> HtxEvaluator<'a> {
    pub fn new(functions: &'a HtxFunctionRegistry) -> Self {
        HtxEvaluator { functions }
    }

    /// Renders a node tree to its string form.
    pub fn render(&self, node: &HtxNode, ctx: &mut HtxEvalContext) -> Result<String> {
        let mut out = String::new();
        self.render_into(node, ctx, &mut out)?;
        Ok(out)
    }

    fn render_into(&self, node: &HtxNode, ctx: &mut HtxEvalContext, out: &mut String) -> Result<()> {
        match node {
            HtxNode::Template(children) => {
                for child in children {
                    self.render_into(child, ctx, out)?;
                }
                Ok(())
            }
            HtxNode::Text(text) => {
                out.push_str(text);
                Ok(())
            }
            HtxNode::Output(expr) => {
                let value = self.eval(expr, ctx)?;
                out.push_str(&escape_html(&value_text(&value)));
                Ok(())
            }
            HtxNode::RawOutput(expr) => {
                let value = self.eval(expr, ctx)?;
                out.push_str(&value_text(&value));
                Ok(())
            }
            HtxNode::Placeholder(name) => {
                if let Some(value) = ctx.lookup(name) {
                    let text = value_text(value);
                    out.push_str(&escape_html(&text));
                }
                Ok(())
            }
            HtxNode::Each {
                var,
                iterable,
                body,
            } => {
                let items = match self.eval(iterable, ctx)? {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items,
                    other => {
                        return Err(HtxError::eval(format!(
                            "each expects an array, got {}",
                            type_name(&other)
                        )));
                    }
                };
                for (index, item) in items.into_iter().enumerate() {
                    ctx.push_scope();
                    // Object elements spread their fields into the child
                    // scope so bare placeholders resolve per row; the loop
                    // variable and `index` bind last and win collisions.
                    if let Value::Object(fields) = &item {
                        for (key, value) in fields {
                            ctx.set(key.clone(), value.clone());
                        }
                    }
                    ctx.set(var.clone(), item);
                    ctx.set("index", Value::from(index));
                    let mut rendered = Ok(());
                    for child in body {
                        rendered = self.render_into(child, ctx, out);
                        if rendered.is_err() {
                            break;
                        }
                    }
                    ctx.pop_scope();
                    rendered?;
                }
                Ok(())
            }
            HtxNode::If {
                condition,
                body,
                elseifs,
                else_body,
            } => {
                if is_truthy(&self.eval(condition, ctx)?) {
                    for child in body {
                        self.render_into(child, ctx, out)?;
                    }
                    return Ok(());
                }
                for clause in elseifs {
                    if is_truthy(&self.eval(&clause.condition, ctx)?) {
                        for child in &clause.body {
                            self.render_into(child, ctx, out)?;
                        }
                        return Ok(());
                    }
                }
                if let Some(children) = else_body {
                    for child in children {
                        self.render_into(child, ctx, out)?;
                    }
                }
                Ok(())
            }
            HtxNode::NoneBlock(children) => {
                let empty = ctx.lookup(ROWS_EMPTY_KEY).map(is_truthy).unwrap_or(false);
                if empty {
                    for child in children {
                        self.render_into(child, ctx, out)?;
                    }
                }
                Ok(())
            }
            // A value-position node in render position emits its display
            // text, escaped.
            other => {
                let value = self.eval(other, ctx)?;
                out.push_str(&escape_html(&value_text(&value)));
                Ok(())
            }
        }
    }

    /// Evaluates a node to a value.
    pub fn eval(&self, node: &HtxNode, ctx: &mut HtxEvalContext) -> Result<Value> {
        match node {
            HtxNode::StringLit(s) => Ok(Value::String(s.clone())),
            HtxNode::NumberLit(n) => Ok(Value::Number(n.clone())),
            HtxNode::BoolLit(b) => Ok(Value::Bool(*b)),
            HtxNode::FieldRef(name) | HtxNode::Placeholder(name) => {
                Ok(ctx.lookup(name).cloned().unwrap_or(Value::Null))
            }
            HtxNode::DotAccess { target, property } => {
                let value = self.eval(target, ctx)?;
                match value {
                    Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
                    Value::Null => Ok(Value::Null),
                    other => Err(HtxError::eval(format!(
                        "cannot access property `{}` on {}",
                        property,
                        type_name(&other)
                    ))),
                }
            }
            HtxNode::FunctionCall { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, ctx)?);
                }
                self.functions.call(name, values)
            }
            HtxNode::UnaryOp { op, operand } => {
                let value = self.eval(operand, ctx)?;
                match op {
                    HtxUnaryOp::Not => Ok(Value::Bool(!is_truthy(&value))),
                    HtxUnaryOp::Neg => {
                        let n = as_number(&value).ok_or_else(|| {
                            HtxError::eval(format!("cannot negate {}", type_name(&value)))
                        })?;
                        Ok(number_value(-n))
                    }
                }
            }
            HtxNode::BinaryOp { op, left, right } => self.eval_binary(*op, left, right, ctx),
            // Render-position nodes evaluate to their rendered string.
            other => Ok(Value::String(self.render(other, ctx)?)),
        }
    }

    fn eval_binary(
        &self,
        op: HtxBinaryOp,
        left: &HtxNode,
        right: &HtxNode,
        ctx: &mut HtxEvalContext,
    ) -> Result<Value> {
        // Logical operators short-circuit.
        if op == HtxBinaryOp::And {
            let l = self.eval(left, ctx)?;
            if !is_truthy(&l) {
                return Ok(Value::Bool(false));
            }
            let r = self.eval(right, ctx)?;
            return Ok(Value::Bool(is_truthy(&r)));
        }
        if op == HtxBinaryOp::Or {
            let l = self.eval(left, ctx)?;
            if is_truthy(&l) {
                return Ok(Value::Bool(true));
            }
            let r = self.eval(right, ctx)?;
            return Ok(Value::Bool(is_truthy(&r)));
        }

        let l = self.eval(left, ctx)?;
        let r = self.eval(right, ctx)?;
        match op {
            HtxBinaryOp::Add => match (&l, &r) {
                (Value::String(a), Value::String(b)) => {
                    Ok(Value::String(format!("{}{}", a, b)))
                }
                _ => self.arithmetic(op, &l, &r),
            },
            HtxBinaryOp::Sub | HtxBinaryOp::Mul | HtxBinaryOp::Div | HtxBinaryOp::Mod => {
                self.arithmetic(op, &l, &r)
            }
            HtxBinaryOp::Lt | HtxBinaryOp::Le | HtxBinaryOp::Gt | HtxBinaryOp::Ge => {
                let ordering = match (as_number(&l), as_number(&r)) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => Some(value_text(&l).cmp(&value_text(&r))),
                }
                .ok_or_else(|| HtxError::eval("incomparable values"))?;
                Ok(Value::Bool(match op {
                    HtxBinaryOp::Lt => ordering.is_lt(),
                    HtxBinaryOp::Le => ordering.is_le(),
                    HtxBinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                }))
            }
            HtxBinaryOp::Eq | HtxBinaryOp::Ne => {
                let equal = match (as_number(&l), as_number(&r)) {
                    (Some(a), Some(b)) => a == b,
                    _ => l == r,
                };
                Ok(Value::Bool(if op == HtxBinaryOp::Eq { equal } else { !equal }))
            }
            HtxBinaryOp::And | HtxBinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn arithmetic(&self, op: HtxBinaryOp, l: &Value, r: &Value) -> Result<Value> {
        let a = as_number(l).ok_or_else(|| coercion_error(op, l))?;
        let b = as_number(r).ok_or_else(|| coercion_error(op, r))?;
        let result = match op {
            HtxBinaryOp::Add => a + b,
            HtxBinaryOp::Sub => a - b,
            HtxBinaryOp::Mul => a * b,
            HtxBinaryOp::Div => {
                if b == 0.0 {
                    return Err(HtxError::eval("division by zero"));
                }
                a / b
            }
            HtxBinaryOp::Mod => {
                if b == 0.0 {
                    return Err(HtxError::eval("division by zero"));
                }
                a % b
            }
            _ => unreachable!("not an arithmetic operator"),
        };
        Ok(number_value(result))
    }
}

fn coercion_error(op: HtxBinaryOp, value: &Value) -> HtxError {
    HtxError::eval(format!(
        "operator `{}` cannot coerce {} to a number",
        op.symbol(),
        type_name(value)
    ))
}

/// Numeric coercion used by operators and builtins: numbers pass
/// through, numeric strings parse, nothing else coerces.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Wraps a float back into a JSON number, collapsing to an integer when
/// the value is exact.
pub(crate) fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Value::Number(Number::from(f as i64))
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
