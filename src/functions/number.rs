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

//! Numeric formatting and arithmetic helpers.

use serde_json::{json, Value};

use crate::errors::Result;
use crate::eval::evaluator::number_value;
use crate::functions::{int_arg, num_arg, str_arg, HtxFunctionDef, HtxFunctionRegistry, HtxParam};

pub fn register(registry: &mut HtxFunctionRegistry) {
    registry.register(HtxFunctionDef {
        name: "clamp",
        params: vec![
            HtxParam::required("value"),
            HtxParam::required("min"),
            HtxParam::required("max"),
        ],
        handler: clamp,
    });
    registry.register(HtxFunctionDef {
        name: "round",
        params: vec![
            HtxParam::required("value"),
            HtxParam::optional("digits", json!(0)),
        ],
        handler: round,
    });
    registry.register(HtxFunctionDef {
        name: "floor",
        params: vec![HtxParam::required("value")],
        handler: floor,
    });
    registry.register(HtxFunctionDef {
        name: "ceil",
        params: vec![HtxParam::required("value")],
        handler: ceil,
    });
    registry.register(HtxFunctionDef {
        name: "number_format",
        params: vec![
            HtxParam::required("value"),
            HtxParam::optional("decimals", json!(0)),
            HtxParam::optional("separator", json!(",")),
        ],
        handler: number_format,
    });
    registry.register(HtxFunctionDef {
        name: "percent",
        params: vec![
            HtxParam::required("part"),
            HtxParam::required("whole"),
            HtxParam::optional("decimals", json!(0)),
        ],
        handler: percent,
    });
}

/// Pins a value into `[min, max]`. When the bounds are inverted the
/// result follows from applying the lower bound first.
fn clamp(args: &[Value]) -> Result<Value> {
    let value = num_arg("clamp", args, 0)?;
    let min = num_arg("clamp", args, 1)?;
    let max = num_arg("clamp", args, 2)?;
    Ok(number_value(value.max(min).min(max)))
}

fn round(args: &[Value]) -> Result<Value> {
    let value = num_arg("round", args, 0)?;
    let digits = int_arg("round", args, 1)?.clamp(0, 12) as i32;
    let factor = 10f64.powi(digits);
    Ok(number_value((value * factor).round() / factor))
}

fn floor(args: &[Value]) -> Result<Value> {
    Ok(number_value(num_arg("floor", args, 0)?.floor()))
}

fn ceil(args: &[Value]) -> Result<Value> {
    Ok(number_value(num_arg("ceil", args, 0)?.ceil()))
}

/// Renders a number with a fixed decimal count and a thousands
/// separator in the integer part, e.g. `1234567.891` with 2 decimals is
/// `"1,234,567.89"`.
fn number_format(args: &[Value]) -> Result<Value> {
    let value = num_arg("number_format", args, 0)?;
    let decimals = int_arg("number_format", args, 1)?.clamp(0, 12) as usize;
    let separator = str_arg("number_format", args, 2)?;

    let fixed = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed, None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (pos, ch) in digits.chars().enumerate() {
        let remaining = digits.len() - pos;
        if pos > 0 && remaining % 3 == 0 {
            grouped.push_str(&separator);
        }
        grouped.push(ch);
    }

    let out = match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    };
    Ok(Value::String(out))
}

/// Formats `part / whole` as a percentage string; a zero whole yields
/// `"0%"` instead of a division error.
fn percent(args: &[Value]) -> Result<Value> {
    let part = num_arg("percent", args, 0)?;
    let whole = num_arg("percent", args, 1)?;
    let decimals = int_arg("percent", args, 2)?.clamp(0, 12) as usize;
    if whole == 0.0 {
        return Ok(Value::String(format!("{:.*}%", decimals, 0.0)));
    }
    let ratio = part / whole * 100.0;
    Ok(Value::String(format!("{:.*}%", decimals, ratio)))
}
