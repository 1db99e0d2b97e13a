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

//! Date and time functions.
//!
//! Timestamps arrive from content rows as RFC 3339 strings,
//! `YYYY-MM-DD [HH:MM:SS]` strings, or unix epoch seconds; all functions
//! accept any of these forms and work in UTC.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};

use crate::errors::{HtxError, Result};
use crate::functions::{str_arg, HtxFunctionDef, HtxFunctionRegistry, HtxParam};
use crate::record::value_text;

pub fn register(registry: &mut HtxFunctionRegistry) {
    registry.register(HtxFunctionDef {
        name: "time_ago",
        params: vec![HtxParam::required("timestamp")],
        handler: time_ago,
    });
    registry.register(HtxFunctionDef {
        name: "date_format",
        params: vec![
            HtxParam::required("timestamp"),
            HtxParam::optional("format", json!("%Y-%m-%d")),
        ],
        handler: date_format,
    });
    registry.register(HtxFunctionDef {
        name: "days_since",
        params: vec![HtxParam::required("timestamp")],
        handler: days_since,
    });
    registry.register(HtxFunctionDef {
        name: "is_past",
        params: vec![HtxParam::required("timestamp")],
        handler: is_past,
    });
    registry.register(HtxFunctionDef {
        name: "is_future",
        params: vec![HtxParam::required("timestamp")],
        handler: is_future,
    });
    registry.register(HtxFunctionDef {
        name: "year",
        params: vec![HtxParam::required("timestamp")],
        handler: year,
    });
}

/// Parses the accepted timestamp forms into a UTC instant.
pub(crate) fn parse_timestamp(function: &'static str, value: &Value) -> Result<DateTime<Utc>> {
    if let Some(secs) = value.as_i64() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(|| out_of_range(function, value));
    }
    if let Some(secs) = value.as_f64() {
        return DateTime::from_timestamp(secs as i64, 0)
            .ok_or_else(|| out_of_range(function, value));
    }
    let text = value_text(value);
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(at_midnight) = parsed.and_hms_opt(0, 0, 0) {
            return Ok(at_midnight.and_utc());
        }
    }
    if let Ok(secs) = text.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(|| out_of_range(function, value));
    }
    Err(HtxError::function(
        function,
        format!("unrecognized timestamp `{}`", text),
    ))
}

fn out_of_range(function: &'static str, value: &Value) -> HtxError {
    HtxError::function(function, format!("timestamp out of range: {}", value))
}

const UNITS: &[(i64, &str)] = &[
    (31_536_000, "year"),
    (2_592_000, "month"),
    (604_800, "week"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
];

/// Human relative time: `"3 days ago"`, `"in 2 hours"`, `"just now"`
/// for anything under a minute either way.
fn time_ago(args: &[Value]) -> Result<Value> {
    let instant = parse_timestamp("time_ago", &args[0])?;
    let millis = Utc::now().signed_duration_since(instant).num_milliseconds();
    let future = millis < 0;
    // Round to the nearest second: an instant exactly one hour ahead
    // measures 3599.9s after sub-second clock advance, and truncation
    // would drop it a whole bucket.
    let elapsed = (millis.abs() + 500) / 1000;
    if elapsed < 60 {
        return Ok(json!("just now"));
    }
    let (span, unit) = UNITS
        .iter()
        .find(|(span, _)| elapsed >= *span)
        .copied()
        .unwrap_or((60, "minute"));
    let n = elapsed / span;
    let plural = if n == 1 { "" } else { "s" };
    let text = if future {
        format!("in {} {}{}", n, unit, plural)
    } else {
        format!("{} {}{} ago", n, unit, plural)
    };
    Ok(Value::String(text))
}

fn date_format(args: &[Value]) -> Result<Value> {
    let instant = parse_timestamp("date_format", &args[0])?;
    let format = str_arg("date_format", args, 1)?;
    let items: Vec<Item<'_>> = StrftimeItems::new(&format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(HtxError::function(
            "date_format",
            format!("invalid format string `{}`", format),
        ));
    }
    let rendered = instant.format_with_items(items.into_iter()).to_string();
    Ok(Value::String(rendered))
}

fn days_since(args: &[Value]) -> Result<Value> {
    let instant = parse_timestamp("days_since", &args[0])?;
    let days = Utc::now().signed_duration_since(instant).num_days();
    Ok(json!(days))
}

fn is_past(args: &[Value]) -> Result<Value> {
    let instant = parse_timestamp("is_past", &args[0])?;
    Ok(Value::Bool(instant < Utc::now()))
}

fn is_future(args: &[Value]) -> Result<Value> {
    let instant = parse_timestamp("is_future", &args[0])?;
    Ok(Value::Bool(instant > Utc::now()))
}

fn year(args: &[Value]) -> Result<Value> {
    let instant = parse_timestamp("year", &args[0])?;
    Ok(json!(i64::from(instant.year())))
}
