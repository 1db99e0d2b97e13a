//! Copyright © 2025-2026 The Htx Authors. All Rights Reserved.
//!
//! This file is part of Htx.
//! The Htx project belongs to the Htx project team.

use htx::{HtxEvalContext, HtxEvaluator, HtxFunctionRegistry, HtxTemplateParser};
use serde_json::json;

fn render(body: &str, fields: serde_json::Value) -> String {
    try_render(body, fields).unwrap()
}

fn try_render(body: &str, fields: serde_json::Value) -> htx::Result<String> {
    let registry = HtxFunctionRegistry::new();
    let evaluator = HtxEvaluator::new(&registry);
    let ast = HtxTemplateParser::new().parse(body)?;
    let row = fields.as_object().cloned().unwrap_or_default();
    let mut ctx = HtxEvalContext::from_row(&row);
    evaluator.render(&ast, &mut ctx)
}

#[test]
fn test_truthiness_in_conditionals() {
    let body = r#"<htx:if condition="flag">T<htx:else>F</htx:if>"#;
    for falsy in [
        json!(null),
        json!(""),
        json!("0"),
        json!("false"),
        json!(false),
        json!(0),
        json!(0.0),
        json!([]),
    ] {
        assert_eq!(render(body, json!({ "flag": falsy })), "F");
    }
    for truthy in [json!("0.0"), json!("x"), json!(1), json!([0]), json!(-1.5)] {
        assert_eq!(render(body, json!({ "flag": truthy })), "T");
    }
}

#[test]
fn test_escaped_and_raw_output() {
    let fields = json!({"body": "<b>x</b> & \"y\""});
    assert_eq!(
        render("{{ body }}", fields.clone()),
        "&lt;b&gt;x&lt;/b&gt; &amp; &quot;y&quot;"
    );
    assert_eq!(render("{{{ body }}}", fields.clone()), "<b>x</b> & \"y\"");
    // Bare placeholders escape like Output.
    assert_eq!(
        render("__body__", fields),
        "&lt;b&gt;x&lt;/b&gt; &amp; &quot;y&quot;"
    );
}

#[test]
fn test_each_renders_n_repetitions_in_order() {
    let out = render(
        r#"<htx:each var="item" in="rows"><li>{{ index }}: __title__</li></htx:each>"#,
        json!({"rows": [{"title": "a"}, {"title": "b"}, {"title": "c"}]}),
    );
    assert_eq!(out, "<li>0: a</li><li>1: b</li><li>2: c</li>");
}

#[test]
fn test_each_over_zero_rows_renders_nothing() {
    let out = render(
        r#"[<htx:each var="item" in="rows">x</htx:each>]"#,
        json!({"rows": []}),
    );
    assert_eq!(out, "[]");
}

#[test]
fn test_operator_semantics() {
    assert_eq!(render("{{ 2 + 3 * 4 - 1 }}", json!({})), "13");
    assert_eq!(render("{{ 10 / 4 }}", json!({})), "2.5");
    assert_eq!(render("{{ 10 % 3 }}", json!({})), "1");
    assert_eq!(render("{{ -n }}", json!({"n": 7})), "-7");
    assert_eq!(render("{{ !n }}", json!({"n": 0})), "true");
    assert_eq!(render(r#"{{ "a" + "b" }}"#, json!({})), "ab");
    assert_eq!(render(r#"{{ "3" * "4" }}"#, json!({})), "12");
    assert_eq!(render("{{ 2 < 3 }}", json!({})), "true");
    assert_eq!(render(r#"{{ n == "5" }}"#, json!({"n": 5})), "true");
    assert_eq!(render("{{ 1 == 2 || 3 > 2 }}", json!({})), "true");
}

#[test]
fn test_short_circuit_skips_right_operand() {
    // The right side would fail (unknown function) if evaluated.
    assert_eq!(render("{{ 0 && nosuch() }}", json!({})), "false");
    assert_eq!(render("{{ 1 || nosuch() }}", json!({})), "true");
}

#[test]
fn test_evaluation_errors_are_not_swallowed() {
    assert!(try_render("{{ 1 / 0 }}", json!({})).is_err());
    assert!(try_render("{{ nosuch(1) }}", json!({})).is_err());
    assert!(try_render("{{ truncate() }}", json!({})).is_err());
    assert!(try_render(r#"{{ "x" - 1 }}"#, json!({})).is_err());
}

#[test]
fn test_dot_access_and_missing_fields() {
    let fields = json!({"author": {"name": "Ada"}});
    assert_eq!(render("{{ author.name }}", fields.clone()), "Ada");
    assert_eq!(render("[{{ author.missing }}]", fields.clone()), "[]");
    assert_eq!(render("[{{ missing.name }}]", fields), "[]");
}

#[test]
fn test_function_composition_in_templates() {
    let out = render(
        r#"{{ upper(truncate(title, 5)) }}"#,
        json!({"title": "hello world"}),
    );
    assert_eq!(out, "HELLO...");
    let out = render(
        r#"{{ default(subtitle, "untitled") }}"#,
        json!({"subtitle": ""}),
    );
    assert_eq!(out, "untitled");
}
