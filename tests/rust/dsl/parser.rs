//! Copyright © 2025-2026 The Htx Authors. All Rights Reserved.
//!
//! This file is part of Htx.
//! The Htx project belongs to the Htx project team.

use htx::dsl::ast::{HtxBinaryOp, HtxNode};
use htx::{HtxError, HtxTemplateParser};

fn template_children(node: HtxNode) -> Vec<HtxNode> {
    match node {
        HtxNode::Template(children) => children,
        other => panic!("expected template root, got {:?}", other),
    }
}

#[test]
fn test_text_placeholder_and_output_nodes() {
    let parser = HtxTemplateParser::new();
    let children = template_children(
        parser
            .parse("<li>__title__ {{ count(tags) }} {{{ body }}}</li>")
            .unwrap(),
    );
    assert_eq!(children[0], HtxNode::Text("<li>".into()));
    assert_eq!(children[1], HtxNode::Placeholder("title".into()));
    assert!(matches!(
        children[3],
        HtxNode::Output(ref inner) if matches!(**inner, HtxNode::FunctionCall { .. })
    ));
    assert!(matches!(
        children[5],
        HtxNode::RawOutput(ref inner) if matches!(**inner, HtxNode::FieldRef(_))
    ));
}

#[test]
fn test_each_block_parses_var_and_iterable() {
    let parser = HtxTemplateParser::new();
    let children = template_children(
        parser
            .parse(r#"<htx:each var="tag" in="tags">x</htx:each>"#)
            .unwrap(),
    );
    match &children[0] {
        HtxNode::Each { var, iterable, body } => {
            assert_eq!(var, "tag");
            assert_eq!(**iterable, HtxNode::FieldRef("tags".into()));
            assert_eq!(body[0], HtxNode::Text("x".into()));
        }
        other => panic!("expected each, got {:?}", other),
    }
}

#[test]
fn test_if_elseif_else_structure() {
    let parser = HtxTemplateParser::new();
    let body = r#"<htx:if condition="a">1<htx:elseif condition="b">2<htx:elseif condition="c">3<htx:else>4</htx:if>"#;
    let children = template_children(parser.parse(body).unwrap());
    match &children[0] {
        HtxNode::If {
            elseifs, else_body, ..
        } => {
            assert_eq!(elseifs.len(), 2);
            assert!(else_body.is_some());
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_missing_closer_is_a_syntax_error_with_line() {
    let parser = HtxTemplateParser::new();
    let err = parser
        .parse("line one\n<htx:if condition=\"a\">never closed")
        .unwrap_err();
    match err {
        HtxError::Syntax { line, .. } => assert_eq!(line, 2),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_stray_closer_is_a_syntax_error() {
    let parser = HtxTemplateParser::new();
    assert!(matches!(
        parser.parse("text </htx:each> more").unwrap_err(),
        HtxError::Syntax { .. }
    ));
}

#[test]
fn test_unterminated_output_is_a_syntax_error() {
    let parser = HtxTemplateParser::new();
    assert!(matches!(
        parser.parse("{{ title ").unwrap_err(),
        HtxError::Syntax { .. }
    ));
    assert!(matches!(
        parser.parse("{{{ title }}").unwrap_err(),
        HtxError::Syntax { .. }
    ));
}

#[test]
fn test_expression_precedence() {
    let parser = HtxTemplateParser::new();
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    match parser.parse_expression("1 + 2 * 3", 1).unwrap() {
        HtxNode::BinaryOp { op, right, .. } => {
            assert_eq!(op, HtxBinaryOp::Add);
            assert!(matches!(
                *right,
                HtxNode::BinaryOp {
                    op: HtxBinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binary op, got {:?}", other),
    }
    // a && b || c parses as (a && b) || c
    match parser.parse_expression("a && b || c", 1).unwrap() {
        HtxNode::BinaryOp { op, left, .. } => {
            assert_eq!(op, HtxBinaryOp::Or);
            assert!(matches!(
                *left,
                HtxNode::BinaryOp {
                    op: HtxBinaryOp::And,
                    ..
                }
            ));
        }
        other => panic!("expected binary op, got {:?}", other),
    }
    // Comparison binds tighter than equality.
    match parser.parse_expression("a < b == c < d", 1).unwrap() {
        HtxNode::BinaryOp { op, .. } => assert_eq!(op, HtxBinaryOp::Eq),
        other => panic!("expected binary op, got {:?}", other),
    }
}

#[test]
fn test_function_calls_with_nested_arguments() {
    let parser = HtxTemplateParser::new();
    match parser
        .parse_expression(r#"truncate(item.title, 5 + 5, "…")"#, 1)
        .unwrap()
    {
        HtxNode::FunctionCall { name, args } => {
            assert_eq!(name, "truncate");
            assert_eq!(args.len(), 3);
            assert!(matches!(args[0], HtxNode::DotAccess { .. }));
            assert!(matches!(args[1], HtxNode::BinaryOp { .. }));
            assert!(matches!(args[2], HtxNode::StringLit(_)));
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_unknown_operator_is_rejected() {
    let parser = HtxTemplateParser::new();
    assert!(parser.parse_expression("a = b", 1).is_err());
    assert!(parser.parse_expression("a & b", 1).is_err());
}

#[test]
fn test_non_namespace_tags_pass_through_as_text() {
    let parser = HtxTemplateParser::new();
    let children = template_children(parser.parse("<div class=\"x\">ok</div>").unwrap());
    assert_eq!(children, vec![HtxNode::Text("<div class=\"x\">ok</div>".into())]);
}

#[test]
fn test_nested_blocks() {
    let parser = HtxTemplateParser::new();
    let body = r#"<htx:each var="row" in="rows"><htx:if condition="row.ok">__title__</htx:if></htx:each>"#;
    let children = template_children(parser.parse(body).unwrap());
    match &children[0] {
        HtxNode::Each { body, .. } => {
            assert!(matches!(body[0], HtxNode::If { .. }));
        }
        other => panic!("expected each, got {:?}", other),
    }
}
