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

//! # Htx Template Parser
//!
//! Compiles a body template into an [`HtxNode::Template`] tree. A body is a
//! sequence of text runs interspersed with:
//!
//! - bare field placeholders: `__name__`
//! - escaped-output expressions: `{{ expr }}`
//! - raw-output expressions: `{{{ expr }}}`
//! - control blocks: `<htx:each>`, `<htx:if>`/`<htx:elseif>`/`<htx:else>`,
//!   `<htx:none>`, each bounded by its matching closer
//!
//! The expression sub-language supports string/number/boolean literals,
//! field references, dot access, unary `!`/`-`, binary operators with
//! standard precedence, and nestable function calls. Parse failures raise
//! [`HtxError::Syntax`] carrying the 1-based template line.

use std::collections::HashMap;

use crate::dsl::ast::{HtxBinaryOp, HtxElseIf, HtxNode, HtxUnaryOp};
use crate::dsl::extract::{find_open_tag_end, line_of, parse_attributes, HTX_TAG_PREFIX};
use crate::dsl::lexer::{tokenize, HtxToken};
use crate::errors::{HtxError, Result};

/// Stateless body-template parser. Safe to construct once and share
/// across concurrent requests.
#[derive(Clone, Debug, Default)]
pub struct HtxTemplateParser;

impl HtxTemplateParser {
    pub fn new() -> Self {
        HtxTemplateParser
    }

    /// Parses a body template into its AST root.
    pub fn parse(&self, body: &str) -> Result<HtxNode> {
        let mut cursor = Cursor { src: body, pos: 0 };
        // With no closer and no markers allowed, the scan can only stop
        // at end of input; anything stray errors inside parse_nodes.
        let (children, _stop) = parse_nodes(&mut cursor, None, false)?;
        Ok(HtxNode::Template(children))
    }

    /// Parses a standalone expression (as found in `in`/`condition`
    /// attributes or between output delimiters).
    pub fn parse_expression(&self, expr: &str, line: usize) -> Result<HtxNode> {
        parse_expression_str(expr, line)
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn line(&self) -> usize {
        line_of(self.src, self.pos)
    }
}

/// Why a child-node scan stopped.
enum Stop {
    Eof,
    /// A control closer `</htx:name>`, already consumed.
    Closer { name: String, line: usize },
    /// An `elseif`/`else` marker tag, already consumed.
    Marker {
        name: String,
        attrs: HashMap<String, String>,
        line: usize,
    },
}

/// The next recognized construct in the text.
enum Special {
    RawExpr,
    Expr,
    Placeholder,
    OpenTag,
    CloseTag,
}

/// Scans children until EOF, the expected closer, or (when
/// `if_markers` is set) an `elseif`/`else` marker.
fn parse_nodes(
    cursor: &mut Cursor<'_>,
    closer: Option<&str>,
    if_markers: bool,
) -> Result<(Vec<HtxNode>, Stop)> {
    let mut nodes = Vec::new();
    let mut text_start = cursor.pos;

    loop {
        let Some((at, special)) = next_special(cursor.src, cursor.pos) else {
            push_text(&mut nodes, &cursor.src[text_start..]);
            cursor.pos = cursor.src.len();
            return Ok((nodes, Stop::Eof));
        };
        push_text(&mut nodes, &cursor.src[text_start..at]);
        cursor.pos = at;

        match special {
            Special::RawExpr => {
                nodes.push(parse_output(cursor, true)?);
            }
            Special::Expr => {
                nodes.push(parse_output(cursor, false)?);
            }
            Special::Placeholder => {
                if let Some(node) = parse_placeholder(cursor) {
                    nodes.push(node);
                } else {
                    // Not a valid placeholder; the underscores are text.
                    push_text(&mut nodes, "__");
                    cursor.pos += 2;
                }
            }
            Special::OpenTag => {
                let line = cursor.line();
                let tag = parse_control_open(cursor)?;
                match tag.name.as_str() {
                    "each" => nodes.push(parse_each(cursor, tag, line)?),
                    "if" => nodes.push(parse_if(cursor, tag, line)?),
                    "none" => nodes.push(parse_none(cursor, tag, line)?),
                    "elseif" | "else" => {
                        if if_markers {
                            return Ok((
                                nodes,
                                Stop::Marker {
                                    name: tag.name,
                                    attrs: tag.attrs,
                                    line,
                                },
                            ));
                        }
                        return Err(HtxError::syntax(
                            line,
                            format!("`<{}:{}>` outside of an if block", HTX_TAG_PREFIX, tag.name),
                        ));
                    }
                    other => {
                        return Err(HtxError::internal(format!(
                            "unexpected control tag `{}`",
                            other
                        )));
                    }
                }
            }
            Special::CloseTag => {
                let line = cursor.line();
                let name = parse_control_close(cursor)?;
                if closer == Some(name.as_str()) {
                    return Ok((nodes, Stop::Closer { name, line }));
                }
                return Err(HtxError::syntax(
                    line,
                    format!("unmatched block terminator `</{}:{}>`", HTX_TAG_PREFIX, name),
                ));
            }
        }
        text_start = cursor.pos;
    }
}

fn push_text(nodes: &mut Vec<HtxNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(HtxNode::Text(existing)) = nodes.last_mut() {
        existing.push_str(text);
    } else {
        nodes.push(HtxNode::Text(text.to_string()));
    }
}

/// Finds the earliest recognized construct at or after `from`.
fn next_special(src: &str, from: usize) -> Option<(usize, Special)> {
    let mut pos = from;
    while pos < src.len() {
        let rest = &src[pos..];
        let candidates = [
            rest.find("{{"),
            rest.find("__"),
            rest.find("<htx:"),
            rest.find("</htx:"),
        ];
        let at = candidates.iter().flatten().min().copied()? + pos;
        let rest = &src[at..];
        if rest.starts_with("{{{") {
            return Some((at, Special::RawExpr));
        }
        if rest.starts_with("{{") {
            return Some((at, Special::Expr));
        }
        if rest.starts_with("</htx:") {
            if control_name_at(src, at + "</htx:".len()).is_some() {
                return Some((at, Special::CloseTag));
            }
            pos = at + 1;
            continue;
        }
        if rest.starts_with("<htx:") {
            if control_name_at(src, at + "<htx:".len()).is_some() {
                return Some((at, Special::OpenTag));
            }
            // Some other htx tag; passes through as text.
            pos = at + 1;
            continue;
        }
        return Some((at, Special::Placeholder));
    }
    None
}

/// Reads the tag name at `at` and returns it when it is a body control
/// tag (`each`, `if`, `elseif`, `else`, `none`).
fn control_name_at(src: &str, at: usize) -> Option<&str> {
    let len = src[at..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
        .count();
    let name = &src[at..at + len];
    crate::dsl::extract::CONTROL_TAGS
        .contains(&name)
        .then_some(name)
}

struct ControlTag {
    name: String,
    attrs: HashMap<String, String>,
    self_closing: bool,
}

/// Consumes a control open tag (`<htx:name attrs>` or `<htx:name/>`).
fn parse_control_open(cursor: &mut Cursor<'_>) -> Result<ControlTag> {
    let line = cursor.line();
    let name_start = cursor.pos + "<htx:".len();
    let name = control_name_at(cursor.src, name_start)
        .ok_or_else(|| HtxError::internal("control tag name vanished"))?
        .to_string();
    let (gt, self_closing) =
        find_open_tag_end(cursor.src, name_start + name.len()).ok_or_else(|| {
            HtxError::syntax(
                line,
                format!("unterminated tag `<{}:{}`", HTX_TAG_PREFIX, name),
            )
        })?;
    let attrs_raw = cursor.src[name_start + name.len()..gt].trim_end_matches('/');
    let attrs = parse_attributes(attrs_raw);
    cursor.pos = gt + 1;
    Ok(ControlTag {
        name,
        attrs,
        self_closing,
    })
}

/// Consumes a control closer (`</htx:name>`), returning the name.
fn parse_control_close(cursor: &mut Cursor<'_>) -> Result<String> {
    let line = cursor.line();
    let name_start = cursor.pos + "</htx:".len();
    let name = control_name_at(cursor.src, name_start)
        .ok_or_else(|| HtxError::internal("control closer name vanished"))?
        .to_string();
    let rest = &cursor.src[name_start + name.len()..];
    let gt = rest
        .find('>')
        .ok_or_else(|| HtxError::syntax(line, format!("unterminated closer `</{}:{}`", HTX_TAG_PREFIX, name)))?;
    cursor.pos = name_start + name.len() + gt + 1;
    Ok(name)
}

fn parse_each(cursor: &mut Cursor<'_>, tag: ControlTag, line: usize) -> Result<HtxNode> {
    let var = tag
        .attrs
        .get("var")
        .cloned()
        .unwrap_or_else(|| "item".to_string());
    let in_expr = tag.attrs.get("in").ok_or_else(|| {
        HtxError::syntax(line, "`<htx:each>` requires an `in` attribute")
    })?;
    let iterable = parse_expression_str(in_expr, line)?;
    let body = if tag.self_closing {
        Vec::new()
    } else {
        let (body, stop) = parse_nodes(cursor, Some("each"), false)?;
        expect_closer(stop, "each", line)?;
        body
    };
    Ok(HtxNode::Each {
        var,
        iterable: Box::new(iterable),
        body,
    })
}

fn parse_none(cursor: &mut Cursor<'_>, tag: ControlTag, line: usize) -> Result<HtxNode> {
    let body = if tag.self_closing {
        Vec::new()
    } else {
        let (body, stop) = parse_nodes(cursor, Some("none"), false)?;
        expect_closer(stop, "none", line)?;
        body
    };
    Ok(HtxNode::NoneBlock(body))
}

fn parse_if(cursor: &mut Cursor<'_>, tag: ControlTag, line: usize) -> Result<HtxNode> {
    let condition = if_condition(&tag.attrs, line)?;
    let mut elseifs: Vec<HtxElseIf> = Vec::new();
    let mut else_body: Option<Vec<HtxNode>> = None;

    let (body, mut stop) = parse_nodes(cursor, Some("if"), true)?;
    loop {
        match stop {
            Stop::Closer { .. } => break,
            Stop::Eof => {
                return Err(HtxError::syntax(
                    line,
                    format!("missing closing tag `</{}:if>`", HTX_TAG_PREFIX),
                ));
            }
            Stop::Marker {
                name,
                attrs,
                line: marker_line,
            } => {
                if name == "elseif" {
                    if else_body.is_some() {
                        return Err(HtxError::syntax(
                            marker_line,
                            "`<htx:elseif>` after `<htx:else>`",
                        ));
                    }
                    let condition = if_condition(&attrs, marker_line)?;
                    let (clause_body, next) = parse_nodes(cursor, Some("if"), true)?;
                    elseifs.push(HtxElseIf {
                        condition,
                        body: clause_body,
                    });
                    stop = next;
                } else {
                    if else_body.is_some() {
                        return Err(HtxError::syntax(
                            marker_line,
                            "duplicate `<htx:else>` in if block",
                        ));
                    }
                    let (clause_body, next) = parse_nodes(cursor, Some("if"), true)?;
                    else_body = Some(clause_body);
                    stop = next;
                }
            }
        }
    }

    Ok(HtxNode::If {
        condition: Box::new(condition),
        body,
        elseifs,
        else_body,
    })
}

fn if_condition(attrs: &HashMap<String, String>, line: usize) -> Result<HtxNode> {
    let raw = attrs
        .get("condition")
        .or_else(|| attrs.get("value"))
        .ok_or_else(|| HtxError::syntax(line, "if block requires a `condition` attribute"))?;
    parse_expression_str(raw, line)
}

fn expect_closer(stop: Stop, name: &str, open_line: usize) -> Result<()> {
    match stop {
        Stop::Closer { .. } => Ok(()),
        _ => Err(HtxError::syntax(
            open_line,
            format!("missing closing tag `</{}:{}>`", HTX_TAG_PREFIX, name),
        )),
    }
}

/// Consumes `{{ expr }}` or `{{{ expr }}}` at the cursor.
fn parse_output(cursor: &mut Cursor<'_>, raw: bool) -> Result<HtxNode> {
    let line = cursor.line();
    let (open, close) = if raw { ("{{{", "}}}") } else { ("{{", "}}") };
    let expr_start = cursor.pos + open.len();
    let rel_end = cursor.src[expr_start..].find(close).ok_or_else(|| {
        HtxError::syntax(line, format!("unterminated expression delimiter `{}`", open))
    })?;
    let expr = &cursor.src[expr_start..expr_start + rel_end];
    cursor.pos = expr_start + rel_end + close.len();
    let node = parse_expression_str(expr, line)?;
    Ok(if raw {
        HtxNode::RawOutput(Box::new(node))
    } else {
        HtxNode::Output(Box::new(node))
    })
}

/// Attempts to consume a `__name__` placeholder at the cursor. Returns
/// `None` (without advancing) when the text is not a valid placeholder.
fn parse_placeholder(cursor: &mut Cursor<'_>) -> Option<HtxNode> {
    let inner_start = cursor.pos + 2;
    let rest = &cursor.src[inner_start..];
    let rel_close = rest.find("__")?;
    let name = &rest[..rel_close];
    let valid = !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.ends_with('_');
    if !valid {
        return None;
    }
    cursor.pos = inner_start + rel_close + 2;
    Some(HtxNode::Placeholder(name.to_string()))
}

/// Parses one full expression from text; trailing tokens are an error.
pub(crate) fn parse_expression_str(expr: &str, line: usize) -> Result<HtxNode> {
    let tokens = tokenize(expr, line)?;
    if tokens.is_empty() {
        return Err(HtxError::syntax(line, "empty expression"));
    }
    let mut parser = ExprParser { tokens, pos: 0, line };
    let node = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(HtxError::syntax(
            line,
            format!("unexpected token after expression in `{}`", expr.trim()),
        ));
    }
    Ok(node)
}

/// Precedence-climbing expression parser over a token stream.
struct ExprParser {
    tokens: Vec<HtxToken>,
    pos: usize,
    line: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&HtxToken> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &HtxToken) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn binary_level(
        &mut self,
        ops: &[(HtxToken, HtxBinaryOp)],
        next: fn(&mut Self) -> Result<HtxNode>,
    ) -> Result<HtxNode> {
        let mut left = next(self)?;
        'outer: loop {
            for (token, op) in ops {
                if self.eat(token) {
                    let right = next(self)?;
                    left = HtxNode::BinaryOp {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn parse_or(&mut self) -> Result<HtxNode> {
        self.binary_level(&[(HtxToken::OrOr, HtxBinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<HtxNode> {
        self.binary_level(&[(HtxToken::AndAnd, HtxBinaryOp::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<HtxNode> {
        self.binary_level(
            &[
                (HtxToken::EqEq, HtxBinaryOp::Eq),
                (HtxToken::NotEq, HtxBinaryOp::Ne),
            ],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<HtxNode> {
        self.binary_level(
            &[
                (HtxToken::Le, HtxBinaryOp::Le),
                (HtxToken::Lt, HtxBinaryOp::Lt),
                (HtxToken::Ge, HtxBinaryOp::Ge),
                (HtxToken::Gt, HtxBinaryOp::Gt),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<HtxNode> {
        self.binary_level(
            &[
                (HtxToken::Plus, HtxBinaryOp::Add),
                (HtxToken::Minus, HtxBinaryOp::Sub),
            ],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<HtxNode> {
        self.binary_level(
            &[
                (HtxToken::Star, HtxBinaryOp::Mul),
                (HtxToken::Slash, HtxBinaryOp::Div),
                (HtxToken::Percent, HtxBinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<HtxNode> {
        if self.eat(&HtxToken::Bang) {
            return Ok(HtxNode::UnaryOp {
                op: HtxUnaryOp::Not,
                operand: Box::new(self.parse_unary()?),
            });
        }
        if self.eat(&HtxToken::Minus) {
            return Ok(HtxNode::UnaryOp {
                op: HtxUnaryOp::Neg,
                operand: Box::new(self.parse_unary()?),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<HtxNode> {
        let mut node = self.parse_primary()?;
        while self.eat(&HtxToken::Dot) {
            match self.peek().cloned() {
                Some(HtxToken::Ident(property)) => {
                    self.pos += 1;
                    node = HtxNode::DotAccess {
                        target: Box::new(node),
                        property,
                    };
                }
                _ => {
                    return Err(HtxError::syntax(
                        self.line,
                        "expected property name after `.`",
                    ));
                }
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<HtxNode> {
        match self.peek().cloned() {
            Some(HtxToken::Num(n)) => {
                self.pos += 1;
                Ok(HtxNode::NumberLit(n))
            }
            Some(HtxToken::Str(s)) => {
                self.pos += 1;
                Ok(HtxNode::StringLit(s))
            }
            Some(HtxToken::Bool(b)) => {
                self.pos += 1;
                Ok(HtxNode::BoolLit(b))
            }
            Some(HtxToken::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                if !self.eat(&HtxToken::RParen) {
                    return Err(HtxError::syntax(self.line, "expected `)`"));
                }
                Ok(inner)
            }
            Some(HtxToken::Ident(name)) => {
                self.pos += 1;
                if self.eat(&HtxToken::LParen) {
                    let args = self.parse_arguments()?;
                    Ok(HtxNode::FunctionCall { name, args })
                } else {
                    Ok(HtxNode::FieldRef(name))
                }
            }
            Some(other) => Err(HtxError::syntax(
                self.line,
                format!("unexpected token {:?}", other),
            )),
            None => Err(HtxError::syntax(self.line, "unexpected end of expression")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<HtxNode>> {
        let mut args = Vec::new();
        if self.eat(&HtxToken::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            if self.eat(&HtxToken::Comma) {
                continue;
            }
            if self.eat(&HtxToken::RParen) {
                return Ok(args);
            }
            return Err(HtxError::syntax(
                self.line,
                "expected `,` or `)` in argument list",
            ));
        }
    }
}
