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

use serde_json::Number;

use crate::errors::{HtxError, Result};

/// A single token of the expression sub-language.
#[derive(Clone, Debug, PartialEq)]
pub enum HtxToken {
    Ident(String),
    Str(String),
    Num(Number),
    Bool(bool),
    Dot,
    Comma,
    LParen,
    RParen,
    Star,
    Slash,
    Percent,
    Plus,
    Minus,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Bang,
}

/// Tokenizes one expression. `line` is the 1-based template line the
/// expression starts on; every lex error reports it.
pub fn tokenize(input: &str, line: usize) -> Result<Vec<HtxToken>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
            b'(' => {
                tokens.push(HtxToken::LParen);
                pos += 1;
            }
            b')' => {
                tokens.push(HtxToken::RParen);
                pos += 1;
            }
            b',' => {
                tokens.push(HtxToken::Comma);
                pos += 1;
            }
            b'.' => {
                tokens.push(HtxToken::Dot);
                pos += 1;
            }
            b'*' => {
                tokens.push(HtxToken::Star);
                pos += 1;
            }
            b'/' => {
                tokens.push(HtxToken::Slash);
                pos += 1;
            }
            b'%' => {
                tokens.push(HtxToken::Percent);
                pos += 1;
            }
            b'+' => {
                tokens.push(HtxToken::Plus);
                pos += 1;
            }
            b'-' => {
                tokens.push(HtxToken::Minus);
                pos += 1;
            }
            b'<' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    tokens.push(HtxToken::Le);
                    pos += 2;
                } else {
                    tokens.push(HtxToken::Lt);
                    pos += 1;
                }
            }
            b'>' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    tokens.push(HtxToken::Ge);
                    pos += 2;
                } else {
                    tokens.push(HtxToken::Gt);
                    pos += 1;
                }
            }
            b'=' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    tokens.push(HtxToken::EqEq);
                    pos += 2;
                } else {
                    return Err(HtxError::syntax(line, "unknown operator token `=`"));
                }
            }
            b'!' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    tokens.push(HtxToken::NotEq);
                    pos += 2;
                } else {
                    tokens.push(HtxToken::Bang);
                    pos += 1;
                }
            }
            b'&' => {
                if bytes.get(pos + 1) == Some(&b'&') {
                    tokens.push(HtxToken::AndAnd);
                    pos += 2;
                } else {
                    return Err(HtxError::syntax(line, "unknown operator token `&`"));
                }
            }
            b'|' => {
                if bytes.get(pos + 1) == Some(&b'|') {
                    tokens.push(HtxToken::OrOr);
                    pos += 2;
                } else {
                    return Err(HtxError::syntax(line, "unknown operator token `|`"));
                }
            }
            b'"' | b'\'' => {
                let (s, next) = lex_string(input, pos, line)?;
                tokens.push(HtxToken::Str(s));
                pos = next;
            }
            b'0'..=b'9' => {
                let (n, next) = lex_number(input, pos, line)?;
                tokens.push(HtxToken::Num(n));
                pos = next;
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                let len = bytes[pos..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                let word = &input[pos..pos + len];
                match word {
                    "true" => tokens.push(HtxToken::Bool(true)),
                    "false" => tokens.push(HtxToken::Bool(false)),
                    _ => tokens.push(HtxToken::Ident(word.to_string())),
                }
                pos += len;
            }
            other => {
                return Err(HtxError::syntax(
                    line,
                    format!("unknown operator token `{}`", other as char),
                ));
            }
        }
    }
    Ok(tokens)
}

/// Lexes a quoted string literal starting at `pos`; backslash escapes the
/// next character. Returns the unescaped text and the offset past the
/// closing quote.
fn lex_string(input: &str, pos: usize, line: usize) -> Result<(String, usize)> {
    let bytes = input.as_bytes();
    let quote = bytes[pos];
    let mut out = String::new();
    let mut i = pos + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == quote {
            return Ok((out, i + 1));
        }
        if b == b'\\' && i + 1 < bytes.len() {
            out.push(bytes[i + 1] as char);
            i += 2;
            continue;
        }
        // Multi-byte characters pass through untouched.
        let ch_len = utf8_len(b);
        out.push_str(&input[i..i + ch_len]);
        i += ch_len;
    }
    Err(HtxError::syntax(line, "unterminated string literal"))
}

fn lex_number(input: &str, pos: usize, line: usize) -> Result<(Number, usize)> {
    let bytes = input.as_bytes();
    let mut i = pos;
    let mut seen_dot = false;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => i += 1,
            // A dot is part of the number only when digits follow;
            // otherwise it is a DotAccess on a literal, which the
            // parser rejects anyway.
            b'.' if !seen_dot && matches!(bytes.get(i + 1), Some(b'0'..=b'9')) => {
                seen_dot = true;
                i += 1;
            }
            _ => break,
        }
    }
    let raw = &input[pos..i];
    let number = if seen_dot {
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| HtxError::syntax(line, format!("invalid number literal `{}`", raw)))?
    } else {
        raw.parse::<i64>()
            .map(Number::from)
            .map_err(|_| HtxError::syntax(line, format!("invalid number literal `{}`", raw)))?
    };
    Ok((number, i))
}

fn utf8_len(first: u8) -> usize {
    match first {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}
