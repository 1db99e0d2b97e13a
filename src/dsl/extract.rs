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

//! # Htx Extraction Module
//!
//! Splits raw DSL text into its three independent products: directive
//! metadata ([`HtxMeta`]), named response templates, and the body template.
//!
//! Extraction is built on a depth-aware tag scanner rather than a
//! non-greedy regex: a `<htx:template>` nested inside another
//! `<htx:template>` is matched by depth counting, so the primary body span
//! is always the first *top-level* tag pair. Every extractor first blanks
//! the primary body span out of its search text, which is what keeps
//! control tags reused inside the body (`<htx:each>`, `<htx:none>`, ...)
//! from being mistaken for top-level directives or response templates.
//!
//! Duplicate directives and duplicate response-template names resolve
//! last-wins; that is the deterministic conflict policy.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{HtxError, Result};

/// Tag namespace prefix of the DSL surface syntax (`<htx:...>`).
pub const HTX_TAG_PREFIX: &str = "htx";

/// Tag names that belong to the body template's control syntax, never to
/// the top-level directive vocabulary.
pub(crate) const CONTROL_TAGS: [&str; 5] = ["each", "if", "elseif", "else", "none"];

/// Tag name of the body template block.
pub(crate) const TEMPLATE_TAG: &str = "template";

/// Attribute names consulted, in order, when a directive tag carries its
/// payload as an attribute instead of inner content. Different directive
/// kinds conventionally use different names (`where` uses `condition`,
/// `order` uses `by`, `howmany` uses `count`, `fields` uses `list`).
const VALUE_ATTRIBUTES: [&str; 6] = ["value", "name", "condition", "by", "count", "list"];

/// A directive value: plain text or a parsed list (e.g. `fields`).
#[derive(Clone, Debug, PartialEq)]
pub enum HtxMetaValue {
    Text(String),
    List(Vec<String>),
}

impl HtxMetaValue {
    /// Collapses the value to display text; lists join with `,`.
    pub fn as_text(&self) -> String {
        match self {
            HtxMetaValue::Text(s) => s.clone(),
            HtxMetaValue::List(items) => items.join(","),
        }
    }

    /// Views the value as a list; text splits on commas.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            HtxMetaValue::Text(s) => split_list(s),
            HtxMetaValue::List(items) => items.clone(),
        }
    }
}

/// Ordered directive metadata extracted from a DSL document.
///
/// Insertion order is preserved; re-inserting an existing name overwrites
/// its value in place (last occurrence wins). Read-only after extraction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HtxMeta {
    entries: Vec<(String, HtxMetaValue)>,
}

impl HtxMeta {
    pub fn insert(&mut self, name: impl Into<String>, value: HtxMetaValue) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&HtxMetaValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(HtxMetaValue::as_text)
    }

    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).map(HtxMetaValue::as_list)
    }

    /// The `howmany` directive coerced to an integer, default 10 when
    /// absent or invalid.
    pub fn howmany(&self) -> u32 {
        match self.text("howmany") {
            None => 10,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) => n,
                Err(_) => {
                    log::warn!("invalid howmany directive '{}', using default 10", raw);
                    10
                }
            },
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, HtxMetaValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Response-type name (lower-cased) to raw fragment content.
pub type HtxResponseTemplates = HashMap<String, String>;

/// The body template block: its raw content plus any attributes carried
/// on the opening tag (rendering hints such as `mode="list"`).
#[derive(Clone, Debug, PartialEq)]
pub struct HtxBodyTemplate {
    pub content: String,
    pub attributes: HashMap<String, String>,
}

impl HtxBodyTemplate {
    /// Rendering-mode hint; `list` when unspecified.
    pub fn mode(&self) -> &str {
        self.attributes.get("mode").map(String::as_str).unwrap_or("list")
    }
}

/// A single matched `<htx:...>` tag in source text.
#[derive(Clone, Debug)]
pub(crate) struct HtxTagMatch {
    pub name: String,
    pub attrs: HashMap<String, String>,
    /// Inner content for paired tags; `None` for self-closing tags.
    pub inner: Option<String>,
    pub start: usize,
    pub end: usize,
}

/// Stateless extractor for directives, response templates, and the body
/// template. Safe to construct once and share across requests.
#[derive(Clone, Debug, Default)]
pub struct HtxExtractor;

impl HtxExtractor {
    pub fn new() -> Self {
        HtxExtractor
    }

    /// Extracts directive metadata, ignoring the primary body span and any
    /// response-template or control tags.
    pub fn meta(&self, source: &str) -> Result<HtxMeta> {
        let cleaned = self.without_primary_body(source)?;
        let mut meta = HtxMeta::default();
        for tag in scan_top_level(&cleaned)? {
            if !is_directive_tag(&tag.name) {
                continue;
            }
            let value = resolve_directive_value(&tag);
            meta.insert(tag.name.clone(), value);
        }
        log::debug!("extracted {} directive(s)", meta.len());
        Ok(meta)
    }

    /// Extracts named response templates (`success`, `error`, `redirect`,
    /// or custom). Keys are lower-cased; the last duplicate wins.
    pub fn response_templates(&self, source: &str) -> Result<HtxResponseTemplates> {
        let cleaned = self.without_primary_body(source)?;
        let mut templates = HtxResponseTemplates::new();
        for tag in scan_top_level(&cleaned)? {
            let Some(key) = response_key(&tag) else {
                continue;
            };
            templates.insert(key, tag.inner.clone().unwrap_or_default());
        }
        log::debug!("extracted {} response template(s)", templates.len());
        Ok(templates)
    }

    /// The canonical body template: the first top-level
    /// `<htx:template>` pair, or `None` when the document has no body.
    pub fn body_template(&self, source: &str) -> Result<Option<HtxBodyTemplate>> {
        Ok(self.body_templates(source)?.into_iter().next())
    }

    /// Extended accessor exposing every top-level body template match in
    /// document order.
    pub fn body_templates(&self, source: &str) -> Result<Vec<HtxBodyTemplate>> {
        let mut templates = Vec::new();
        for tag in scan_top_level(source)? {
            if tag.name == TEMPLATE_TAG {
                templates.push(HtxBodyTemplate {
                    content: tag.inner.clone().unwrap_or_default(),
                    attributes: tag.attrs.clone(),
                });
            }
        }
        Ok(templates)
    }

    /// Blanks the primary body span out of the source, preserving line
    /// numbers so later syntax errors still point at the right line.
    fn without_primary_body(&self, source: &str) -> Result<String> {
        let tags = scan_top_level(source)?;
        let Some(body) = tags.iter().find(|t| t.name == TEMPLATE_TAG) else {
            return Ok(source.to_string());
        };
        let mut cleaned = String::with_capacity(source.len());
        cleaned.push_str(&source[..body.start]);
        for ch in source[body.start..body.end].chars() {
            cleaned.push(if ch == '\n' { '\n' } else { ' ' });
        }
        cleaned.push_str(&source[body.end..]);
        Ok(cleaned)
    }
}

fn is_directive_tag(name: &str) -> bool {
    name != TEMPLATE_TAG
        && !CONTROL_TAGS.contains(&name)
        && name != "response"
        && !name.starts_with("response-")
}

/// Resolution order for a directive's payload: trimmed inner content,
/// then the `value`/`name`/`condition`/`by`/`count`/`list` attributes.
fn resolve_directive_value(tag: &HtxTagMatch) -> HtxMetaValue {
    let mut raw = None;
    let mut from_list_attr = false;
    if let Some(inner) = &tag.inner {
        let trimmed = inner.trim();
        if !trimmed.is_empty() {
            raw = Some(trimmed.to_string());
        }
    }
    if raw.is_none() {
        for attr in VALUE_ATTRIBUTES {
            if let Some(v) = tag.attrs.get(attr) {
                from_list_attr = attr == "list";
                raw = Some(v.clone());
                break;
            }
        }
    }
    let raw = raw.unwrap_or_default();
    if tag.name == "fields" || from_list_attr {
        HtxMetaValue::List(split_list(&raw))
    } else {
        HtxMetaValue::Text(raw)
    }
}

/// Maps a tag to its response-template key: the explicit `name` attribute
/// on `<htx:response>`, or the tag-name suffix of `<htx:response-*>`.
fn response_key(tag: &HtxTagMatch) -> Option<String> {
    if tag.name == "response" {
        let name = tag.attrs.get("name").or_else(|| tag.attrs.get("value"))?;
        return Some(name.to_lowercase());
    }
    tag.name
        .strip_prefix("response-")
        .filter(|suffix| !suffix.is_empty())
        .map(str::to_lowercase)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 1-based line number of a byte offset in source text.
pub(crate) fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

fn attr_regex() -> &'static Regex {
    static ATTR_RE: OnceLock<Regex> = OnceLock::new();
    ATTR_RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
            .expect("attribute regex must compile")
    })
}

/// Parses `key="v"`, `key='v'`, and bare `key=v` attribute tokens.
pub(crate) fn parse_attributes(raw: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for caps in attr_regex().captures_iter(raw) {
        let key = caps[1].to_string();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        attrs.insert(key, value);
    }
    attrs
}

/// Scans source text for top-level `<htx:...>` tags.
///
/// Paired tags are matched depth-aware: a nested same-named opener
/// increments depth and the matching closer is the one that brings depth
/// back to zero. Nested tags of any name are part of the outer tag's
/// inner content and are not reported.
pub(crate) fn scan_top_level(source: &str) -> Result<Vec<HtxTagMatch>> {
    let marker = format!("<{}:", HTX_TAG_PREFIX);
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(found) = source[pos..].find(&marker) {
        let start = pos + found;
        match parse_tag_at(source, start, &marker)? {
            Some(tag) => {
                pos = tag.end;
                tags.push(tag);
            }
            None => pos = start + 1,
        }
    }
    Ok(tags)
}

/// Parses the tag starting at `start` (which points at `<htx:`). Returns
/// `None` when the text is not actually a tag (e.g. `<htx:` with no name).
fn parse_tag_at(source: &str, start: usize, marker: &str) -> Result<Option<HtxTagMatch>> {
    let name_start = start + marker.len();
    let name_len = source[name_start..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
        .count();
    if name_len == 0 {
        return Ok(None);
    }
    let name = &source[name_start..name_start + name_len];

    let (gt, self_closing) = find_open_tag_end(source, name_start + name_len).ok_or_else(|| {
        HtxError::syntax(
            line_of(source, start),
            format!("unterminated tag `<{}:{}`", HTX_TAG_PREFIX, name),
        )
    })?;
    let attrs_raw = source[name_start + name_len..gt].trim_end_matches('/');
    let attrs = parse_attributes(attrs_raw);

    if self_closing {
        return Ok(Some(HtxTagMatch {
            name: name.to_string(),
            attrs,
            inner: None,
            start,
            end: gt + 1,
        }));
    }

    let (inner_end, end) = find_matching_close(source, gt + 1, name).ok_or_else(|| {
        HtxError::syntax(
            line_of(source, start),
            format!("missing closing tag `</{}:{}>`", HTX_TAG_PREFIX, name),
        )
    })?;
    Ok(Some(HtxTagMatch {
        name: name.to_string(),
        attrs,
        inner: Some(source[gt + 1..inner_end].to_string()),
        start,
        end,
    }))
}

/// Finds the `>` terminating an open tag, skipping quoted attribute
/// values. Returns the byte offset of `>` and whether the tag was
/// self-closing.
pub(crate) fn find_open_tag_end(source: &str, from: usize) -> Option<(usize, bool)> {
    let bytes = source.as_bytes();
    let mut quote: Option<u8> = None;
    let mut prev = 0u8;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some((i, prev == b'/')),
                _ => {}
            },
        }
        prev = b;
    }
    None
}

/// Finds the closer matching an already-opened `<htx:name>` tag, counting
/// nested same-named paired openers. Returns (inner end, span end).
fn find_matching_close(source: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let open_pat = format!("<{}:{}", HTX_TAG_PREFIX, name);
    let close_pat = format!("</{}:{}", HTX_TAG_PREFIX, name);
    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let next_open = find_tag_token(source, pos, &open_pat);
        let next_close = find_tag_token(source, pos, &close_pat);
        match (next_open, next_close) {
            (_, None) => return None,
            (Some(open_at), Some(close_at)) if open_at < close_at => {
                // Self-closing nested tags have no closer of their own.
                let (gt, self_closing) = find_open_tag_end(source, open_at + open_pat.len())?;
                if !self_closing {
                    depth += 1;
                }
                pos = gt + 1;
            }
            (_, Some(close_at)) => {
                let gt = source[close_at..].find('>')? + close_at;
                depth -= 1;
                if depth == 0 {
                    return Some((close_at, gt + 1));
                }
                pos = gt + 1;
            }
        }
    }
}

/// Finds `pat` at a tag-name boundary (followed by whitespace, `/`, or
/// `>`), so `<htx:none>` is never confused with `<htx:nonesuch>`.
fn find_tag_token(source: &str, from: usize, pat: &str) -> Option<usize> {
    let mut pos = from;
    while let Some(found) = source[pos..].find(pat) {
        let at = pos + found;
        let after = source.as_bytes().get(at + pat.len());
        match after {
            None => return None,
            Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => return Some(at),
            _ => pos = at + 1,
        }
    }
    None
}
