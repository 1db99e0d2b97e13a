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

//! # Operation Executors
//!
//! Each operation is a straight linear pipeline with no internal retries:
//!
//! - **Get**: extract → derive query parameters from the directives →
//!   collaborator query → hydrate against the returned rows → HTML.
//! - **Set**: extract → collaborator prepare (action defaults to `save`)
//!   → when a `recordId` directive is present, fetch the existing row
//!   (causally after prepare) → hydrate the form in single mode → HTML.
//! - **Delete**: extract → prepare with action `delete` (a `recordId` is
//!   required) → fetch the target row's identifying fields → hydrate the
//!   confirmation fragment → HTML.
//!
//! Collaborator failures propagate unmodified to the caller; a caller
//! wanting graceful degradation catches around the executor call.

use log::info;

use crate::client::{HtxContentApi, HtxPrepareMeta, HtxPrepareRequest, HtxQueryRequest};
use crate::dsl::ast::HtxNode;
use crate::dsl::extract::{HtxBodyTemplate, HtxExtractor, HtxMeta, HtxResponseTemplates};
use crate::dsl::parser::HtxTemplateParser;
use crate::errors::{HtxError, Result};
use crate::functions::HtxFunctionRegistry;
use crate::hydrate::{HtxHydrator, HtxSystemBindings};
use crate::record::HtxRow;

/// A fully parsed DSL document, ready for one executor pass.
#[derive(Clone, Debug)]
pub struct HtxDocument {
    pub meta: HtxMeta,
    pub responses: HtxResponseTemplates,
    pub body: HtxBodyTemplate,
    pub ast: HtxNode,
}

/// Runs Get/Set/Delete pipelines against a collaborator.
pub struct HtxExecutor<'a> {
    api: &'a dyn HtxContentApi,
    functions: &'a HtxFunctionRegistry,
    extractor: HtxExtractor,
    parser: HtxTemplateParser,
}

impl<'a> HtxExecutor<'a> {
    pub fn new(api: &'a dyn HtxContentApi, functions: &'a HtxFunctionRegistry) -> Self {
        HtxExecutor {
            api,
            functions,
            extractor: HtxExtractor::new(),
            parser: HtxTemplateParser::new(),
        }
    }

    /// Extracts directives, response templates, and the compiled body
    /// template. A document without a body template cannot be executed.
    pub fn parse_document(&self, source: &str) -> Result<HtxDocument> {
        let meta = self.extractor.meta(source)?;
        let responses = self.extractor.response_templates(source)?;
        let body = self.extractor.body_template(source)?.ok_or_else(|| {
            HtxError::syntax(1, "document has no <htx:template> body")
        })?;
        let ast = self.parser.parse(&body.content)?;
        Ok(HtxDocument {
            meta,
            responses,
            body,
            ast,
        })
    }

    pub fn get(&self, source: &str) -> Result<String> {
        let doc = self.parse_document(source)?;
        let request = HtxQueryRequest {
            content_type: doc.meta.text("type").unwrap_or_default(),
            status: doc.meta.text("status"),
            order: doc.meta.text("order"),
            howmany: i64::from(doc.meta.howmany()),
            filter: doc.meta.text("where"),
            fields: doc.meta.list("fields"),
        };
        let rows = self.api.query(&request)?;
        let hydrator = HtxHydrator::new(self.functions);
        // The mode hint on the body template picks the hydration shape;
        // single-mode bodies render against the first row only.
        let html = if doc.body.mode() == "single" {
            hydrator.hydrate_single(&doc.ast, rows.first(), &HtxSystemBindings::default())?
        } else {
            hydrator.hydrate_list(&doc.ast, &rows, &HtxSystemBindings::default())?
        };
        info!(
            "get executed: type={} rows={}",
            request.content_type,
            rows.len()
        );
        Ok(html)
    }

    pub fn set(&self, source: &str) -> Result<String> {
        let doc = self.parse_document(source)?;
        let content_type = doc.meta.text("type").unwrap_or_default();
        let record_id = directive(&doc.meta, "recordId");
        let action = directive(&doc.meta, "action").unwrap_or_else(|| "save".to_string());

        let prepared = self.api.prepare(&HtxPrepareRequest {
            meta: HtxPrepareMeta {
                content_type: content_type.clone(),
                action: action.clone(),
                record_id: record_id.clone(),
            },
        })?;

        // The row fetch is causally ordered after prepare; an update form
        // pre-populates from the existing row, a creation form from the
        // prepare-supplied values alone.
        let existing = match &record_id {
            Some(id) => self.fetch_row(&content_type, id)?,
            None => None,
        };
        let mut fields = prepared.values.clone();
        if let Some(row) = existing {
            fields.extend(row);
        }
        let row = if fields.is_empty() { None } else { Some(fields) };

        let system = HtxSystemBindings {
            endpoint: Some(prepared.endpoint),
            payload: prepared.payload,
            token: prepared.token,
            record_id,
        };
        let hydrator = HtxHydrator::new(self.functions);
        let html = hydrator.hydrate_single(&doc.ast, row.as_ref(), &system)?;
        info!("set executed: type={} action={}", content_type, action);
        Ok(html)
    }

    pub fn delete(&self, source: &str) -> Result<String> {
        let doc = self.parse_document(source)?;
        let content_type = doc.meta.text("type").unwrap_or_default();
        let record_id = directive(&doc.meta, "recordId").ok_or_else(|| {
            HtxError::eval("delete requires a recordId directive")
        })?;

        let prepared = self.api.prepare(&HtxPrepareRequest {
            meta: HtxPrepareMeta {
                content_type: content_type.clone(),
                action: "delete".to_string(),
                record_id: Some(record_id.clone()),
            },
        })?;

        let row = self.fetch_row(&content_type, &record_id)?;
        let system = HtxSystemBindings {
            endpoint: Some(prepared.endpoint),
            payload: prepared.payload,
            token: prepared.token,
            record_id: Some(record_id),
        };
        let hydrator = HtxHydrator::new(self.functions);
        let html = hydrator.hydrate_single(&doc.ast, row.as_ref(), &system)?;
        info!("delete executed: type={}", content_type);
        Ok(html)
    }

    fn fetch_row(&self, content_type: &str, record_id: &str) -> Result<Option<HtxRow>> {
        let request = HtxQueryRequest {
            content_type: content_type.to_string(),
            howmany: 1,
            filter: Some(format!("id = {}", record_id)),
            ..Default::default()
        };
        Ok(self.api.query(&request)?.into_iter().next())
    }
}

fn directive(meta: &HtxMeta, name: &str) -> Option<String> {
    meta.text(name).filter(|value| !value.is_empty())
}
