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

//! # Content Collaborator Client
//!
//! The engine consumes (never implements) a content collaborator with
//! two operations:
//!
//! - **query**: `{type, status?, order?, howmany, where?, fields?}` →
//!   `{rows: [...]}`
//! - **prepare**: `{meta: {type, action, recordId?}}` →
//!   `{data: {endpoint, payload, token?, values, labels,
//!   responseTemplates}}`
//!
//! [`HtxContentApi`] is the seam: executors depend on the trait, the
//! production [`HtxContentClient`] speaks JSON over HTTP with a fixed
//! timeout, and tests substitute an in-memory double. Every call carries
//! the tenant key and the DSL protocol version as headers. Collaborator
//! failures propagate unmodified; nothing here retries.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{HtxError, Result};
use crate::record::HtxRowSet;

pub const TENANT_HEADER: &str = "X-Htx-Tenant";
pub const PROTOCOL_HEADER: &str = "X-Htx-Protocol";
pub const PROTOCOL_VERSION: &str = "1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Content query parameters derived from a document's directives.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HtxQueryRequest {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    pub howmany: i64,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HtxQueryResponse {
    #[serde(default)]
    pub rows: HtxRowSet,
}

/// Envelope for the prepare operation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HtxPrepareRequest {
    pub meta: HtxPrepareMeta,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HtxPrepareMeta {
    #[serde(rename = "type")]
    pub content_type: String,
    pub action: String,
    #[serde(rename = "recordId", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HtxPrepareResponse {
    pub data: HtxPrepareData,
}

/// Action materials issued by prepare: where the rendered form posts,
/// the serialized payload blob it must carry, and optional pre-filled
/// values and labels.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HtxPrepareData {
    pub endpoint: String,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub values: Map<String, Value>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(rename = "responseTemplates", default)]
    pub response_templates: HashMap<String, String>,
}

/// The collaborator seam the executors call through.
pub trait HtxContentApi: Send + Sync {
    fn query(&self, request: &HtxQueryRequest) -> Result<HtxRowSet>;
    fn prepare(&self, request: &HtxPrepareRequest) -> Result<HtxPrepareData>;
}

/// Blocking HTTP implementation of [`HtxContentApi`].
#[derive(Clone, Debug)]
pub struct HtxContentClient {
    http: reqwest::blocking::Client,
    base_url: String,
    tenant: String,
}

impl HtxContentClient {
    pub fn new(base_url: impl Into<String>, tenant: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, tenant, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        tenant: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HtxContentClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tenant: tenant.into(),
        })
    }

    fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::blocking::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("collaborator call: POST {}", url);
        let response = self
            .http
            .post(&url)
            .header(TENANT_HEADER, &self.tenant)
            .header(PROTOCOL_HEADER, PROTOCOL_VERSION)
            .json(body)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(HtxError::collaborator(format!(
                "{} returned {}: {}",
                path, status, body
            )));
        }
        Ok(response)
    }
}

impl HtxContentApi for HtxContentClient {
    fn query(&self, request: &HtxQueryRequest) -> Result<HtxRowSet> {
        let response = self.post("/query", request)?;
        let parsed: HtxQueryResponse = response
            .json()
            .map_err(|err| HtxError::collaborator(format!("malformed query response: {}", err)))?;
        Ok(parsed.rows)
    }

    fn prepare(&self, request: &HtxPrepareRequest) -> Result<HtxPrepareData> {
        let response = self.post("/prepare", request)?;
        let parsed: HtxPrepareResponse = response.json().map_err(|err| {
            HtxError::collaborator(format!("malformed prepare response: {}", err))
        })?;
        Ok(parsed.data)
    }
}
