//! Copyright © 2025-2026 The Htx Authors. All Rights Reserved.
//!
//! This file is part of Htx.
//! The Htx project belongs to the Htx project team.

use std::sync::{Arc, Mutex};

use htx::{
    HtxContentApi, HtxEngine, HtxPrepareData, HtxPrepareRequest, HtxQueryRequest, HtxRowSet,
    Result,
};
use serde_json::json;

/// In-memory collaborator double recording every request it receives.
#[derive(Default)]
struct FakeContentApi {
    rows: Mutex<Vec<HtxRowSet>>,
    prepare_data: Mutex<Vec<HtxPrepareData>>,
    queries: Mutex<Vec<HtxQueryRequest>>,
    prepares: Mutex<Vec<HtxPrepareRequest>>,
}

impl FakeContentApi {
    fn with_rows(rows: serde_json::Value) -> Self {
        let api = FakeContentApi::default();
        api.push_rows(rows);
        api
    }

    fn push_rows(&self, rows: serde_json::Value) {
        let set: HtxRowSet = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        self.rows.lock().unwrap().push(set);
    }

    fn push_prepare(&self, data: HtxPrepareData) {
        self.prepare_data.lock().unwrap().push(data);
    }
}

impl HtxContentApi for FakeContentApi {
    fn query(&self, request: &HtxQueryRequest) -> Result<HtxRowSet> {
        self.queries.lock().unwrap().push(request.clone());
        let mut rows = self.rows.lock().unwrap();
        Ok(if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        })
    }

    fn prepare(&self, request: &HtxPrepareRequest) -> Result<HtxPrepareData> {
        self.prepares.lock().unwrap().push(request.clone());
        let mut data = self.prepare_data.lock().unwrap();
        Ok(if data.is_empty() {
            HtxPrepareData::default()
        } else {
            data.remove(0)
        })
    }
}

const LIST_DOC: &str = r#"<htx:type value="article"/>
<htx:order by="date desc"/>
<htx:howmany count="5"/>
<htx:fields>title, date</htx:fields>
<htx:template mode="list">
<ul><htx:each var="item" in="rows"><li>__title__</li></htx:each><htx:none><li>No entries.</li></htx:none></ul>
</htx:template>"#;

const FORM_DOC: &str = r#"<htx:type value="article"/>
<htx:template mode="single">
<form action="__endpoint__"><input name="title" value="__title__"/><textarea name="body">__body__</textarea><input type="hidden" name="payload" value="__payload__"/></form>
</htx:template>"#;

#[test]
fn test_get_two_rows_renders_two_fragments() {
    let api = Arc::new(FakeContentApi::with_rows(json!([
        {"title": "First"},
        {"title": "Second"}
    ])));
    let engine = HtxEngine::new(api.clone());
    let html = engine.get(LIST_DOC).unwrap();

    assert!(html.contains("<li>First</li><li>Second</li>"));
    assert!(!html.contains("No entries."));

    let queries = api.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].content_type, "article");
    assert_eq!(queries[0].order.as_deref(), Some("date desc"));
    assert_eq!(queries[0].howmany, 5);
    assert_eq!(
        queries[0].fields,
        Some(vec!["title".to_string(), "date".to_string()])
    );
}

#[test]
fn test_get_zero_rows_renders_none_fallback() {
    let api = Arc::new(FakeContentApi::with_rows(json!([])));
    let engine = HtxEngine::new(api);
    let html = engine.get(LIST_DOC).unwrap();
    assert!(html.contains("<li>No entries.</li>"));
    assert!(!html.contains("<li></li>"));
}

#[test]
fn test_set_without_record_id_prepares_save_and_blanks_placeholders() {
    let api = Arc::new(FakeContentApi::default());
    api.push_prepare(HtxPrepareData {
        endpoint: "/content/article/save".into(),
        payload: Some("tok-blob".into()),
        ..Default::default()
    });
    let engine = HtxEngine::new(api.clone());
    let html = engine.set(FORM_DOC).unwrap();

    // Prepare carried {type: "article", action: "save"}, no recordId.
    let prepares = api.prepares.lock().unwrap();
    assert_eq!(prepares.len(), 1);
    assert_eq!(prepares[0].meta.content_type, "article");
    assert_eq!(prepares[0].meta.action, "save");
    assert!(prepares[0].meta.record_id.is_none());
    // No row fetch happened for a creation form.
    assert!(api.queries.lock().unwrap().is_empty());

    // Field placeholders are empty, action materials are bound.
    assert!(html.contains(r#"<form action="/content/article/save">"#));
    assert!(html.contains(r#"<input name="title" value=""/>"#));
    assert!(html.contains(r#"<textarea name="body"></textarea>"#));
    assert!(html.contains(r#"value="tok-blob""#));
}

#[test]
fn test_set_with_record_id_prefills_from_existing_row() {
    let doc = FORM_DOC.replace(
        "<htx:type value=\"article\"/>",
        "<htx:type value=\"article\"/><htx:recordId>42</htx:recordId>",
    );
    let api = Arc::new(FakeContentApi::with_rows(json!([
        {"title": "Existing", "body": "Old text"}
    ])));
    api.push_prepare(HtxPrepareData {
        endpoint: "/content/article/update".into(),
        payload: Some("tok".into()),
        ..Default::default()
    });
    let engine = HtxEngine::new(api.clone());
    let html = engine.set(&doc).unwrap();

    let prepares = api.prepares.lock().unwrap();
    assert_eq!(prepares[0].meta.record_id.as_deref(), Some("42"));
    // The row fetch is scoped to the record.
    let queries = api.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].filter.as_deref(), Some("id = 42"));
    assert_eq!(queries[0].howmany, 1);

    assert!(html.contains(r#"value="Existing""#));
    assert!(html.contains(">Old text</textarea>"));
}

#[test]
fn test_delete_prepares_delete_and_renders_confirmation() {
    let doc = r#"<htx:type value="article"/>
<htx:recordId>7</htx:recordId>
<htx:template mode="single">
<p>Delete "__title__"?</p><form action="__endpoint__"><input type="hidden" value="__payload__"/></form>
</htx:template>"#;
    let api = Arc::new(FakeContentApi::with_rows(json!([{"title": "Doomed"}])));
    api.push_prepare(HtxPrepareData {
        endpoint: "/content/article/delete".into(),
        payload: Some("del-tok".into()),
        ..Default::default()
    });
    let engine = HtxEngine::new(api.clone());
    let html = engine.delete(doc).unwrap();

    let prepares = api.prepares.lock().unwrap();
    assert_eq!(prepares[0].meta.action, "delete");
    assert_eq!(prepares[0].meta.record_id.as_deref(), Some("7"));
    assert!(html.contains(r#"Delete "Doomed"?"#));
    assert!(html.contains("/content/article/delete"));
    assert!(html.contains("del-tok"));
}

#[test]
fn test_collaborator_errors_propagate() {
    struct Failing;
    impl HtxContentApi for Failing {
        fn query(&self, _request: &HtxQueryRequest) -> Result<HtxRowSet> {
            Err(htx::HtxError::collaborator("boom"))
        }
        fn prepare(&self, _request: &HtxPrepareRequest) -> Result<HtxPrepareData> {
            Err(htx::HtxError::collaborator("boom"))
        }
    }
    let engine = HtxEngine::new(Arc::new(Failing));
    assert!(matches!(
        engine.get(LIST_DOC).unwrap_err(),
        htx::HtxError::Collaborator { .. }
    ));
    assert!(matches!(
        engine.set(FORM_DOC).unwrap_err(),
        htx::HtxError::Collaborator { .. }
    ));
}

#[test]
fn test_prepare_values_seed_creation_forms() {
    let api = Arc::new(FakeContentApi::default());
    api.push_prepare(HtxPrepareData {
        endpoint: "/save".into(),
        values: json!({"title": "Draft title"})
            .as_object()
            .cloned()
            .unwrap(),
        ..Default::default()
    });
    let engine = HtxEngine::new(api);
    let html = engine.set(FORM_DOC).unwrap();
    assert!(html.contains(r#"value="Draft title""#));
}
