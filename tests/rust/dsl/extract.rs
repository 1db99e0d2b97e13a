//! Copyright © 2025-2026 The Htx Authors. All Rights Reserved.
//!
//! This file is part of Htx.
//! The Htx project belongs to the Htx project team.

use htx::{HtxError, HtxExtractor, HtxMetaValue};

const DOC: &str = r#"<htx:action>list</htx:action>
<htx:type value="article"/>
<htx:order by="date desc"/>
<htx:howmany count="5"/>
<htx:where condition="status=published"/>
<htx:fields>title, body, date</htx:fields>
<htx:response name="success"><p>Saved.</p></htx:response>
<htx:response-error><p>Failed.</p></htx:response-error>
<htx:template mode="list">
  <htx:each var="item" in="rows"><li>__title__</li></htx:each>
  <htx:none><li>No entries.</li></htx:none>
</htx:template>
"#;

#[test]
fn test_full_document_extraction() {
    let extractor = HtxExtractor::new();

    let meta = extractor.meta(DOC).unwrap();
    assert_eq!(meta.text("action").as_deref(), Some("list"));
    assert_eq!(meta.text("type").as_deref(), Some("article"));
    assert_eq!(meta.text("order").as_deref(), Some("date desc"));
    assert_eq!(meta.text("where").as_deref(), Some("status=published"));
    assert_eq!(meta.howmany(), 5);
    assert_eq!(
        meta.get("fields"),
        Some(&HtxMetaValue::List(vec![
            "title".into(),
            "body".into(),
            "date".into()
        ]))
    );

    let responses = extractor.response_templates(DOC).unwrap();
    assert_eq!(responses.get("success").unwrap(), "<p>Saved.</p>");
    assert_eq!(responses.get("error").unwrap(), "<p>Failed.</p>");

    let body = extractor.body_template(DOC).unwrap().unwrap();
    assert_eq!(body.mode(), "list");
    assert!(body.content.contains("<htx:each"));
}

#[test]
fn test_extraction_stable_regardless_of_body_content() {
    // Directives repeated inside the body span are part of the template,
    // not the document's metadata.
    let noisy = DOC.replace(
        "__title__",
        "<htx:action>delete</htx:action><htx:type>page</htx:type> __title__",
    );
    let extractor = HtxExtractor::new();
    let meta = extractor.meta(&noisy).unwrap();
    assert_eq!(meta.text("action").as_deref(), Some("list"));
    assert_eq!(meta.text("type").as_deref(), Some("article"));

    let responses = extractor
        .response_templates(&DOC.replace(
            "__title__",
            "<htx:response name=\"success\">body-noise</htx:response> __title__",
        ))
        .unwrap();
    assert_eq!(responses.get("success").unwrap(), "<p>Saved.</p>");
}

#[test]
fn test_duplicate_directives_and_responses_last_wins() {
    let doc = "<htx:type>article</htx:type>\
               <htx:type>page</htx:type>\
               <htx:response name=\"success\">one</htx:response>\
               <htx:response-Success>two</htx:response-Success>";
    let extractor = HtxExtractor::new();
    let meta = extractor.meta(doc).unwrap();
    assert_eq!(meta.text("type").as_deref(), Some("page"));
    assert_eq!(meta.len(), 1);
    let responses = extractor.response_templates(doc).unwrap();
    assert_eq!(responses.get("success").unwrap(), "two");
    assert_eq!(responses.len(), 1);
}

#[test]
fn test_nested_template_tags_match_by_depth() {
    let doc = "<htx:template>a <htx:template>b</htx:template> c</htx:template>\
               <htx:template>second</htx:template>";
    let extractor = HtxExtractor::new();
    let body = extractor.body_template(doc).unwrap().unwrap();
    assert_eq!(body.content, "a <htx:template>b</htx:template> c");
    let all = extractor.body_templates(doc).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].content, "second");
}

#[test]
fn test_directive_value_resolution_order() {
    let extractor = HtxExtractor::new();
    // Inner content beats attributes.
    let meta = extractor
        .meta("<htx:type value=\"page\">article</htx:type>")
        .unwrap();
    assert_eq!(meta.text("type").as_deref(), Some("article"));
    // Bare attribute form.
    let meta = extractor.meta("<htx:howmany count=7/>").unwrap();
    assert_eq!(meta.howmany(), 7);
    // `list` attribute parses to a list value for any directive.
    let meta = extractor.meta("<htx:tags list=\"a, b\"/>").unwrap();
    assert_eq!(
        meta.get("tags"),
        Some(&HtxMetaValue::List(vec!["a".into(), "b".into()]))
    );
}

#[test]
fn test_howmany_fallback() {
    let extractor = HtxExtractor::new();
    assert_eq!(extractor.meta("").unwrap().howmany(), 10);
    assert_eq!(
        extractor
            .meta("<htx:howmany>many</htx:howmany>")
            .unwrap()
            .howmany(),
        10
    );
}

#[test]
fn test_missing_closer_reports_line_number() {
    let err = HtxExtractor::new()
        .meta("<htx:type>a</htx:type>\n\n<htx:where>unclosed")
        .unwrap_err();
    match err {
        HtxError::Syntax { line, .. } => assert_eq!(line, 3),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_document_without_body_has_no_template() {
    let extractor = HtxExtractor::new();
    assert!(extractor
        .body_template("<htx:type>a</htx:type>")
        .unwrap()
        .is_none());
}
