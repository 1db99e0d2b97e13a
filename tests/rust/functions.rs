//! Copyright © 2025-2026 The Htx Authors. All Rights Reserved.
//!
//! This file is part of Htx.
//! The Htx project belongs to the Htx project team.

use chrono::{Duration, Utc};
use htx::{HtxError, HtxFunctionRegistry};
use serde_json::{json, Value};

fn call(name: &str, args: Vec<Value>) -> Value {
    HtxFunctionRegistry::new().call(name, args).unwrap()
}

#[test]
fn test_string_builtins() {
    assert_eq!(call("truncate", vec![json!("hello world"), json!(5)]), json!("hello..."));
    assert_eq!(call("slug", vec![json!("Hello World!")]), json!("hello-world"));
    assert_eq!(call("upper", vec![json!("abc")]), json!("ABC"));
    assert_eq!(call("lower", vec![json!("ABC")]), json!("abc"));
    assert_eq!(call("capitalize", vec![json!("hELLO")]), json!("Hello"));
    assert_eq!(
        call("replace", vec![json!("a.b.c"), json!("."), json!("/")]),
        json!("a/b/c")
    );
    assert_eq!(call("contains", vec![json!("abc"), json!("b")]), json!(true));
    assert_eq!(call("default", vec![json!(""), json!("fb")]), json!("fb"));
    assert_eq!(
        call("markdown", vec![json!("**hi** [x](u)")]),
        json!(r#"<strong>hi</strong> <a href="u">x</a>"#)
    );
}

#[test]
fn test_number_builtins() {
    assert_eq!(call("clamp", vec![json!(99), json!(0), json!(10)]), json!(10));
    assert_eq!(call("round", vec![json!(3.456), json!(2)]), json!(3.46));
    assert_eq!(call("floor", vec![json!(3.9)]), json!(3));
    assert_eq!(call("ceil", vec![json!(3.1)]), json!(4));
    assert_eq!(
        call("number_format", vec![json!(1234567.891), json!(2)]),
        json!("1,234,567.89")
    );
    assert_eq!(call("percent", vec![json!(3), json!(4)]), json!("75%"));
    assert_eq!(call("percent", vec![json!(1), json!(0)]), json!("0%"));
}

#[test]
fn test_date_builtins() {
    let now = Utc::now();
    let past = json!((now - Duration::seconds(90)).to_rfc3339());
    assert_eq!(call("time_ago", vec![past]), json!("1 minute ago"));
    let future = json!((now + Duration::seconds(3600)).to_rfc3339());
    assert_eq!(call("time_ago", vec![future]), json!("in 1 hour"));
    let later = json!((now + Duration::hours(2)).to_rfc3339());
    assert_eq!(call("time_ago", vec![later]), json!("in 2 hours"));
    let fresh = json!((now - Duration::seconds(10)).to_rfc3339());
    assert_eq!(call("time_ago", vec![fresh]), json!("just now"));

    assert_eq!(
        call("date_format", vec![json!("2024-03-01T12:30:00Z")]),
        json!("2024-03-01")
    );
    assert_eq!(call("year", vec![json!("2024-03-01")]), json!(2024));
    assert_eq!(call("is_past", vec![json!("2001-01-01")]), json!(true));
    assert_eq!(call("is_future", vec![json!("2999-01-01")]), json!(true));
}

#[test]
fn test_array_builtins() {
    assert_eq!(call("count", vec![json!([1, 2, 3])]), json!(3));
    assert_eq!(call("count", vec![json!("abcd")]), json!(4));
    assert_eq!(call("first", vec![json!(["a", "b"])]), json!("a"));
    assert_eq!(call("last", vec![json!(["a", "b"])]), json!("b"));
    assert_eq!(call("reverse", vec![json!([1, 2, 3])]), json!([3, 2, 1]));
    assert_eq!(call("sort", vec![json!([3, 1, 2])]), json!([1, 2, 3]));
    assert_eq!(call("unique", vec![json!([1, 2, 1])]), json!([1, 2]));
    assert_eq!(
        call("slice", vec![json!([1, 2, 3, 4]), json!(1), json!(2)]),
        json!([2, 3])
    );
    assert_eq!(call("empty", vec![json!([])]), json!(true));
    assert_eq!(
        call("in_list", vec![json!("b"), json!("a, b, c")]),
        json!(true)
    );
}

#[test]
fn test_arity_contract() {
    let registry = HtxFunctionRegistry::new();
    // Too few required arguments.
    assert!(matches!(
        registry.call("clamp", vec![json!(1)]).unwrap_err(),
        HtxError::Function { .. }
    ));
    // More arguments than declared slots.
    assert!(matches!(
        registry
            .call("upper", vec![json!("a"), json!("b")])
            .unwrap_err(),
        HtxError::Function { .. }
    ));
    // Optional slots fill from defaults.
    assert_eq!(
        registry.call("round", vec![json!(2.7)]).unwrap(),
        json!(3)
    );
}

#[test]
fn test_purity_of_repeated_calls() {
    let registry = HtxFunctionRegistry::new();
    let args = vec![json!([3, 1, 2])];
    let first = registry.call("sort", args.clone()).unwrap();
    let second = registry.call("sort", args).unwrap();
    assert_eq!(first, second);
}
