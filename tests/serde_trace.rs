//! JSON form of failures and analysis results.
#![cfg(feature = "serde")]

use raise_this::scenario::{foo, sample_index};
use raise_this::{Config, RegionError, Runtime};
use serde_json::json;

#[test]
fn test_raised_serializes_with_trail() {
    let mut rt = Runtime::new();
    let raised = rt.call("caller", |rt| foo(rt, false)).unwrap_err();
    let value = serde_json::to_value(&raised).unwrap();

    assert_eq!(value["id"], json!(raised.id().get()));
    assert_eq!(value["payload"], json!({ "Record": { "i": 0 } }));
    assert_eq!(value["origin"], json!("foo"));
    assert!(value["site"].as_str().unwrap().contains("scenario.rs"));
    assert_eq!(
        value["hops"],
        json!([
            { "Unwound": { "function": "foo", "released": 0 } },
            { "Unwound": { "function": "caller", "released": 0 } },
        ])
    );
}

#[test]
fn test_config_serializes() {
    let value = serde_json::to_value(Config::new().hop_limit(4)).unwrap();
    assert_eq!(value, json!({ "hop_limit": 4, "root_name": "<root>" }));
}

#[test]
fn test_region_error_serializes() {
    let value = serde_json::to_value(RegionError::CatchAllNotLast { position: 0, total: 2 }).unwrap();
    assert_eq!(value, json!({ "CatchAllNotLast": { "position": 0, "total": 2 } }));
}

#[test]
fn test_index_serializes() {
    let index = sample_index().unwrap();
    let tree = index.throw_tree(&index.throwers()[0]);
    let value = serde_json::to_value(&tree).unwrap();

    assert_eq!(value["kind"], json!("Int"));
    assert_eq!(value["leaves"][0], json!({ "Uncaught": { "function": "bar" } }));
    assert_eq!(value["leaves"][4], json!({ "Uncaught": { "function": "main" } }));
    assert_eq!(value["root"]["loc"]["line"], json!(11));
}
