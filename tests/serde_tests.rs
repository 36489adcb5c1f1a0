//! Serde integration: documents serialize like their JSON equivalents.

#![cfg(feature = "serde")]

use radyaml::{parse, CollectionStyle, EmitConfig, ParseConfig, QuoteStyle};

#[test]
fn test_document_to_json() {
    let doc = parse("name: demo\ncount: 3\nratio: 0.5\nok: yes\nnone: ~\ntags: [b, a]\n").unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    assert_eq!(
        json,
        r#"{"name":"demo","count":3,"ratio":0.5,"ok":true,"none":null,"tags":["b","a"]}"#
    );
}

#[test]
fn test_cursor_to_json() {
    let doc = parse("outer: {inner: [1, 2]}").unwrap();
    let inner = doc.root().get("outer").unwrap();
    assert_eq!(
        serde_json::to_value(inner).unwrap(),
        serde_json::json!({"inner": [1, 2]})
    );
}

#[test]
fn test_shared_nodes_are_repeated() {
    let doc = parse("a: &x [1]\nb: *x\n").unwrap();
    assert_eq!(
        serde_json::to_string(&doc).unwrap(),
        r#"{"a":[1],"b":[1]}"#
    );
}

#[test]
fn test_cyclic_document_fails() {
    let doc = parse("&r [*r]").unwrap();
    let err = serde_json::to_string(&doc).unwrap_err();
    assert!(err.to_string().contains("nesting deeper than"));
}

#[test]
fn test_config_round_trip() {
    let config = EmitConfig::flow()
        .with_indent(4)
        .with_quote_style(QuoteStyle::Double);
    let json = serde_json::to_string(&config).unwrap();
    let back: EmitConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.style, CollectionStyle::Flow);
    assert_eq!(back.indent, 4);
    assert_eq!(back.quote_style, QuoteStyle::Double);
    assert_eq!(back.max_depth, 512);

    let strict = ParseConfig::strict();
    let back: ParseConfig = serde_json::from_str(&serde_json::to_string(&strict).unwrap()).unwrap();
    assert_eq!(back.duplicate_keys, strict.duplicate_keys);
    assert_eq!(back.max_depth, 512);
}
