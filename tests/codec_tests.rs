//! End-to-end parse/emit behaviour.

use radyaml::{
    emit, emit_all, parse, parse_all, parse_with, ComposeError, CyclePolicy, Document,
    DocumentMode, DuplicateKeys, EmitConfig, EmitError, Error, NodeId, ParseConfig, ScanErrorKind,
    Value,
};

fn emit_default(doc: &Document) -> String {
    emit(doc, &EmitConfig::default()).unwrap()
}

fn assert_round_trip(input: &str) {
    let doc = parse(input).unwrap();
    let text = emit_default(&doc);
    let reparsed = parse(&text).unwrap_or_else(|e| panic!("reparse of {:?} failed: {}", text, e));
    assert_eq!(doc, reparsed, "round trip through {:?}", text);
    assert_eq!(emit_default(&reparsed), text, "emission is not idempotent");
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn test_block_mapping_order_preserved() {
    let doc = parse("a: 1\nb: 2\n").unwrap();
    let pairs: Vec<_> = doc
        .root()
        .entries()
        .map(|(k, v)| (k.as_str().unwrap().to_string(), v.as_i64().unwrap()))
        .collect();
    assert_eq!(pairs, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    assert_eq!(emit_default(&doc), "a: 1\nb: 2\n");
}

#[test]
fn test_aliases_share_the_anchored_node() {
    let doc = parse("a: &x 1\nb: *x\n").unwrap();
    let a = doc.root().get("a").unwrap();
    let b = doc.root().get("b").unwrap();
    assert_eq!(a.as_i64(), Some(1));
    assert!(a.same_node(&b));
    assert_eq!(a.id(), b.id());
}

#[test]
fn test_flow_collections() {
    let doc = parse("[1, 2, 3]").unwrap();
    assert_eq!(doc.to_rust::<Vec<i64>>(), Ok(vec![1, 2, 3]));

    let doc = parse("{a: 1, b: 2}").unwrap();
    let keys: Vec<_> = doc.root().entries().map(|(k, _)| k.as_str().unwrap()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(doc.root().get("b").and_then(|c| c.as_i64()), Some(2));
}

#[test]
fn test_indentation_nesting() {
    let doc = parse("a:\n  b: 1\n  c: 2\n").unwrap();
    let inner = doc.root().get("a").unwrap();
    assert!(inner.is_mapping());
    assert_eq!(inner.get("b").and_then(|c| c.as_i64()), Some(1));
    assert_eq!(inner.get("c").and_then(|c| c.as_i64()), Some(2));

    let doc = parse("a:\nb: 1\n").unwrap();
    assert_eq!(doc.root().len(), 2);
    assert!(doc.root().get("a").unwrap().is_null());
    assert_eq!(doc.root().get("b").and_then(|c| c.as_i64()), Some(1));
}

#[test]
fn test_scalar_resolution() {
    let doc = parse(
        "- ~\n- yes\n- Off\n- 0x1F\n- 0o17\n- 0755\n- -1_000\n- 1e3\n- -.inf\n- .nan\n- 2001-12-14\n- '42'\n- !!str 42\n- !!float 1\n- 99999999999999999999\n",
    )
    .unwrap();
    let values: Vec<&Value> = doc.root().elements().map(|c| c.value()).collect();
    assert_eq!(values[0], &Value::Null);
    assert_eq!(values[1], &Value::Bool(true));
    assert_eq!(values[2], &Value::Bool(false));
    assert_eq!(values[3], &Value::Int(31));
    assert_eq!(values[4], &Value::Int(15));
    assert_eq!(values[5], &Value::Int(493));
    assert_eq!(values[6], &Value::Int(-1000));
    assert_eq!(values[7], &Value::Float(1000.0));
    assert_eq!(values[8], &Value::Float(f64::NEG_INFINITY));
    assert!(matches!(values[9], Value::Float(f) if f.is_nan()));
    assert_eq!(values[10], &Value::String("2001-12-14".into()));
    assert_eq!(values[11], &Value::String("42".into()));
    assert_eq!(values[12], &Value::String("42".into()));
    assert_eq!(values[13], &Value::Float(1.0));
    assert_eq!(values[14], &Value::String("99999999999999999999".into()));
}

#[test]
fn test_block_scalars() {
    let doc = parse("lit: |\n  one\n  two\nfold: >\n  one\n  two\nkeep: |+\n  x\n\nstrip: |-\n  y\n").unwrap();
    let root = doc.root();
    assert_eq!(root.get("lit").and_then(|c| c.as_str()), Some("one\ntwo\n"));
    assert_eq!(root.get("fold").and_then(|c| c.as_str()), Some("one two\n"));
    assert_eq!(root.get("keep").and_then(|c| c.as_str()), Some("x\n\n"));
    assert_eq!(root.get("strip").and_then(|c| c.as_str()), Some("y"));
}

#[test]
fn test_complex_keys() {
    let doc = parse("? [a, b]\n: pair\n{x: 1}: map\n").unwrap();
    let key = parse("[a, b]").unwrap();
    assert_eq!(
        doc.root().get_by(key.root()).and_then(|c| c.as_str()),
        Some("pair")
    );

    let config = ParseConfig::default().with_complex_keys(false);
    let err = parse_with("? [a, b]\n: pair\n", &config).unwrap_err();
    assert!(matches!(
        err,
        Error::Compose(ComposeError::UnsupportedComplexKey { .. })
    ));
}

#[test]
fn test_duplicate_keys() {
    let doc = parse("a: 1\nb: 2\na: 3\n").unwrap();
    let pairs: Vec<_> = doc
        .root()
        .entries()
        .map(|(k, v)| (k.as_str().unwrap(), v.as_i64().unwrap()))
        .collect();
    assert_eq!(pairs, vec![("a", 3), ("b", 2)]);

    let config = ParseConfig::default().with_duplicate_keys(DuplicateKeys::Reject);
    let err = parse_with("a: 1\na: 3\n", &config).unwrap_err();
    assert!(matches!(err, Error::Compose(ComposeError::DuplicateKey { .. })));
}

#[test]
fn test_self_referencing_anchor() {
    let doc = parse("&a [1, *a]").unwrap();
    assert!(doc.is_cyclic());
    let root = doc.root();
    assert!(root.index(1).unwrap().same_node(&root));

    let config = ParseConfig::default().with_cycles(CyclePolicy::Reject);
    let err = parse_with("&a [1, *a]", &config).unwrap_err();
    assert!(matches!(
        err,
        Error::Compose(ComposeError::CyclicStructure { .. })
    ));
}

#[test]
fn test_document_modes() {
    let input = "first\n---\nsecond\n";
    assert_eq!(parse(input).unwrap().root().as_str(), Some("first"));
    assert!(parse("").unwrap().root().is_null());

    let single = ParseConfig::default().with_documents(DocumentMode::Single);
    let err = parse_with(input, &single).unwrap_err();
    assert_eq!(
        err,
        Error::Compose(ComposeError::DocumentCount { found: 2 })
    );
    assert!(parse_with("only\n", &single).is_ok());

    let docs = parse_all(input).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].root().as_str(), Some("second"));
}

#[test]
fn test_directives_are_kept() {
    let doc = parse("%YAML 1.1\n%TAG !e! tag:example.com,2024:\n---\n!e!thing value\n").unwrap();
    assert_eq!(doc.version(), Some((1, 1)));
    assert_eq!(
        doc.tag_directives(),
        &[("!e!".to_string(), "tag:example.com,2024:".to_string())]
    );
    assert_eq!(doc.root().as_str(), Some("value"));
    assert_eq!(
        emit_default(&doc),
        "%YAML 1.1\n%TAG !e! tag:example.com,2024:\n--- value\n"
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_undefined_alias() {
    let err = parse("a: *undefined\n").unwrap_err();
    match &err {
        Error::Compose(ComposeError::UndefinedAlias { anchor, mark }) => {
            assert_eq!(anchor, "undefined");
            assert_eq!(mark.line, 1);
            assert_eq!(mark.column, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unbalanced_flow_fails_at_end_of_input() {
    let input = "[1, 2";
    let err = parse(input).unwrap_err();
    assert!(matches!(err, Error::Parse(_) | Error::Scan(_)));
    let mark = err.marker().unwrap();
    assert!(mark.offset >= input.len(), "error at {}", mark);
}

#[test]
fn test_scan_errors() {
    let kind = |input: &str| match parse(input).unwrap_err() {
        Error::Scan(e) => e.kind,
        other => panic!("expected a scan error, got {:?}", other),
    };
    assert_eq!(kind("a:\n\tb: 1\n"), ScanErrorKind::TabIndentation);
    assert!(matches!(kind("'open"), ScanErrorKind::UnterminatedQuote { .. }));
    assert!(matches!(kind("\"\\q\""), ScanErrorKind::InvalidEscape { .. }));
}

#[test]
fn test_grammar_errors() {
    assert!(matches!(parse("a: 1\n- b\n"), Err(Error::Parse(_))));
    assert!(matches!(parse("[1, 2]]"), Err(Error::Parse(_))));
    assert!(matches!(parse("{a: 1"), Err(Error::Parse(_))));
}

#[test]
fn test_depth_limit() {
    let input = format!("{}{}", "[".repeat(20), "]".repeat(20));
    let config = ParseConfig::default().with_max_depth(10);
    let err = parse_with(&input, &config).unwrap_err();
    assert!(matches!(
        err,
        Error::Compose(ComposeError::DepthLimitExceeded { limit: 10, .. })
    ));
    assert!(parse(&input).is_ok());
}

#[test]
fn test_invalid_tagged_scalar() {
    let err = parse("!!int twelve").unwrap_err();
    assert!(matches!(
        err,
        Error::Compose(ComposeError::InvalidTaggedScalar { .. })
    ));
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_round_trip_documents() {
    for input in [
        "plain",
        "- 1\n- 2.5\n- true\n- null\n- text\n",
        "a:\n  b:\n    - x\n    - y: z\n",
        "{a: [1, {b: c}], d: []}",
        "- []\n- {}\n- - - deep\n",
        "'yes': '123'\n'null': ''\n",
        "? [1, 2]\n: pair\n? {k: v}\n: map\n",
        "1: int key\ntrue: bool key\n~: null key\n1.5: float key\n",
        "text: |\n  line one\n  line two\n",
        "shared: &s [1, 2]\nagain: *s\n",
        "&root {self: *root}",
        "- &k key\n- {*k : v}\n",
    ] {
        assert_round_trip(input);
    }
}

#[test]
fn test_round_trip_awkward_strings() {
    for s in [
        "",
        " leading",
        "trailing ",
        "#comment",
        "key: value",
        "- dash",
        "[flow]",
        "'single'",
        "\"double\"",
        "tab\there",
        "cr\r\nlf",
        "nul\0",
        "unicode é 🦀",
        "line\nbreaks\n",
        "\nleading break",
        "  indented\nblock",
        "...",
        "---",
        "%percent",
        "@at",
        "a #b",
        "ends:",
        "0x",
        "1_000",
        ".inf",
        "\u{2028}",
        "\u{feff}bom",
    ] {
        let doc = Document::from_value(s);
        let text = emit_default(&doc);
        let back = parse(&text).unwrap_or_else(|e| panic!("{:?} -> {:?}: {}", s, text, e));
        assert_eq!(back.root().as_str(), Some(s), "through {:?}", text);
    }
}

#[test]
fn test_round_trip_in_flow_style() {
    let doc = parse("a: [x, 'y, z', {c: null}]\nb: \"multi\\nline\"\n").unwrap();
    let text = emit(&doc, &EmitConfig::flow()).unwrap();
    assert_eq!(text, "{a: [x, 'y, z', {c: null}], b: \"multi\\nline\"}\n");
    assert_eq!(parse(&text).unwrap(), doc);
}

#[test]
fn test_round_trip_keeps_sharing() {
    let doc = parse("- &a [x]\n- *a\n- *a\n").unwrap();
    let back = parse(&emit_default(&doc)).unwrap();
    let root = back.root();
    let first = root.index(0).unwrap();
    assert!(first.same_node(&root.index(1).unwrap()));
    assert!(first.same_node(&root.index(2).unwrap()));
}

// =============================================================================
// Emitting
// =============================================================================

#[test]
fn test_emit_all_separates_documents() {
    let docs = parse_all("a\n---\nb: 1\n").unwrap();
    let text = emit_all(&docs, &EmitConfig::default()).unwrap();
    assert_eq!(text, "a\n---\nb: 1\n");
    assert_eq!(parse_all(&text).unwrap(), docs);
}

#[test]
fn test_emit_rejects_cycles_when_asked() {
    let doc = parse("&a [*a]").unwrap();
    let config = EmitConfig::default().with_cycles(CyclePolicy::Reject);
    assert!(matches!(
        emit(&doc, &config),
        Err(EmitError::CyclicStructure { .. })
    ));
}

#[test]
fn test_emit_dangling_node() {
    let mut doc = Document::new();
    let key = doc.push("k");
    let root = doc.push(Value::Mapping(vec![(key, NodeId::from_index(40))]));
    doc.set_root(root);
    assert_eq!(
        emit(&doc, &EmitConfig::default()),
        Err(EmitError::UnrepresentableValue {
            node: NodeId::from_index(40)
        })
    );
}

#[test]
fn test_emit_does_not_mutate_input() {
    let doc = parse("a: &x [1]\nb: *x\n").unwrap();
    let before = doc.clone();
    let _ = emit_default(&doc);
    let _ = emit(&doc, &EmitConfig::flow()).unwrap();
    assert_eq!(doc, before);
    assert_eq!(doc.node_count(), before.node_count());
}
