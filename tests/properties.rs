//! Property-based tests for the parse/emit laws.

use proptest::prelude::*;
use radyaml::{emit, parse, Document, EmitConfig, NodeId, QuoteStyle, Value};

/// Acyclic value tree used to generate documents.
#[derive(Debug, Clone)]
enum Tree {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Tree>),
    Map(Vec<(String, Tree)>),
}

fn build(tree: &Tree, doc: &mut Document) -> NodeId {
    match tree {
        Tree::Null => doc.push(Value::Null),
        Tree::Bool(b) => doc.push(*b),
        Tree::Int(n) => doc.push(*n),
        Tree::Float(f) => doc.push(*f),
        Tree::Str(s) => doc.push(s.as_str()),
        Tree::Seq(items) => {
            let ids = items.iter().map(|item| build(item, doc)).collect();
            doc.push(Value::Sequence(ids))
        }
        Tree::Map(pairs) => {
            let ids = pairs
                .iter()
                .map(|(k, v)| {
                    let key = doc.push(k.as_str());
                    (key, build(v, doc))
                })
                .collect();
            doc.push(Value::Mapping(ids))
        }
    }
}

fn to_document(tree: &Tree) -> Document {
    let mut doc = Document::new();
    let root = build(tree, &mut doc);
    doc.set_root(root);
    doc
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{0,8}",
        "[ -~]{0,16}",
        "[ -~\n\t]{0,24}",
        "\\PC{0,8}",
        Just("yes".to_string()),
        Just("null".to_string()),
        Just("0x1F".to_string()),
        Just("- item".to_string()),
        Just("a: b".to_string()),
    ]
}

fn tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        Just(Tree::Null),
        any::<bool>().prop_map(Tree::Bool),
        any::<i64>().prop_map(Tree::Int),
        any::<f64>().prop_map(Tree::Float),
        text().prop_map(Tree::Str),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Tree::Seq),
            prop::collection::btree_map(text(), inner, 0..6)
                .prop_map(|m| Tree::Map(m.into_iter().collect())),
        ]
    })
}

fn config() -> impl Strategy<Value = EmitConfig> {
    (
        prop_oneof![Just(EmitConfig::block()), Just(EmitConfig::flow())],
        1usize..5,
        prop_oneof![Just(None), Just(Some(12usize)), Just(Some(40usize))],
        prop_oneof![
            Just(QuoteStyle::Auto),
            Just(QuoteStyle::Double),
            Just(QuoteStyle::Single)
        ],
    )
        .prop_map(|(base, indent, line_width, quote_style)| {
            base.with_indent(indent)
                .with_line_width(line_width)
                .with_quote_style(quote_style)
        })
}

proptest! {
    /// parse(emit(v)) == v
    #[test]
    fn prop_round_trip(tree in tree()) {
        let doc = to_document(&tree);
        let text = emit(&doc, &EmitConfig::default()).unwrap();
        let back = parse(&text);
        prop_assert!(back.is_ok(), "reparse failed for {:?}: {:?}", text, back);
        prop_assert_eq!(back.unwrap(), doc, "through {:?}", text);
    }

    /// Every configuration produces text that reads back as the same value.
    #[test]
    fn prop_round_trip_any_config(tree in tree(), config in config()) {
        let doc = to_document(&tree);
        let text = emit(&doc, &config).unwrap();
        let back = parse(&text);
        prop_assert!(back.is_ok(), "reparse failed for {:?}: {:?}", text, back);
        prop_assert_eq!(back.unwrap(), doc, "through {:?}", text);
    }

    /// emit(parse(emit(v, c)), c) == emit(v, c)
    #[test]
    fn prop_emit_idempotent(tree in tree(), config in config()) {
        let doc = to_document(&tree);
        let first = emit(&doc, &config).unwrap();
        let second = emit(&parse(&first).unwrap(), &config).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Shared subtrees come back shared.
    #[test]
    fn prop_sharing_survives(tree in tree(), copies in 2usize..5) {
        let mut doc = Document::new();
        let shared = build(&tree, &mut doc);
        let root = doc.push(Value::Sequence(vec![shared; copies]));
        doc.set_root(root);

        let text = emit(&doc, &EmitConfig::default()).unwrap();
        let back = parse(&text).unwrap();
        let first = back.root().index(0).unwrap();
        for i in 1..copies {
            prop_assert!(first.same_node(&back.root().index(i).unwrap()));
        }
        prop_assert_eq!(back, doc);
    }

    /// Arbitrary input never panics; it parses or returns an error.
    #[test]
    fn prop_parse_never_panics(input in "[ -~\n\t]{0,64}") {
        let _ = parse(&input);
    }
}
