//! # RadYAML
//!
//! A bidirectional YAML codec: text to a dynamic value graph and back.
//!
//! Parsing runs in three stages, each usable on its own:
//!
//! ```text
//! text ──Scanner──▶ tokens ──Parser──▶ events ──Loader──▶ Document
//! Document ──Emitter──▶ text
//! ```
//!
//! ## Module Organization
//!
//! - [`scanner`] - Tokenizer: indentation, flow levels, scalar styles, anchors, tags
//! - [`parser`] - Event stream following the block/flow grammar
//! - [`composer`] - Documents from events: anchors, type resolution, duplicate keys
//! - [`emitter`] - Text from documents: anchors for shared nodes, quoting
//! - [`value`] - The value graph ([`Document`], [`Value`], [`Cursor`])
//! - [`resolver`] - Scalar type resolution shared by composer and emitter
//! - [`convert`] - Conversions between Rust values and documents
//! - [`config`] - Parse and emit settings
//!
//! ## Quick Start
//!
//! ```
//! use radyaml::{emit, parse, EmitConfig};
//!
//! let doc = parse("a: &x 1\nb: *x\n")?;
//! let root = doc.root();
//! assert_eq!(root.get("a").and_then(|c| c.as_i64()), Some(1));
//!
//! // Aliases share the anchored node.
//! let (a, b) = (root.get("a").unwrap(), root.get("b").unwrap());
//! assert!(a.same_node(&b));
//!
//! // Shared nodes are written back with anchors.
//! assert_eq!(emit(&doc, &EmitConfig::default())?, "a: &id001 1\nb: *id001\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Scalar types
//!
//! Untagged plain scalars resolve with a YAML 1.1 flavoured core schema
//! (null, bool, int, float, otherwise string). Timestamps are not resolved.
//! See [`resolver`] for the exact forms.
//!
//! ## Features
//!
//! - `serde` - `Serialize` for [`Document`] and [`Cursor`], serde derives on
//!   the configuration types

// =============================================================================
// Pipeline
// =============================================================================

/// Tokenizer.
pub mod scanner;

/// Token types.
pub mod token;

/// Event stream parser.
pub mod parser;

/// Event types.
pub mod event;

/// Event to document composition.
pub mod composer;

/// Document to text emission.
pub mod emitter;

// =============================================================================
// Data model
// =============================================================================

/// Dynamic value graph.
pub mod value;

/// Scalar type resolution.
pub mod resolver;

/// Rust value conversions.
pub mod convert;

/// Parse and emit configuration.
pub mod config;

/// Error types.
pub mod error;

#[cfg(feature = "serde")]
mod serde;

// =============================================================================
// Public re-exports
// =============================================================================

pub use composer::Loader;
pub use config::{
    CollectionStyle, CyclePolicy, DocumentMode, DuplicateKeys, EmitConfig, ParseConfig,
    QuoteStyle,
};
pub use convert::{ConvertError, FromYaml, IntoYaml};
pub use emitter::Emitter;
pub use error::{
    ComposeError, EmitError, Error, Marker, ParseError, Result, ScanError, ScanErrorKind,
};
pub use event::{Event, EventKind};
pub use parser::Parser;
pub use scanner::Scanner;
pub use token::{ScalarStyle, Token, TokenKind};
pub use value::{Cursor, Document, Elements, Entries, NodeId, Value};

#[cfg(feature = "serde")]
pub use crate::serde::MAX_SERIALIZE_DEPTH;

// =============================================================================
// Entry points
// =============================================================================

/// Parse one document with the default configuration.
///
/// The first document of the stream is returned; an empty stream gives a
/// `null` document.
pub fn parse(input: &str) -> Result<Document> {
    parse_with(input, &ParseConfig::default())
}

/// Parse one document.
///
/// With [`DocumentMode::Single`] the stream must hold exactly one document.
pub fn parse_with(input: &str, config: &ParseConfig) -> Result<Document> {
    composer::load_one(input, config)
}

/// Parse every document of a stream with the default configuration.
pub fn parse_all(input: &str) -> Result<Vec<Document>> {
    parse_all_with(input, &ParseConfig::default())
}

/// Parse every document of a stream.
///
/// [`ParseConfig::documents`] is ignored.
pub fn parse_all_with(input: &str, config: &ParseConfig) -> Result<Vec<Document>> {
    Loader::new(input, config.clone()).collect()
}

/// Write one document.
pub fn emit(doc: &Document, config: &EmitConfig) -> core::result::Result<String, EmitError> {
    Emitter::new(config)?.emit(doc)
}

/// Write several documents separated by `---`.
pub fn emit_all(
    docs: &[Document],
    config: &EmitConfig,
) -> core::result::Result<String, EmitError> {
    Emitter::new(config)?.emit_all(docs)
}

/// Write one document with the default configuration.
pub fn to_string(doc: &Document) -> core::result::Result<String, EmitError> {
    emit(doc, &EmitConfig::default())
}

/// Convert a Rust value and write it with the default configuration.
///
/// ```
/// let text = radyaml::to_yaml_string(vec!["a", "b"]).unwrap();
/// assert_eq!(text, "- a\n- b\n");
/// ```
pub fn to_yaml_string<T: IntoYaml>(value: T) -> core::result::Result<String, EmitError> {
    to_string(&Document::from_value(value))
}

impl core::str::FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}
