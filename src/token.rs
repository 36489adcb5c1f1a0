//! Lexical tokens produced by the scanner.

use crate::error::Marker;

/// Presentation style of a scalar in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    /// Unquoted scalar
    Plain,
    /// `'single quoted'`
    SingleQuoted,
    /// `"double quoted"`
    DoubleQuoted,
    /// `|` literal block scalar
    Literal,
    /// `>` folded block scalar
    Folded,
}

/// A single token together with its start position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token type
    pub kind: TokenKind,
    /// Where the token starts
    pub mark: Marker,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, mark: Marker) -> Self {
        Self { kind, mark }
    }
}

/// Token types.
///
/// Block structure is made explicit by the scanner: indentation changes turn
/// into `BlockSequenceStart` / `BlockMappingStart` / `BlockEnd`, and simple
/// keys are announced with a `Key` token inserted before the key's first
/// token once the following `:` is seen.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    StreamStart,
    StreamEnd,
    /// `%YAML major.minor`
    VersionDirective(u32, u32),
    /// `%TAG handle prefix`
    TagDirective {
        handle: String,
        prefix: String,
    },
    /// `---`
    DocumentStart,
    /// `...`
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    /// `[`
    FlowSequenceStart,
    /// `]`
    FlowSequenceEnd,
    /// `{`
    FlowMappingStart,
    /// `}`
    FlowMappingEnd,
    /// `-` in block context
    BlockEntry,
    /// `,`
    FlowEntry,
    Key,
    Value,
    /// `*name`
    Alias(String),
    /// `&name`
    Anchor(String),
    /// `!handle!suffix`, `!suffix` or `!<verbatim>` (empty handle)
    Tag {
        handle: String,
        suffix: String,
    },
    Scalar {
        value: String,
        style: ScalarStyle,
    },
}

impl TokenKind {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::StreamStart => "start of stream".into(),
            TokenKind::StreamEnd => "end of stream".into(),
            TokenKind::VersionDirective(..) => "%YAML directive".into(),
            TokenKind::TagDirective { .. } => "%TAG directive".into(),
            TokenKind::DocumentStart => "'---'".into(),
            TokenKind::DocumentEnd => "'...'".into(),
            TokenKind::BlockSequenceStart => "block sequence".into(),
            TokenKind::BlockMappingStart => "block mapping".into(),
            TokenKind::BlockEnd => "end of block collection".into(),
            TokenKind::FlowSequenceStart => "'['".into(),
            TokenKind::FlowSequenceEnd => "']'".into(),
            TokenKind::FlowMappingStart => "'{'".into(),
            TokenKind::FlowMappingEnd => "'}'".into(),
            TokenKind::BlockEntry => "'-'".into(),
            TokenKind::FlowEntry => "','".into(),
            TokenKind::Key => "mapping key".into(),
            TokenKind::Value => "':'".into(),
            TokenKind::Alias(name) => format!("alias '*{}'", name),
            TokenKind::Anchor(name) => format!("anchor '&{}'", name),
            TokenKind::Tag { handle, suffix } => format!("tag '{}{}'", handle, suffix),
            TokenKind::Scalar { value, .. } => {
                let mut preview: String = value.chars().take(20).collect();
                if value.chars().count() > 20 {
                    preview.push_str("...");
                }
                format!("scalar '{}'", preview)
            }
        }
    }
}
