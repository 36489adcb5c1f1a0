//! Configuration for parsing and emitting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use crate::event::CollectionStyle;

/// How many documents [`parse_with`](crate::parse_with) accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DocumentMode {
    /// Return the first document; an empty stream yields `null`
    #[default]
    First,
    /// Require exactly one document
    Single,
}

/// What to do when a mapping contains the same key twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DuplicateKeys {
    /// Keep the first key's position, take the last value
    #[default]
    KeepLast,
    /// Fail with a duplicate key error
    Reject,
}

/// Whether a node may (transitively) contain itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CyclePolicy {
    /// Cycles are built (parse) or written with anchors (emit)
    #[default]
    Allow,
    /// Cycles are errors
    Reject,
}

/// How the emitter quotes strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QuoteStyle {
    /// Plain when unambiguous, quoted otherwise
    #[default]
    Auto,
    /// Always `"double quoted"`
    Double,
    /// `'single quoted'` whenever the text can be written that way
    Single,
}

/// Configuration for parsing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseConfig {
    /// Documents accepted by `parse_with` (default: first)
    pub documents: DocumentMode,
    /// Duplicate key handling (default: keep last)
    pub duplicate_keys: DuplicateKeys,
    /// Allow sequences and mappings as mapping keys (default: true)
    pub complex_keys: bool,
    /// Alias cycles (default: allowed)
    pub cycles: CyclePolicy,
    /// Maximum collection nesting depth (default: 512)
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            documents: DocumentMode::First,
            duplicate_keys: DuplicateKeys::KeepLast,
            complex_keys: true,
            cycles: CyclePolicy::Allow,
            max_depth: 512,
        }
    }
}

impl ParseConfig {
    /// Exactly one document, no duplicate keys, no cycles.
    pub fn strict() -> Self {
        Self {
            documents: DocumentMode::Single,
            duplicate_keys: DuplicateKeys::Reject,
            cycles: CyclePolicy::Reject,
            ..Self::default()
        }
    }

    /// Set the document mode.
    pub fn with_documents(mut self, documents: DocumentMode) -> Self {
        self.documents = documents;
        self
    }

    /// Set duplicate key handling.
    pub fn with_duplicate_keys(mut self, duplicate_keys: DuplicateKeys) -> Self {
        self.duplicate_keys = duplicate_keys;
        self
    }

    /// Allow or forbid complex keys.
    pub fn with_complex_keys(mut self, complex_keys: bool) -> Self {
        self.complex_keys = complex_keys;
        self
    }

    /// Set the cycle policy.
    pub fn with_cycles(mut self, cycles: CyclePolicy) -> Self {
        self.cycles = cycles;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Configuration for emitting.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmitConfig {
    /// Collection layout (default: block)
    pub style: CollectionStyle,
    /// Spaces per nesting level, at least 1 (default: 2)
    pub indent: usize,
    /// Fold long scalars at this column (default: unbounded)
    pub line_width: Option<usize>,
    /// String quoting (default: auto)
    pub quote_style: QuoteStyle,
    /// Start every document with `---` (default: false)
    pub explicit_start: bool,
    /// Self-referencing nodes (default: written with anchors)
    pub cycles: CyclePolicy,
    /// Maximum collection nesting written (default: 512)
    pub max_depth: usize,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            style: CollectionStyle::Block,
            indent: 2,
            line_width: None,
            quote_style: QuoteStyle::Auto,
            explicit_start: false,
            cycles: CyclePolicy::Allow,
            max_depth: 512,
        }
    }
}

impl EmitConfig {
    /// Block layout with default settings.
    pub fn block() -> Self {
        Self::default()
    }

    /// Flow layout: `{a: [1, 2]}`.
    pub fn flow() -> Self {
        Self {
            style: CollectionStyle::Flow,
            ..Self::default()
        }
    }

    /// Set the collection style.
    pub fn with_style(mut self, style: CollectionStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the indentation width.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the folding width.
    pub fn with_line_width(mut self, line_width: Option<usize>) -> Self {
        self.line_width = line_width;
        self
    }

    /// Set the quote style.
    pub fn with_quote_style(mut self, quote_style: QuoteStyle) -> Self {
        self.quote_style = quote_style;
        self
    }

    /// Start documents with `---`.
    pub fn with_explicit_start(mut self, explicit_start: bool) -> Self {
        self.explicit_start = explicit_start;
        self
    }

    /// Set the cycle policy.
    pub fn with_cycles(mut self, cycles: CyclePolicy) -> Self {
        self.cycles = cycles;
        self
    }

    /// Set the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
