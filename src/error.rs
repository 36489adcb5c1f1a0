//! Error types for every stage of the codec.
//!
//! Each stage has its own error type so callers can tell a lexical problem
//! (bad escape, tab indentation) from a grammar problem (missing `]`) or a
//! graph problem (undefined alias). All of them carry a [`Marker`] pointing
//! at the offending input.

use core::fmt;

use crate::value::NodeId;

/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A position in the input text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Marker {
    /// Byte offset in input
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column in characters (0-indexed)
    pub column: usize,
}

impl Marker {
    /// Create a marker.
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column + 1)
    }
}

/// Lexical error raised by the [`Scanner`](crate::Scanner).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {mark}")]
pub struct ScanError {
    /// Where the problem was detected
    pub mark: Marker,
    /// What went wrong
    pub kind: ScanErrorKind,
}

impl ScanError {
    pub(crate) fn new(mark: Marker, kind: ScanErrorKind) -> Self {
        Self { mark, kind }
    }

    /// Human readable description without the position.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// The different lexical failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanErrorKind {
    /// Tab character used for indentation (YAML forbids tabs).
    #[error("found a tab character where an indentation space is expected")]
    TabIndentation,

    /// Quoted scalar reached the end of input.
    #[error("unterminated {} quoted scalar", quote_name(.quote))]
    UnterminatedQuote {
        /// The quote character (" or ')
        quote: char,
    },

    /// Invalid escape sequence in a double-quoted scalar.
    #[error("invalid escape sequence '{sequence}'")]
    InvalidEscape {
        /// The escape as written, including the backslash
        sequence: String,
    },

    /// Unexpected character in the given context.
    #[error("unexpected character '{ch}': {context}")]
    UnexpectedCharacter {
        /// The unexpected character
        ch: char,
        /// Description of what was expected
        context: &'static str,
    },

    /// A simple key that must be followed by `:` was not.
    #[error("could not find expected ':' for a mapping key")]
    MissingValueIndicator,

    /// An indicator appeared where the grammar does not allow it.
    #[error("{what} are not allowed in this context")]
    NotAllowed {
        /// Plural description of the construct
        what: &'static str,
    },

    /// `---` or `...` inside a quoted scalar.
    #[error("found unexpected document indicator inside a quoted scalar")]
    DocumentIndicatorInScalar,

    /// Header of a `|` or `>` scalar is malformed.
    #[error("invalid block scalar header: {reason}")]
    InvalidBlockScalarHeader {
        /// Why the header was rejected
        reason: &'static str,
    },

    /// Anchor or alias without a name.
    #[error("invalid {what} name: {reason}")]
    InvalidAnchorName {
        /// "anchor" or "alias"
        what: &'static str,
        /// Reason for invalidity
        reason: &'static str,
    },

    /// Malformed tag or tag handle.
    #[error("invalid tag: {reason}")]
    InvalidTag {
        /// Reason for invalidity
        reason: &'static str,
    },

    /// Malformed `%YAML` or `%TAG` directive.
    #[error("invalid directive: {reason}")]
    InvalidDirective {
        /// Reason for invalidity
        reason: &'static str,
    },
}

fn quote_name(quote: &char) -> &'static str {
    if *quote == '"' {
        "double"
    } else {
        "single"
    }
}

/// Grammar error raised by the [`Parser`](crate::Parser).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "did not find expected {} while parsing {context}, found {found} at {mark}",
    .expected.join(" or ")
)]
pub struct ParseError {
    /// Position of the offending token
    pub mark: Marker,
    /// Tokens that would have been accepted here
    pub expected: Vec<&'static str>,
    /// Description of the token actually found
    pub found: String,
    /// Grammar production being parsed
    pub context: &'static str,
}

impl ParseError {
    pub(crate) fn new(
        mark: Marker,
        expected: &[&'static str],
        found: impl Into<String>,
        context: &'static str,
    ) -> Self {
        Self {
            mark,
            expected: expected.to_vec(),
            found: found.into(),
            context,
        }
    }
}

/// Failure while turning events into a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    /// `*name` without an earlier `&name` in the same document.
    #[error("found undefined alias '{anchor}' at {mark}")]
    UndefinedAlias {
        /// The alias name
        anchor: String,
        /// Position of the alias
        mark: Marker,
    },

    /// Collection used as a mapping key while complex keys are disabled.
    #[error("complex mapping keys are not supported at {mark}")]
    UnsupportedComplexKey {
        /// Position of the key
        mark: Marker,
    },

    /// Alias refers to a node that is still being composed.
    #[error("alias '{anchor}' creates a cyclic structure at {mark}")]
    CyclicStructure {
        /// The alias name
        anchor: String,
        /// Position of the alias
        mark: Marker,
    },

    /// Mapping contains the same key twice.
    #[error("duplicate mapping key {key} at {mark}")]
    DuplicateKey {
        /// Short rendering of the key
        key: String,
        /// Position of the second occurrence
        mark: Marker,
    },

    /// Scalar text does not match its explicit core-schema tag.
    #[error("scalar '{value}' is not a valid {tag} at {mark}")]
    InvalidTaggedScalar {
        /// Resolved tag
        tag: String,
        /// Scalar text
        value: String,
        /// Position of the scalar
        mark: Marker,
    },

    /// Nesting deeper than the configured limit.
    #[error("nesting depth exceeds limit of {limit} at {mark}")]
    DepthLimitExceeded {
        /// Configured maximum depth
        limit: usize,
        /// Position of the node that crossed the limit
        mark: Marker,
    },

    /// Single-document mode found zero or several documents.
    #[error("expected exactly one document, found {found}")]
    DocumentCount {
        /// Number of documents in the stream
        found: usize,
    },
}

/// Failure while writing a [`Document`](crate::Document) as text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    /// A node id that does not belong to the document.
    #[error("node {node} does not exist in the document")]
    UnrepresentableValue {
        /// The dangling id
        node: NodeId,
    },

    /// Node reachable from itself while cycles are rejected.
    #[error("node {node} is part of a cycle")]
    CyclicStructure {
        /// A node on the cycle
        node: NodeId,
    },

    /// Collections nested deeper than [`EmitConfig::max_depth`](crate::EmitConfig::max_depth).
    #[error("nesting depth exceeds limit of {limit} at node {node}")]
    DepthLimitExceeded {
        /// Configured maximum depth
        limit: usize,
        /// The collection that crossed the limit
        node: NodeId,
    },

    /// Emit configuration is out of range.
    #[error("invalid emit configuration: {reason}")]
    InvalidConfig {
        /// Which setting is wrong
        reason: &'static str,
    },
}

/// Any error produced while parsing text into documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Lexical error
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// Grammar error
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Graph construction error
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

impl Error {
    /// Position of the error, when one is known.
    pub fn marker(&self) -> Option<Marker> {
        match self {
            Error::Scan(e) => Some(e.mark),
            Error::Parse(e) => Some(e.mark),
            Error::Compose(e) => match e {
                ComposeError::UndefinedAlias { mark, .. }
                | ComposeError::UnsupportedComplexKey { mark }
                | ComposeError::CyclicStructure { mark, .. }
                | ComposeError::DuplicateKey { mark, .. }
                | ComposeError::InvalidTaggedScalar { mark, .. }
                | ComposeError::DepthLimitExceeded { mark, .. } => Some(*mark),
                ComposeError::DocumentCount { .. } => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::new(Marker::new(10, 2, 4), ScanErrorKind::TabIndentation);
        assert_eq!(
            err.to_string(),
            "found a tab character where an indentation space is expected at line 2 column 5"
        );

        let err = ScanError::new(
            Marker::new(0, 1, 0),
            ScanErrorKind::UnterminatedQuote { quote: '"' },
        );
        assert_eq!(
            err.to_string(),
            "unterminated double quoted scalar at line 1 column 1"
        );

        let err = ParseError::new(
            Marker::new(6, 1, 6),
            &["','", "']'"],
            "end of stream",
            "a flow sequence",
        );
        assert_eq!(
            err.to_string(),
            "did not find expected ',' or ']' while parsing a flow sequence, found end of stream at line 1 column 7"
        );
    }

    #[test]
    fn test_compose_error_display() {
        let err = ComposeError::UndefinedAlias {
            anchor: "base".into(),
            mark: Marker::new(3, 1, 3),
        };
        assert_eq!(
            err.to_string(),
            "found undefined alias 'base' at line 1 column 4"
        );
        assert_eq!(Error::from(err).marker(), Some(Marker::new(3, 1, 3)));
    }

    #[test]
    fn test_emit_error_display() {
        let err = EmitError::InvalidConfig {
            reason: "indent must be at least 1",
        };
        assert_eq!(
            err.to_string(),
            "invalid emit configuration: indent must be at least 1"
        );
        let err = EmitError::DepthLimitExceeded {
            limit: 512,
            node: NodeId::from_index(7),
        };
        assert_eq!(
            err.to_string(),
            "nesting depth exceeds limit of 512 at node #7"
        );
    }
}
