//! Parser events.
//!
//! Events describe document structure independent of block/flow layout:
//! a block mapping and a flow mapping produce the same `MappingStart` /
//! `MappingEnd` pair, differing only in [`CollectionStyle`].

use crate::error::Marker;
use crate::token::ScalarStyle;

/// Layout of a collection, both as parsed and as requested from the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionStyle {
    /// Indentation based
    #[default]
    Block,
    /// `[...]` / `{...}`
    Flow,
}

/// A parser event with the position of the token that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The event type
    pub kind: EventKind,
    /// Where the event starts
    pub mark: Marker,
}

impl Event {
    pub(crate) fn new(kind: EventKind, mark: Marker) -> Self {
        Self { kind, mark }
    }
}

/// Event types.
///
/// Tags are fully resolved: handles have been expanded with the document's
/// `%TAG` directives, so `!!int` arrives as `tag:yaml.org,2002:int`.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    StreamStart,
    StreamEnd,
    DocumentStart {
        /// No `---` marker was present
        implicit: bool,
        /// `%YAML` directive, if any
        version: Option<(u32, u32)>,
        /// `%TAG` directives as (handle, prefix)
        tags: Vec<(String, String)>,
    },
    DocumentEnd {
        /// No `...` marker was present
        implicit: bool,
    },
    Alias {
        anchor: String,
    },
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        value: String,
        style: ScalarStyle,
    },
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: CollectionStyle,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: CollectionStyle,
    },
    MappingEnd,
}

impl EventKind {
    /// Plain scalar without anchor or tag; used for implied empty nodes.
    pub(crate) fn empty_scalar() -> Self {
        EventKind::Scalar {
            anchor: None,
            tag: None,
            value: String::new(),
            style: ScalarStyle::Plain,
        }
    }

    /// Anchor attached to a node event, if any.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            EventKind::Scalar { anchor, .. }
            | EventKind::SequenceStart { anchor, .. }
            | EventKind::MappingStart { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }
}
