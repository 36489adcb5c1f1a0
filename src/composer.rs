//! Composer: events to documents.
//!
//! Builds one [`Document`] per document in the event stream. Composition is
//! iterative: open collections live on an explicit stack, so nesting depth is
//! bounded only by [`ParseConfig::max_depth`], not by the call stack.
//!
//! Anchors are registered when their node starts, before any child is
//! composed. An alias inside an anchored collection that refers back to it
//! therefore resolves to the collection itself, producing a cycle (or a
//! [`ComposeError::CyclicStructure`] under [`CyclePolicy::Reject`]).

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::config::{CyclePolicy, DocumentMode, DuplicateKeys, ParseConfig};
use crate::error::{ComposeError, Error, Marker, ParseError, Result};
use crate::event::{Event, EventKind};
use crate::parser::Parser;
use crate::resolver;
use crate::value::{Cursor, Document, NodeId, Value};

/// Hashable form of a scalar mapping key, for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScalarKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    String(String),
}

impl ScalarKey {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(ScalarKey::Null),
            Value::Bool(b) => Some(ScalarKey::Bool(*b)),
            Value::Int(n) => Some(ScalarKey::Int(*n)),
            Value::Float(f) => {
                // 0.0 == -0.0 and NaN == NaN under structural equality
                let bits = if *f == 0.0 {
                    0
                } else if f.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    f.to_bits()
                };
                Some(ScalarKey::Float(bits))
            }
            Value::String(s) => Some(ScalarKey::String(s.clone())),
            Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

/// A collection whose end event has not been seen yet.
enum Frame {
    Sequence {
        id: NodeId,
        mark: Marker,
        items: Vec<NodeId>,
    },
    Mapping {
        id: NodeId,
        mark: Marker,
        pairs: Vec<(NodeId, NodeId)>,
        key: Option<(NodeId, Marker)>,
        scalar_index: HashMap<ScalarKey, usize>,
    },
}

/// State for composing a single document.
struct Composer<'c> {
    config: &'c ParseConfig,
    doc: Document,
    anchors: IndexMap<String, NodeId>,
    in_progress: HashSet<NodeId>,
}

impl<'c> Composer<'c> {
    fn new(config: &'c ParseConfig) -> Self {
        Self {
            config,
            doc: Document::empty(),
            anchors: IndexMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn register_anchor(&mut self, anchor: Option<String>, id: NodeId) {
        if let Some(name) = anchor {
            tracing::trace!(anchor = %name, node = %id, "registered anchor");
            self.anchors.insert(name, id);
        }
    }

    /// Compose the root node of a document; the `DocumentStart` event has
    /// already been consumed.
    fn compose_root(&mut self, parser: &mut Parser<'_>) -> Result<NodeId> {
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let event = next_event(parser)?;
            let mark = event.mark;

            let completed = match event.kind {
                EventKind::Alias { anchor } => {
                    let id = match self.anchors.get(&anchor) {
                        Some(&id) => id,
                        None => return Err(ComposeError::UndefinedAlias { anchor, mark }.into()),
                    };
                    if self.config.cycles == CyclePolicy::Reject && self.in_progress.contains(&id)
                    {
                        return Err(ComposeError::CyclicStructure { anchor, mark }.into());
                    }
                    Some((id, mark))
                }
                EventKind::Scalar {
                    anchor,
                    tag,
                    value,
                    style,
                } => {
                    let resolved = match resolver::resolve(&value, style, tag.as_deref()) {
                        Some(resolved) => resolved,
                        None => {
                            return Err(ComposeError::InvalidTaggedScalar {
                                tag: tag.unwrap_or_default(),
                                value,
                                mark,
                            }
                            .into())
                        }
                    };
                    let id = self.doc.push(resolved);
                    self.register_anchor(anchor, id);
                    Some((id, mark))
                }
                EventKind::SequenceStart { anchor, .. } => {
                    self.check_depth(stack.len(), mark)?;
                    let id = self.doc.push(Value::Sequence(Vec::new()));
                    self.register_anchor(anchor, id);
                    self.in_progress.insert(id);
                    stack.push(Frame::Sequence {
                        id,
                        mark,
                        items: Vec::new(),
                    });
                    None
                }
                EventKind::MappingStart { anchor, .. } => {
                    self.check_depth(stack.len(), mark)?;
                    let id = self.doc.push(Value::Mapping(Vec::new()));
                    self.register_anchor(anchor, id);
                    self.in_progress.insert(id);
                    stack.push(Frame::Mapping {
                        id,
                        mark,
                        pairs: Vec::new(),
                        key: None,
                        scalar_index: HashMap::new(),
                    });
                    None
                }
                EventKind::SequenceEnd | EventKind::MappingEnd => match stack.pop() {
                    Some(frame) => Some(self.close(frame)),
                    None => return Err(unexpected_event(&EventKind::MappingEnd, mark)),
                },
                other => return Err(unexpected_event(&other, mark)),
            };

            if let Some((id, mark)) = completed {
                match stack.last_mut() {
                    None => return Ok(id),
                    Some(Frame::Sequence { items, .. }) => items.push(id),
                    Some(Frame::Mapping {
                        pairs,
                        key,
                        scalar_index,
                        ..
                    }) => self.add_entry(pairs, key, scalar_index, id, mark)?,
                }
            }
        }
    }

    fn check_depth(&self, depth: usize, mark: Marker) -> Result<()> {
        if depth >= self.config.max_depth {
            return Err(ComposeError::DepthLimitExceeded {
                limit: self.config.max_depth,
                mark,
            }
            .into());
        }
        Ok(())
    }

    /// Store the children of a finished collection in its node.
    fn close(&mut self, frame: Frame) -> (NodeId, Marker) {
        let (id, mark, value) = match frame {
            Frame::Sequence { id, mark, items } => (id, mark, Value::Sequence(items)),
            Frame::Mapping {
                id, mark, pairs, ..
            } => (id, mark, Value::Mapping(pairs)),
        };
        if let Some(slot) = self.doc.get_mut(id) {
            *slot = value;
        }
        self.in_progress.remove(&id);
        (id, mark)
    }

    /// Feed a composed node into a mapping as key or value.
    fn add_entry(
        &self,
        pairs: &mut Vec<(NodeId, NodeId)>,
        key: &mut Option<(NodeId, Marker)>,
        scalar_index: &mut HashMap<ScalarKey, usize>,
        id: NodeId,
        mark: Marker,
    ) -> Result<()> {
        let (key_id, key_mark) = match key.take() {
            Some(pending) => pending,
            None => {
                if !self.config.complex_keys && !self.doc.value_of(id).is_scalar() {
                    return Err(ComposeError::UnsupportedComplexKey { mark }.into());
                }
                *key = Some((id, mark));
                return Ok(());
            }
        };

        let scalar_key = ScalarKey::of(self.doc.value_of(key_id));
        let existing = match &scalar_key {
            Some(k) => scalar_index.get(k).copied(),
            None => {
                let probe = self.doc.cursor(key_id);
                pairs
                    .iter()
                    .position(|&(k, _)| !self.doc.value_of(k).is_scalar() && self.doc.cursor(k) == probe)
            }
        };

        match existing {
            Some(position) => match self.config.duplicate_keys {
                DuplicateKeys::KeepLast => pairs[position].1 = id,
                DuplicateKeys::Reject => {
                    return Err(ComposeError::DuplicateKey {
                        key: key_preview(self.doc.cursor(key_id)),
                        mark: key_mark,
                    }
                    .into())
                }
            },
            None => {
                if let Some(k) = scalar_key {
                    scalar_index.insert(k, pairs.len());
                }
                pairs.push((key_id, id));
            }
        }
        Ok(())
    }
}

/// Short rendering of a mapping key for error messages.
fn key_preview(key: Cursor<'_>) -> String {
    match key.value() {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => {
            let mut preview: String = s.chars().take(40).collect();
            if s.chars().count() > 40 {
                preview.push_str("...");
            }
            format!("'{}'", preview)
        }
        Value::Sequence(_) => "<sequence>".to_string(),
        Value::Mapping(_) => "<mapping>".to_string(),
    }
}

fn next_event(parser: &mut Parser<'_>) -> Result<Event> {
    match parser.next_event()? {
        Some(event) => Ok(event),
        None => Err(ParseError::new(
            Marker::default(),
            &["an event"],
            "end of event stream",
            "a document",
        )
        .into()),
    }
}

fn unexpected_event(kind: &EventKind, mark: Marker) -> Error {
    let found = match kind {
        EventKind::StreamStart => "stream start",
        EventKind::StreamEnd => "stream end",
        EventKind::DocumentStart { .. } => "document start",
        EventKind::DocumentEnd { .. } => "document end",
        EventKind::SequenceEnd => "sequence end",
        EventKind::MappingEnd => "mapping end",
        _ => "node",
    };
    ParseError::new(mark, &["a node"], found, "a document").into()
}

/// Iterator over the documents of a YAML stream.
///
/// Each document is composed completely before it is returned; a failing
/// document yields the error and ends the iteration.
#[derive(Debug)]
pub struct Loader<'a> {
    parser: Parser<'a>,
    config: ParseConfig,
    started: bool,
    finished: bool,
}

impl<'a> Loader<'a> {
    /// Create a loader over `input`.
    pub fn new(input: &'a str, config: ParseConfig) -> Self {
        Self {
            parser: Parser::new(input),
            config,
            started: false,
            finished: false,
        }
    }

    /// Compose the next document, or `None` at the end of the stream.
    pub fn next_document(&mut self) -> Result<Option<Document>> {
        if self.finished {
            return Ok(None);
        }
        match self.compose_document() {
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Ok(Some(doc)) => Ok(Some(doc)),
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }

    fn compose_document(&mut self) -> Result<Option<Document>> {
        if !self.started {
            let event = next_event(&mut self.parser)?;
            if event.kind != EventKind::StreamStart {
                return Err(unexpected_event(&event.kind, event.mark));
            }
            self.started = true;
        }

        let event = next_event(&mut self.parser)?;
        let (version, tags) = match event.kind {
            EventKind::StreamEnd => return Ok(None),
            EventKind::DocumentStart { version, tags, .. } => (version, tags),
            other => return Err(unexpected_event(&other, event.mark)),
        };

        let mut composer = Composer::new(&self.config);
        let root = composer.compose_root(&mut self.parser)?;

        let end = next_event(&mut self.parser)?;
        if !matches!(end.kind, EventKind::DocumentEnd { .. }) {
            return Err(unexpected_event(&end.kind, end.mark));
        }

        let anchors = composer.anchors.len();
        let mut doc = composer.doc;
        doc.set_root(root);
        doc.set_version(version);
        for (handle, prefix) in tags {
            doc.add_tag_directive(handle, prefix);
        }
        tracing::debug!(nodes = doc.node_count(), anchors, "composed document");
        Ok(Some(doc))
    }

    /// Parse the event after the current document without composing it,
    /// surfacing grammar errors that directly follow the document.
    fn check_next(&mut self) -> Result<()> {
        if !self.finished {
            self.parser.next_event()?;
        }
        Ok(())
    }
}

impl<'a> Iterator for Loader<'a> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_document().transpose()
    }
}

/// Parse according to the configured [`DocumentMode`].
pub(crate) fn load_one(input: &str, config: &ParseConfig) -> Result<Document> {
    let mut loader = Loader::new(input, config.clone());
    match config.documents {
        DocumentMode::First => match loader.next_document()? {
            Some(doc) => {
                loader.check_next()?;
                Ok(doc)
            }
            None => Ok(Document::new()),
        },
        DocumentMode::Single => {
            let first = loader.next_document()?;
            let Some(doc) = first else {
                return Err(ComposeError::DocumentCount { found: 0 }.into());
            };
            let mut found = 1;
            while loader.next_document()?.is_some() {
                found += 1;
            }
            if found == 1 {
                Ok(doc)
            } else {
                tracing::debug!(found, "single-document mode rejected the stream");
                Err(ComposeError::DocumentCount { found }.into())
            }
        }
    }
}
