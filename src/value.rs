//! Dynamic value graph.
//!
//! A [`Document`] is an arena of [`Value`] nodes. Collections refer to their
//! children by [`NodeId`], so a node reached through several aliases is
//! stored once and shared, and anchors may form cycles without any
//! reference-counting leaks.
//!
//! Two notions of sameness are available:
//!
//! - **identity**: two cursors designate the same node
//!   ([`Cursor::same_node`]);
//! - **structural equality**: `==` on [`Document`] or [`Cursor`] compares the
//!   graphs reachable from both nodes. The comparison terminates on cycles and
//!   treats NaN as equal to NaN.

use core::fmt;
use std::collections::HashSet;

use crate::convert::{ConvertError, FromYaml, IntoYaml};

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Id for an arena position. The id is only meaningful for a document
    /// with at least `index + 1` nodes.
    pub fn from_index(index: usize) -> Self {
        NodeId(index)
    }

    /// Position of the node in the document arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single node of the value graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`, `~` or empty
    Null,
    /// Boolean
    Bool(bool),
    /// Integer (stored as i64)
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// String
    String(String),
    /// Sequence of child nodes
    Sequence(Vec<NodeId>),
    /// Mapping as ordered (key, value) pairs
    Mapping(Vec<(NodeId, NodeId)>),
}

static NULL: Value = Value::Null;

impl Value {
    /// Get the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Check if this is a scalar (not a collection).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// One YAML document: a node arena, the root node and the directives that
/// preceded it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Value>,
    root: NodeId,
    version: Option<(u32, u32)>,
    tags: Vec<(String, String)>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document whose root is `null`.
    pub fn new() -> Self {
        Self {
            nodes: vec![Value::Null],
            root: NodeId(0),
            version: None,
            tags: Vec::new(),
        }
    }

    /// Create a document with no nodes; the caller must push the root.
    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId(0),
            version: None,
            tags: Vec::new(),
        }
    }

    /// Build a document from any convertible Rust value.
    pub fn from_value<T: IntoYaml>(value: T) -> Self {
        let mut doc = Self::empty();
        let root = value.into_yaml(&mut doc);
        doc.root = root;
        doc
    }

    /// Convert the root node into a Rust value.
    pub fn to_rust<T: FromYaml>(&self) -> Result<T, ConvertError> {
        T::from_yaml(self.root())
    }

    /// Add a node to the arena and return its id.
    ///
    /// Collections may refer to ids pushed later, which is how cycles are
    /// built by hand.
    pub fn push(&mut self, value: impl Into<Value>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(value.into());
        id
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Value> {
        self.nodes.get(id.0)
    }

    /// Get a mutable node by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Value> {
        self.nodes.get_mut(id.0)
    }

    /// Id of the root node.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Make `id` the root node.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    /// Cursor at the root node.
    pub fn root(&self) -> Cursor<'_> {
        self.cursor(self.root)
    }

    /// Cursor at an arbitrary node.
    pub fn cursor(&self, id: NodeId) -> Cursor<'_> {
        Cursor { doc: self, id }
    }

    /// Number of nodes in the arena, reachable or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `%YAML` version directive, if any.
    pub fn version(&self) -> Option<(u32, u32)> {
        self.version
    }

    /// Set the `%YAML` version directive.
    pub fn set_version(&mut self, version: Option<(u32, u32)>) {
        self.version = version;
    }

    /// `%TAG` directives as (handle, prefix) pairs.
    pub fn tag_directives(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Add a `%TAG` directive.
    pub fn add_tag_directive(&mut self, handle: impl Into<String>, prefix: impl Into<String>) {
        self.tags.push((handle.into(), prefix.into()));
    }

    /// Node value, with dangling ids reading as `null`.
    pub(crate) fn value_of(&self, id: NodeId) -> &Value {
        self.nodes.get(id.0).unwrap_or(&NULL)
    }

    /// The `n`th child of a collection; mapping keys and values alternate.
    pub(crate) fn child_at(&self, id: NodeId, n: usize) -> Option<NodeId> {
        match self.nodes.get(id.0)? {
            Value::Sequence(items) => items.get(n).copied(),
            Value::Mapping(pairs) => pairs
                .get(n / 2)
                .map(|&(k, v)| if n % 2 == 0 { k } else { v }),
            _ => None,
        }
    }

    /// Check if any node reachable from the root is reachable from itself.
    pub fn is_cyclic(&self) -> bool {
        const UNVISITED: u8 = 0;
        const IN_PROGRESS: u8 = 1;
        const DONE: u8 = 2;

        if self.root.0 >= self.nodes.len() {
            return false;
        }
        let mut state = vec![UNVISITED; self.nodes.len()];
        let mut stack: Vec<(NodeId, usize)> = vec![(self.root, 0)];
        state[self.root.0] = IN_PROGRESS;

        while let Some(&(id, next)) = stack.last() {
            match self.child_at(id, next) {
                Some(child) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    match state.get(child.0) {
                        Some(&IN_PROGRESS) => return true,
                        Some(&UNVISITED) => {
                            state[child.0] = IN_PROGRESS;
                            stack.push((child, 0));
                        }
                        _ => {}
                    }
                }
                None => {
                    state[id.0] = DONE;
                    stack.pop();
                }
            }
        }
        false
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root() == other.root()
    }
}

/// Read-only view of one node in a [`Document`].
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Cursor<'a> {
    /// Id of the node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Document the node belongs to.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Node value. A dangling id reads as `null`.
    pub fn value(&self) -> &'a Value {
        self.doc.value_of(self.id)
    }

    /// Get the type name of the node.
    pub fn type_name(&self) -> &'static str {
        self.value().type_name()
    }

    /// Check if the node is null.
    pub fn is_null(&self) -> bool {
        matches!(self.value(), Value::Null)
    }

    /// Get the boolean value, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer value, if this is an int.
    pub fn as_i64(&self) -> Option<i64> {
        match self.value() {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get a float value; ints are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value() {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Get the string value, if this is a string.
    pub fn as_str(&self) -> Option<&'a str> {
        match self.value() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if the node is a sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self.value(), Value::Sequence(_))
    }

    /// Check if the node is a mapping.
    pub fn is_mapping(&self) -> bool {
        matches!(self.value(), Value::Mapping(_))
    }

    /// Number of elements or entries; 0 for scalars.
    pub fn len(&self) -> usize {
        match self.value() {
            Value::Sequence(items) => items.len(),
            Value::Mapping(pairs) => pairs.len(),
            _ => 0,
        }
    }

    /// Check if the node is an empty collection or a scalar.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over sequence elements (empty for other nodes).
    pub fn elements(&self) -> Elements<'a> {
        let items: &'a [NodeId] = match self.value() {
            Value::Sequence(items) => items,
            _ => &[],
        };
        Elements {
            doc: self.doc,
            inner: items.iter(),
        }
    }

    /// Iterate over mapping entries (empty for other nodes).
    pub fn entries(&self) -> Entries<'a> {
        let pairs: &'a [(NodeId, NodeId)] = match self.value() {
            Value::Mapping(pairs) => pairs,
            _ => &[],
        };
        Entries {
            doc: self.doc,
            inner: pairs.iter(),
        }
    }

    /// Sequence element by position.
    pub fn index(&self, index: usize) -> Option<Cursor<'a>> {
        match self.value() {
            Value::Sequence(items) => items.get(index).map(|&id| self.doc.cursor(id)),
            _ => None,
        }
    }

    /// Mapping value for a string key.
    pub fn get(&self, key: &str) -> Option<Cursor<'a>> {
        self.entries()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Mapping value for a key of any type, compared structurally.
    pub fn get_by(&self, key: Cursor<'_>) -> Option<Cursor<'a>> {
        self.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Check if both cursors designate the same node (identity, not
    /// structural equality).
    pub fn same_node(&self, other: &Cursor<'_>) -> bool {
        core::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("id", &self.id)
            .field("value", self.value())
            .finish()
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(*self, *other)
    }
}

/// Compare the graphs reachable from two nodes.
///
/// Coinductive: a pair of nodes already under comparison is assumed equal,
/// so cycles terminate. Mapping entries compare in order.
fn structural_eq(a: Cursor<'_>, b: Cursor<'_>) -> bool {
    let mut assumed: HashSet<(NodeId, NodeId)> = HashSet::new();
    let mut pending = vec![(a.id, b.id)];

    while let Some((x, y)) = pending.pop() {
        if !assumed.insert((x, y)) {
            continue;
        }
        match (a.doc.value_of(x), b.doc.value_of(y)) {
            (Value::Null, Value::Null) => {}
            (Value::Bool(p), Value::Bool(q)) if p == q => {}
            (Value::Int(p), Value::Int(q)) if p == q => {}
            (Value::Float(p), Value::Float(q)) if p == q || (p.is_nan() && q.is_nan()) => {}
            (Value::String(p), Value::String(q)) if p == q => {}
            (Value::Sequence(p), Value::Sequence(q)) if p.len() == q.len() => {
                pending.extend(p.iter().copied().zip(q.iter().copied()));
            }
            (Value::Mapping(p), Value::Mapping(q)) if p.len() == q.len() => {
                for (&(pk, pv), &(qk, qv)) in p.iter().zip(q.iter()) {
                    pending.push((pk, qk));
                    pending.push((pv, qv));
                }
            }
            _ => return false,
        }
    }
    true
}

/// Iterator over sequence elements.
#[derive(Debug, Clone)]
pub struct Elements<'a> {
    doc: &'a Document,
    inner: core::slice::Iter<'a, NodeId>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Cursor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|&id| self.doc.cursor(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Elements<'_> {}

/// Iterator over mapping entries.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    doc: &'a Document,
    inner: core::slice::Iter<'a, (NodeId, NodeId)>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (Cursor<'a>, Cursor<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|&(k, v)| (self.doc.cursor(k), self.doc.cursor(v)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}
