//! Conversions between Rust values and document nodes.
//!
//! [`IntoYaml`] builds nodes inside a [`Document`]; [`FromYaml`] reads them
//! back through a [`Cursor`].
//!
//! ```
//! use indexmap::IndexMap;
//! use radyaml::Document;
//!
//! let mut servers = IndexMap::new();
//! servers.insert("alpha".to_string(), vec![80i64, 443]);
//! let doc = Document::from_value(servers.clone());
//!
//! let back: IndexMap<String, Vec<i64>> = doc.to_rust().unwrap();
//! assert_eq!(back, servers);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use indexmap::IndexMap;

use crate::value::{Cursor, Document, NodeId, Value};

/// Error converting a node into a Rust value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// The node has the wrong type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type
        expected: &'static str,
        /// Type name of the node
        found: &'static str,
    },

    /// An integer does not fit the target type.
    #[error("integer {value} out of range for {target}")]
    OutOfRange {
        /// The integer
        value: i64,
        /// Target type name
        target: &'static str,
    },
}

impl ConvertError {
    fn mismatch(expected: &'static str, node: Cursor<'_>) -> Self {
        ConvertError::TypeMismatch {
            expected,
            found: node.type_name(),
        }
    }
}

/// Build a node from a Rust value.
pub trait IntoYaml {
    /// Add `self` to `doc` and return the new node's id.
    fn into_yaml(self, doc: &mut Document) -> NodeId;
}

/// Read a Rust value from a node.
pub trait FromYaml: Sized {
    /// Convert the node.
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError>;
}

// =============================================================================
// IntoYaml
// =============================================================================

impl IntoYaml for () {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        doc.push(Value::Null)
    }
}

impl IntoYaml for bool {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        doc.push(Value::Bool(self))
    }
}

macro_rules! into_yaml_int {
    ($($t:ty),*) => {
        $(
            impl IntoYaml for $t {
                fn into_yaml(self, doc: &mut Document) -> NodeId {
                    doc.push(Value::Int(i64::from(self)))
                }
            }
        )*
    };
}

into_yaml_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! into_yaml_wide_int {
    ($($t:ty),*) => {
        $(
            /// Values above `i64::MAX` become floats.
            impl IntoYaml for $t {
                fn into_yaml(self, doc: &mut Document) -> NodeId {
                    match i64::try_from(self) {
                        Ok(n) => doc.push(Value::Int(n)),
                        Err(_) => doc.push(Value::Float(self as f64)),
                    }
                }
            }
        )*
    };
}

into_yaml_wide_int!(u64, usize, isize);

impl IntoYaml for f32 {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        doc.push(Value::Float(f64::from(self)))
    }
}

impl IntoYaml for f64 {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        doc.push(Value::Float(self))
    }
}

impl IntoYaml for String {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        doc.push(Value::String(self))
    }
}

impl IntoYaml for &str {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        doc.push(Value::String(self.to_string()))
    }
}

impl IntoYaml for char {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        doc.push(Value::String(self.to_string()))
    }
}

impl<T: IntoYaml> IntoYaml for Option<T> {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        match self {
            Some(value) => value.into_yaml(doc),
            None => doc.push(Value::Null),
        }
    }
}

impl<T: IntoYaml> IntoYaml for Vec<T> {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        let items = self.into_iter().map(|item| item.into_yaml(doc)).collect();
        doc.push(Value::Sequence(items))
    }
}

impl<T: IntoYaml + Clone> IntoYaml for &[T] {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        let items = self.iter().map(|item| item.clone().into_yaml(doc)).collect();
        doc.push(Value::Sequence(items))
    }
}

fn mapping_into_yaml<K, V>(pairs: impl IntoIterator<Item = (K, V)>, doc: &mut Document) -> NodeId
where
    K: IntoYaml,
    V: IntoYaml,
{
    let pairs = pairs
        .into_iter()
        .map(|(k, v)| {
            let key = k.into_yaml(doc);
            let value = v.into_yaml(doc);
            (key, value)
        })
        .collect();
    doc.push(Value::Mapping(pairs))
}

impl<K: IntoYaml, V: IntoYaml> IntoYaml for IndexMap<K, V> {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        mapping_into_yaml(self, doc)
    }
}

impl<K: IntoYaml, V: IntoYaml> IntoYaml for BTreeMap<K, V> {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        mapping_into_yaml(self, doc)
    }
}

/// Deep copy of the subgraph under the cursor. Sharing and cycles are kept.
impl IntoYaml for Cursor<'_> {
    fn into_yaml(self, doc: &mut Document) -> NodeId {
        let source = self.document();
        let mut copies: HashMap<NodeId, NodeId> = HashMap::new();
        let mut pending = vec![self.id()];

        // First pass: one placeholder per reachable node.
        while let Some(id) = pending.pop() {
            if copies.contains_key(&id) {
                continue;
            }
            let value = source.cursor(id).value();
            copies.insert(id, doc.push(value.clone()));
            match value {
                Value::Sequence(items) => pending.extend(items.iter().copied()),
                Value::Mapping(pairs) => {
                    pending.extend(pairs.iter().flat_map(|&(k, v)| [k, v]));
                }
                _ => {}
            }
        }

        // Second pass: point the copied collections at the copied children.
        for &copy in copies.values() {
            if let Some(node) = doc.get_mut(copy) {
                match node {
                    Value::Sequence(items) => {
                        for item in items.iter_mut() {
                            *item = copies[&*item];
                        }
                    }
                    Value::Mapping(pairs) => {
                        for (k, v) in pairs.iter_mut() {
                            *k = copies[&*k];
                            *v = copies[&*v];
                        }
                    }
                    _ => {}
                }
            }
        }

        copies[&self.id()]
    }
}

// =============================================================================
// FromYaml
// =============================================================================

impl FromYaml for () {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        if node.is_null() {
            Ok(())
        } else {
            Err(ConvertError::mismatch("null", node))
        }
    }
}

impl FromYaml for bool {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        node.as_bool().ok_or_else(|| ConvertError::mismatch("bool", node))
    }
}

macro_rules! from_yaml_int {
    ($($t:ty),*) => {
        $(
            impl FromYaml for $t {
                fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
                    let n = node
                        .as_i64()
                        .ok_or_else(|| ConvertError::mismatch("int", node))?;
                    <$t>::try_from(n).map_err(|_| ConvertError::OutOfRange {
                        value: n,
                        target: stringify!($t),
                    })
                }
            }
        )*
    };
}

from_yaml_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromYaml for f64 {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        node.as_f64().ok_or_else(|| ConvertError::mismatch("float", node))
    }
}

impl FromYaml for f32 {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        f64::from_yaml(node).map(|f| f as f32)
    }
}

impl FromYaml for String {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        node.as_str()
            .map(str::to_string)
            .ok_or_else(|| ConvertError::mismatch("string", node))
    }
}

impl FromYaml for char {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        let s = node
            .as_str()
            .ok_or_else(|| ConvertError::mismatch("string", node))?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConvertError::TypeMismatch {
                expected: "single character",
                found: "string",
            }),
        }
    }
}

impl<T: FromYaml> FromYaml for Option<T> {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        if node.is_null() {
            Ok(None)
        } else {
            T::from_yaml(node).map(Some)
        }
    }
}

impl<T: FromYaml> FromYaml for Vec<T> {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        if !node.is_sequence() {
            return Err(ConvertError::mismatch("sequence", node));
        }
        node.elements().map(T::from_yaml).collect()
    }
}

fn mapping_from_yaml<K, V, M>(node: Cursor<'_>) -> Result<M, ConvertError>
where
    K: FromYaml,
    V: FromYaml,
    M: FromIterator<(K, V)>,
{
    if !node.is_mapping() {
        return Err(ConvertError::mismatch("mapping", node));
    }
    node.entries()
        .map(|(k, v)| Ok((K::from_yaml(k)?, V::from_yaml(v)?)))
        .collect()
}

impl<K: FromYaml + Hash + Eq, V: FromYaml> FromYaml for IndexMap<K, V> {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        mapping_from_yaml(node)
    }
}

impl<K: FromYaml + Ord, V: FromYaml> FromYaml for BTreeMap<K, V> {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        mapping_from_yaml(node)
    }
}

impl<K: FromYaml + Hash + Eq, V: FromYaml> FromYaml for HashMap<K, V> {
    fn from_yaml(node: Cursor<'_>) -> Result<Self, ConvertError> {
        mapping_from_yaml(node)
    }
}
