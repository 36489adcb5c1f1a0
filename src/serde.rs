//! `Serialize` for documents and cursors.
//!
//! Shared nodes are serialized once per reference. Cyclic documents would
//! recurse forever, so nesting is limited to [`MAX_SERIALIZE_DEPTH`] levels
//! and deeper graphs fail with a serializer error.

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::value::{Cursor, Document, Value};

/// Deepest nesting written before serialization gives up.
pub const MAX_SERIALIZE_DEPTH: usize = 512;

struct Bounded<'a> {
    node: Cursor<'a>,
    depth: usize,
}

impl Serialize for Bounded<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.depth > MAX_SERIALIZE_DEPTH {
            return Err(S::Error::custom(format!(
                "nesting deeper than {} levels (is the document cyclic?)",
                MAX_SERIALIZE_DEPTH
            )));
        }
        let child = |node| Bounded {
            node,
            depth: self.depth + 1,
        };

        match self.node.value() {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for element in self.node.elements() {
                    seq.serialize_element(&child(element))?;
                }
                seq.end()
            }
            Value::Mapping(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in self.node.entries() {
                    map.serialize_entry(&child(key), &child(value))?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for Cursor<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Bounded {
            node: *self,
            depth: 0,
        }
        .serialize(serializer)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}
