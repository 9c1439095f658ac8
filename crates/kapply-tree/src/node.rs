use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{TreeError, TreeResult};

/// Object representation. Keys are unique and keep insertion order so that
/// merged output is stable from run to run.
pub type TreeMap = IndexMap<String, TreeNode>;

/// A node in a generic document tree.
///
/// Scalars are compared and propagated by value. Object equality ignores key
/// order; array equality does not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TreeNode {
    /// Nothing declared at this position.
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<TreeNode>),
    Object(TreeMap),
}

/// The broad kind of a [`TreeNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// Lower-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// Returns `true` for bool, number and string.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Kind::Bool | Kind::Number | Kind::String)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TreeNode {
    /// An object node with no fields.
    pub fn empty_object() -> Self {
        TreeNode::Object(TreeMap::new())
    }

    pub fn kind(&self) -> Kind {
        match self {
            TreeNode::Null => Kind::Null,
            TreeNode::Bool(_) => Kind::Bool,
            TreeNode::Number(_) => Kind::Number,
            TreeNode::String(_) => Kind::String,
            TreeNode::Array(_) => Kind::Array,
            TreeNode::Object(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TreeNode::Null)
    }

    pub fn as_object(&self) -> Option<&TreeMap> {
        match self {
            TreeNode::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut TreeMap> {
        match self {
            TreeNode::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TreeNode]> {
        match self {
            TreeNode::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeNode::String(s) => Some(s),
            _ => None,
        }
    }

    /// Field lookup on an object node. Returns `None` for any other kind.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Walk a sequence of object fields.
    ///
    /// A missing field or a `null` along the way yields `Ok(None)`. Walking
    /// into a scalar or an array is an error naming the offending prefix.
    pub fn lookup(&self, fields: &[&str]) -> TreeResult<Option<&TreeNode>> {
        let mut current = self;
        for (i, field) in fields.iter().enumerate() {
            match current {
                TreeNode::Null => return Ok(None),
                TreeNode::Object(map) => match map.get(*field) {
                    Some(next) => current = next,
                    None => return Ok(None),
                },
                other => {
                    return Err(TreeError::NotAnObject {
                        path: fields[..=i].join("."),
                        actual: other.kind(),
                    })
                }
            }
        }
        Ok(Some(current))
    }

    /// Like [`lookup`](Self::lookup), but the leaf must be a string.
    pub fn nested_str(&self, fields: &[&str]) -> TreeResult<Option<&str>> {
        match self.lookup(fields)? {
            None => Ok(None),
            Some(TreeNode::String(s)) => Ok(Some(s)),
            Some(other) => Err(TreeError::NotAString {
                path: fields.join("."),
                actual: other.kind(),
            }),
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(input: &str) -> TreeResult<Self> {
        serde_json::from_str(input).map_err(|e| TreeError::Serialization(e.to_string()))
    }

    /// Compact JSON encoding.
    pub fn to_json_string(&self) -> TreeResult<String> {
        serde_json::to_string(self).map_err(|e| TreeError::Serialization(e.to_string()))
    }

    /// Indented JSON encoding, for human consumption.
    pub fn to_json_string_pretty(&self) -> TreeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TreeError::Serialization(e.to_string()))
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeNode::Null => serializer.serialize_unit(),
            TreeNode::Bool(b) => serializer.serialize_bool(*b),
            TreeNode::Number(n) => n.serialize(serializer),
            TreeNode::String(s) => serializer.serialize_str(s),
            TreeNode::Array(items) => items.serialize(serializer),
            TreeNode::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TreeNodeVisitor)
    }
}

struct TreeNodeVisitor;

impl<'de> Visitor<'de> for TreeNodeVisitor {
    type Value = TreeNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<TreeNode, E> {
        Ok(TreeNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<TreeNode, E> {
        Ok(TreeNode::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<TreeNode, D::Error> {
        TreeNode::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<TreeNode, E> {
        Ok(TreeNode::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TreeNode, E> {
        Ok(TreeNode::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TreeNode, E> {
        Ok(TreeNode::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<TreeNode, E> {
        Number::from_f64(v)
            .map(TreeNode::Number)
            .ok_or_else(|| E::custom("non-finite numbers are not representable"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TreeNode, E> {
        Ok(TreeNode::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<TreeNode, E> {
        Ok(TreeNode::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TreeNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(TreeNode::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TreeNode, A::Error> {
        let mut map = TreeMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, TreeNode>()? {
            map.insert(key, value);
        }
        Ok(TreeNode::Object(map))
    }
}

impl From<Value> for TreeNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TreeNode::Null,
            Value::Bool(b) => TreeNode::Bool(b),
            Value::Number(n) => TreeNode::Number(n),
            Value::String(s) => TreeNode::String(s),
            Value::Array(items) => TreeNode::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                TreeNode::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<TreeNode> for Value {
    fn from(node: TreeNode) -> Self {
        match node {
            TreeNode::Null => Value::Null,
            TreeNode::Bool(b) => Value::Bool(b),
            TreeNode::Number(n) => Value::Number(n),
            TreeNode::String(s) => Value::String(s),
            TreeNode::Array(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            TreeNode::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for TreeNode {
    fn from(s: &str) -> Self {
        TreeNode::String(s.to_owned())
    }
}

impl From<String> for TreeNode {
    fn from(s: String) -> Self {
        TreeNode::String(s)
    }
}

impl From<bool> for TreeNode {
    fn from(b: bool) -> Self {
        TreeNode::Bool(b)
    }
}

impl From<i64> for TreeNode {
    fn from(n: i64) -> Self {
        TreeNode::Number(n.into())
    }
}

impl From<TreeMap> for TreeNode {
    fn from(map: TreeMap) -> Self {
        TreeNode::Object(map)
    }
}

impl From<Vec<TreeNode>> for TreeNode {
    fn from(items: Vec<TreeNode>) -> Self {
        TreeNode::Array(items)
    }
}
