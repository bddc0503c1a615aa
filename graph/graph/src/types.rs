use crate::error::{validation_failed, GraphError};
use std::collections::HashMap;

/// A single property value as stored on a node or relationship.
///
/// The transactional endpoint round-trips strings, 64-bit integers, booleans
/// and null. Anything else (floats, nested lists, maps) is outside the
/// supported set; the result mapper decides per decode mode what to do with
/// such values.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    StringValue(String),
    Int64(i64),
    Boolean(bool),
    Null,
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::StringValue(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// A node returned by the database: its identity, the labels the projection
/// supplied (empty when the query only returned the property map) and its
/// properties.
///
/// Records are only ever constructed by the result mapper; callers describe
/// write operations with labels and a [`PropertySpec`], never with a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRecord {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: HashMap<String, PropertyValue>,
}

impl NodeRecord {
    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropertyValue::as_str)
    }

    pub fn int_property(&self, name: &str) -> Option<i64> {
        self.properties.get(name).and_then(PropertyValue::as_i64)
    }

    pub fn bool_property(&self, name: &str) -> Option<bool> {
        self.properties.get(name).and_then(PropertyValue::as_bool)
    }
}

/// A relationship returned by the database. Identity and endpoints are the
/// database-assigned integer ids; `relationship_type` is the single type the
/// relationship carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipRecord {
    pub id: i64,
    pub relationship_type: String,
    pub start_node_id: i64,
    pub end_node_id: i64,
    pub properties: HashMap<String, PropertyValue>,
}

impl RelationshipRecord {
    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropertyValue::as_str)
    }

    pub fn int_property(&self, name: &str) -> Option<i64> {
        self.properties.get(name).and_then(PropertyValue::as_i64)
    }

    pub fn bool_property(&self, name: &str) -> Option<bool> {
        self.properties.get(name).and_then(PropertyValue::as_bool)
    }
}

/// Builder input for write operations: three typed name/value lists that are
/// rendered into one property object literal.
///
/// Insertion order is preserved so the synthesized statement text is
/// deterministic. Property names must be disjoint across the three lists;
/// [`PropertySpec::validate`] rejects collisions before any request is sent,
/// since each list contributes `name:value` pairs to the same object
/// independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySpec {
    strings: Vec<(String, String)>,
    integers: Vec<(String, i64)>,
    booleans: Vec<(String, bool)>,
}

impl PropertySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.push((name.into(), value.into()));
        self
    }

    pub fn integer(mut self, name: impl Into<String>, value: i64) -> Self {
        self.integers.push((name.into(), value));
        self
    }

    pub fn boolean(mut self, name: impl Into<String>, value: bool) -> Self {
        self.booleans.push((name.into(), value));
        self
    }

    pub fn strings(&self) -> &[(String, String)] {
        &self.strings
    }

    pub fn integers(&self) -> &[(String, i64)] {
        &self.integers
    }

    pub fn booleans(&self) -> &[(String, bool)] {
        &self.booleans
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.integers.is_empty() && self.booleans.is_empty()
    }

    /// Rejects property names used more than once, within one list or across
    /// the three.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut seen = std::collections::HashSet::new();
        let names = self
            .strings
            .iter()
            .map(|(n, _)| n)
            .chain(self.integers.iter().map(|(n, _)| n))
            .chain(self.booleans.iter().map(|(n, _)| n));
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(validation_failed(format!(
                    "property name used more than once: {name}"
                )));
            }
        }
        Ok(())
    }
}

/// Direction of a neighbor traversal relative to the anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// What kind of records the statements of a batch project back, carried
/// alongside the batch so the result mapper can produce correctly-typed
/// records instead of an untyped property bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// The batch ends in a node projection (`RETURN m` or `RETURN n`).
    Nodes,
    /// The batch returns the aliased relationship row shape.
    Relationships,
    /// The batch returns nothing the caller consumes.
    Unit,
}
