//! Classification and canonical encoding of snapshot values
//!
//! A snapshot is a plain `serde_json::Value`. Every value falls into exactly
//! one [`ValueKind`], decided once by [`ValueKind::classify`]:
//! - primitives and `null` are leaves
//! - arrays are positional structural nodes
//! - objects tagged with a truthy discriminator field are opaque leaves
//! - all other objects are keyed structural nodes

use crate::Result;
use serde_json::{Map, Value};

/// Default discriminator property marking an object as opaque
pub const DEFAULT_DISCRIMINATOR: &str = "type";

/// How a value participates in the hash tree
#[derive(Clone, Copy, Debug)]
pub enum ValueKind<'v> {
    /// Primitive or null
    Leaf(&'v Value),
    /// Object carrying the discriminator, compared as a whole
    Opaque(&'v Map<String, Value>),
    /// Array, children keyed by stringified index
    Array(&'v [Value]),
    /// Plain object, children keyed by property name
    Object(&'v Map<String, Value>),
}

impl<'v> ValueKind<'v> {
    pub fn classify(value: &'v Value, discriminator: &str) -> Self {
        match value {
            Value::Array(items) => ValueKind::Array(items),
            Value::Object(map) => {
                if map.get(discriminator).is_some_and(is_truthy) {
                    ValueKind::Opaque(map)
                } else {
                    ValueKind::Object(map)
                }
            }
            other => ValueKind::Leaf(other),
        }
    }

    /// Arrays and plain objects
    pub fn is_structural(&self) -> bool {
        matches!(self, ValueKind::Array(_) | ValueKind::Object(_))
    }

    /// Value stored under `key`, if this is a structural value that has it
    pub fn get(&self, key: &str) -> Option<&'v Value> {
        match *self {
            ValueKind::Object(map) => map.get(key),
            ValueKind::Array(items) => parse_index(key).and_then(|i| items.get(i)),
            ValueKind::Leaf(_) | ValueKind::Opaque(_) => None,
        }
    }

    /// Whether `key` names a property or in-range index
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Child entries in enumeration order (sorted keys, or ascending index)
    pub fn entries(&self) -> Vec<(String, &'v Value)> {
        match *self {
            ValueKind::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            ValueKind::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            ValueKind::Leaf(_) | ValueKind::Opaque(_) => Vec::new(),
        }
    }
}

/// Parse a canonical array index ("0", "17"; not "01" or "+1")
pub fn parse_index(key: &str) -> Option<usize> {
    let index: usize = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Truthiness of a discriminator value
///
/// `null`, `false`, numeric zero and the empty string are falsy; everything
/// else, including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Canonical compact encoding used as hash input
///
/// `serde_json::Map` is ordered by key, so objects encode identically
/// regardless of how they were constructed.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}
