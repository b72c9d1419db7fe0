//! Dynamic slot values
//!
//! A row slot holds either nothing (`Option::None`, "absent"), the explicit
//! [`Value::Null`] sentinel, or a typed value of the column's element type.
//! Null and absent are distinct: null serializes as literal `null`, absent is
//! omitted entirely.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::sortable::Key;
use crate::types::ident::Identifier;

/// Semantic element type of a stored column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// UTF-8 string
    Str,
    /// 16-byte identifier
    Id,
    /// UTC timestamp
    Time,
    /// Raw bytes
    Bytes,
}

impl ElementType {
    /// Returns the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Int => "int",
            ElementType::Float => "float",
            ElementType::Str => "string",
            ElementType::Id => "id",
            ElementType::Time => "time",
            ElementType::Bytes => "bytes",
        }
    }

    /// The zero value of this element type.
    pub fn zero(&self) -> Value {
        match self {
            ElementType::Bool => Value::Bool(false),
            ElementType::Int => Value::Int(0),
            ElementType::Float => Value::Float(0.0),
            ElementType::Str => Value::Str(String::new()),
            ElementType::Id => Value::Id(Identifier::nil()),
            ElementType::Time => Value::Time(DateTime::UNIX_EPOCH),
            ElementType::Bytes => Value::Bytes(Vec::new()),
        }
    }

    /// True when values of this type can serve as index keys or row ids.
    pub fn is_sortable(&self) -> bool {
        matches!(self, ElementType::Id | ElementType::Str)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A dynamic value held in a row slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null, distinct from an absent slot
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// String value
    Str(String),
    /// Identifier value
    Id(Identifier),
    /// Timestamp value
    Time(DateTime<Utc>),
    /// Byte-string value
    Bytes(Vec<u8>),
}

impl Value {
    /// The element type this value inhabits, or `None` for the null sentinel.
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ElementType::Bool),
            Value::Int(_) => Some(ElementType::Int),
            Value::Float(_) => Some(ElementType::Float),
            Value::Str(_) => Some(ElementType::Str),
            Value::Id(_) => Some(ElementType::Id),
            Value::Time(_) => Some(ElementType::Time),
            Value::Bytes(_) => Some(ElementType::Bytes),
        }
    }

    /// Views this value as a sortable key, if it is one.
    pub fn as_key(&self) -> Option<Key> {
        match self {
            Value::Id(id) => Some(Key::Id(*id)),
            Value::Str(s) => Some(Key::Str(s.clone())),
            _ => None,
        }
    }

    /// True for the zero value of the inhabited type, and for null.
    ///
    /// Drives `omitempty` serialization.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Id(id) => id.is_zero(),
            Value::Time(t) => *t == DateTime::UNIX_EPOCH,
            Value::Bytes(b) => b.is_empty(),
        }
    }

    /// Renders this value as a JSON value.
    ///
    /// Identifiers render in hyphenated text form, timestamps as RFC 3339.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Id(id) => serde_json::Value::String(id.to_string()),
            Value::Time(t) => serde_json::Value::String(t.to_rfc3339()),
            Value::Bytes(b) => serde_json::Value::from(b.clone()),
        }
    }

    /// Maps a JSON value onto the loose dynamic shape, before any coercion
    /// to a column's element type.
    ///
    /// Arrays of anything but numbers, and nested objects, have no dynamic
    /// shape and return `None`.
    pub fn from_json(v: &serde_json::Value) -> Option<Value> {
        match v {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            serde_json::Value::Array(items) => {
                let mut bytes = Vec::with_capacity(items.len());
                for item in items {
                    let b = item.as_u64().filter(|b| *b <= u8::MAX as u64)?;
                    bytes.push(b as u8);
                }
                Some(Value::Bytes(bytes))
            }
            serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Id(id) => write!(f, "{id}"),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Bytes(b) => write!(f, "{b:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Identifier> for Value {
    fn from(v: Identifier) -> Self {
        Value::Id(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}
