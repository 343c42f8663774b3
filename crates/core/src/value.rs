//! Tagged runtime value passed across the export boundary.
//!
//! Producers expose wildly different types (counters, status strings, nested
//! maps), so the registry moves a single boxed value around instead of
//! threading generics through every decorator. Strong typing stays on the
//! producer side; the registry only needs value identity and, for expansion,
//! a mapping view.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Ordered mapping used for expandable values.
///
/// `BTreeMap` keeps keys sorted, which makes expansion order (and therefore
/// dump output) deterministic.
pub type ValueMap = BTreeMap<String, Value>;

/// A single exported value.
///
/// The `Display` form is the string rendering used by dump output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent / unset value.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A nested mapping; the only variant that can be expanded into
    /// sub-variables.
    Map(ValueMap),
}

impl Value {
    /// True if this value is a mapping.
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Borrow the mapping view, if this value is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Value::Map(m)
    }
}
