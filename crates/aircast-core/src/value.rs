//! Dynamically typed property values.
//!
//! Graph element properties carry one of four runtime types. The control
//! plane never knows the static type of a property it writes — the engine
//! accepts or rejects a value at the call site — so values travel as
//! [`PropertyValue`] everywhere.

use std::fmt;

/// A value read from or written to a graph element property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Double-precision float. The only type the interpolation facility
    /// accepts.
    Float(f64),
    /// Signed integer.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Free-form string.
    Str(String),
}

impl PropertyValue {
    /// Returns the value as a float, widening integers.
    ///
    /// `Bool` and `Str` return `None` — they are never interpolable.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::Bool(_) | PropertyValue::Str(_) => None,
        }
    }

    /// True for `Float` and `Int` values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, PropertyValue::Float(_) | PropertyValue::Int(_))
    }

    /// Short type name for diagnostics ("float", "int", "bool", "string").
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Float(_) => "float",
            PropertyValue::Int(_) => "int",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Bool(v) => write!(f, "{v}"),
            PropertyValue::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}
