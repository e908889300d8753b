use std::collections::BTreeMap;

/// Dynamic value passed between the source reader, the coercion rules and
/// the target writer.
///
/// Strategy by type:
/// - Scalars: widest representation (`i128` covers every integer width).
/// - Absence and unresolved state are values of their own (`Null`, `Unknown`).
/// - Collections, maps and records: recursive.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent: `None`, `Attr::Null`.
    Null,
    /// `Attr::Unknown`: not resolved yet.
    Unknown,

    Bool(bool),
    Int(i128),
    Float(f64),
    String(String),

    /// Ordered elements.
    List(Vec<Value>),
    /// Unordered elements, duplicates already removed.
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Fields in declaration order, keyed by correspondence name.
    Record(Vec<(&'static str, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `""`, `0`, `0.0` and `false`.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unknown => "unknown",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }
}
