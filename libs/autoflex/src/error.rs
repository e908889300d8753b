use std::fmt;

use crate::schema::TypeDesc;

/// Broad classification of a [`FlexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Top-level values are not record-shaped.
    Shape,
    /// No rule for a type pair, or an orphan field in strict mode.
    Coercion,
    /// A rule applied but the value itself did not fit.
    Value,
    Config,
}

/// One step of an error location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Key(String),
}

/// Location of an element error, rendered as `spec.rules[2].name` or
/// `labels["env"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn prepend(mut self, segment: PathSegment) -> Self {
        self.0.insert(0, segment);
        self
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlexError {
    #[error("shape error: {0}")]
    Shape(String),

    #[error("cannot coerce {from} into {to}")]
    Coercion { from: String, to: String },

    #[error("value {value} does not fit into {to}")]
    Overflow { value: String, to: String },

    #[error("unknown value cannot be expanded into {to}")]
    UnknownValue { to: String },

    #[error("cannot store {found} value into {expected}")]
    Store { expected: String, found: &'static str },

    #[error("source field '{0}' has no counterpart on target")]
    OrphanField(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{path}: {source}")]
    Field {
        path: FieldPath,
        #[source]
        source: Box<FlexError>,
    },
}

impl FlexError {
    pub fn shape(msg: impl Into<String>) -> Self {
        FlexError::Shape(msg.into())
    }

    pub fn coercion(from: &TypeDesc, to: &TypeDesc) -> Self {
        FlexError::Coercion {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn overflow(value: impl fmt::Display, to: &TypeDesc) -> Self {
        FlexError::Overflow {
            value: value.to_string(),
            to: to.to_string(),
        }
    }

    pub fn unknown_value(to: &TypeDesc) -> Self {
        FlexError::UnknownValue { to: to.to_string() }
    }

    pub fn store(expected: &TypeDesc, found: &crate::Value) -> Self {
        FlexError::Store {
            expected: expected.to_string(),
            found: found.kind(),
        }
    }

    /// Prefixes the error location with a record field.
    pub fn in_field(self, name: impl Into<String>) -> Self {
        self.nested(PathSegment::Field(name.into()))
    }

    /// Prefixes the error location with a collection index.
    pub fn at_index(self, idx: usize) -> Self {
        self.nested(PathSegment::Index(idx))
    }

    /// Prefixes the error location with a map key.
    pub fn at_key(self, key: impl Into<String>) -> Self {
        self.nested(PathSegment::Key(key.into()))
    }

    fn nested(self, segment: PathSegment) -> Self {
        match self {
            FlexError::Field { path, source } => FlexError::Field {
                path: path.prepend(segment),
                source,
            },
            other => FlexError::Field {
                path: FieldPath(vec![segment]),
                source: Box::new(other),
            },
        }
    }

    /// Location of the failure; empty for top-level errors.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            FlexError::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The underlying failure, without location.
    pub fn root(&self) -> &FlexError {
        match self {
            FlexError::Field { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FlexError::Shape(_) => ErrorKind::Shape,
            FlexError::Coercion { .. } | FlexError::OrphanField(_) => ErrorKind::Coercion,
            FlexError::Overflow { .. }
            | FlexError::UnknownValue { .. }
            | FlexError::Store { .. } => ErrorKind::Value,
            FlexError::Config(_) => ErrorKind::Config,
            FlexError::Field { source, .. } => source.kind(),
        }
    }
}

impl From<toml::de::Error> for FlexError {
    fn from(e: toml::de::Error) -> Self {
        FlexError::Config(e.to_string())
    }
}
