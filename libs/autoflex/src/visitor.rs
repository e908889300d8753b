use std::fmt;

use crate::error::FlexError;
use crate::registry::Context;
use crate::schema::FieldOptions;
use crate::value::Value;
use crate::walker::FieldPair;

/// Direction of a transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Config model → API model.
    Expand,
    /// API model → config model.
    Flatten,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Expand => f.write_str("expand"),
            Direction::Flatten => f.write_str("flatten"),
        }
    }
}

/// Strategy applied to every matched field pair.
///
/// Returns the value to store into the target field, or `None` to leave the
/// target field untouched.
pub trait Visitor: Send + Sync {
    fn direction(&self) -> Direction;

    /// Options of the config-model side of the pair.
    fn field_options(&self, pair: &FieldPair) -> FieldOptions;

    fn visit(
        &self,
        cx: &Context<'_>,
        pair: &FieldPair,
        value: Value,
    ) -> Result<Option<Value>, FlexError>;
}

/// Config model → API model.
///
/// Field options are read from the source (config) field. An absent result
/// is never written, so the API field keeps its zero value or `None`.
pub struct ExpandVisitor;

impl Visitor for ExpandVisitor {
    fn direction(&self) -> Direction {
        Direction::Expand
    }

    fn field_options(&self, pair: &FieldPair) -> FieldOptions {
        pair.source.options
    }

    fn visit(
        &self,
        cx: &Context<'_>,
        pair: &FieldPair,
        value: Value,
    ) -> Result<Option<Value>, FlexError> {
        let cx = cx.for_field(self.field_options(pair));
        let value = cx.coerce(value, &pair.source.ty, &pair.target.ty)?;
        if value.is_null() {
            tracing::trace!(field = pair.source.name, "absent, target left unset");
            return Ok(None);
        }
        Ok(Some(value))
    }
}

/// API model → config model.
///
/// Field options are read from the target (config) field. Null is written
/// into tri-state and optional targets and skipped for the rest.
pub struct FlattenVisitor;

impl Visitor for FlattenVisitor {
    fn direction(&self) -> Direction {
        Direction::Flatten
    }

    fn field_options(&self, pair: &FieldPair) -> FieldOptions {
        pair.target.options
    }

    fn visit(
        &self,
        cx: &Context<'_>,
        pair: &FieldPair,
        value: Value,
    ) -> Result<Option<Value>, FlexError> {
        let cx = cx.for_field(self.field_options(pair));
        let value = cx.coerce(value, &pair.source.ty, &pair.target.ty)?;
        if value.is_null() && !pair.target.ty.is_nullable() {
            tracing::trace!(field = pair.target.name, "absent, non-nullable target left unset");
            return Ok(None);
        }
        Ok(Some(value))
    }
}
