//! Built-in coercion rules.
//!
//! Order matters: tri-state and optional wrappers are peeled first so that
//! the structural and scalar rules only ever see bare types.

use std::collections::BTreeMap;

use crate::error::FlexError;
use crate::registry::{CoercionRule, Context};
use crate::schema::{FieldOptions, FloatWidth, TypeDesc};
use crate::value::Value;
use crate::visitor::Direction;
use crate::walker;

pub(crate) fn builtin() -> Vec<Box<dyn CoercionRule>> {
    vec![
        Box::new(TriState),
        Box::new(Optional),
        Box::new(Nested),
        Box::new(Sequence),
        Box::new(Mapping),
        Box::new(Integer),
        Box::new(Float),
        Box::new(Identity),
    ]
}

/// `Attr<T>` on either side.
///
/// - Known → inner conversion.
/// - Null → Null; when flattening into a tri-state collection, an empty
///   collection instead.
/// - Unknown → kept between two tri-states when expanding, Null when
///   flattening, absent for an optional target, error otherwise.
pub struct TriState;

impl TriState {
    /// What an absent source becomes in a tri-state target.
    fn absent(cx: &Context<'_>, to_inner: &TypeDesc) -> Value {
        if cx.direction() == Direction::Expand {
            return Value::Null;
        }
        match empty_collection(to_inner) {
            Some(empty) => empty,
            None if cx.field().legacy => zero(to_inner).unwrap_or(Value::Null),
            None => Value::Null,
        }
    }
}

/// Flattening never leaves a collection target null.
fn empty_collection(ty: &TypeDesc) -> Option<Value> {
    match ty.unwrap_optional() {
        TypeDesc::List(_) => Some(Value::List(Vec::new())),
        TypeDesc::Set(_) => Some(Value::Set(Vec::new())),
        TypeDesc::Map(_) => Some(Value::Map(BTreeMap::new())),
        _ => None,
    }
}

/// Element options: only `narrowing` reaches inside a collection.
fn element_context<'a>(cx: &Context<'a>) -> Context<'a> {
    cx.for_field(FieldOptions {
        narrowing: cx.field().narrowing,
        ..FieldOptions::default()
    })
}

fn zero(ty: &TypeDesc) -> Option<Value> {
    match ty {
        TypeDesc::Bool => Some(Value::Bool(false)),
        TypeDesc::Int(_) => Some(Value::Int(0)),
        TypeDesc::Float(_) => Some(Value::Float(0.0)),
        TypeDesc::String => Some(Value::String(String::new())),
        _ => None,
    }
}

impl CoercionRule for TriState {
    fn name(&self) -> &'static str {
        "tri-state"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        from.is_attr() || to.is_attr()
    }

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        let (from_inner, to_inner) = (from.unwrap_attr(), to.unwrap_attr());
        let flatten = cx.direction() == Direction::Flatten;

        match value {
            Value::Unknown if to.is_attr() && !flatten => Ok(Value::Unknown),
            Value::Unknown | Value::Null if to.is_attr() => Ok(Self::absent(cx, to_inner)),
            Value::Unknown if to.is_optional() => Ok(Value::Null),
            Value::Unknown => Err(FlexError::unknown_value(to)),
            Value::Null => Ok(Value::Null),
            value if !flatten && cx.field().legacy && value.is_zero() => Ok(Value::Null),
            value => {
                let out = cx.coerce(value, from_inner, to_inner)?;
                match out {
                    Value::String(s) if flatten && s.is_empty() && cx.field().omit_empty => {
                        Ok(Value::Null)
                    }
                    out => Ok(out),
                }
            }
        }
    }
}

/// `Option<T>` on either side: absent stays absent, present is converted.
/// When flattening, an absent collection becomes an empty one.
pub struct Optional;

impl CoercionRule for Optional {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        from.is_optional() || to.is_optional()
    }

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        if value.is_null() {
            if cx.direction() == Direction::Flatten {
                if let Some(empty) = empty_collection(to) {
                    return Ok(empty);
                }
            }
            return Ok(Value::Null);
        }
        cx.coerce(value, from.unwrap_optional(), to.unwrap_optional())
    }
}

/// Record to record: the fields are walked again with the same visitor.
pub struct Nested;

impl CoercionRule for Nested {
    fn name(&self) -> &'static str {
        "nested"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        matches!((from, to), (TypeDesc::Record(_), TypeDesc::Record(_)))
    }

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        let (Some(source), Some(target)) = (from.as_record(), to.as_record()) else {
            return Err(FlexError::coercion(from, to));
        };
        let fields = match value {
            Value::Null => return Ok(Value::Null),
            Value::Record(fields) => fields,
            other => return Err(FlexError::store(from, &other)),
        };

        let visitor = cx.visitor();
        let mut out = Vec::new();
        walker::walk(fields, source, target, cx.direction(), cx.options(), |pair, value| {
            if let Some(value) = visitor.visit(cx, pair, value)? {
                out.push((pair.target.name, value));
            }
            Ok(())
        })?;
        Ok(Value::Record(out))
    }
}

/// `Vec`/`Set` to `Vec`/`Set`, element by element.
///
/// Order is preserved; into a set, equal coerced elements collapse. An absent
/// source is an empty collection.
pub struct Sequence;

fn element(ty: &TypeDesc) -> Option<&TypeDesc> {
    match ty {
        TypeDesc::List(elem) | TypeDesc::Set(elem) => Some(&**elem),
        _ => None,
    }
}

impl CoercionRule for Sequence {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        element(from).is_some() && element(to).is_some()
    }

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        let (Some(from_elem), Some(to_elem)) = (element(from), element(to)) else {
            return Err(FlexError::coercion(from, to));
        };
        let items = match value {
            Value::Null => Vec::new(),
            Value::List(items) | Value::Set(items) => items,
            other => return Err(FlexError::store(from, &other)),
        };

        let unique = matches!(to, TypeDesc::Set(_));
        let cx = element_context(cx);
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let v = cx
                .coerce(item, from_elem, to_elem)
                .map_err(|e| e.at_index(i))?;
            if unique && out.contains(&v) {
                continue;
            }
            out.push(v);
        }

        Ok(if unique { Value::Set(out) } else { Value::List(out) })
    }
}

/// String-keyed map to string-keyed map, entry by entry.
pub struct Mapping;

impl CoercionRule for Mapping {
    fn name(&self) -> &'static str {
        "map"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        matches!((from, to), (TypeDesc::Map(_), TypeDesc::Map(_)))
    }

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        let (TypeDesc::Map(from_elem), TypeDesc::Map(to_elem)) = (from, to) else {
            return Err(FlexError::coercion(from, to));
        };
        let entries = match value {
            Value::Null => BTreeMap::new(),
            Value::Map(entries) => entries,
            other => return Err(FlexError::store(from, &other)),
        };

        let cx = element_context(cx);
        let mut out = BTreeMap::new();
        for (key, v) in entries {
            match cx.coerce(v, from_elem, to_elem) {
                Ok(v) => {
                    out.insert(key, v);
                }
                Err(e) => return Err(e.at_key(key)),
            }
        }
        Ok(Value::Map(out))
    }
}

/// Integer to integer. Widening always; narrowing only for fields marked
/// `narrowing`, and only for values that fit.
pub struct Integer;

impl CoercionRule for Integer {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        matches!((from, to), (TypeDesc::Int(_), TypeDesc::Int(_)))
    }

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        let (TypeDesc::Int(from_width), TypeDesc::Int(to_width)) = (from, to) else {
            return Err(FlexError::coercion(from, to));
        };
        let v = match value {
            Value::Int(v) => v,
            other => return Err(FlexError::store(from, &other)),
        };

        if from_width.widens_to(*to_width) {
            return Ok(Value::Int(v));
        }
        if !cx.field().narrowing {
            return Err(FlexError::coercion(from, to));
        }
        if !to_width.contains(v) {
            return Err(FlexError::overflow(v, to));
        }
        Ok(Value::Int(v))
    }
}

/// `f32` to `f64` always; `f64` to `f32` only for fields marked `narrowing`.
pub struct Float;

impl CoercionRule for Float {
    fn name(&self) -> &'static str {
        "float"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        matches!((from, to), (TypeDesc::Float(_), TypeDesc::Float(_)))
    }

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        let v = match value {
            Value::Float(v) => v,
            other => return Err(FlexError::store(from, &other)),
        };

        match (from, to) {
            (TypeDesc::Float(FloatWidth::F64), TypeDesc::Float(FloatWidth::F32)) => {
                if !cx.field().narrowing {
                    return Err(FlexError::coercion(from, to));
                }
                if !v.is_finite() || v.abs() > f64::from(f32::MAX) {
                    return Err(FlexError::overflow(v, to));
                }
                Ok(Value::Float(v))
            }
            _ => Ok(Value::Float(v)),
        }
    }
}

/// Same scalar on both sides.
pub struct Identity;

impl CoercionRule for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool {
        from.is_scalar() && from == to
    }

    fn coerce(
        &self,
        _cx: &Context<'_>,
        value: Value,
        _from: &TypeDesc,
        _to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        Ok(value)
    }
}
