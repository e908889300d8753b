use std::collections::{BTreeMap, HashMap};

use crate::attr::{Attr, Set};
use crate::error::FlexError;
use crate::schema::{FieldDesc, FloatWidth, IntWidth, TypeDesc};
use crate::value::Value;

/// A type the transcoder can read from and write into.
///
/// Implemented here for scalars, `Option`, `Box`, `Vec`, [`Set`], string-keyed
/// maps and [`Attr`]; records get it from `#[derive(Record)]`.
pub trait Flex: Sized {
    /// Declared type, used to select coercion rules.
    fn describe() -> TypeDesc;

    /// Reads the current value.
    fn to_value(&self) -> Value;

    /// Builds a value from an already coerced [`Value`].
    fn from_value(value: Value) -> Result<Self, FlexError>;

    /// Overwrites `self` with an already coerced [`Value`].
    ///
    /// Records override this to write field by field into the existing value.
    fn store(&mut self, value: Value) -> Result<(), FlexError> {
        *self = Self::from_value(value)?;
        Ok(())
    }

    /// Overwrites a single named field. Only records have fields.
    fn store_field(&mut self, name: &str, _value: Value) -> Result<(), FlexError> {
        Err(FlexError::shape(format!(
            "{} has no field '{name}'",
            Self::describe()
        )))
    }
}

/// A struct whose public fields take part in transcoding.
///
/// Derive it with `#[derive(Record)]`; the struct must implement `Default`.
pub trait Record: Flex {
    /// Public fields in declaration order.
    fn fields() -> Vec<FieldDesc>;
}

macro_rules! flex_int {
    ($($ty:ty => $width:ident),* $(,)?) => {$(
        impl Flex for $ty {
            fn describe() -> TypeDesc {
                TypeDesc::Int(IntWidth::$width)
            }

            fn to_value(&self) -> Value {
                Value::Int(*self as i128)
            }

            fn from_value(value: Value) -> Result<Self, FlexError> {
                match value {
                    Value::Int(v) => {
                        <$ty>::try_from(v).map_err(|_| FlexError::overflow(v, &Self::describe()))
                    }
                    other => Err(FlexError::store(&Self::describe(), &other)),
                }
            }
        }
    )*};
}

flex_int! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl Flex for f64 {
    fn describe() -> TypeDesc {
        TypeDesc::Float(FloatWidth::F64)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(FlexError::store(&Self::describe(), &other)),
        }
    }
}

impl Flex for f32 {
    fn describe() -> TypeDesc {
        TypeDesc::Float(FloatWidth::F32)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        match value {
            // Range was checked by the float rule.
            Value::Float(v) => Ok(v as f32),
            other => Err(FlexError::store(&Self::describe(), &other)),
        }
    }
}

impl Flex for bool {
    fn describe() -> TypeDesc {
        TypeDesc::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(FlexError::store(&Self::describe(), &other)),
        }
    }
}

impl Flex for String {
    fn describe() -> TypeDesc {
        TypeDesc::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(FlexError::store(&Self::describe(), &other)),
        }
    }
}

impl<T: Flex> Flex for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::Optional(Box::new(T::describe()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

/// Transparent: a boxed record is still a record.
impl<T: Flex> Flex for Box<T> {
    fn describe() -> TypeDesc {
        T::describe()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        T::from_value(value).map(Box::new)
    }

    fn store(&mut self, value: Value) -> Result<(), FlexError> {
        (**self).store(value)
    }

    fn store_field(&mut self, name: &str, value: Value) -> Result<(), FlexError> {
        (**self).store_field(name, value)
    }
}

fn elements(expected: &TypeDesc, value: Value) -> Result<Vec<Value>, FlexError> {
    match value {
        Value::List(items) | Value::Set(items) => Ok(items),
        other => Err(FlexError::store(expected, &other)),
    }
}

impl<T: Flex> Flex for Vec<T> {
    fn describe() -> TypeDesc {
        TypeDesc::List(Box::new(T::describe()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Flex::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        elements(&Self::describe(), value)?
            .into_iter()
            .enumerate()
            .map(|(i, v)| T::from_value(v).map_err(|e| e.at_index(i)))
            .collect()
    }
}

impl<T: Flex + PartialEq> Flex for Set<T> {
    fn describe() -> TypeDesc {
        TypeDesc::Set(Box::new(T::describe()))
    }

    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(Flex::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        elements(&Self::describe(), value)?
            .into_iter()
            .enumerate()
            .map(|(i, v)| T::from_value(v).map_err(|e| e.at_index(i)))
            .collect()
    }
}

fn entries(expected: &TypeDesc, value: Value) -> Result<BTreeMap<String, Value>, FlexError> {
    match value {
        Value::Map(entries) => Ok(entries),
        other => Err(FlexError::store(expected, &other)),
    }
}

impl<T: Flex> Flex for BTreeMap<String, T> {
    fn describe() -> TypeDesc {
        TypeDesc::Map(Box::new(T::describe()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        entries(&Self::describe(), value)?
            .into_iter()
            .map(|(k, v)| match T::from_value(v) {
                Ok(v) => Ok((k, v)),
                Err(e) => Err(e.at_key(k)),
            })
            .collect()
    }
}

impl<T: Flex> Flex for HashMap<String, T> {
    fn describe() -> TypeDesc {
        TypeDesc::Map(Box::new(T::describe()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        entries(&Self::describe(), value)?
            .into_iter()
            .map(|(k, v)| match T::from_value(v) {
                Ok(v) => Ok((k, v)),
                Err(e) => Err(e.at_key(k)),
            })
            .collect()
    }
}

impl<T: Flex> Flex for Attr<T> {
    fn describe() -> TypeDesc {
        TypeDesc::Attr(Box::new(T::describe()))
    }

    fn to_value(&self) -> Value {
        match self {
            Attr::Known(v) => v.to_value(),
            Attr::Null => Value::Null,
            Attr::Unknown => Value::Unknown,
        }
    }

    fn from_value(value: Value) -> Result<Self, FlexError> {
        match value {
            Value::Null => Ok(Attr::Null),
            Value::Unknown => Ok(Attr::Unknown),
            v => T::from_value(v).map(Attr::Known),
        }
    }
}
