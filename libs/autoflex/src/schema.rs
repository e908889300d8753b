use std::fmt;

/// Integer width of a declared scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    pub fn min(self) -> i128 {
        match self {
            IntWidth::I8 => i8::MIN as i128,
            IntWidth::I16 => i16::MIN as i128,
            IntWidth::I32 => i32::MIN as i128,
            IntWidth::I64 => i64::MIN as i128,
            IntWidth::U8 | IntWidth::U16 | IntWidth::U32 | IntWidth::U64 => 0,
        }
    }

    pub fn max(self) -> i128 {
        match self {
            IntWidth::I8 => i8::MAX as i128,
            IntWidth::I16 => i16::MAX as i128,
            IntWidth::I32 => i32::MAX as i128,
            IntWidth::I64 => i64::MAX as i128,
            IntWidth::U8 => u8::MAX as i128,
            IntWidth::U16 => u16::MAX as i128,
            IntWidth::U32 => u32::MAX as i128,
            IntWidth::U64 => u64::MAX as i128,
        }
    }

    /// Every value of `self` is representable in `other`.
    pub fn widens_to(self, other: IntWidth) -> bool {
        other.min() <= self.min() && self.max() <= other.max()
    }

    pub fn contains(self, v: i128) -> bool {
        self.min() <= v && v <= self.max()
    }

    fn as_str(self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::U8 => "u8",
            IntWidth::U16 => "u16",
            IntWidth::U32 => "u32",
            IntWidth::U64 => "u64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    F32,
    F64,
}

/// Declared type of a flexible value.
///
/// Produced statically by [`Flex::describe`](crate::Flex::describe). Coercion
/// rules are selected by the ordered pair `(source, target)` of these.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    Bool,
    Int(IntWidth),
    Float(FloatWidth),
    String,
    /// `Option<T>`, possibly absent.
    Optional(Box<TypeDesc>),
    /// `Attr<T>`: known, null or unknown.
    Attr(Box<TypeDesc>),
    /// Ordered collection.
    List(Box<TypeDesc>),
    /// Unordered collection without duplicates.
    Set(Box<TypeDesc>),
    /// String-keyed map.
    Map(Box<TypeDesc>),
    Record(RecordDesc),
}

impl TypeDesc {
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeDesc::Bool | TypeDesc::Int(_) | TypeDesc::Float(_) | TypeDesc::String
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, TypeDesc::List(_) | TypeDesc::Set(_) | TypeDesc::Map(_))
    }

    /// A target of this type can hold an explicit null.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeDesc::Optional(_) | TypeDesc::Attr(_))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeDesc::Optional(_))
    }

    pub fn is_attr(&self) -> bool {
        matches!(self, TypeDesc::Attr(_))
    }

    /// Strips one `Optional` layer, if any.
    pub fn unwrap_optional(&self) -> &TypeDesc {
        match self {
            TypeDesc::Optional(inner) => &**inner,
            other => other,
        }
    }

    /// Strips one `Attr` layer, if any.
    pub fn unwrap_attr(&self) -> &TypeDesc {
        match self {
            TypeDesc::Attr(inner) => &**inner,
            other => other,
        }
    }

    pub fn as_record(&self) -> Option<&RecordDesc> {
        match self {
            TypeDesc::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Bool => f.write_str("bool"),
            TypeDesc::Int(w) => f.write_str(w.as_str()),
            TypeDesc::Float(FloatWidth::F32) => f.write_str("f32"),
            TypeDesc::Float(FloatWidth::F64) => f.write_str("f64"),
            TypeDesc::String => f.write_str("String"),
            TypeDesc::Optional(inner) => write!(f, "Option<{inner}>"),
            TypeDesc::Attr(inner) => write!(f, "Attr<{inner}>"),
            TypeDesc::List(inner) => write!(f, "Vec<{inner}>"),
            TypeDesc::Set(inner) => write!(f, "Set<{inner}>"),
            TypeDesc::Map(inner) => write!(f, "Map<String, {inner}>"),
            TypeDesc::Record(record) => f.write_str(record.name),
        }
    }
}

/// Descriptor of a record type.
///
/// Fields are produced on demand so that a record may (indirectly) contain
/// itself.
#[derive(Clone, Copy)]
pub struct RecordDesc {
    pub name: &'static str,
    pub fields: fn() -> Vec<FieldDesc>,
}

impl RecordDesc {
    pub fn new(name: &'static str, fields: fn() -> Vec<FieldDesc>) -> Self {
        Self { name, fields }
    }

    pub fn fields(&self) -> Vec<FieldDesc> {
        (self.fields)()
    }
}

impl fmt::Debug for RecordDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDesc").field("name", &self.name).finish()
    }
}

// Record names come from the type name, so the name is the identity.
impl PartialEq for RecordDesc {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Per-field behaviour switches, declared with `#[flex(...)]` on the
/// config-model side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Zero values are treated as absent (expand) and absent scalars become
    /// zero values (flatten).
    pub legacy: bool,
    /// Flatten an empty string to null.
    pub omit_empty: bool,
    /// Allow narrowing numeric conversions.
    pub narrowing: bool,
    /// Never matched. `#[derive(Record)]` leaves skipped fields out of the
    /// descriptor altogether, so this is only seen in hand-written `Record`
    /// impls.
    pub skip: bool,
}

/// A single public field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
    /// Correspondence name: the field identifier or its `rename`.
    pub name: &'static str,
    pub ty: TypeDesc,
    pub options: FieldOptions,
}

impl FieldDesc {
    pub fn new(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            name,
            ty,
            options: FieldOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}
