//! Field declarations and declared field types.
//!
//! A [`FieldDecl`] is one row of a record's accessor table: the field name,
//! its column position (if any), its declared [`FieldType`], and a typed
//! getter pair. The getters are erased behind `FieldAccess` so that one
//! table can hold fields of different value types.

use std::fmt;

use crate::codec::config::CodecConfig;
use crate::codec::value::{ConversionError, CsvValue};

use super::index::FieldIndex;

/// The underlying kind of a field value, with any `Option` stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Free text, passed through unchanged.
    Text,
    /// A single character.
    Char,
    /// A boolean flag.
    Bool,
    /// A signed integer.
    Int,
    /// An unsigned integer.
    UInt,
    /// A floating-point number.
    Float,
    /// A calendar date.
    Date,
    /// A time of day.
    Time,
    /// A date and time, with or without an offset.
    DateTime,
    /// An enumeration, parsed by member name. Holds the enum's name.
    Enum(&'static str),
    /// A caller-defined type with its own [`CsvValue`] impl.
    Custom(&'static str),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Char => f.write_str("char"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("integer"),
            Self::UInt => f.write_str("unsigned integer"),
            Self::Float => f.write_str("float"),
            Self::Date => f.write_str("date"),
            Self::Time => f.write_str("time"),
            Self::DateTime => f.write_str("datetime"),
            Self::Enum(name) => write!(f, "enum {name}"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// The declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    /// The underlying value kind.
    pub kind: ValueKind,
    /// Whether the field is `Option<_>`: an empty token decodes to `None`.
    pub nullable: bool,
}

impl FieldType {
    /// Returns the declared type of `V`.
    #[must_use]
    pub fn of<V: CsvValue>() -> Self {
        Self {
            kind: V::KIND,
            nullable: V::NULLABLE,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{} (nullable)", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Type-erased get/set access to one field of `R`.
pub(crate) trait FieldAccess<R>: Send + Sync {
    /// Coerces `raw` into the field's type and stores it in `record`.
    fn assign(&self, record: &mut R, raw: &str, config: &CodecConfig)
        -> Result<(), ConversionError>;

    /// Renders the field's current value of `record` as text.
    fn render(&self, record: &R, config: &CodecConfig) -> String;
}

struct Accessor<R, V> {
    get: fn(&R) -> &V,
    get_mut: fn(&mut R) -> &mut V,
}

impl<R, V: CsvValue> FieldAccess<R> for Accessor<R, V> {
    fn assign(
        &self,
        record: &mut R,
        raw: &str,
        config: &CodecConfig,
    ) -> Result<(), ConversionError> {
        *(self.get_mut)(record) = V::from_field(raw, config)?;
        Ok(())
    }

    fn render(&self, record: &R, config: &CodecConfig) -> String {
        (self.get)(record).to_field(config)
    }
}

/// One declared field of record type `R`.
pub struct FieldDecl<R> {
    pub(crate) name: &'static str,
    pub(crate) index: Option<FieldIndex>,
    pub(crate) field_type: FieldType,
    pub(crate) access: Box<dyn FieldAccess<R>>,
}

impl<R: 'static> FieldDecl<R> {
    /// Declares a field with an optional column position.
    ///
    /// A field declared with `None` is still part of the record's mapped
    /// surface; describing the record will fail with
    /// [`SchemaError::MissingPosition`](super::SchemaError::MissingPosition).
    #[must_use]
    pub fn new<V: CsvValue + 'static>(
        name: &'static str,
        index: Option<FieldIndex>,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> Self {
        Self {
            name,
            index,
            field_type: FieldType::of::<V>(),
            access: Box::new(Accessor { get, get_mut }),
        }
    }

    /// Declares a field mapped to column `index`.
    #[must_use]
    pub fn at<V: CsvValue + 'static>(
        name: &'static str,
        index: FieldIndex,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> Self {
        Self::new(name, Some(index), get, get_mut)
    }
}

impl<R> FieldDecl<R> {
    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared column position, if any.
    #[must_use]
    pub fn index(&self) -> Option<FieldIndex> {
        self.index
    }

    /// Returns the declared field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

impl<R> fmt::Debug for FieldDecl<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}
