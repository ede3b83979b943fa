//! Record types and their derived column descriptors.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::codec::config::CodecConfig;
use crate::codec::value::ConversionError;

use super::error::{SchemaError, SchemaResult};
use super::field::{FieldAccess, FieldDecl, FieldType};
use super::index::FieldIndex;

/// A record type whose fields map to delimited columns by position.
///
/// Implement it with [`csv_record!`](crate::csv_record), or by hand by
/// listing one [`FieldDecl`] per exposed field:
///
/// ```
/// use csv_fields::schema::{FieldDecl, FieldIndex, Record};
///
/// #[derive(Default)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// impl Record for Point {
///     fn fields() -> Vec<FieldDecl<Self>> {
///         vec![
///             FieldDecl::<Self>::at("x", FieldIndex::must(1), |p| &p.x, |p| &mut p.x),
///             FieldDecl::<Self>::at("y", FieldIndex::must(2), |p| &p.y, |p| &mut p.y),
///         ]
///     }
/// }
/// ```
pub trait Record: Default + 'static {
    /// The name used in error messages. Defaults to the Rust type name.
    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Every field exposed for mapping, in declaration order.
    fn fields() -> Vec<FieldDecl<Self>>;
}

/// A validated, positioned field of record type `R`.
pub struct FieldDescriptor<R> {
    name: &'static str,
    index: FieldIndex,
    field_type: FieldType,
    access: Box<dyn FieldAccess<R>>,
}

impl<R> FieldDescriptor<R> {
    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the column index.
    #[must_use]
    pub fn index(&self) -> FieldIndex {
        self.index
    }

    /// Returns the declared field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub(crate) fn assign(
        &self,
        record: &mut R,
        raw: &str,
        config: &CodecConfig,
    ) -> Result<(), ConversionError> {
        self.access.assign(record, raw, config)
    }

    pub(crate) fn render(&self, record: &R, config: &CodecConfig) -> String {
        self.access.render(record, config)
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

/// The column layout of a record type.
///
/// Built once per type from its [`Record::fields`] table. Fields are kept
/// sorted by index; lookups by column search that order, so storage grows
/// with the number of fields and not with the highest index.
pub struct RecordDescriptor<R> {
    record: &'static str,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> RecordDescriptor<R> {
    /// Validates a field table and builds its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingPosition`] for the first field without
    /// an index, or [`SchemaError::DuplicateIndex`] if two fields share one.
    pub fn build(record: &'static str, decls: Vec<FieldDecl<R>>) -> SchemaResult<Self> {
        let mut seen: HashMap<FieldIndex, &'static str> = HashMap::with_capacity(decls.len());
        let mut fields = Vec::with_capacity(decls.len());

        for decl in decls {
            let Some(index) = decl.index else {
                return Err(SchemaError::MissingPosition {
                    record,
                    field: decl.name,
                });
            };
            if let Some(first) = seen.insert(index, decl.name) {
                return Err(SchemaError::DuplicateIndex {
                    record,
                    index: index.get(),
                    first,
                    second: decl.name,
                });
            }
            fields.push(FieldDescriptor {
                name: decl.name,
                index,
                field_type: decl.field_type,
                access: decl.access,
            });
        }

        fields.sort_by_key(|f| f.index);

        debug!(
            record,
            fields = fields.len(),
            max_index = fields.last().map_or(0, |f| f.index.get()),
            "built record descriptor"
        );

        Ok(Self { record, fields })
    }

    /// Returns the record type name.
    #[must_use]
    pub fn record_name(&self) -> &'static str {
        self.record
    }

    /// Returns the fields in ascending index order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// Returns the field declared at 1-based column `index`, if any.
    #[must_use]
    pub fn field_at(&self, index: usize) -> Option<&FieldDescriptor<R>> {
        let offset = index.checked_sub(1)?;
        self.field_at_offset(offset)
    }

    /// Returns the field for 0-based column `offset`, if any.
    pub(crate) fn field_at_offset(&self, offset: usize) -> Option<&FieldDescriptor<R>> {
        self.fields
            .binary_search_by_key(&offset, |f| f.index.offset())
            .ok()
            .map(|pos| &self.fields[pos])
    }

    /// Returns the number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record maps no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the highest declared index, or 0 for an empty record.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.fields.last().map_or(0, |f| f.index.get())
    }

    /// Returns `true` if some index between 1 and [`max_index`](Self::max_index)
    /// is not declared by any field.
    #[must_use]
    pub fn has_gaps(&self) -> bool {
        self.fields.len() < self.max_index()
    }
}

impl<R> fmt::Debug for RecordDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("record", &self.record)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
