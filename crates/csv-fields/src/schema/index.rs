//! Column position metadata.

use std::fmt;
use std::num::NonZeroUsize;

use super::error::{SchemaError, SchemaResult};

/// A 1-based column index declared on a record field.
///
/// A `FieldIndex` is always at least 1. Runtime construction goes through
/// [`FieldIndex::new`], which rejects anything smaller. Declarations written
/// with [`csv_record!`](crate::csv_record) go through [`FieldIndex::must`]
/// in a `const` context, so a literal index of 0 fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldIndex(NonZeroUsize);

impl FieldIndex {
    /// Creates a column index.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidIndex`] if `index` is less than 1 or
    /// does not fit in a `usize`.
    pub fn new(index: i64) -> SchemaResult<Self> {
        usize::try_from(index)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(SchemaError::InvalidIndex(index))
    }

    /// Creates a column index in a `const` context.
    ///
    /// # Panics
    ///
    /// Panics if `index` is less than 1. Inside a `const` block the panic is
    /// reported as a compile error.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn must(index: i64) -> Self {
        assert!(index >= 1, "column indices start at 1");
        match NonZeroUsize::new(index as usize) {
            Some(n) => Self(n),
            None => panic!("column index out of range"),
        }
    }

    /// Returns the 1-based index.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Returns the 0-based column offset of this index within a row.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for FieldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for FieldIndex {
    type Error = SchemaError;

    fn try_from(index: i64) -> SchemaResult<Self> {
        Self::new(index)
    }
}
