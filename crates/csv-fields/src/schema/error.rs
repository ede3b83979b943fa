//! Schema error types.
//!
//! Provides [`SchemaError`] for record declaration and descriptor building,
//! plus a convenience [`SchemaResult`] alias.

use thiserror::Error;

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while declaring or describing a record type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field exposed for mapping does not declare a column position.
    #[error("missing position: field '{field}' of '{record}' declares no column index")]
    MissingPosition {
        /// The record type name.
        record: &'static str,
        /// The field without a position.
        field: &'static str,
    },

    /// A column index below 1 was supplied.
    #[error("invalid index: {0} (column indices start at 1)")]
    InvalidIndex(i64),

    /// Two fields of the same record declare the same column index.
    #[error("duplicate index {index} in '{record}': fields '{first}' and '{second}'")]
    DuplicateIndex {
        /// The record type name.
        record: &'static str,
        /// The shared column index.
        index: usize,
        /// The field declared first.
        first: &'static str,
        /// The field declared second.
        second: &'static str,
    },
}
