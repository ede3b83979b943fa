//! Codec error types.
//!
//! [`CodecError`] is what every caller-facing operation returns. It keeps
//! the four failure kinds apart: configuration, schema, conversion and I/O.

use thiserror::Error;

use crate::codec::value::ConversionError;
use crate::schema::{FieldIndex, SchemaError};

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Missing or invalid codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No source or destination path was given.
    #[error("missing config: path is empty")]
    MissingPath,

    /// A configuration value is invalid.
    #[error("invalid config key '{key}': {message}")]
    InvalidConfig {
        /// The configuration key.
        key: String,
        /// What was wrong with the value.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors returned by decode and encode operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec was called with a missing or invalid setting.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The record type's field declarations are incomplete or inconsistent.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A column value could not be coerced into its field's type.
    #[error("line {line}, field '{field}' (column {index}): {source}")]
    Conversion {
        /// 1-based line number in the source, header included.
        line: usize,
        /// The target field.
        field: &'static str,
        /// The column index of the target field.
        index: FieldIndex,
        /// The underlying conversion failure.
        #[source]
        source: ConversionError,
    },

    /// Reading or writing the underlying file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
