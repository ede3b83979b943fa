//! # csv-fields
//!
//! Index-driven mapping between delimited text rows and typed records.
//!
//! Each record field declares a 1-based column index. Decoding assigns
//! column `i` of a row to the field declaring index `i`; encoding writes
//! fields in ascending index order.
//!
//! ```no_run
//! use csv_fields::{csv_enum, csv_record};
//!
//! csv_enum! {
//!     #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
//!     pub enum Role {
//!         #[default]
//!         Engineer,
//!         Manager,
//!     }
//! }
//!
//! csv_record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Person {
//!         pub name: String => 1,
//!         pub age: Option<i32> => 2,
//!         pub role: Role => 3,
//!     }
//! }
//!
//! # fn main() -> csv_fields::CodecResult<()> {
//! let people = csv_fields::decode_all::<Person>("people.csv")?
//!     .collect::<csv_fields::CodecResult<Vec<_>>>()?;
//! csv_fields::encode_all("copy.csv", &["name", "age", "role"], &people)?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

#[macro_use]
mod macros;

/// Delimited text decoding and encoding
pub mod codec;
/// Codec error types
pub mod error;
/// Field descriptors and the descriptor registry
pub mod schema;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use codec::{
    CodecConfig, ColumnLayout, ConversionError, CsvValue, Newline, RecordCodec, RecordReader,
    RecordWriter, TextEncoding,
};
pub use error::{CodecError, CodecResult, ConfigError};
pub use schema::{
    describe, FieldDescriptor, FieldIndex, FieldType, Record, RecordDescriptor, SchemaError,
    ValueKind,
};

/// Opens `path` and lazily decodes its records with the default
/// configuration.
///
/// # Errors
///
/// See [`RecordCodec::decode_all`].
pub fn decode_all<R: Record>(
    path: impl AsRef<Path>,
) -> CodecResult<RecordReader<R, BufReader<File>>> {
    RecordCodec::new().decode_all(path)
}

/// Writes `records` to `path` with the default configuration, preceded
/// by a header line unless `headers` is empty. Returns the number of
/// records written.
///
/// # Errors
///
/// See [`RecordCodec::encode_all`].
pub fn encode_all<'r, R, H, I>(path: impl AsRef<Path>, headers: &[H], records: I) -> CodecResult<usize>
where
    R: Record,
    H: AsRef<str>,
    I: IntoIterator<Item = &'r R>,
{
    RecordCodec::new().encode_all(path, headers, records)
}
