//! Record codec: delimited text ⇄ typed records.
//!
//! - **Values** ([`value`]): the [`CsvValue`] coercion trait and its impls
//!   for text, numbers, booleans, chrono dates and times, and `Option<T>`
//! - **Configuration** ([`config`]): [`CodecConfig`] with defaults,
//!   dotted-key property loading and serde support
//! - **Decoding** ([`decoder`]): [`RecordReader`], a lazy iterator of
//!   records over any [`BufRead`]
//! - **Encoding** ([`encoder`]): [`RecordWriter`], writing an optional
//!   header and one line per record to any [`Write`]
//!
//! [`RecordCodec`] ties these to files.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod value;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CodecResult, ConfigError};
use crate::schema::{describe, Record};

pub use config::{CodecConfig, ColumnLayout, Newline, TextEncoding};
pub use decoder::RecordReader;
pub use encoder::RecordWriter;
pub use value::{unknown_member, ConversionError, CsvValue};

/// Reads and writes records of any [`Record`] type using one
/// [`CodecConfig`].
///
/// ```no_run
/// use csv_fields::{csv_record, RecordCodec};
///
/// csv_record! {
///     #[derive(Debug, Default)]
///     struct Person {
///         name: String => 1,
///         age: Option<i32> => 2,
///     }
/// }
///
/// # fn main() -> csv_fields::CodecResult<()> {
/// let codec = RecordCodec::new();
/// for person in codec.decode_all::<Person>("people.csv")? {
///     println!("{:?}", person?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordCodec {
    config: CodecConfig,
}

impl RecordCodec {
    /// Creates a codec with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec with a custom configuration.
    ///
    /// The configuration is validated when an operation starts.
    #[must_use]
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Opens `path` and returns a lazy reader over its records.
    ///
    /// Nothing past the file open happens until the reader is iterated.
    /// Each item is one record, or the error that ended the sequence.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingPath`] if `path` is empty
    /// - [`ConfigError::InvalidConfig`] if the configuration is invalid
    /// - [`SchemaError`](crate::SchemaError) if `R`'s fields are not all positioned
    /// - [`CodecError::Io`](crate::CodecError::Io) if the file cannot be opened
    pub fn decode_all<R: Record>(
        &self,
        path: impl AsRef<Path>,
    ) -> CodecResult<RecordReader<R, BufReader<File>>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath.into());
        }
        self.config.validate()?;
        let descriptor = describe::<R>()?;
        let file = File::open(path)?;
        debug!(
            path = %path.display(),
            record = descriptor.record_name(),
            "decoding records"
        );
        Ok(RecordReader::new(
            BufReader::new(file),
            descriptor,
            self.config.clone(),
        ))
    }

    /// Returns a lazy reader over the records of an in-memory or streaming
    /// source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] or
    /// [`SchemaError`](crate::SchemaError) as for
    /// [`decode_all`](Self::decode_all).
    pub fn decode_reader<R: Record, S: BufRead>(
        &self,
        source: S,
    ) -> CodecResult<RecordReader<R, S>> {
        self.config.validate()?;
        let descriptor = describe::<R>()?;
        Ok(RecordReader::new(source, descriptor, self.config.clone()))
    }

    /// Decodes one already-split row. Errors report line 1.
    ///
    /// # Errors
    ///
    /// Returns a schema error for an invalid record type, or
    /// [`CodecError::Conversion`](crate::CodecError::Conversion) if a token
    /// cannot be coerced.
    pub fn decode_row<R: Record>(&self, tokens: &[&str]) -> CodecResult<R> {
        let descriptor = describe::<R>()?;
        decoder::decode_tokens(&descriptor, &self.config, tokens.iter().copied(), 1)
    }

    /// Writes an optional header line followed by one line per record to
    /// `path`, replacing any existing file.
    ///
    /// No header line is written when `headers` is empty. Returns the
    /// number of records written.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingPath`] if `path` is empty
    /// - [`ConfigError::InvalidConfig`] if the configuration is invalid
    /// - [`SchemaError`](crate::SchemaError) if `R`'s fields are not all
    ///   positioned; the file is not touched
    /// - [`CodecError::Io`](crate::CodecError::Io) if the file cannot be
    ///   created or written
    pub fn encode_all<'r, R, H, I>(
        &self,
        path: impl AsRef<Path>,
        headers: &[H],
        records: I,
    ) -> CodecResult<usize>
    where
        R: Record,
        H: AsRef<str>,
        I: IntoIterator<Item = &'r R>,
    {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath.into());
        }
        self.config.validate()?;
        let descriptor = describe::<R>()?;
        let file = File::create(path)?;

        let mut writer = RecordWriter::new(BufWriter::new(file), descriptor, self.config.clone())?;
        writer.write_header(headers)?;
        for record in records {
            writer.write_record(record)?;
        }
        let written = writer.written();
        writer.finish()?;

        info!(
            path = %path.display(),
            record = R::record_name(),
            written,
            "encoded records"
        );
        Ok(written)
    }

    /// Returns a writer that encodes records to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`], a schema error, or
    /// [`CodecError::Io`](crate::CodecError::Io) if a configured byte order
    /// mark cannot be written.
    pub fn encode_writer<R: Record, W: Write>(&self, sink: W) -> CodecResult<RecordWriter<R, W>> {
        self.config.validate()?;
        let descriptor = describe::<R>()?;
        RecordWriter::new(sink, descriptor, self.config.clone())
    }

    /// Renders one record as column values in output order.
    ///
    /// # Errors
    ///
    /// Returns a schema error for an invalid record type.
    pub fn encode_row<R: Record>(&self, record: &R) -> CodecResult<Vec<String>> {
        let descriptor = describe::<R>()?;
        Ok(encoder::encode_row(&descriptor, &self.config, record))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::csv_record;
    use crate::error::CodecError;
    use crate::schema::SchemaError;

    csv_record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Item {
            sku: String => 1,
            qty: u32 => 2,
            price: Option<f64> => 3,
        }
    }

    csv_record! {
        #[derive(Debug, Default)]
        struct Loose {
            a: String => 1,
            b: String,
        }
    }

    #[test]
    fn test_decode_reader() {
        let codec = RecordCodec::new();
        let items: Vec<Item> = codec
            .decode_reader(Cursor::new("sku,qty,price\nA1,2,9.5\nB2,1,\n"))
            .unwrap()
            .collect::<CodecResult<_>>()
            .unwrap();
        assert_eq!(
            items,
            vec![
                Item {
                    sku: "A1".into(),
                    qty: 2,
                    price: Some(9.5)
                },
                Item {
                    sku: "B2".into(),
                    qty: 1,
                    price: None
                },
            ]
        );
    }

    #[test]
    fn test_decode_row() {
        let codec = RecordCodec::new();
        let item: Item = codec.decode_row(&["Z9", " 4 ", "1.25"]).unwrap();
        assert_eq!(item.qty, 4);
        assert_eq!(item.price, Some(1.25));

        let err = codec.decode_row::<Item>(&["Z9", "-1"]).unwrap_err();
        assert!(matches!(err, CodecError::Conversion { line: 1, field: "qty", .. }));
    }

    #[test]
    fn test_encode_row() {
        let codec = RecordCodec::new();
        let row = codec
            .encode_row(&Item {
                sku: "A1".into(),
                qty: 3,
                price: None,
            })
            .unwrap();
        assert_eq!(row, vec!["A1", "3", ""]);
    }

    #[test]
    fn test_encode_writer_round_trip() {
        let codec = RecordCodec::new();
        let items = vec![
            Item {
                sku: "A1".into(),
                qty: 2,
                price: Some(0.5),
            },
            Item::default(),
        ];
        let mut writer = codec.encode_writer::<Item, _>(Vec::new()).unwrap();
        writer.write_header(&["sku", "qty", "price"]).unwrap();
        for item in &items {
            writer.write_record(item).unwrap();
        }
        let bytes = writer.finish().unwrap();

        let decoded: Vec<Item> = codec
            .decode_reader(Cursor::new(bytes))
            .unwrap()
            .collect::<CodecResult<_>>()
            .unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_schema_error_before_reading() {
        let codec = RecordCodec::new();
        let err = codec.decode_reader::<Loose, _>(Cursor::new("x,y\n")).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Schema(SchemaError::MissingPosition { field: "b", .. })
        ));
        assert!(codec.encode_row(&Loose::default()).is_err());
    }

    #[test]
    fn test_empty_path_is_missing_path() {
        let codec = RecordCodec::new();
        let err = codec.decode_all::<Item>("").unwrap_err();
        assert!(matches!(err, CodecError::Config(ConfigError::MissingPath)));

        let items: Vec<Item> = Vec::new();
        let err = codec.encode_all("", &["sku"], &items).unwrap_err();
        assert!(matches!(err, CodecError::Config(ConfigError::MissingPath)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let codec = RecordCodec::with_config(CodecConfig::default().with_delimiter(""));
        let err = codec.decode_reader::<Item, _>(Cursor::new("")).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Config(ConfigError::InvalidConfig { .. })
        ));
        assert!(codec.encode_writer::<Item, _>(Vec::new()).is_err());
    }

    #[test]
    fn test_config_accessor() {
        let config = CodecConfig::default().with_header(false);
        let codec = RecordCodec::with_config(config.clone());
        assert_eq!(codec.config(), &config);
    }
}
