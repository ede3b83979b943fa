//! Row encoding: records → delimited lines.
//!
//! Fields are rendered in ascending index order. With
//! [`ColumnLayout::Compact`] they are written back to back, so a record
//! declaring indices 1, 2 and 4 produces three columns. That output does
//! not decode back positionally (the field at index 4 lands in column 3),
//! which [`RecordWriter::new`] reports with a warning.
//! [`ColumnLayout::Positional`] pads undeclared slots with empty columns.
//!
//! Text is converted to bytes with the configured [`TextEncoding`]; a
//! character the encoding cannot represent fails the write unless the
//! encoding is lossy.
//!
//! [`TextEncoding`]: super::config::TextEncoding

use std::io::Write;
use std::sync::Arc;

use tracing::warn;

use crate::error::CodecResult;
use crate::schema::{Record, RecordDescriptor};

use super::config::{CodecConfig, ColumnLayout, UTF8_BOM};

/// Renders one record as a row of column values.
pub(crate) fn encode_row<R>(
    descriptor: &RecordDescriptor<R>,
    config: &CodecConfig,
    record: &R,
) -> Vec<String> {
    let fields = descriptor.fields();
    match config.layout {
        ColumnLayout::Compact => fields.iter().map(|f| f.render(record, config)).collect(),
        ColumnLayout::Positional => {
            let mut row = Vec::with_capacity(fields.len());
            for field in fields {
                row.resize(field.index().offset(), String::new());
                row.push(field.render(record, config));
            }
            row
        }
    }
}

/// Writes records of type `R` as delimited lines to a byte sink.
///
/// The sink is flushed by [`RecordWriter::finish`]. A writer dropped
/// without `finish` may leave buffered output unwritten.
pub struct RecordWriter<R: Record, W: Write> {
    sink: W,
    descriptor: Arc<RecordDescriptor<R>>,
    config: CodecConfig,
    /// Delimiter and line terminator in the output encoding.
    delimiter: Vec<u8>,
    newline: Vec<u8>,
    written: usize,
    warned_delimiter: bool,
}

impl<R: Record, W: Write> RecordWriter<R, W> {
    /// Creates a writer, emitting the byte order mark if configured.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`](crate::CodecError::Io) if the byte order
    /// mark cannot be written, or if the delimiter or line terminator
    /// cannot be represented in the configured encoding.
    pub(crate) fn new(
        mut sink: W,
        descriptor: Arc<RecordDescriptor<R>>,
        config: CodecConfig,
    ) -> CodecResult<Self> {
        if config.layout == ColumnLayout::Compact && descriptor.has_gaps() {
            warn!(
                record = descriptor.record_name(),
                fields = descriptor.len(),
                max_index = descriptor.max_index(),
                "column indices have gaps; compact layout shifts later fields left"
            );
        }
        let delimiter = config.encoding.encode(config.delimiter.as_str())?.into_owned();
        let newline = config.encoding.encode(config.newline.as_str())?.into_owned();
        if config.write_bom && config.encoding.is_utf8() {
            sink.write_all(UTF8_BOM)?;
        }
        Ok(Self {
            sink,
            descriptor,
            config,
            delimiter,
            newline,
            written: 0,
            warned_delimiter: false,
        })
    }

    /// Writes a header line. Does nothing if `labels` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`](crate::CodecError::Io) on write failure
    /// or if a label cannot be represented in the configured encoding.
    pub fn write_header<H: AsRef<str>>(&mut self, labels: &[H]) -> CodecResult<()> {
        if labels.is_empty() {
            return Ok(());
        }
        for (i, label) in labels.iter().enumerate() {
            if i > 0 {
                self.sink.write_all(&self.delimiter)?;
            }
            self.write_text(label.as_ref())?;
        }
        self.sink.write_all(&self.newline)?;
        Ok(())
    }

    /// Writes one record as a line.
    ///
    /// Positional padding is streamed to the sink, so a record declaring a
    /// far index costs no memory beyond its rendered values.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`](crate::CodecError::Io) on write failure
    /// or if a value cannot be represented in the configured encoding.
    pub fn write_record(&mut self, record: &R) -> CodecResult<()> {
        let descriptor = Arc::clone(&self.descriptor);
        let mut column = 0;
        for field in descriptor.fields() {
            let target = match self.config.layout {
                ColumnLayout::Compact => column,
                ColumnLayout::Positional => field.index().offset(),
            };
            // One delimiter before every column but the first, padding included.
            for _ in column.max(1)..=target {
                self.sink.write_all(&self.delimiter)?;
            }
            let value = field.render(record, &self.config);
            self.check_delimiter(&value);
            self.write_text(&value)?;
            column = target + 1;
        }
        self.sink.write_all(&self.newline)?;
        self.written += 1;
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`](crate::CodecError::Io) if the flush fails.
    pub fn finish(mut self) -> CodecResult<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn write_text(&mut self, text: &str) -> CodecResult<()> {
        let bytes = self.config.encoding.encode(text)?;
        self.sink.write_all(&bytes)?;
        Ok(())
    }

    fn check_delimiter(&mut self, value: &str) {
        if !self.warned_delimiter && value.contains(self.config.delimiter.as_str()) {
            warn!(
                record = self.descriptor.record_name(),
                value = %value,
                "value contains the delimiter and will not decode back unchanged"
            );
            self.warned_delimiter = true;
        }
    }
}

impl<R: Record, W: Write> std::fmt::Debug for RecordWriter<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordWriter")
            .field("record", &self.descriptor.record_name())
            .field("encoding", &self.config.encoding)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}
