//! Row decoding: delimited lines → records.
//!
//! [`RecordReader`] is a lazy, single-pass iterator over the records of a
//! text source. It owns the source and releases it as soon as iteration
//! ends, whether by exhaustion or by an error; dropping the reader part
//! way through releases it too.
//!
//! A line ends at `\n`, `\r\n` or a lone `\r`. Lines are split naively on
//! the configured delimiter. Column `i` (0-based) is assigned to the field
//! declaring index `i + 1`; columns with no such field are ignored and
//! fields with no column keep their `Default` value.

use std::io::{self, BufRead};
use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{CodecError, CodecResult};
use crate::schema::{Record, RecordDescriptor};

use super::config::{CodecConfig, TextEncoding, UTF8_BOM};

/// Decodes one row of raw tokens into a new record.
///
/// `line` is only used for error context.
pub(crate) fn decode_tokens<'a, R: Record>(
    descriptor: &RecordDescriptor<R>,
    config: &CodecConfig,
    tokens: impl IntoIterator<Item = &'a str>,
    line: usize,
) -> CodecResult<R> {
    let mut record = R::default();
    let mut fields = descriptor.fields().iter().peekable();

    for (offset, raw) in tokens.into_iter().enumerate() {
        // Fields are sorted by index, so the next one is never behind `offset`.
        let Some(field) = fields.next_if(|f| f.index().offset() == offset) else {
            if fields.peek().is_none() {
                break;
            }
            continue;
        };
        let value = if config.trim_whitespace { raw.trim() } else { raw };
        field
            .assign(&mut record, value, config)
            .map_err(|source| CodecError::Conversion {
                line,
                field: field.name(),
                index: field.index(),
                source,
            })?;
    }

    Ok(record)
}

/// A lazy iterator of records decoded from a line-oriented text source.
///
/// Yields `Err` at most once: after the first error the reader drops its
/// source and returns `None` from then on.
pub struct RecordReader<R: Record, S> {
    /// `None` once iteration has ended.
    source: Option<S>,
    descriptor: Arc<RecordDescriptor<R>>,
    config: CodecConfig,
    encoding: TextEncoding,
    /// Lines consumed so far, header included.
    line: usize,
    header_pending: bool,
    /// The previous line ended with `\r`; a leading `\n` belongs to it.
    pending_lf: bool,
    buf: Vec<u8>,
}

impl<R: Record, S: BufRead> RecordReader<R, S> {
    pub(crate) fn new(source: S, descriptor: Arc<RecordDescriptor<R>>, config: CodecConfig) -> Self {
        Self {
            source: Some(source),
            descriptor,
            encoding: config.encoding,
            header_pending: config.has_header,
            config,
            line: 0,
            pending_lf: false,
            buf: Vec::new(),
        }
    }

    /// Returns the number of lines consumed so far, header included.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Returns the descriptor rows are decoded against.
    #[must_use]
    pub fn descriptor(&self) -> &RecordDescriptor<R> {
        &self.descriptor
    }

    /// Returns `true` once iteration has ended and the source is released.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.source.is_none()
    }

    /// Returns the underlying source, dropping any unread lines, or `None`
    /// if the reader has already finished and released it.
    pub fn into_inner(self) -> Option<S> {
        self.source
    }

    /// Reads the next line into `buf` as raw bytes, without its terminator.
    /// Returns `false` at end of input.
    fn read_raw_line(&mut self) -> io::Result<bool> {
        let Some(source) = self.source.as_mut() else {
            return Ok(false);
        };
        self.buf.clear();

        let mut found = false;
        loop {
            let available = match source.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            let start = usize::from(self.pending_lf && available[0] == b'\n');
            self.pending_lf = false;

            if let Some(end) = available[start..]
                .iter()
                .position(|&b| b == b'\n' || b == b'\r')
            {
                let end = start + end;
                self.buf.extend_from_slice(&available[start..end]);
                self.pending_lf = available[end] == b'\r';
                source.consume(end + 1);
                found = true;
                break;
            }
            let len = available.len();
            self.buf.extend_from_slice(&available[start..]);
            source.consume(len);
            found |= len > start;
        }
        if !found {
            return Ok(false);
        }

        self.line += 1;
        if self.line == 1 && self.buf.starts_with(UTF8_BOM) {
            self.buf.drain(..UTF8_BOM.len());
            // A UTF-8 byte order mark overrides the configured encoding.
            if !self.encoding.is_utf8() {
                debug!(configured = %self.encoding, "byte order mark found, decoding as UTF-8");
                let utf8 = TextEncoding::utf8();
                self.encoding = if self.encoding.is_lossy() { utf8.lossy() } else { utf8 };
            }
        }
        Ok(true)
    }

    fn read_line(&mut self) -> CodecResult<Option<String>> {
        if !self.read_raw_line()? {
            return Ok(None);
        }
        Ok(Some(self.encoding.decode(&self.buf)?))
    }

    fn next_record(&mut self) -> CodecResult<Option<R>> {
        if self.header_pending {
            self.header_pending = false;
            // The header is skipped undecoded.
            if !self.read_raw_line()? {
                return Ok(None);
            }
        }

        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            if self.config.skip_blank_lines && line.trim().is_empty() {
                continue;
            }
            trace!(line = self.line, "decoding row");
            let tokens = line.split(self.config.delimiter.as_str());
            return decode_tokens(&self.descriptor, &self.config, tokens, self.line).map(Some);
        }
    }

    fn release(&mut self) {
        self.source = None;
        self.buf = Vec::new();
    }
}

impl<R: Record, S: BufRead> Iterator for RecordReader<R, S> {
    type Item = CodecResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.is_none() {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.release();
                None
            }
            Err(e) => {
                self.release();
                Some(Err(e))
            }
        }
    }
}

impl<R: Record, S: BufRead> FusedIterator for RecordReader<R, S> {}

impl<R: Record, S> std::fmt::Debug for RecordReader<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("record", &self.descriptor.record_name())
            .field("line", &self.line)
            .field("encoding", &self.encoding)
            .field("finished", &self.source.is_none())
            .finish_non_exhaustive()
    }
}
