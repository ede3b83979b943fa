//! Codec configuration.
//!
//! [`CodecConfig`] can be built in code with the `with_*` builders,
//! deserialized with serde (missing keys take their defaults), or parsed
//! from a flat string property map with [`CodecConfig::from_properties`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::str::FromStr;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default date-time format: `2024-01-15 10:30:00.250`.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Default date format: `2024-01-15`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default time format: `10:30:00.250`.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S%.f";

/// The UTF-8 byte order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encoding of the delimited file, resolved from a WHATWG label.
///
/// Any ASCII-compatible encoding known to `encoding_rs` is accepted, e.g.
/// `utf-8`, `shift_jis`, `euc-jp`, `windows-1252` or `gbk`. Labels match
/// case-insensitively. A `-lossy` suffix (`utf-8-lossy`) makes decoding
/// replace malformed sequences with U+FFFD and encoding replace unmappable
/// characters with HTML numeric character references; without it both
/// fail with an [`io::ErrorKind::InvalidData`] error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextEncoding {
    encoding: &'static Encoding,
    lossy: bool,
}

impl TextEncoding {
    /// Strict UTF-8.
    #[must_use]
    pub fn utf8() -> Self {
        Self::new(encoding_rs::UTF_8)
    }

    /// Strict decoding and encoding with `encoding`.
    #[must_use]
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            lossy: false,
        }
    }

    /// Resolves a label such as `shift_jis` or `utf-8-lossy`.
    #[must_use]
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        let (name, lossy) = match label
            .strip_suffix("-lossy")
            .or_else(|| label.strip_suffix("_lossy"))
        {
            Some(name) => (name, true),
            None => (label.as_str(), false),
        };
        Encoding::for_label(name.as_bytes()).map(|encoding| Self { encoding, lossy })
    }

    /// Returns the same encoding with replacement instead of failure.
    #[must_use]
    pub fn lossy(self) -> Self {
        Self {
            lossy: true,
            ..self
        }
    }

    /// Returns the underlying `encoding_rs` encoding.
    #[must_use]
    pub fn encoding(self) -> &'static Encoding {
        self.encoding
    }

    /// Whether malformed or unmappable text is replaced instead of failing.
    #[must_use]
    pub fn is_lossy(self) -> bool {
        self.lossy
    }

    /// Whether this is UTF-8.
    #[must_use]
    pub fn is_utf8(self) -> bool {
        self.encoding == encoding_rs::UTF_8
    }

    /// Decodes one line of raw bytes. Byte order marks are not handled here.
    ///
    /// # Errors
    ///
    /// Returns an [`io::ErrorKind::InvalidData`] error for malformed input
    /// unless the encoding is lossy.
    pub fn decode(self, bytes: &[u8]) -> io::Result<String> {
        if self.lossy {
            let (text, _) = self.encoding.decode_without_bom_handling(bytes);
            return Ok(text.into_owned());
        }
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(Cow::into_owned)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("malformed {} byte sequence", self.encoding.name()),
                )
            })
    }

    /// Encodes text for writing.
    ///
    /// # Errors
    ///
    /// Returns an [`io::ErrorKind::InvalidData`] error if `text` holds a
    /// character the encoding cannot represent, unless the encoding is lossy.
    pub fn encode(self, text: &str) -> io::Result<Cow<'_, [u8]>> {
        let (bytes, _, unmappable) = self.encoding.encode(text);
        if unmappable && !self.lossy {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("'{text}' cannot be encoded as {}", self.encoding.name()),
            ));
        }
        Ok(bytes)
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encoding.name())?;
        if self.lossy {
            f.write_str("-lossy")?;
        }
        Ok(())
    }
}

impl FromStr for TextEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_label(s)
            .ok_or_else(|| ConfigError::invalid("encoding", format!("unknown encoding '{s}'")))
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = ConfigError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(encoding: TextEncoding) -> Self {
        encoding.to_string()
    }
}

/// Line terminator written by the encoder.
///
/// The decoder accepts both regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Newline {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

str_enum!(Newline, "newline",
    Lf => "lf", "\\n", "unix";
    CrLf => "crlf", "\\r\\n", "windows";
);

impl Newline {
    /// Returns the terminator text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// How the encoder places fields whose indices leave gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    /// Emit declared fields back to back in index order. Indices 1, 2, 4
    /// produce three columns, so the fourth field lands in column 3.
    #[default]
    Compact,
    /// Emit one column per index slot up to the highest index, leaving
    /// undeclared slots empty. Indices 1, 2, 4 produce four columns.
    Positional,
}

str_enum!(ColumnLayout, "column.layout",
    Compact => "compact";
    Positional => "positional";
);

/// Configuration for [`RecordCodec`](super::RecordCodec).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Whether the first line is a header. The decoder skips it; the
    /// encoder writes a header only when labels are passed in.
    /// Default: `true`.
    pub has_header: bool,

    /// Column delimiter. May be more than one character. Default: `","`.
    pub delimiter: String,

    /// Whether to trim surrounding whitespace from each token before
    /// coercion. Default: `true`.
    pub trim_whitespace: bool,

    /// Text encoding used for reading and writing. Default: strict UTF-8.
    pub encoding: TextEncoding,

    /// Whether the encoder writes a UTF-8 byte order mark. Only valid with a
    /// UTF-8 encoding. Default: `false`, so output starts directly with the
    /// header or first record; set it for consumers that sniff the BOM.
    pub write_bom: bool,

    /// Line terminator written by the encoder. Default: `\n`.
    pub newline: Newline,

    /// Whether the decoder skips lines that are empty or whitespace-only.
    /// When `false` such a line decodes as a record with one column.
    /// Default: `false`.
    pub skip_blank_lines: bool,

    /// Encoder column placement. Default: [`ColumnLayout::Compact`].
    pub layout: ColumnLayout,

    /// chrono format for naive date-times.
    pub datetime_format: String,

    /// chrono format for dates.
    pub date_format: String,

    /// chrono format for times of day.
    pub time_format: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: ",".into(),
            trim_whitespace: true,
            encoding: TextEncoding::utf8(),
            write_bom: false,
            newline: Newline::Lf,
            skip_blank_lines: false,
            layout: ColumnLayout::Compact,
            datetime_format: DEFAULT_DATETIME_FORMAT.into(),
            date_format: DEFAULT_DATE_FORMAT.into(),
            time_format: DEFAULT_TIME_FORMAT.into(),
        }
    }
}

impl CodecConfig {
    /// Builds a config from a flat property map.
    ///
    /// Recognized keys: `has.header`, `delimiter`, `trim.whitespace`,
    /// `encoding`, `write.bom`, `newline`, `skip.blank.lines`,
    /// `column.layout`, `datetime.format`, `date.format`, `time.format`.
    /// Other keys are ignored; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] for unparsable values or a
    /// config that fails [`CodecConfig::validate`].
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = parse_bool(props, "has.header")? {
            config.has_header = v;
        }
        if let Some(v) = props.get("delimiter") {
            config.delimiter = unescape_delimiter(v);
        }
        if let Some(v) = parse_bool(props, "trim.whitespace")? {
            config.trim_whitespace = v;
        }
        if let Some(v) = props.get("encoding") {
            config.encoding = v.parse()?;
        }
        if let Some(v) = parse_bool(props, "write.bom")? {
            config.write_bom = v;
        }
        if let Some(v) = props.get("newline") {
            config.newline = v.parse()?;
        }
        if let Some(v) = parse_bool(props, "skip.blank.lines")? {
            config.skip_blank_lines = v;
        }
        if let Some(v) = props.get("column.layout") {
            config.layout = v.parse()?;
        }
        if let Some(v) = props.get("datetime.format") {
            config.datetime_format.clone_from(v);
        }
        if let Some(v) = props.get("date.format") {
            config.date_format.clone_from(v);
        }
        if let Some(v) = props.get("time.format") {
            config.time_format.clone_from(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the settings the codec cannot run without.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if the delimiter is empty or
    /// contains a line break, if the encoding is not ASCII-compatible, if a
    /// byte order mark is requested for a non-UTF-8 encoding, or if a
    /// date/time format is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::invalid("delimiter", "must not be empty"));
        }
        if self.delimiter.contains(['\n', '\r']) {
            return Err(ConfigError::invalid(
                "delimiter",
                "must not contain a line break",
            ));
        }
        if !self.encoding.encoding().is_ascii_compatible() {
            return Err(ConfigError::invalid(
                "encoding",
                format!(
                    "{} is not ASCII-compatible and cannot be split into lines",
                    self.encoding
                ),
            ));
        }
        if self.write_bom && !self.encoding.is_utf8() {
            return Err(ConfigError::invalid(
                "write.bom",
                format!("a byte order mark requires UTF-8, not {}", self.encoding),
            ));
        }
        for (key, format) in [
            ("datetime.format", &self.datetime_format),
            ("date.format", &self.date_format),
            ("time.format", &self.time_format),
        ] {
            if format.is_empty() {
                return Err(ConfigError::invalid(key, "must not be empty"));
            }
        }
        Ok(())
    }

    /// Sets whether the first line is a header.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets the column delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Sets whether tokens are trimmed before coercion.
    #[must_use]
    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Sets the text encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets whether the encoder writes a byte order mark.
    #[must_use]
    pub fn with_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }

    /// Sets the line terminator written by the encoder.
    #[must_use]
    pub fn with_newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    /// Sets whether the decoder skips empty lines.
    #[must_use]
    pub fn with_skip_blank_lines(mut self, skip: bool) -> Self {
        self.skip_blank_lines = skip;
        self
    }

    /// Sets the encoder column layout.
    #[must_use]
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the naive date-time format.
    #[must_use]
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// Sets the date format.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Sets the time format.
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }
}

fn parse_bool(props: &HashMap<String, String>, key: &str) -> Result<Option<bool>, ConfigError> {
    match props.get(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(None),
        Some(ref v) if v == "true" => Ok(Some(true)),
        Some(ref v) if v == "false" => Ok(Some(false)),
        Some(other) => Err(ConfigError::invalid(
            key,
            format!("expected 'true' or 'false', got '{other}'"),
        )),
    }
}

/// Maps the escaped spellings of a tab delimiter to the character itself.
fn unescape_delimiter(raw: &str) -> String {
    match raw {
        "\\t" | "tab" => "\t".to_string(),
        other => other.to_string(),
    }
}
