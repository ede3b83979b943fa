//! Text coercion for field values.
//!
//! [`CsvValue`] converts a trimmed token into a field value and renders a
//! field value back to text. Implementations exist for the standard
//! primitives, `String`, `char`, chrono date/time types and `Option<T>`.
//! Enumerations get an impl from [`csv_enum!`](crate::csv_enum).
//!
//! # Coercion rules
//!
//! - `Option<T>`: an empty token is `None`, anything else goes to `T`.
//! - `String`: passthrough, including the empty string.
//! - numbers: Rust `FromStr`; an empty token is an error.
//! - `bool`: `true`/`false`, `1`/`0`, `yes`/`no`, `t`/`f`, `y`/`n`, any case.
//! - dates and times: the formats configured on
//!   [`CodecConfig`](super::CodecConfig), with an ISO 8601 fallback.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::schema::ValueKind;

use super::config::CodecConfig;

/// A token that could not be coerced into its field's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{value}' to {target}: {reason}")]
pub struct ConversionError {
    /// The offending token, after trimming.
    pub value: String,
    /// The target type.
    pub target: ValueKind,
    /// Why the conversion failed.
    pub reason: String,
}

impl ConversionError {
    /// Creates a conversion error.
    pub fn new(value: impl Into<String>, target: ValueKind, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            target,
            reason: reason.into(),
        }
    }
}

/// A field value that can be read from and written to a delimited column.
pub trait CsvValue: Sized {
    /// The underlying value kind.
    const KIND: ValueKind;

    /// Whether an empty token decodes to an absent value.
    const NULLABLE: bool = false;

    /// Parses a (trimmed) token.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if `raw` is not a valid value.
    fn from_field(raw: &str, config: &CodecConfig) -> Result<Self, ConversionError>;

    /// Renders the value in its canonical textual form.
    fn to_field(&self, config: &CodecConfig) -> String;
}

impl<T: CsvValue> CsvValue for Option<T> {
    const KIND: ValueKind = T::KIND;
    const NULLABLE: bool = true;

    fn from_field(raw: &str, config: &CodecConfig) -> Result<Self, ConversionError> {
        if raw.is_empty() {
            Ok(None)
        } else {
            T::from_field(raw, config).map(Some)
        }
    }

    fn to_field(&self, config: &CodecConfig) -> String {
        self.as_ref()
            .map_or_else(String::new, |value| value.to_field(config))
    }
}

impl CsvValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_field(raw: &str, _config: &CodecConfig) -> Result<Self, ConversionError> {
        Ok(raw.to_string())
    }

    fn to_field(&self, _config: &CodecConfig) -> String {
        self.clone()
    }
}

impl CsvValue for char {
    const KIND: ValueKind = ValueKind::Char;

    fn from_field(raw: &str, _config: &CodecConfig) -> Result<Self, ConversionError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            (None, _) => Err(ConversionError::new(raw, Self::KIND, "empty value")),
            (Some(_), Some(_)) => Err(ConversionError::new(
                raw,
                Self::KIND,
                "expected exactly one character",
            )),
        }
    }

    fn to_field(&self, _config: &CodecConfig) -> String {
        self.to_string()
    }
}

impl CsvValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_field(raw: &str, _config: &CodecConfig) -> Result<Self, ConversionError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "t" | "y" => Ok(true),
            "false" | "0" | "no" | "f" | "n" => Ok(false),
            _ => Err(ConversionError::new(raw, Self::KIND, "not a boolean")),
        }
    }

    fn to_field(&self, _config: &CodecConfig) -> String {
        self.to_string()
    }
}

macro_rules! impl_csv_value_from_str {
    ($kind:expr => $($t:ty),+ $(,)?) => {
        $(
            impl CsvValue for $t {
                const KIND: ValueKind = $kind;

                fn from_field(raw: &str, _config: &CodecConfig) -> Result<Self, ConversionError> {
                    raw.parse::<$t>()
                        .map_err(|e| ConversionError::new(raw, Self::KIND, e.to_string()))
                }

                fn to_field(&self, _config: &CodecConfig) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

impl_csv_value_from_str!(ValueKind::Int => i8, i16, i32, i64, i128, isize);
impl_csv_value_from_str!(ValueKind::UInt => u8, u16, u32, u64, u128, usize);
impl_csv_value_from_str!(ValueKind::Float => f32, f64);

impl CsvValue for NaiveDate {
    const KIND: ValueKind = ValueKind::Date;

    fn from_field(raw: &str, config: &CodecConfig) -> Result<Self, ConversionError> {
        NaiveDate::parse_from_str(raw, &config.date_format)
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .map_err(|e| ConversionError::new(raw, Self::KIND, e.to_string()))
    }

    fn to_field(&self, config: &CodecConfig) -> String {
        self.format(&config.date_format).to_string()
    }
}

impl CsvValue for NaiveTime {
    const KIND: ValueKind = ValueKind::Time;

    fn from_field(raw: &str, config: &CodecConfig) -> Result<Self, ConversionError> {
        NaiveTime::parse_from_str(raw, &config.time_format)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S%.f"))
            .map_err(|e| ConversionError::new(raw, Self::KIND, e.to_string()))
    }

    fn to_field(&self, config: &CodecConfig) -> String {
        self.format(&config.time_format).to_string()
    }
}

impl CsvValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::DateTime;

    fn from_field(raw: &str, config: &CodecConfig) -> Result<Self, ConversionError> {
        parse_naive_datetime(raw, config)
    }

    fn to_field(&self, config: &CodecConfig) -> String {
        self.format(&config.datetime_format).to_string()
    }
}

impl CsvValue for DateTime<FixedOffset> {
    const KIND: ValueKind = ValueKind::DateTime;

    fn from_field(raw: &str, config: &CodecConfig) -> Result<Self, ConversionError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt);
        }
        parse_naive_datetime(raw, config).map(|ndt| ndt.and_utc().fixed_offset())
    }

    fn to_field(&self, _config: &CodecConfig) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl CsvValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::DateTime;

    fn from_field(raw: &str, config: &CodecConfig) -> Result<Self, ConversionError> {
        DateTime::<FixedOffset>::from_field(raw, config).map(|dt| dt.with_timezone(&Utc))
    }

    fn to_field(&self, _config: &CodecConfig) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Parses a naive date-time with the configured format, then ISO 8601.
fn parse_naive_datetime(raw: &str, config: &CodecConfig) -> Result<NaiveDateTime, ConversionError> {
    NaiveDateTime::parse_from_str(raw, &config.datetime_format)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| ConversionError::new(raw, ValueKind::DateTime, e.to_string()))
}

/// Builds the error for a token that names no member of an enumeration.
///
/// Used by the impls generated by [`csv_enum!`](crate::csv_enum).
#[must_use]
pub fn unknown_member(raw: &str, kind: ValueKind, members: &[&str]) -> ConversionError {
    ConversionError::new(
        raw,
        kind,
        format!("expected one of [{}]", members.join(", ")),
    )
}
