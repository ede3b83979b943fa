/// Generates `Display` and `FromStr` impls for simple config enums.
///
/// Parsing lowercases the input and maps `_` to `-` before matching the
/// canonical name or any alias. Unknown values produce
/// [`ConfigError::InvalidConfig`](crate::ConfigError::InvalidConfig) for the
/// given key.
macro_rules! str_enum {
    ($enum_name:ident, $key:literal,
        $( $variant:ident => $display:literal $(, $alias:literal)* );+ $(;)?
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let s = match self {
                    $( Self::$variant => $display, )+
                };
                f.write_str(s)
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = crate::error::ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase().replace('_', "-");
                match normalized.as_str() {
                    $( $display $(| $alias)* => Ok(Self::$variant), )+
                    other => Err(crate::error::ConfigError::invalid(
                        $key,
                        format!("unknown value '{other}'"),
                    )),
                }
            }
        }
    };
}

/// Declares a record struct together with its column mapping.
///
/// Each field is written as `name: Type => index`. A field written without
/// `=> index` is still part of the record's mapped surface, and describing
/// the record then fails with
/// [`SchemaError::MissingPosition`](crate::SchemaError::MissingPosition).
/// Indices are checked at compile time: `=> 0` does not build.
///
/// The struct must implement `Default`; decoding starts every row from
/// `Default::default()`.
///
/// ```
/// use csv_fields::csv_record;
///
/// csv_record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Employee {
///         pub name: String => 1,
///         pub age: Option<i32> => 2,
///         pub role: String => 3,
///     }
/// }
///
/// let descriptor = csv_fields::describe::<Employee>().unwrap();
/// assert_eq!(descriptor.len(), 3);
/// ```
///
/// Column indices start at 1:
///
/// ```compile_fail
/// csv_fields::csv_record! {
///     #[derive(Debug, Default)]
///     pub struct Zeroed {
///         pub name: String => 0,
///     }
/// }
///
/// let _ = csv_fields::describe::<Zeroed>();
/// ```
///
/// and cannot be negative:
///
/// ```compile_fail
/// csv_fields::csv_record! {
///     #[derive(Debug, Default)]
///     pub struct Negative {
///         pub name: String => -1,
///     }
/// }
///
/// let _ = csv_fields::describe::<Negative>();
/// ```
#[macro_export]
macro_rules! csv_record {
    (@index $index:literal) => {
        ::std::option::Option::Some(const { $crate::schema::FieldIndex::must($index) })
    };
    (@index) => {
        ::std::option::Option::None
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> $index:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::schema::Record for $name {
            fn record_name() -> &'static str {
                stringify!($name)
            }

            fn fields() -> ::std::vec::Vec<$crate::schema::FieldDecl<Self>> {
                ::std::vec![
                    $(
                        $crate::schema::FieldDecl::<Self>::new::<$ty>(
                            stringify!($field),
                            $crate::csv_record!(@index $($index)?),
                            |record| &record.$field,
                            |record| &mut record.$field,
                        ),
                    )*
                ]
            }
        }
    };
}

/// Declares a fieldless enum that decodes from its member names.
///
/// Matching is exact and case-sensitive: `Engineer` matches, `engineer`
/// does not. Encoding writes the member name. The generated impl also adds
/// `MEMBERS` (names in declaration order) and `name()`.
///
/// ```
/// use csv_fields::{csv_enum, CodecConfig, CsvValue};
///
/// csv_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Role {
///         Engineer,
///         Manager,
///     }
/// }
///
/// let config = CodecConfig::default();
/// assert_eq!(Role::from_field("Manager", &config).unwrap(), Role::Manager);
/// assert!(Role::from_field("manager", &config).is_err());
/// assert_eq!(Role::Engineer.to_field(&config), "Engineer");
/// ```
#[macro_export]
macro_rules! csv_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident $(= $disc:expr)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant $(= $disc)?,
            )+
        }

        impl $name {
            /// Member names in declaration order.
            pub const MEMBERS: &'static [&'static str] = &[$(stringify!($variant)),+];

            /// Returns the member name.
            #[must_use]
            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant), )+
                }
            }
        }

        impl $crate::CsvValue for $name {
            const KIND: $crate::schema::ValueKind =
                $crate::schema::ValueKind::Enum(stringify!($name));

            fn from_field(
                raw: &str,
                _config: &$crate::CodecConfig,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                match raw {
                    $( stringify!($variant) => ::std::result::Result::Ok(Self::$variant), )+
                    other => ::std::result::Result::Err($crate::codec::unknown_member(
                        other,
                        Self::KIND,
                        Self::MEMBERS,
                    )),
                }
            }

            fn to_field(&self, _config: &$crate::CodecConfig) -> ::std::string::String {
                ::std::string::String::from(self.name())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::schema::{FieldIndex, Record, ValueKind};
    use crate::{CodecConfig, CsvValue};

    csv_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Shade {
            Light = 1,
            /// The dark one.
            Dark = 4,
        }
    }

    csv_record! {
        #[derive(Debug, Default, PartialEq)]
        struct Swatch {
            /// Display label.
            label: String => 1,
            shade: Option<Shade> => 3,
            pub(crate) weight: f32,
        }
    }

    #[test]
    fn test_enum_members_and_names() {
        assert_eq!(Shade::MEMBERS, &["Light", "Dark"]);
        assert_eq!(Shade::Dark.name(), "Dark");
        assert_eq!(Shade::Dark as i32, 4);
        assert_eq!(Shade::KIND, ValueKind::Enum("Shade"));
    }

    #[test]
    fn test_enum_parse_exact() {
        let config = CodecConfig::default();
        assert_eq!(Shade::from_field("Light", &config).unwrap(), Shade::Light);
        let err = Shade::from_field("LIGHT", &config).unwrap_err();
        assert_eq!(err.value, "LIGHT");
        assert!(err.reason.contains("Light, Dark"));
    }

    #[test]
    fn test_optional_enum() {
        let config = CodecConfig::default();
        assert_eq!(Option::<Shade>::from_field("", &config).unwrap(), None);
        assert_eq!(
            Option::<Shade>::from_field("Dark", &config).unwrap(),
            Some(Shade::Dark)
        );
    }

    #[test]
    fn test_record_declaration_table() {
        assert_eq!(Swatch::record_name(), "Swatch");
        let fields = Swatch::fields();
        let summary: Vec<(&str, Option<usize>)> = fields
            .iter()
            .map(|f| (f.name(), f.index().map(FieldIndex::get)))
            .collect();
        assert_eq!(
            summary,
            vec![("label", Some(1)), ("shade", Some(3)), ("weight", None)]
        );
        assert!(fields[1].field_type().nullable);
        assert_eq!(fields[1].field_type().kind, ValueKind::Enum("Shade"));
    }

    #[test]
    fn test_str_enum_parse_and_display() {
        use crate::codec::config::Newline;

        assert_eq!("CRLF".parse::<Newline>().unwrap(), Newline::CrLf);
        assert_eq!(Newline::Lf.to_string(), "lf");
        let err = "cr".parse::<Newline>().unwrap_err();
        assert!(err.to_string().contains("newline"));
    }
}
