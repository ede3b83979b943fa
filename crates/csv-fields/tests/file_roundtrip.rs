//! Integration tests: decoding and encoding real files.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use csv_fields::{
    csv_enum, csv_record, CodecConfig, CodecError, CodecResult, ColumnLayout, ConfigError,
    Newline, RecordCodec, SchemaError, TextEncoding,
};

csv_enum! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum Role {
        #[default]
        Engineer,
        Manager,
    }
}

csv_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Person {
        pub name: String => 1,
        pub age: Option<i32> => 2,
        pub role: Role => 3,
    }
}

csv_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct NameAge {
        pub name: String => 1,
        pub age: Option<i32> => 2,
    }
}

csv_record! {
    #[derive(Debug, Default)]
    pub struct HalfMapped {
        pub a: String => 1,
        pub b: String,
    }
}

csv_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Shipment {
        pub id: u64 => 1,
        pub shipped: NaiveDate => 2,
        pub seen_at: DateTime<Utc> => 3,
        pub fragile: bool => 4,
        pub note: Option<String> => 6,
    }
}

fn read_all<R: csv_fields::Record>(codec: &RecordCodec, path: &Path) -> CodecResult<Vec<R>> {
    codec.decode_all::<R>(path)?.collect()
}

#[test]
fn test_decode_people_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    fs::write(&path, "name,age,role\nAlice,30,Engineer\nBob,,Manager\n").unwrap();

    let people: Vec<Person> = read_all(&RecordCodec::new(), &path).unwrap();
    assert_eq!(
        people,
        vec![
            Person {
                name: "Alice".into(),
                age: Some(30),
                role: Role::Engineer,
            },
            Person {
                name: "Bob".into(),
                age: None,
                role: Role::Manager,
            },
        ]
    );
}

#[test]
fn test_free_functions_use_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let written = csv_fields::encode_all(
        &path,
        &["name", "age"],
        &[NameAge {
            name: "Alice".into(),
            age: Some(30),
        }],
    )
    .unwrap();
    assert_eq!(written, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");

    let back: Vec<NameAge> = csv_fields::decode_all(&path)
        .unwrap()
        .collect::<CodecResult<_>>()
        .unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].age, Some(30));
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    let codec = RecordCodec::new();
    let people = vec![
        Person {
            name: "Ada".into(),
            age: Some(36),
            role: Role::Manager,
        },
        Person {
            name: "Linus".into(),
            age: None,
            role: Role::Engineer,
        },
        Person::default(),
    ];

    let written = codec
        .encode_all(&path, &["name", "age", "role"], &people)
        .unwrap();
    assert_eq!(written, people.len());
    assert_eq!(read_all::<Person>(&codec, &path).unwrap(), people);
}

#[test]
fn test_round_trip_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bare.csv");
    let codec = RecordCodec::with_config(CodecConfig::default().with_header(false));
    let rows = vec![NameAge {
        name: "x".into(),
        age: Some(-4),
    }];

    codec.encode_all(&path, &[] as &[&str], &rows).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "x,-4\n");
    assert_eq!(read_all::<NameAge>(&codec, &path).unwrap(), rows);
}

#[test]
fn test_round_trip_chrono_and_gaps_positional() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shipments.tsv");
    let codec = RecordCodec::with_config(
        CodecConfig::default()
            .with_delimiter("\t")
            .with_layout(ColumnLayout::Positional)
            .with_newline(Newline::CrLf)
            .with_bom(true),
    );
    let shipments = vec![Shipment {
        id: 7,
        shipped: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        seen_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap(),
        fragile: true,
        note: Some("left at door".into()),
    }];

    let headers = ["id", "shipped", "seen_at", "fragile", "", "note"];
    codec.encode_all(&path, &headers, &shipments).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with('\u{FEFF}'));
    assert!(text.ends_with("7\t2024-03-01\t2024-03-02T08:30:00Z\ttrue\t\tleft at door\r\n"));

    assert_eq!(read_all::<Shipment>(&codec, &path).unwrap(), shipments);
}

#[test]
fn test_compact_layout_shifts_columns_after_gap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compact.csv");
    let codec = RecordCodec::with_config(CodecConfig::default().with_header(false));
    let shipment = Shipment {
        id: 1,
        shipped: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        seen_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        fragile: false,
        note: Some("n".into()),
    };

    codec.encode_all(&path, &[] as &[&str], [&shipment]).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "1,2024-01-01,2024-01-01T00:00:00Z,false,n\n"
    );

    // Column 5 holds the note but no field declares index 5.
    let back = read_all::<Shipment>(&codec, &path).unwrap();
    assert_eq!(back[0].note, None);
}

#[test]
fn test_encode_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(&path, "stale content\nmore stale content\n").unwrap();

    let rows = vec![NameAge {
        name: "new".into(),
        age: None,
    }];
    RecordCodec::new().encode_all(&path, &["name", "age"], &rows).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nnew,\n");
}

#[test]
fn test_encode_empty_sequence_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    let rows: Vec<NameAge> = Vec::new();

    let written = RecordCodec::new().encode_all(&path, &["name", "age"], &rows).unwrap();
    assert_eq!(written, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\n");
}

#[test]
fn test_unpositioned_field_fails_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.csv");
    let codec = RecordCodec::new();

    let err = codec.decode_all::<HalfMapped>(&path).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Schema(SchemaError::MissingPosition {
            record: "HalfMapped",
            field: "b"
        })
    ));

    let rows = vec![HalfMapped::default()];
    let err = codec.encode_all(&path, &["a", "b"], &rows).unwrap_err();
    assert!(matches!(err, CodecError::Schema(_)));
    assert!(!path.exists());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RecordCodec::new()
        .decode_all::<Person>(dir.path().join("absent.csv"))
        .unwrap_err();
    match err {
        CodecError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected I/O error, got {other:?}"),
    }
}

#[test]
fn test_empty_path_is_config_error() {
    let err = csv_fields::decode_all::<Person>("").unwrap_err();
    assert!(matches!(err, CodecError::Config(ConfigError::MissingPath)));
}

#[test]
fn test_bad_row_reports_line_and_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(
        &path,
        "name,age,role\nAlice,30,Engineer\nBob,thirty,Manager\nCy,1,Manager\n",
    )
    .unwrap();

    let results: Vec<_> = RecordCodec::new().decode_all::<Person>(&path).unwrap().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().unwrap_err();
    assert!(err.to_string().starts_with("line 3, field 'age' (column 2)"));
}

#[test]
fn test_config_from_properties_drives_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("semi.csv");
    fs::write(&path, "Alice;30;Manager\n").unwrap();

    let props = [("has.header", "false"), ("delimiter", ";")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = CodecConfig::from_properties(&props).unwrap();
    let people: Vec<Person> = read_all(&RecordCodec::with_config(config), &path).unwrap();
    assert_eq!(people[0].role, Role::Manager);
}

fn shift_jis() -> TextEncoding {
    TextEncoding::for_label("shift_jis").unwrap()
}

#[test]
fn test_shift_jis_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sjis.csv");
    let codec = RecordCodec::with_config(CodecConfig::default().with_encoding(shift_jis()));
    let rows = vec![
        NameAge {
            name: "山田".into(),
            age: Some(41),
        },
        NameAge {
            name: "Ω".into(),
            age: None,
        },
    ];

    codec.encode_all(&path, &["名前", "年齢"], &rows).unwrap();
    let bytes = fs::read(&path).unwrap();
    let (expected, _, _) = shift_jis().encoding().encode("名前,年齢\n山田,41\nΩ,\n");
    assert_eq!(bytes, expected.as_ref());

    assert_eq!(read_all::<NameAge>(&codec, &path).unwrap(), rows);
}

#[test]
fn test_non_utf8_header_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("header.csv");
    let (header, _, _) = shift_jis().encoding().encode("名前,年齢\n");
    let mut bytes = header.into_owned();
    bytes.extend_from_slice(b"Alice,30\n");
    fs::write(&path, bytes).unwrap();

    let rows = read_all::<NameAge>(&RecordCodec::new(), &path).unwrap();
    assert_eq!(
        rows,
        vec![NameAge {
            name: "Alice".into(),
            age: Some(30),
        }]
    );
}

#[test]
fn test_carriage_return_line_endings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classic-mac.csv");
    fs::write(&path, "name,age\rAlice,30\rBob,\r").unwrap();

    let rows = read_all::<NameAge>(&RecordCodec::new(), &path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].age, Some(30));
    assert_eq!(rows[1].name, "Bob");
    assert_eq!(rows[1].age, None);
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_far_index_round_trip_compact() {
    csv_record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Far {
            pub id: u32 => 1,
            pub tail: Option<String> => 1_000_000_000_000,
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("far.csv");
    let codec = RecordCodec::new();
    let descriptor = csv_fields::describe::<Far>().unwrap();
    assert_eq!(descriptor.max_index(), 1_000_000_000_000);

    let rows = vec![Far {
        id: 3,
        tail: Some("t".into()),
    }];
    codec.encode_all(&path, &["id", "tail"], &rows).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "id,tail\n3,t\n");

    // Column 2 is not index 1e12, so the tail is not read back.
    let back = read_all::<Far>(&codec, &path).unwrap();
    assert_eq!(back, vec![Far { id: 3, tail: None }]);
}
