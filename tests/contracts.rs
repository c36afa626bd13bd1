use chrono::{DateTime, Utc};
use jsonbind::{
    Class, ClassParser, ClassSerializer, ErrorKind, Iso8601, JsonContract, JsonWrite, Nullable,
    ParsePolicy, Result, SerializeError, Signed, Text, Unsigned,
};

#[derive(Debug, PartialEq)]
struct LogEntry {
    name: String,
    timestamp: DateTime<Utc>,
}

impl<'de> JsonContract<'de> for LogEntry {
    const MEMBER_NAMES: &'static [&'static str] = &["name", "timestamp"];
    const ALL_MEMBERS_REQUIRED: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let name = cls.member::<Text>("name")?;
        let timestamp = cls.member::<Iso8601>("timestamp")?;
        Ok(LogEntry { name, timestamp })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Text>("name", &self.name)?;
        cls.member::<Iso8601>("timestamp", &self.timestamp)
    }
}

#[test]
fn name_and_timestamp() {
    let input = r#"{"name":"Toronto","timestamp":"2020-02-01T01:02:03.456Z"}"#;
    let entry = jsonbind::from_str::<Class<LogEntry>>(input).unwrap();
    assert_eq!(entry.name, "Toronto");
    assert_eq!(entry.timestamp.timestamp_millis(), 1_580_518_923_456);

    let text = jsonbind::to_string::<Class<LogEntry>>(&entry);
    assert_eq!(text, input);
    let again = jsonbind::from_str::<Class<LogEntry>>(&text).unwrap();
    assert_eq!(again, entry);
}

#[derive(Debug, PartialEq)]
struct Pair {
    a: u32,
    b: u32,
}

impl<'de> JsonContract<'de> for Pair {
    const MEMBER_NAMES: &'static [&'static str] = &["a", "b"];
    const ALL_MEMBERS_REQUIRED: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let a = cls.member::<Unsigned<u32>>("a")?;
        let b = cls.member::<Unsigned<u32>>("b")?;
        Ok(Pair { a, b })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Unsigned<u32>>("a", &self.a)?;
        cls.member::<Unsigned<u32>>("b", &self.b)
    }
}

#[test]
fn members_out_of_order() {
    let pair = jsonbind::from_str::<Class<Pair>>(r#"{"b":2,"a":1}"#).unwrap();
    assert_eq!(pair, Pair { a: 1, b: 2 });

    let minified = jsonbind::to_string::<Class<Pair>>(&pair);
    assert_eq!(minified, r#"{"a":1,"b":2}"#);
    let again = jsonbind::from_str::<Class<Pair>>(&minified).unwrap();
    assert_eq!(again, pair);
}

#[test]
fn member_order_is_irrelevant() {
    for permutation in [
        r#"{"a":1,"b":2}"#,
        r#"{"b":2,"a":1}"#,
        r#" { "b" : 2 , "a" : 1 } "#,
    ] {
        let pair = jsonbind::from_str::<Class<Pair>>(permutation).unwrap();
        assert_eq!(pair, Pair { a: 1, b: 2 });
    }
}

#[test]
fn unknown_member_in_exact_class() {
    let err = jsonbind::from_str::<Class<Pair>>(r#"{"a":1,"c":3,"b":2}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownMember);
}

#[test]
fn missing_required_member() {
    let err = jsonbind::from_str::<Class<Pair>>(r#"{"a":1}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingMember);
    assert_eq!(err.member(), Some("b"));
}

struct MaybeX {
    x: Option<i64>,
}

impl<'de> JsonContract<'de> for MaybeX {
    const MEMBER_NAMES: &'static [&'static str] = &["x"];

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let x = cls.member::<Nullable<Signed<i64>>>("x")?;
        Ok(MaybeX { x })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Nullable<Signed<i64>>>("x", &self.x)
    }
}

#[derive(Debug)]
struct RequiredX {
    #[allow(dead_code)]
    x: i64,
}

impl<'de> JsonContract<'de> for RequiredX {
    const MEMBER_NAMES: &'static [&'static str] = &["x"];
    const ALL_MEMBERS_REQUIRED: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let x = cls.member::<Signed<i64>>("x")?;
        Ok(RequiredX { x })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Signed<i64>>("x", &self.x)
    }
}

#[test]
fn null_against_nullable_and_required() {
    let parsed = jsonbind::from_str::<Class<MaybeX>>(r#"{"x":null}"#).unwrap();
    assert_eq!(parsed.x, None);

    let parsed = jsonbind::from_str::<Class<MaybeX>>(r#"{}"#).unwrap();
    assert_eq!(parsed.x, None);

    let parsed = jsonbind::from_str::<Class<MaybeX>>(r#"{"x":7}"#).unwrap();
    assert_eq!(parsed.x, Some(7));

    let err = jsonbind::from_str::<Class<RequiredX>>(r#"{"x":null}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingMember);
}

#[test]
fn nullable_serializes_as_null() {
    let text = jsonbind::to_string::<Class<MaybeX>>(&MaybeX { x: None });
    assert_eq!(text, r#"{"x":null}"#);
    let text = jsonbind::to_string::<Class<MaybeX>>(&MaybeX { x: Some(-3) });
    assert_eq!(text, r#"{"x":-3}"#);
}

#[derive(Debug, PartialEq)]
struct Inner {
    value: u64,
}

impl<'de> JsonContract<'de> for Inner {
    const MEMBER_NAMES: &'static [&'static str] = &["value"];
    const ALL_MEMBERS_REQUIRED: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let value = cls.member::<Unsigned<u64>>("value")?;
        Ok(Inner { value })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Unsigned<u64>>("value", &self.value)
    }
}

#[derive(Debug, PartialEq)]
struct Outer {
    label: String,
    first: Inner,
    second: Inner,
}

impl<'de> JsonContract<'de> for Outer {
    const MEMBER_NAMES: &'static [&'static str] = &["label", "first", "second"];
    const ALL_MEMBERS_REQUIRED: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let label = cls.member::<Text>("label")?;
        let first = cls.member::<Class<Inner>>("first")?;
        let second = cls.member::<Class<Inner>>("second")?;
        Ok(Outer {
            label,
            first,
            second,
        })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Text>("label", &self.label)?;
        cls.member::<Class<Inner>>("first", &self.first)?;
        cls.member::<Class<Inner>>("second", &self.second)
    }
}

#[test]
fn nested_classes_in_any_order() {
    let expected = Outer {
        label: "pair".into(),
        first: Inner { value: 1 },
        second: Inner { value: 2 },
    };

    let in_order =
        r#"{"label":"pair","first":{"value":1},"second":{"value":2}}"#;
    assert_eq!(
        jsonbind::from_str::<Class<Outer>>(in_order).unwrap(),
        expected
    );

    let scrambled =
        r#"{"second":{"value":2},"label":"pair","first":{"value":1}}"#;
    assert_eq!(
        jsonbind::from_str::<Class<Outer>>(scrambled).unwrap(),
        expected
    );

    assert_eq!(jsonbind::to_string::<Class<Outer>>(&expected), in_order);
}

#[test]
fn pretty_input_parses() {
    let input = "{\n  \"a\": 1,\n  \"b\": 2\n}";
    let pair = jsonbind::from_str::<Class<Pair>>(input).unwrap();
    assert_eq!(pair, Pair { a: 1, b: 2 });
}

#[test]
fn malformed_class_start() {
    let err = jsonbind::from_str::<Class<Pair>>(r#"["a",1]"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidClassStart);
}

#[test]
fn truncated_document() {
    let err = jsonbind::from_str::<Class<Pair>>(r#"{"a":1,"b"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEndOfData);
}
