use jsonbind::{
    Boolean, Class, ClassParser, ClassSerializer, CppCommentsPolicy, HashCommentsPolicy,
    JsonContract, JsonWrite, MinifiedPolicy, ParsePolicy, Result, ScalarPolicy, SerializeError,
    SimdPolicy, Text, UncheckedPolicy, Unsigned,
};

#[derive(Debug, PartialEq)]
struct Sample {
    id: u64,
    name: String,
    active: bool,
}

impl<'de> JsonContract<'de> for Sample {
    const MEMBER_NAMES: &'static [&'static str] = &["id", "name", "active"];
    const ALL_MEMBERS_REQUIRED: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let id = cls.member::<Unsigned<u64>>("id")?;
        let name = cls.member::<Text>("name")?;
        let active = cls.member::<Boolean>("active")?;
        Ok(Sample { id, name, active })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Unsigned<u64>>("id", &self.id)?;
        cls.member::<Text>("name", &self.name)?;
        cls.member::<Boolean>("active", &self.active)
    }
}

fn sample() -> Sample {
    Sample {
        id: 17,
        name: "node".into(),
        active: true,
    }
}

#[test]
fn cpp_comments_are_whitespace() {
    let input = r#"
    // leading comment
    {
        "id": 17, /* inline */ "name": "node",
        // the flag
        "active": true
    }"#;
    let parsed =
        jsonbind::from_str_with::<Class<Sample>, CppCommentsPolicy>(input).unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn hash_comments_are_whitespace() {
    let input = "# header\n{\"id\":17,\"name\":\"node\",\n# flag\n\"active\":true}";
    let parsed =
        jsonbind::from_str_with::<Class<Sample>, HashCommentsPolicy>(input).unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn comments_are_rejected_by_default() {
    let input = "{\"id\":17,//x\n\"name\":\"node\",\"active\":true}";
    assert!(jsonbind::from_str::<Class<Sample>>(input).is_err());
}

#[test]
fn minified_policy() {
    let input = r#"{"id":17,"name":"node","active":true}"#;
    let parsed = jsonbind::from_str_with::<Class<Sample>, MinifiedPolicy>(input).unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn exec_modes_agree() {
    let input = r#"  {"name":"a \"quoted\" name","active":false,"id":3}  "#;
    let expected = Sample {
        id: 3,
        name: "a \"quoted\" name".into(),
        active: false,
    };
    assert_eq!(
        jsonbind::from_str::<Class<Sample>>(input).unwrap(),
        expected
    );
    assert_eq!(
        jsonbind::from_str_with::<Class<Sample>, SimdPolicy>(input).unwrap(),
        expected
    );
    assert_eq!(
        jsonbind::from_str_with::<Class<Sample>, ScalarPolicy>(input).unwrap(),
        expected
    );
}

#[test]
fn unchecked_policy_on_well_formed_input() {
    // Out-of-order members exercise the skip-and-memoize path, including
    // the skipped-boolean fast path that reads the literal back out of
    // the skipper's counter.
    let input = r#"{"active":true,"name":"node","id":17}"#;
    let parsed =
        jsonbind::from_str_with::<Class<Sample>, UncheckedPolicy>(input).unwrap();
    assert_eq!(parsed, sample());

    let parsed = jsonbind::from_str_with::<Class<Sample>, UncheckedPolicy>(
        r#"{"id":17,"name":"node","active":true}"#,
    )
    .unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn skip_then_parse_equals_inline_parse() {
    // Each value parsed from a memoized range must equal the value parsed
    // inline, for every shape of sub-document.
    for (doc_in_order, doc_reversed) in [
        (r#"{"id":1,"extra":42}"#, r#"{"extra":42,"id":1}"#),
        (r#"{"id":1,"extra":"s"}"#, r#"{"extra":"s","id":1}"#),
        (r#"{"id":1,"extra":[1,2]}"#, r#"{"extra":[1,2],"id":1}"#),
        (
            r#"{"id":1,"extra":{"a":[{}]}}"#,
            r#"{"extra":{"a":[{}]},"id":1}"#,
        ),
        (r#"{"id":1,"extra":true}"#, r#"{"extra":true,"id":1}"#),
    ] {
        let a = jsonbind::from_str::<Class<Probe>>(doc_in_order).unwrap();
        let b = jsonbind::from_str::<Class<Probe>>(doc_reversed).unwrap();
        assert_eq!(a, b, "for {doc_in_order}");
    }
}

#[derive(Debug, PartialEq)]
struct Probe {
    id: u64,
    extra: String,
}

impl<'de> JsonContract<'de> for Probe {
    const MEMBER_NAMES: &'static [&'static str] = &["id", "extra"];

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let id = cls.member::<Unsigned<u64>>("id")?;
        let extra = cls.member::<jsonbind::Unknown>("extra")?.to_owned();
        Ok(Probe { id, extra })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Unsigned<u64>>("id", &self.id)?;
        cls.member::<Text>("extra", &self.extra)
    }
}
