use std::collections::BTreeMap;

use jsonbind::{
    Class, ClassParser, ClassSerializer, DependentName, ErrorKind, JsonContract, JsonWrite,
    KeyValue, KeyValueArray, KvNames, List, Nullable, ParsePolicy, Quoted, Real, Result,
    SerializeError, SizedArray, Text, Tuple, TupleContract, TupleParser, TupleSerializer,
    Unsigned,
};

#[test]
fn arrays_of_scalars() {
    let values: Vec<u32> = jsonbind::array_from_str::<Unsigned<u32>, _>("[1,2,3]").unwrap();
    assert_eq!(values, [1, 2, 3]);

    let empty: Vec<u32> = jsonbind::array_from_str::<Unsigned<u32>, _>("[]").unwrap();
    assert!(empty.is_empty());

    let spaced: Vec<u32> =
        jsonbind::array_from_str::<Unsigned<u32>, _>(" [ 1 , 2 , 3 ] ").unwrap();
    assert_eq!(spaced, [1, 2, 3]);
}

#[test]
fn nested_arrays() {
    let values: Vec<Vec<u32>> =
        jsonbind::array_from_str::<List<Unsigned<u32>, Vec<u32>>, _>("[[1],[2,3],[]]").unwrap();
    assert_eq!(values, [vec![1], vec![2, 3], vec![]]);
}

#[test]
fn array_of_nullables() {
    let values: Vec<Option<u32>> =
        jsonbind::array_from_str::<Nullable<Unsigned<u32>>, _>("[1,null,3]").unwrap();
    assert_eq!(values, [Some(1), None, Some(3)]);
}

#[test]
fn bad_array_start() {
    let err = jsonbind::array_from_str::<Unsigned<u32>, Vec<u32>>("{}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArrayStart);
}

// --- sized arrays ------------------------------------------------------------

struct LenMember;

impl DependentName for LenMember {
    const NAME: &'static str = "len";
}

#[derive(Debug, PartialEq)]
struct Batch {
    len: usize,
    items: Vec<u32>,
}

impl<'de> JsonContract<'de> for Batch {
    const MEMBER_NAMES: &'static [&'static str] = &["len", "items"];
    const ALL_MEMBERS_REQUIRED: bool = true;
    const NEEDS_CLASS_POSITIONS: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let len = cls.member::<Unsigned<usize>>("len")?;
        let items = cls.member::<SizedArray<Unsigned<u32>, LenMember, Vec<u32>>>("items")?;
        Ok(Batch { len, items })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<Unsigned<usize>>("len", &self.len)?;
        cls.member::<SizedArray<Unsigned<u32>, LenMember, Vec<u32>>>("items", &self.items)
    }
}

#[test]
fn sized_array_resolves_its_count_member() {
    let batch =
        jsonbind::from_str::<Class<Batch>>(r#"{"len":3,"items":[10,20,30]}"#).unwrap();
    assert_eq!(
        batch,
        Batch {
            len: 3,
            items: vec![10, 20, 30],
        }
    );

    // The count member may come after the array in the document.
    let batch =
        jsonbind::from_str::<Class<Batch>>(r#"{"items":[10,20,30],"len":3}"#).unwrap();
    assert_eq!(batch.items, [10, 20, 30]);
}

#[derive(Debug)]
struct NoCount {
    #[allow(dead_code)]
    items: Vec<u32>,
}

impl<'de> JsonContract<'de> for NoCount {
    const MEMBER_NAMES: &'static [&'static str] = &["items"];
    const NEEDS_CLASS_POSITIONS: bool = true;

    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self> {
        let items = cls.member::<SizedArray<Unsigned<u32>, LenMember, Vec<u32>>>("items")?;
        Ok(NoCount { items })
    }

    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        cls.member::<SizedArray<Unsigned<u32>, LenMember, Vec<u32>>>("items", &self.items)
    }
}

#[test]
fn sized_array_without_its_count_member() {
    let err = jsonbind::from_str::<Class<NoCount>>(r#"{"items":[1]}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TagMemberNotFound);
}

// --- key-value containers ----------------------------------------------------

#[test]
fn key_value_objects() {
    let map: BTreeMap<String, u64> = jsonbind::from_str::<
        KeyValue<Text, Unsigned<u64>, BTreeMap<String, u64>>,
    >(r#"{"one":1,"two":2}"#)
    .unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["one"], 1);
    assert_eq!(map["two"], 2);

    let text =
        jsonbind::to_string::<KeyValue<Text, Unsigned<u64>, BTreeMap<String, u64>>>(&map);
    assert_eq!(text, r#"{"one":1,"two":2}"#);
}

#[test]
fn key_value_with_numeric_keys() {
    let map: BTreeMap<u32, bool> = jsonbind::from_str::<
        KeyValue<Quoted<Unsigned<u32>>, jsonbind::Boolean, BTreeMap<u32, bool>>,
    >(r#"{"1":true,"2":false}"#)
    .unwrap();
    assert_eq!(map[&1], true);
    assert_eq!(map[&2], false);
}

struct ShortNames;

impl KvNames for ShortNames {
    const KEY: &'static str = "k";
    const VALUE: &'static str = "v";
}

type ShortKvArray = KeyValueArray<Text, Unsigned<u64>, BTreeMap<String, u64>, ShortNames>;

#[test]
fn key_value_arrays() {
    let map: BTreeMap<String, u64> =
        jsonbind::from_str::<ShortKvArray>(r#"[{"k":"a","v":1},{"k":"b","v":2}]"#).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 1);
    assert_eq!(map["b"], 2);

    // Pair members may arrive value-first.
    let map: BTreeMap<String, u64> =
        jsonbind::from_str::<ShortKvArray>(r#"[{"v":1,"k":"a"}]"#).unwrap();
    assert_eq!(map["a"], 1);

    let text = jsonbind::to_string::<ShortKvArray>(&map);
    assert_eq!(text, r#"[{"k":"a","v":1}]"#);
}

#[test]
fn key_value_array_wrong_start() {
    let err = jsonbind::from_str::<ShortKvArray>(r#"{"k":"a"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExpectedKeyValueArrayToStartWithBracket);
}

// --- tuples ------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl<'de> TupleContract<'de> for Point {
    const ALL_MEMBERS_REQUIRED: bool = true;

    fn parse_elements<P: ParsePolicy>(tp: &mut TupleParser<'_, 'de, P>) -> Result<Self> {
        let x = tp.element::<Real>()?;
        let y = tp.element::<Real>()?;
        Ok(Point { x, y })
    }

    fn serialize_elements<W: JsonWrite>(
        &self,
        tp: &mut TupleSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        tp.element::<Real>(&self.x)?;
        tp.element::<Real>(&self.y)
    }
}

#[test]
fn tuple_class() {
    let point = jsonbind::from_str::<Tuple<Point>>("[1.5,2.5]").unwrap();
    assert_eq!(point, Point { x: 1.5, y: 2.5 });

    assert_eq!(jsonbind::to_string::<Tuple<Point>>(&point), "[1.5,2.5]");

    let err = jsonbind::from_str::<Tuple<Point>>("[1.5,2.5,3.5]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownMember);

    let err = jsonbind::from_str::<Tuple<Point>>("[1.5]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingMember);
}

#[derive(Debug, PartialEq)]
struct Sparse {
    first: u32,
    fourth: Option<u32>,
}

impl<'de> TupleContract<'de> for Sparse {
    fn parse_elements<P: ParsePolicy>(tp: &mut TupleParser<'_, 'de, P>) -> Result<Self> {
        let first = tp.element::<Unsigned<u32>>()?;
        let fourth = tp.element_at::<Nullable<Unsigned<u32>>>(3)?;
        Ok(Sparse { first, fourth })
    }

    fn serialize_elements<W: JsonWrite>(
        &self,
        tp: &mut TupleSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError> {
        tp.element::<Unsigned<u32>>(&self.first)?;
        tp.element::<Unsigned<u32>>(&0)?;
        tp.element::<Unsigned<u32>>(&0)?;
        tp.element::<Nullable<Unsigned<u32>>>(&self.fourth)
    }
}

#[test]
fn tuple_with_indexed_members() {
    let sparse = jsonbind::from_str::<Tuple<Sparse>>("[9,0,0,42]").unwrap();
    assert_eq!(
        sparse,
        Sparse {
            first: 9,
            fourth: Some(42),
        }
    );

    // A nullable member whose index lies past the end gets the null form.
    let sparse = jsonbind::from_str::<Tuple<Sparse>>("[9,0]").unwrap();
    assert_eq!(
        sparse,
        Sparse {
            first: 9,
            fourth: None,
        }
    );
}
