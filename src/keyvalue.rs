//! Key-value containers: JSON objects whose member names are data, and
//! arrays of `{"key":…,"value":…}` tagged objects.

use core::marker::PhantomData;

use crate::class::read_member_name;
use crate::error::{ErrorKind, Result};
use crate::member::{BaseKind, JsonMember, MemberKind};
use crate::options::ParsePolicy;
use crate::parse_state::ParseState;
use crate::serialize::{JsonWrite, SerializationPolicy, SerializeError};
use crate::skip;

/// Key-value member shape: `{…}` whose member names become keys. `K` is
/// applied to each quoted name token, `V` to each value.
pub struct KeyValue<K, V, C>(PhantomData<(K, V, C)>);

impl<'de, K, V, C> JsonMember<'de> for KeyValue<K, V, C>
where
    K: JsonMember<'de>,
    V: JsonMember<'de>,
    C: FromIterator<(K::Value, V::Value)>,
    for<'a> &'a C: IntoIterator<Item = (&'a K::Value, &'a V::Value)>,
{
    type Value = C;
    const KIND: MemberKind = MemberKind::KeyValue;
    const BASE_KIND: BaseKind = BaseKind::Class;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<C> {
        ps.trim_left();
        if !ps.is_opening_brace_checked() {
            return Err(ps.error(ErrorKind::ExpectedKeyValueToStartWithBrace));
        }
        ps.remove_prefix(1);
        ps.trim_left();
        PairIter::<'_, 'de, P, K, V>::new(ps).collect()
    }

    fn serialize<W: JsonWrite>(
        value: &C,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'{');
        out.add_indent();
        let mut first = true;
        for (key, val) in value.into_iter() {
            if !first {
                out.put(b',');
            }
            first = false;
            out.next_member();
            K::serialize(key, out)?;
            out.put_colon();
            V::serialize(val, out)?;
        }
        out.del_indent();
        if !first {
            if out.output_trailing_comma() {
                out.put(b',');
            }
            out.next_member();
        }
        out.put(b'}');
        Ok(())
    }
}

/// Lazily parses `(key, value)` pairs out of an object body.
struct PairIter<'a, 'de, P: ParsePolicy, K, V> {
    ps: &'a mut ParseState<'de, P>,
    done: bool,
    _pair: PhantomData<(K, V)>,
}

impl<'a, 'de, P: ParsePolicy, K, V> PairIter<'a, 'de, P, K, V> {
    fn new(ps: &'a mut ParseState<'de, P>) -> Self {
        PairIter {
            ps,
            done: false,
            _pair: PhantomData,
        }
    }
}

impl<'a, 'de, P, K, V> Iterator for PairIter<'a, 'de, P, K, V>
where
    P: ParsePolicy,
    K: JsonMember<'de>,
    V: JsonMember<'de>,
{
    type Item = Result<(K::Value, V::Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let pair = self.next_pair();
        if !matches!(pair, Some(Ok(_))) {
            self.done = true;
        }
        pair
    }
}

impl<'a, 'de, P, K, V> PairIter<'a, 'de, P, K, V>
where
    P: ParsePolicy,
    K: JsonMember<'de>,
    V: JsonMember<'de>,
{
    fn next_pair(&mut self) -> Option<Result<(K::Value, V::Value)>> {
        self.ps.trim_left();
        if !self.ps.has_more() {
            if P::CHECKED {
                return Some(Err(self.ps.error(ErrorKind::UnexpectedEndOfData)));
            }
            return None;
        }
        if self.ps.front() == b'}' {
            self.ps.remove_prefix(1);
            self.ps.trim_left();
            return None;
        }
        // The key is the quoted member name; hand `K` the whole token
        // including its quotes.
        if P::CHECKED && self.ps.front() != b'"' {
            return Some(Err(self
                .ps
                .error(ErrorKind::MissingMemberNameOrEndOfClass)));
        }
        let key_start = self.ps.offset();
        if let Err(e) = skip::skip_string(self.ps) {
            return Some(Err(e));
        }
        let mut key_ps = self.ps.subrange(key_start, self.ps.offset());
        let key = match K::parse(&mut key_ps) {
            Ok(key) => key,
            Err(e) => return Some(Err(e)),
        };
        self.ps.trim_left();
        if P::CHECKED && !(self.ps.has_more() && self.ps.front() == b':') {
            return Some(Err(self
                .ps
                .error(ErrorKind::MissingMemberNameOrEndOfClass)));
        }
        self.ps.remove_prefix(1);
        self.ps.trim_left();
        let value = match V::parse(self.ps) {
            Ok(value) => value,
            Err(e) => return Some(Err(e)),
        };
        self.ps.move_next_member_or_end();
        Some(Ok((key, value)))
    }
}

/// Names of the two members of each tagged pair object.
pub trait KvNames {
    /// The key member's name.
    const KEY: &'static str = "key";
    /// The value member's name.
    const VALUE: &'static str = "value";
}

/// The default `"key"`/`"value"` member names.
pub struct DefaultKvNames;

impl KvNames for DefaultKvNames {}

/// Key-value-array member shape: `[{"key":…,"value":…},…]`. The two
/// member names are configurable through `N`.
pub struct KeyValueArray<K, V, C, N = DefaultKvNames>(PhantomData<(K, V, C, N)>);

impl<'de, K, V, C, N> JsonMember<'de> for KeyValueArray<K, V, C, N>
where
    K: JsonMember<'de>,
    V: JsonMember<'de>,
    C: FromIterator<(K::Value, V::Value)>,
    for<'a> &'a C: IntoIterator<Item = (&'a K::Value, &'a V::Value)>,
    N: KvNames,
{
    type Value = C;
    const KIND: MemberKind = MemberKind::KeyValueArray;
    const BASE_KIND: BaseKind = BaseKind::Array;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<C> {
        ps.trim_left();
        if !ps.is_opening_bracket_checked() {
            return Err(ps.error(ErrorKind::ExpectedKeyValueArrayToStartWithBracket));
        }
        ps.remove_prefix(1);
        TaggedPairIter::<'_, 'de, P, K, V, N>::new(ps).collect()
    }

    fn serialize<W: JsonWrite>(
        value: &C,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'[');
        out.add_indent();
        let mut first = true;
        for (key, val) in value.into_iter() {
            if !first {
                out.put(b',');
            }
            first = false;
            out.next_member();
            out.put(b'{');
            out.add_indent();
            out.next_member();
            out.write_member_name(N::KEY);
            K::serialize(key, out)?;
            out.put(b',');
            out.next_member();
            out.write_member_name(N::VALUE);
            V::serialize(val, out)?;
            out.del_indent();
            out.next_member();
            out.put(b'}');
        }
        out.del_indent();
        if !first {
            if out.output_trailing_comma() {
                out.put(b',');
            }
            out.next_member();
        }
        out.put(b']');
        Ok(())
    }
}

/// Lazily parses `(key, value)` pairs out of an array of tagged objects.
/// The two members of each object may appear in either order.
struct TaggedPairIter<'a, 'de, P: ParsePolicy, K, V, N> {
    ps: &'a mut ParseState<'de, P>,
    done: bool,
    _pair: PhantomData<(K, V, N)>,
}

impl<'a, 'de, P: ParsePolicy, K, V, N> TaggedPairIter<'a, 'de, P, K, V, N> {
    fn new(ps: &'a mut ParseState<'de, P>) -> Self {
        TaggedPairIter {
            ps,
            done: false,
            _pair: PhantomData,
        }
    }
}

impl<'a, 'de, P, K, V, N> Iterator for TaggedPairIter<'a, 'de, P, K, V, N>
where
    P: ParsePolicy,
    K: JsonMember<'de>,
    V: JsonMember<'de>,
    N: KvNames,
{
    type Item = Result<(K::Value, V::Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let pair = self.next_pair();
        if !matches!(pair, Some(Ok(_))) {
            self.done = true;
        }
        pair
    }
}

impl<'a, 'de, P, K, V, N> TaggedPairIter<'a, 'de, P, K, V, N>
where
    P: ParsePolicy,
    K: JsonMember<'de>,
    V: JsonMember<'de>,
    N: KvNames,
{
    fn next_pair(&mut self) -> Option<Result<(K::Value, V::Value)>> {
        match self.next_pair_inner() {
            Ok(pair) => pair.map(Ok),
            Err(e) => Some(Err(e)),
        }
    }

    fn next_pair_inner(&mut self) -> Result<Option<(K::Value, V::Value)>> {
        self.ps.trim_left();
        if P::CHECKED && !self.ps.has_more() {
            return Err(self.ps.error(ErrorKind::UnexpectedEndOfData));
        }
        if self.ps.front() == b']' {
            self.ps.remove_prefix(1);
            self.ps.trim_left();
            return Ok(None);
        }
        if !self.ps.is_opening_brace_checked() {
            return Err(self.ps.error(ErrorKind::InvalidClassStart));
        }
        self.ps.remove_prefix(1);
        self.ps.trim_left();

        let first_name = read_member_name(self.ps)?;
        let (key, value) = if first_name == N::KEY.as_bytes() {
            let key = K::parse(self.ps)?;
            self.ps.move_next_member_or_end();
            let second_name = read_member_name(self.ps)?;
            if second_name != N::VALUE.as_bytes() {
                return Err(self.ps.error(ErrorKind::MissingMember));
            }
            (key, V::parse(self.ps)?)
        } else if first_name == N::VALUE.as_bytes() {
            let value = V::parse(self.ps)?;
            self.ps.move_next_member_or_end();
            let second_name = read_member_name(self.ps)?;
            if second_name != N::KEY.as_bytes() {
                return Err(self.ps.error(ErrorKind::MissingMember));
            }
            (K::parse(self.ps)?, value)
        } else {
            return Err(self.ps.error(ErrorKind::UnknownMember));
        };

        self.ps.trim_left();
        if P::CHECKED && !(self.ps.has_more() && self.ps.front() == b'}') {
            return Err(self.ps.error(ErrorKind::UnknownMember));
        }
        self.ps.remove_prefix(1);
        self.ps.move_next_member_or_end();
        Ok(Some((key, value)))
    }
}
