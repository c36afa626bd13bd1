//! Array parsing.
//!
//! Containers are built through `FromIterator` over an iterator that
//! lazily parses one element per step. When the array was bracket-skipped
//! beforehand, the skip-time comma count seeds the iterator's `size_hint`
//! so collecting can pre-reserve.

use core::marker::PhantomData;

use crate::class::find_member_range;
use crate::error::{ErrorKind, Result};
use crate::member::{BaseKind, JsonMember, MemberKind};
use crate::options::ParsePolicy;
use crate::parse_state::ParseState;
use crate::serialize::{JsonWrite, SerializationPolicy, SerializeError};
use crate::Unsigned;

/// Array member shape: `[…]` of `E` elements collected into `C`.
pub struct List<E, C>(PhantomData<(E, C)>);

impl<'de, E, C> JsonMember<'de> for List<E, C>
where
    E: JsonMember<'de>,
    C: FromIterator<E::Value>,
    for<'a> &'a C: IntoIterator<Item = &'a E::Value>,
{
    type Value = C;
    const KIND: MemberKind = MemberKind::Array;
    const BASE_KIND: BaseKind = BaseKind::Array;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<C> {
        ps.trim_left();
        if !ps.is_opening_bracket_checked() {
            return Err(ps.error(ErrorKind::InvalidArrayStart));
        }
        ps.remove_prefix(1);
        ps.trim_left_unchecked();
        ElementIter::<'_, 'de, P, E>::new(ps, None).collect()
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<C> {
        ps.trim_left();
        if !ps.is_opening_bracket_checked() {
            return Err(ps.error(ErrorKind::InvalidArrayStart));
        }
        let commas = ps.counter;
        ps.remove_prefix(1);
        ps.trim_left_unchecked();
        let hint = if ps.has_more() && ps.front() == b']' {
            0
        } else {
            commas + 1
        };
        ElementIter::<'_, 'de, P, E>::new(ps, Some(hint)).collect()
    }

    fn serialize<W: JsonWrite>(
        value: &C,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        serialize_elements::<E, _, _>(value.into_iter(), out)
    }
}

pub(crate) fn serialize_elements<'v, 'it, M, W, I>(
    elements: I,
    out: &mut SerializationPolicy<'_, W>,
) -> core::result::Result<(), SerializeError>
where
    M: JsonMember<'v>,
    W: JsonWrite,
    I: Iterator<Item = &'it M::Value>,
    M::Value: 'it,
{
    out.put(b'[');
    out.add_indent();
    let mut first = true;
    for element in elements {
        if !first {
            out.put(b',');
        }
        first = false;
        out.next_member();
        M::serialize(element, out)?;
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

/// Lazily parses one element per step. The final step consumes the
/// closing `]` and trailing whitespace.
struct ElementIter<'a, 'de, P: ParsePolicy, E> {
    ps: &'a mut ParseState<'de, P>,
    remaining_hint: Option<usize>,
    done: bool,
    _element: PhantomData<E>,
}

impl<'a, 'de, P: ParsePolicy, E: JsonMember<'de>> ElementIter<'a, 'de, P, E> {
    fn new(ps: &'a mut ParseState<'de, P>, hint: Option<usize>) -> Self {
        ElementIter {
            ps,
            remaining_hint: hint,
            done: false,
            _element: PhantomData,
        }
    }
}

impl<'a, 'de, P: ParsePolicy, E: JsonMember<'de>> Iterator for ElementIter<'a, 'de, P, E> {
    type Item = Result<E::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.ps.trim_left();
        if !self.ps.has_more() {
            self.done = true;
            if P::CHECKED {
                return Some(Err(self.ps.error(ErrorKind::UnexpectedEndOfData)));
            }
            return None;
        }
        if self.ps.front() == b']' {
            self.ps.remove_prefix(1);
            self.ps.trim_left();
            self.done = true;
            return None;
        }
        let value = E::parse(self.ps);
        match value {
            Ok(value) => {
                self.ps.move_next_member_or_end();
                self.remaining_hint = self.remaining_hint.and_then(|h| h.checked_sub(1));
                Some(Ok(value))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining_hint {
            Some(hint) => (hint, Some(hint)),
            None => (0, None),
        }
    }
}

/// Marker naming a dependent member in the enclosing class.
pub trait DependentName {
    /// The member's declared name.
    const NAME: &'static str;
}

/// Array member whose element count is declared by a sibling member of
/// the enclosing class, named by `S`. The count seeds container
/// pre-reserve; under an unchecked policy with known bounds it is
/// verified against the skip-time element count.
pub struct SizedArray<E, S, C>(PhantomData<(E, S, C)>);

impl<'de, E, S, C> JsonMember<'de> for SizedArray<E, S, C>
where
    E: JsonMember<'de>,
    S: DependentName,
    C: FromIterator<E::Value>,
    for<'a> &'a C: IntoIterator<Item = &'a E::Value>,
{
    type Value = C;
    const KIND: MemberKind = MemberKind::SizedArray;
    const BASE_KIND: BaseKind = BaseKind::Array;
    const MUST_BE_CLASS_MEMBER: bool = true;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<C> {
        let size = resolve_size::<P>(ps, S::NAME)?;
        ps.trim_left();
        if !ps.is_opening_bracket_checked() {
            return Err(ps.error(ErrorKind::InvalidArrayStart));
        }
        ps.remove_prefix(1);
        ps.trim_left_unchecked();
        ElementIter::<'_, 'de, P, E>::new(ps, Some(size)).collect()
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<C> {
        let size = resolve_size::<P>(ps, S::NAME)?;
        ps.trim_left();
        if !ps.is_opening_bracket_checked() {
            return Err(ps.error(ErrorKind::InvalidArrayStart));
        }
        let commas = ps.counter;
        ps.remove_prefix(1);
        ps.trim_left_unchecked();
        if !P::CHECKED {
            // Known bounds under an unchecked policy: the skip-time count
            // is authoritative, so the declared size must agree.
            let actual = if ps.has_more() && ps.front() == b']' {
                0
            } else {
                commas + 1
            };
            if actual != size {
                return Err(ps.error(ErrorKind::NumberOutOfRange));
            }
        }
        ElementIter::<'_, 'de, P, E>::new(ps, Some(size)).collect()
    }

    fn serialize<W: JsonWrite>(
        value: &C,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        serialize_elements::<E, _, _>(value.into_iter(), out)
    }
}

/// Parse the dependent count member out of the enclosing class.
fn resolve_size<P: ParsePolicy>(ps: &ParseState<'_, P>, name: &str) -> Result<usize> {
    let found = find_member_range(ps.class_region(), name)?;
    let mut size_ps = found.ok_or_else(|| ps.error(ErrorKind::TagMemberNotFound))?;
    <Unsigned<usize>>::parse_known(&mut size_ps)
}
