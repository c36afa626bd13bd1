//! Ordered-array classes: values constructed from the elements of a JSON
//! array, in declared order, with optional explicit indices leaving gaps.

use core::marker::PhantomData;

use crate::error::{ErrorKind, Result};
use crate::member::{BaseKind, JsonMember, MemberKind};
use crate::options::ParsePolicy;
use crate::parse_state::ParseState;
use crate::serialize::{JsonWrite, SerializationPolicy, SerializeError};
use crate::skip;

/// The schema contract of a tuple-shaped user type (a class encoded as a
/// JSON array).
pub trait TupleContract<'de>: Sized {
    /// True when the array must contain exactly the declared elements.
    const ALL_MEMBERS_REQUIRED: bool = false;

    /// Parse each element in declared order via [`TupleParser::element`]
    /// or [`TupleParser::element_at`], then construct the value.
    fn parse_elements<P: ParsePolicy>(tp: &mut TupleParser<'_, 'de, P>) -> Result<Self>;

    /// Write each element, in declared order.
    fn serialize_elements<W: JsonWrite>(
        &self,
        tp: &mut TupleSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError>;
}

/// Tuple member shape: `[…]` parsed through `T`'s [`TupleContract`].
pub struct Tuple<T>(PhantomData<T>);

impl<'de, T: TupleContract<'de>> JsonMember<'de> for Tuple<T> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Tuple;
    const BASE_KIND: BaseKind = BaseKind::Array;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        ps.trim_left();
        if !ps.is_opening_bracket_checked() {
            return Err(ps.error(ErrorKind::InvalidArrayStart));
        }
        let old_class_pos = ps.get_class_position();
        ps.remove_prefix(1);
        ps.set_class_position_here();
        ps.trim_left();

        let mut tp = TupleParser { ps, index: 0 };
        let value = T::parse_elements(&mut tp)?;

        if T::ALL_MEMBERS_REQUIRED {
            ps.trim_left();
            if P::CHECKED && !(ps.has_more() && ps.front() == b']') {
                return Err(ps.error(ErrorKind::UnknownMember));
            }
            ps.remove_prefix(1);
            ps.trim_left();
        } else {
            ps.skip_array()?;
        }
        ps.set_class_position(old_class_pos);
        Ok(value)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'[');
        out.add_indent();
        let mut tp = TupleSerializer {
            policy: out,
            first: true,
        };
        value.serialize_elements(&mut tp)?;
        let wrote_any = !tp.first;
        out.del_indent();
        if wrote_any {
            if out.output_trailing_comma() {
                out.put(b',');
            }
            out.next_member();
        }
        out.put(b']');
        Ok(())
    }
}

/// Per-activation state handed to [`TupleContract::parse_elements`].
pub struct TupleParser<'a, 'de, P: ParsePolicy> {
    ps: &'a mut ParseState<'de, P>,
    index: usize,
}

impl<'a, 'de, P: ParsePolicy> TupleParser<'a, 'de, P> {
    /// Parse the next element.
    pub fn element<M: JsonMember<'de>>(&mut self) -> Result<M::Value> {
        self.ps.move_next_member_or_end();
        if P::CHECKED && !self.ps.has_more() {
            return Err(self.ps.error(ErrorKind::UnexpectedEndOfData));
        }
        self.index += 1;
        self.parse_current::<M>()
    }

    /// Parse the element at an explicit array index, skipping intervening
    /// elements. A nullable member whose index lies past the array's end
    /// receives the null value without advancing.
    pub fn element_at<M: JsonMember<'de>>(&mut self, index: usize) -> Result<M::Value> {
        self.ps.move_next_member_or_end();
        if index < self.index {
            return Err(self.ps.error(ErrorKind::OutOfOrderOrderedMembers));
        }
        while self.index < index {
            if P::CHECKED && !self.ps.has_more() {
                return Err(self.ps.error(ErrorKind::UnexpectedEndOfData));
            }
            if self.ps.front() == b']' {
                break;
            }
            skip::skip_value(self.ps)?;
            self.ps.move_next_member_or_end();
            self.index += 1;
        }
        if P::CHECKED && !self.ps.has_more() {
            return Err(self.ps.error(ErrorKind::UnexpectedEndOfData));
        }
        self.index += 1;
        self.parse_current::<M>()
    }

    fn parse_current<M: JsonMember<'de>>(&mut self) -> Result<M::Value> {
        if self.ps.front() == b']' {
            return if M::NULLABLE {
                M::parse_missing(self.ps)
            } else {
                Err(self.ps.error(ErrorKind::MissingMember))
            };
        }
        M::parse(self.ps)
    }
}

/// Per-activation state handed to [`TupleContract::serialize_elements`].
pub struct TupleSerializer<'a, 'w, W: JsonWrite> {
    policy: &'a mut SerializationPolicy<'w, W>,
    first: bool,
}

impl<'a, 'w, W: JsonWrite> TupleSerializer<'a, 'w, W> {
    /// Write one element.
    pub fn element<'v, M: JsonMember<'v>>(
        &mut self,
        value: &M::Value,
    ) -> core::result::Result<(), SerializeError> {
        if !self.first {
            self.policy.put(b',');
        }
        self.first = false;
        self.policy.next_member();
        M::serialize(value, self.policy)
    }
}
