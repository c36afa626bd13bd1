//! Variant parsing: untagged (dispatch on the first significant byte),
//! tagged (the discriminant lives in a sibling member of the enclosing
//! class), and intrusive (the discriminant lives inside the value itself).

use core::marker::PhantomData;

use log::trace;

use crate::class::find_member_range;
use crate::error::{ErrorKind, Result};
use crate::member::{BaseKind, JsonMember, MemberKind};
use crate::options::ParsePolicy;
use crate::parse_state::ParseState;
use crate::serialize::{JsonWrite, SerializationPolicy, SerializeError};

/// Alternatives of an untagged variant: one registered parser per
/// observed [`BaseKind`].
pub trait VariantAlternatives<'de> {
    /// The materialized sum type.
    type Value;

    /// Parse the alternative registered for `kind`. Return
    /// [`ErrorKind::UnexpectedJsonVariantType`] for kinds without a
    /// registered alternative. `known_bounds` is forwarded from the
    /// caller; pass it to [`crate::parse_shape`].
    fn parse_kind<P: ParsePolicy>(
        kind: BaseKind,
        ps: &mut ParseState<'de, P>,
        known_bounds: bool,
    ) -> Result<Self::Value>;

    /// Write the active alternative.
    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError>;
}

/// Untagged variant member shape.
pub struct Variant<A>(PhantomData<A>);

fn base_kind_of<P: ParsePolicy>(ps: &ParseState<'_, P>) -> Result<BaseKind> {
    match ps.front() {
        b'{' => Ok(BaseKind::Class),
        b'[' => Ok(BaseKind::Array),
        b't' | b'f' => Ok(BaseKind::Bool),
        b'"' => Ok(BaseKind::String),
        b'0'..=b'9' | b'+' | b'-' => Ok(BaseKind::Number),
        _ => Err(ps.error(ErrorKind::InvalidStartOfValue)),
    }
}

impl<'de, A: VariantAlternatives<'de>> JsonMember<'de> for Variant<A> {
    type Value = A::Value;
    const KIND: MemberKind = MemberKind::Variant;
    const BASE_KIND: BaseKind = BaseKind::Class;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        ps.trim_left();
        if P::CHECKED && !ps.has_more() {
            return Err(ps.error(ErrorKind::UnexpectedEndOfData));
        }
        let kind = base_kind_of(ps)?;
        trace!("untagged variant dispatching on {kind:?}");
        A::parse_kind(kind, ps, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        // The skipper trims the quotes off strings, so a skipped string
        // range is recognized by the byte before it.
        if ps.prev_byte() == Some(b'"') {
            return A::parse_kind(BaseKind::String, ps, true);
        }
        if P::CHECKED && !ps.has_more() {
            return Err(ps.error(ErrorKind::UnexpectedEndOfData));
        }
        let kind = base_kind_of(ps)?;
        A::parse_kind(kind, ps, true)
    }

    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        A::serialize(value, out)
    }
}

/// Alternatives of a tagged variant: the tag member's shape and name, the
/// switcher mapping tag values to alternative indices, and one parser per
/// index.
pub trait TaggedAlternatives<'de> {
    /// The materialized sum type.
    type Value;

    /// Shape of the tag member.
    type Tag: JsonMember<'de>;

    /// Name of the tag member.
    const TAG_NAME: &'static str;

    /// Map a parsed tag to the zero-based alternative index, or `None`
    /// when the tag matches no alternative.
    fn switch(tag: &<Self::Tag as JsonMember<'de>>::Value) -> Option<usize>;

    /// Parse the `index`-th alternative from the cursor.
    fn parse_index<P: ParsePolicy>(
        index: usize,
        ps: &mut ParseState<'de, P>,
    ) -> Result<Self::Value>;

    /// Write the active alternative.
    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError>;
}

/// Variant member whose tag is a sibling member of the enclosing class.
pub struct VariantTagged<A>(PhantomData<A>);

fn switch_on_tag<'de, A: TaggedAlternatives<'de>, P: ParsePolicy>(
    tag_range: Option<ParseState<'de, P>>,
    ps: &ParseState<'de, P>,
) -> Result<usize> {
    let mut tag_ps = tag_range.ok_or_else(|| ps.error(ErrorKind::TagMemberNotFound))?;
    let tag = A::Tag::parse_known(&mut tag_ps)?;
    let index = A::switch(&tag).ok_or_else(|| ps.error(ErrorKind::UnexpectedJsonVariantType))?;
    trace!(
        "tag member `{}` selected alternative {index}",
        A::TAG_NAME
    );
    Ok(index)
}

impl<'de, A: TaggedAlternatives<'de>> JsonMember<'de> for VariantTagged<A> {
    type Value = A::Value;
    const KIND: MemberKind = MemberKind::VariantTagged;
    const BASE_KIND: BaseKind = BaseKind::Class;
    const MUST_BE_CLASS_MEMBER: bool = true;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        let tag_range = find_member_range(ps.class_region(), A::TAG_NAME)?;
        let index = switch_on_tag::<A, P>(tag_range, ps)?;
        A::parse_index(index, ps)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        Self::parse(ps)
    }

    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        A::serialize(value, out)
    }
}

/// Variant member whose tag lives inside the value's own object: the
/// object is parsed twice, once for the tag and once as the selected
/// alternative.
pub struct VariantIntrusive<A>(PhantomData<A>);

impl<'de, A: TaggedAlternatives<'de>> JsonMember<'de> for VariantIntrusive<A> {
    type Value = A::Value;
    const KIND: MemberKind = MemberKind::VariantIntrusive;
    const BASE_KIND: BaseKind = BaseKind::Class;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        ps.trim_left();
        let mut probe = *ps;
        if !probe.is_opening_brace_checked() {
            return Err(probe.error(ErrorKind::InvalidClassStart));
        }
        probe.remove_prefix(1);
        let tag_range = find_member_range(probe, A::TAG_NAME)?;
        let index = switch_on_tag::<A, P>(tag_range, ps)?;
        A::parse_index(index, ps)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        Self::parse(ps)
    }

    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        A::serialize(value, out)
    }
}
