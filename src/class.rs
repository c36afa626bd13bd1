//! Class parsing: contracts, the member locator, and class serialization.
//!
//! The parser runs left-to-right when the document's member order matches
//! the contract order. On a mismatch it scans ahead, memoizing the skipped
//! range of every declared member it passes, so each value is still parsed
//! exactly once — from the live cursor when in order, from its memoized
//! range otherwise.

use core::marker::PhantomData;

use log::trace;
use smallvec::SmallVec;

use crate::error::{ErrorKind, Result};
use crate::member::{BaseKind, JsonMember, MemberKind};
use crate::options::ParsePolicy;
use crate::parse_state::ParseState;
use crate::serialize::{JsonWrite, SerializationPolicy, SerializeError};
use crate::skip;

/// The schema contract of a class-shaped user type.
///
/// Declared member names must be unique. `parse_members` must call
/// [`ClassParser::member`] once per declared member, in declaration order,
/// and then construct the value; `serialize_members` mirrors it.
pub trait JsonContract<'de>: Sized {
    /// Declared member names, in contract order.
    const MEMBER_NAMES: &'static [&'static str];

    /// True when every declared member is required. Such classes are
    /// *exact*: a member not named by the contract is an error, and the
    /// class exit expects the closing `}` directly.
    ///
    /// Declare this `true` only when no member is nullable; the parser
    /// asserts that in debug builds. Leaving it `false` on an
    /// all-required contract is allowed and keeps the class lenient
    /// (unknown members are skipped).
    const ALL_MEMBERS_REQUIRED: bool = false;

    /// True when any member rewinds within the enclosing class (tagged
    /// variants, sized arrays); enables class-position save/restore
    /// around member parses.
    ///
    /// Must be declared whenever any member has
    /// [`JsonMember::MUST_BE_CLASS_MEMBER`]; the parser asserts that in
    /// debug builds, since such a member parses against the wrong class
    /// window otherwise.
    const NEEDS_CLASS_POSITIONS: bool = false;

    /// Parse each member into a local, in contract order, and construct
    /// the value.
    fn parse_members<P: ParsePolicy>(cls: &mut ClassParser<'_, 'de, P>) -> Result<Self>;

    /// Write each member, in contract order.
    fn serialize_members<W: JsonWrite>(
        &self,
        cls: &mut ClassSerializer<'_, '_, W>,
    ) -> core::result::Result<(), SerializeError>;
}

/// Class member shape: `{…}` parsed through `T`'s [`JsonContract`].
pub struct Class<T>(PhantomData<T>);

impl<'de, T: JsonContract<'de>> JsonMember<'de> for Class<T> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Class;
    const BASE_KIND: BaseKind = BaseKind::Class;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        ps.trim_left();
        if !ps.is_opening_brace_checked() {
            return Err(ps.error(ErrorKind::InvalidClassStart));
        }
        let old_class_pos = ps.get_class_position();
        ps.remove_prefix(1);
        ps.set_class_position_here();
        ps.trim_left();

        let mut cls = ClassParser::new(
            ps,
            T::MEMBER_NAMES,
            T::ALL_MEMBERS_REQUIRED,
            T::NEEDS_CLASS_POSITIONS,
        );
        let value = T::parse_members(&mut cls)?;
        class_cleanup(ps, old_class_pos, T::ALL_MEMBERS_REQUIRED)?;
        Ok(value)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'{');
        out.add_indent();
        let mut cls = ClassSerializer {
            policy: out,
            first: true,
        };
        value.serialize_members(&mut cls)?;
        let wrote_any = !cls.first;
        out.del_indent();
        if wrote_any {
            if out.output_trailing_comma() {
                out.put(b',');
            }
            out.next_member();
        }
        out.put(b'}');
        Ok(())
    }
}

/// Leave the cursor just past the class's closing brace, restore the
/// previous class position.
fn class_cleanup<P: ParsePolicy>(
    ps: &mut ParseState<'_, P>,
    old_class_pos: (usize, usize),
    exact: bool,
) -> Result<()> {
    if P::CHECKED && !ps.has_more() {
        return Err(ps.error(ErrorKind::UnexpectedEndOfData));
    }
    ps.move_next_member_or_end();
    // The contract may be fulfilled before every document member was seen.
    ps.move_to_next_class_member()?;
    if exact {
        if P::CHECKED && ps.front() != b'}' {
            return Err(ps.error(ErrorKind::UnknownMember));
        }
        ps.remove_prefix(1);
    } else {
        ps.skip_class()?;
    }
    ps.trim_left();
    ps.set_class_position(old_class_pos);
    Ok(())
}

/// Where the locator found a member.
enum Find<'de, P: ParsePolicy> {
    /// The cursor sits at the member's value.
    Live,
    /// The member was skipped earlier; parse from its memoized range.
    Saved(ParseState<'de, P>),
    /// The class closed without the member appearing.
    Missing,
}

type Locations<'de, P> = SmallVec<[Option<ParseState<'de, P>>; 8]>;

/// Per-activation state handed to [`JsonContract::parse_members`].
pub struct ClassParser<'a, 'de, P: ParsePolicy> {
    ps: &'a mut ParseState<'de, P>,
    names: &'static [&'static str],
    locations: Locations<'de, P>,
    position: usize,
    all_required: bool,
    needs_positions: bool,
}

impl<'a, 'de, P: ParsePolicy> ClassParser<'a, 'de, P> {
    fn new(
        ps: &'a mut ParseState<'de, P>,
        names: &'static [&'static str],
        all_required: bool,
        needs_positions: bool,
    ) -> Self {
        debug_assert!(
            names
                .iter()
                .enumerate()
                .all(|(i, n)| !names[..i].contains(n)),
            "contract declares duplicate member names"
        );
        let mut locations = Locations::new();
        locations.resize(names.len(), None);
        ClassParser {
            ps,
            names,
            locations,
            position: 0,
            all_required,
            needs_positions,
        }
    }

    /// Parse the next declared member. `name` must match the declaration
    /// order in [`JsonContract::MEMBER_NAMES`].
    pub fn member<M: JsonMember<'de>>(&mut self, name: &'static str) -> Result<M::Value> {
        let position = self.position;
        self.position += 1;
        debug_assert!(
            position < self.names.len() && self.names[position] == name,
            "members must be parsed in contract order"
        );
        debug_assert!(
            !(self.all_required && M::NULLABLE),
            "`{name}` is nullable, so the contract must not declare ALL_MEMBERS_REQUIRED"
        );
        debug_assert!(
            !M::MUST_BE_CLASS_MEMBER || self.needs_positions,
            "`{name}` rewinds within its class, so the contract must declare NEEDS_CLASS_POSITIONS"
        );

        self.ps.move_next_member_or_end();
        match self.find(position, name)? {
            Find::Live => {
                trace!("member `{name}` found in document order");
                if P::CHECKED
                    && !M::NULLABLE
                    && !matches!(M::KIND, MemberKind::Unknown | MemberKind::Custom)
                    && self.ps.starts_with(b"null")
                {
                    return Err(self.ps.error(ErrorKind::MissingMember).with_member(name));
                }
                let value = if self.needs_positions {
                    let saved = self.ps.get_class_position();
                    let value = M::parse(self.ps);
                    self.ps.set_class_position(saved);
                    value
                } else {
                    M::parse(self.ps)
                };
                value.map_err(|e| e.with_member(name))
            }
            Find::Saved(mut sub) => {
                trace!("member `{name}` parsed from memoized range");
                if sub.is_empty()
                    && !M::NULLABLE
                    && !matches!(M::KIND, MemberKind::Unknown | MemberKind::Custom)
                {
                    // The skipper leaves an empty range for `null`.
                    return Err(self.ps.error(ErrorKind::MissingMember).with_member(name));
                }
                M::parse_known(&mut sub).map_err(|e| e.with_member(name))
            }
            Find::Missing => {
                if M::NULLABLE {
                    M::parse_missing(self.ps)
                } else {
                    Err(self.ps.error(ErrorKind::MissingMember).with_member(name))
                }
            }
        }
    }

    fn find(&mut self, position: usize, name: &'static str) -> Result<Find<'de, P>> {
        if let Some(saved) = self.locations[position].take() {
            return Ok(Find::Saved(saved));
        }
        loop {
            self.ps.trim_left();
            if P::CHECKED && !self.ps.has_more() {
                return Err(self.ps.error(ErrorKind::UnexpectedEndOfData));
            }
            if P::CHECKED && !self.ps.is_at_next_class_member() {
                return Err(self.ps.error(ErrorKind::MissingMemberNameOrEndOfClass));
            }
            if self.ps.front() == b'}' {
                return Ok(Find::Missing);
            }
            let key = read_member_name(self.ps)?;
            if key == name.as_bytes() {
                return Ok(Find::Live);
            }
            match self.names.iter().position(|n| n.as_bytes() == key) {
                Some(index) if self.locations[index].is_none() => {
                    let sub = skip::skip_value(self.ps)?;
                    self.locations[index] = Some(sub);
                }
                Some(_) => {
                    // Duplicate document member; the first occurrence wins.
                    skip::skip_value(self.ps)?;
                }
                None => {
                    if self.all_required {
                        return Err(self.ps.error(ErrorKind::UnknownMember));
                    }
                    skip::skip_value(self.ps)?;
                }
            }
            self.ps.move_next_member_or_end();
        }
    }
}

/// Read `"name"` plus the following `:` at the cursor; returns the raw
/// name bytes. Escaped names are compared verbatim.
pub(crate) fn read_member_name<'de, P: ParsePolicy>(
    ps: &mut ParseState<'de, P>,
) -> Result<&'de [u8]> {
    if P::CHECKED && !ps.is_quotes_checked() {
        return Err(ps.error(ErrorKind::MissingMemberNameOrEndOfClass));
    }
    let name = skip::skip_string(ps)?;
    ps.trim_left();
    if P::CHECKED && !(ps.has_more() && ps.front() == b':') {
        return Err(ps.error(ErrorKind::MissingMemberNameOrEndOfClass));
    }
    ps.remove_prefix(1);
    ps.trim_left();
    Ok(name.data())
}

/// Walk the members of a class body looking for `name`; returns the
/// skipped range of its value. The cursor must sit just inside the
/// opening brace. Used to resolve dependent members (variant tags, sized
/// array counts) out of band.
pub(crate) fn find_member_range<'de, P: ParsePolicy>(
    mut ps: ParseState<'de, P>,
    name: &str,
) -> Result<Option<ParseState<'de, P>>> {
    loop {
        ps.move_next_member_or_end();
        if !ps.has_more() {
            if P::CHECKED {
                return Err(ps.error(ErrorKind::UnexpectedEndOfData));
            }
            return Ok(None);
        }
        if ps.front() == b'}' {
            return Ok(None);
        }
        let key = read_member_name(&mut ps)?;
        let value = skip::skip_value(&mut ps)?;
        if key == name.as_bytes() {
            return Ok(Some(value));
        }
    }
}

/// Per-activation state handed to [`JsonContract::serialize_members`].
pub struct ClassSerializer<'a, 'w, W: JsonWrite> {
    policy: &'a mut SerializationPolicy<'w, W>,
    first: bool,
}

impl<'a, 'w, W: JsonWrite> ClassSerializer<'a, 'w, W> {
    /// Write one named member.
    pub fn member<'v, M: JsonMember<'v>>(
        &mut self,
        name: &str,
        value: &M::Value,
    ) -> core::result::Result<(), SerializeError> {
        if !self.first {
            self.policy.put(b',');
        }
        self.first = false;
        self.policy.next_member();
        self.policy.write_member_name(name);
        M::serialize(value, self.policy)
    }
}
