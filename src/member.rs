//! Member shapes.
//!
//! A [`JsonMember`] describes the JSON shape of one contract member: which
//! parser decodes it, whether it may be absent, and how it serializes.
//! Shapes are zero-sized compile-time tags; every dispatch through them is
//! resolved statically.

use core::marker::PhantomData;

use alloc::borrow::Cow;
use alloc::string::String;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Error, ErrorKind, Result};
use crate::number::{self, JsonFloat, JsonInteger, Quoting};
use crate::options::ParsePolicy;
use crate::parse_state::{at_end_of_item, ParseState};
use crate::serialize::{JsonWrite, SerializationPolicy, SerializeError};
use crate::skip;
use crate::string;

/// The expected-kind tag of a member shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MemberKind {
    /// Floating-point number.
    Real,
    /// Signed integer.
    Signed,
    /// Unsigned integer.
    Unsigned,
    /// `true`/`false`.
    Bool,
    /// A nullable wrapper around another shape.
    Null,
    /// String returned as a raw view, escapes untouched.
    StringRaw,
    /// String decoded into owned text.
    StringEscaped,
    /// ISO-8601 timestamp.
    Date,
    /// User-converted value.
    Custom,
    /// `{…}` parsed through a [`crate::JsonContract`].
    Class,
    /// `[…]` of one element shape.
    Array,
    /// Array whose length is declared by a sibling member.
    SizedArray,
    /// `{…}` of key-value pairs.
    KeyValue,
    /// `[{"key":…,"value":…},…]` of key-value pairs.
    KeyValueArray,
    /// Untagged variant.
    Variant,
    /// Variant selected by a tag member in the enclosing class.
    VariantTagged,
    /// Variant selected by a tag member inside the value itself.
    VariantIntrusive,
    /// `[…]` parsed through a [`crate::TupleContract`].
    Tuple,
    /// The raw text of an arbitrary value.
    Unknown,
}

/// The five base kinds a JSON value can present as, keyed off its first
/// significant byte. Untagged variants dispatch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    /// `{`
    Class,
    /// `[`
    Array,
    /// `t` or `f`
    Bool,
    /// `"`
    String,
    /// A digit or sign.
    Number,
}

/// One member shape: how a value of this shape is parsed and serialized.
///
/// `'de` is the lifetime of the input buffer; borrowed shapes such as
/// [`RawText`] tie their `Value` to it.
pub trait JsonMember<'de> {
    /// The materialized type.
    type Value;

    /// Expected-kind tag.
    const KIND: MemberKind;

    /// Base kind this shape presents as, for untagged variant dispatch.
    const BASE_KIND: BaseKind;

    /// Whether an absent or `null` value is accepted.
    const NULLABLE: bool = false;

    /// Whether parsing this shape rewinds within the enclosing class
    /// (tagged variants, sized arrays). Contracts containing such a member
    /// must set [`crate::JsonContract::NEEDS_CLASS_POSITIONS`].
    const MUST_BE_CLASS_MEMBER: bool = false;

    /// Parse a value from the live cursor.
    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value>;

    /// Parse from a range whose bounds were already established by the
    /// skipper, so redundant end-of-value checks can be elided. String
    /// ranges arrive with their quotes trimmed.
    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        Self::parse(ps)
    }

    /// Produce the value for a member that is absent from its class.
    fn parse_missing<P: ParsePolicy>(ps: &ParseState<'de, P>) -> Result<Self::Value> {
        Err(ps.error(ErrorKind::MissingMember))
    }

    /// Write the value as JSON text.
    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError>;
}

/// Parse a shape, selecting the known-bounds entry when the caller already
/// skipped the value. Useful inside variant alternative implementations.
pub fn parse_shape<'de, M: JsonMember<'de>, P: ParsePolicy>(
    ps: &mut ParseState<'de, P>,
    known_bounds: bool,
) -> Result<M::Value> {
    if known_bounds {
        M::parse_known(ps)
    } else {
        M::parse(ps)
    }
}

pub(crate) fn as_utf8<'de, P: ParsePolicy>(ps: &ParseState<'de, P>) -> Result<&'de str> {
    core::str::from_utf8(ps.data())
        .map_err(|e| Error::new(ErrorKind::InvalidUtf8, ps.offset() + e.valid_up_to()))
}

fn decode_text<'de, P: ParsePolicy>(ps: &ParseState<'de, P>) -> Result<Cow<'de, str>> {
    string::decode_string(ps.data(), ps.offset(), P::EIGHT_BIT, P::CHECKED)
}

// --- numbers -----------------------------------------------------------------

/// Floating-point member. `ALLOW_NAN`/`ALLOW_INF` accept the relaxed
/// `NaN`/`Infinity` literals, bare or quoted.
pub struct Real<T = f64, const ALLOW_NAN: bool = false, const ALLOW_INF: bool = false>(
    PhantomData<T>,
);

/// Floating-point member accepting both `NaN` and `Infinity`.
pub type LenientReal<T = f64> = Real<T, true, true>;

impl<'de, T: JsonFloat, const ALLOW_NAN: bool, const ALLOW_INF: bool> JsonMember<'de>
    for Real<T, ALLOW_NAN, ALLOW_INF>
{
    type Value = T;
    const KIND: MemberKind = MemberKind::Real;
    const BASE_KIND: BaseKind = BaseKind::Number;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_real_value(ps, Quoting::Never, ALLOW_NAN, ALLOW_INF, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_real_value(ps, Quoting::Never, ALLOW_NAN, ALLOW_INF, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        value.write_json(out.writer());
        Ok(())
    }
}

/// Signed integer member. `RANGE_CHECK` enables overflow detection during
/// magnitude accumulation.
pub struct Signed<T, const RANGE_CHECK: bool = true>(PhantomData<T>);

impl<'de, T: JsonInteger, const RANGE_CHECK: bool> JsonMember<'de> for Signed<T, RANGE_CHECK> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Signed;
    const BASE_KIND: BaseKind = BaseKind::Number;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Never, RANGE_CHECK, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Never, RANGE_CHECK, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        value.write_json(out.writer());
        Ok(())
    }
}

/// Unsigned integer member.
pub struct Unsigned<T, const RANGE_CHECK: bool = true>(PhantomData<T>);

impl<'de, T: JsonInteger, const RANGE_CHECK: bool> JsonMember<'de> for Unsigned<T, RANGE_CHECK> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Unsigned;
    const BASE_KIND: BaseKind = BaseKind::Number;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Never, RANGE_CHECK, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Never, RANGE_CHECK, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        value.write_json(out.writer());
        Ok(())
    }
}

// --- booleans ----------------------------------------------------------------

/// `true`/`false` member.
pub struct Boolean;

fn parse_bool_value<P: ParsePolicy>(ps: &mut ParseState<'_, P>, quoting: Quoting) -> Result<bool> {
    let opened = number::skip_quote_for_literal(ps, quoting)?;
    if P::CHECKED && !ps.has_more() {
        return Err(ps.error(ErrorKind::UnexpectedEndOfData));
    }
    let value = if P::CHECKED {
        if ps.starts_with(b"true") {
            ps.remove_prefix(4);
            true
        } else if ps.starts_with(b"false") {
            ps.remove_prefix(5);
            false
        } else {
            return Err(ps.error(ErrorKind::InvalidLiteral));
        }
    } else if ps.front() == b't' {
        ps.remove_prefix(4);
        true
    } else {
        ps.remove_prefix(5);
        false
    };
    number::close_quote(ps, opened)?;
    number::check_end_of_value(ps)?;
    Ok(value)
}

impl<'de> JsonMember<'de> for Boolean {
    type Value = bool;
    const KIND: MemberKind = MemberKind::Bool;
    const BASE_KIND: BaseKind = BaseKind::Bool;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<bool> {
        parse_bool_value(ps, Quoting::Never)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<bool> {
        if !P::CHECKED {
            // The skipper memoized the literal into `counter`.
            return Ok(ps.counter != 0);
        }
        match ps.front() {
            b't' => Ok(true),
            b'f' => Ok(false),
            _ => Err(ps.error(ErrorKind::InvalidLiteral)),
        }
    }

    fn serialize<W: JsonWrite>(
        value: &bool,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.write(if *value { b"true" } else { b"false" });
        Ok(())
    }
}

// --- quoting wrappers --------------------------------------------------------

/// A scalar member that is always enclosed in quotes in the document.
pub struct Quoted<M>(PhantomData<M>);

/// A scalar member that may or may not be enclosed in quotes.
pub struct MaybeQuoted<M>(PhantomData<M>);

impl<'de, T: JsonFloat, const N: bool, const I: bool> JsonMember<'de> for Quoted<Real<T, N, I>> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Real;
    const BASE_KIND: BaseKind = BaseKind::String;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_real_value(ps, Quoting::Always, N, I, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_real_value(ps, Quoting::Always, N, I, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'"');
        value.write_json(out.writer());
        out.put(b'"');
        Ok(())
    }
}

impl<'de, T: JsonFloat, const N: bool, const I: bool> JsonMember<'de>
    for MaybeQuoted<Real<T, N, I>>
{
    type Value = T;
    const KIND: MemberKind = MemberKind::Real;
    const BASE_KIND: BaseKind = BaseKind::Number;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_real_value(ps, Quoting::Maybe, N, I, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_real_value(ps, Quoting::Maybe, N, I, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        value.write_json(out.writer());
        Ok(())
    }
}

impl<'de, T: JsonInteger, const R: bool> JsonMember<'de> for Quoted<Signed<T, R>> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Signed;
    const BASE_KIND: BaseKind = BaseKind::String;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Always, R, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Always, R, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'"');
        value.write_json(out.writer());
        out.put(b'"');
        Ok(())
    }
}

impl<'de, T: JsonInteger, const R: bool> JsonMember<'de> for MaybeQuoted<Signed<T, R>> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Signed;
    const BASE_KIND: BaseKind = BaseKind::Number;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Maybe, R, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Maybe, R, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        value.write_json(out.writer());
        Ok(())
    }
}

impl<'de, T: JsonInteger, const R: bool> JsonMember<'de> for Quoted<Unsigned<T, R>> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Unsigned;
    const BASE_KIND: BaseKind = BaseKind::String;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Always, R, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Always, R, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'"');
        value.write_json(out.writer());
        out.put(b'"');
        Ok(())
    }
}

impl<'de, T: JsonInteger, const R: bool> JsonMember<'de> for MaybeQuoted<Unsigned<T, R>> {
    type Value = T;
    const KIND: MemberKind = MemberKind::Unsigned;
    const BASE_KIND: BaseKind = BaseKind::Number;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Maybe, R, false)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<T> {
        number::parse_int_value(ps, Quoting::Maybe, R, true)
    }

    fn serialize<W: JsonWrite>(
        value: &T,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        value.write_json(out.writer());
        Ok(())
    }
}

impl<'de> JsonMember<'de> for Quoted<Boolean> {
    type Value = bool;
    const KIND: MemberKind = MemberKind::Bool;
    const BASE_KIND: BaseKind = BaseKind::String;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<bool> {
        parse_bool_value(ps, Quoting::Always)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<bool> {
        Boolean::parse_known(ps)
    }

    fn serialize<W: JsonWrite>(
        value: &bool,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.write(if *value { b"\"true\"" } else { b"\"false\"" });
        Ok(())
    }
}

impl<'de> JsonMember<'de> for MaybeQuoted<Boolean> {
    type Value = bool;
    const KIND: MemberKind = MemberKind::Bool;
    const BASE_KIND: BaseKind = BaseKind::Bool;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<bool> {
        parse_bool_value(ps, Quoting::Maybe)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<bool> {
        Boolean::parse_known(ps)
    }

    fn serialize<W: JsonWrite>(
        value: &bool,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        Boolean::serialize(value, out)
    }
}

// --- nullability -------------------------------------------------------------

/// Wrapper accepting `null` or an absent member; produces `Option`.
pub struct Nullable<M>(PhantomData<M>);

impl<'de, M: JsonMember<'de>> JsonMember<'de> for Nullable<M> {
    type Value = Option<M::Value>;
    const KIND: MemberKind = MemberKind::Null;
    const BASE_KIND: BaseKind = M::BASE_KIND;
    const NULLABLE: bool = true;
    const MUST_BE_CLASS_MEMBER: bool = M::MUST_BE_CLASS_MEMBER;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        ps.trim_left();
        if !ps.has_more() || ps.is_at_token_after_value() {
            return Ok(None);
        }
        if P::CHECKED {
            if ps.starts_with(b"null") {
                ps.remove_prefix(4);
                if ps.has_more() && !at_end_of_item(ps.front()) {
                    return Err(ps.error(ErrorKind::InvalidLiteral));
                }
                ps.trim_left();
                return Ok(None);
            }
        } else if ps.front() == b'n' {
            ps.remove_prefix(4);
            ps.trim_left();
            return Ok(None);
        }
        M::parse(ps).map(Some)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        // A skipped `null` leaves an empty range.
        if ps.is_empty() {
            return Ok(None);
        }
        M::parse_known(ps).map(Some)
    }

    fn parse_missing<P: ParsePolicy>(_ps: &ParseState<'de, P>) -> Result<Self::Value> {
        Ok(None)
    }

    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        match value {
            Some(inner) => M::serialize(inner, out),
            None => {
                out.write(b"null");
                Ok(())
            }
        }
    }
}

// --- strings -----------------------------------------------------------------

/// String member decoded into owned text, escapes translated.
pub struct Text;

impl<'de> JsonMember<'de> for Text {
    type Value = String;
    const KIND: MemberKind = MemberKind::StringEscaped;
    const BASE_KIND: BaseKind = BaseKind::String;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<String> {
        ps.trim_left();
        let sub = skip::skip_string(ps)?;
        decode_text(&sub).map(Cow::into_owned)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<String> {
        decode_text(ps).map(Cow::into_owned)
    }

    fn serialize<W: JsonWrite>(
        value: &String,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.write_quoted_str(value);
        Ok(())
    }
}

/// String member returned as a borrowed view between the quotes; escape
/// sequences are left untouched.
pub struct RawText;

impl<'de> JsonMember<'de> for RawText {
    type Value = &'de str;
    const KIND: MemberKind = MemberKind::StringRaw;
    const BASE_KIND: BaseKind = BaseKind::String;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<&'de str> {
        ps.trim_left();
        let sub = skip::skip_string(ps)?;
        as_utf8(&sub)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<&'de str> {
        as_utf8(ps)
    }

    fn serialize<W: JsonWrite>(
        value: &&'de str,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        // The view is raw document text; write it back verbatim.
        out.put(b'"');
        out.write(value.as_bytes());
        out.put(b'"');
        Ok(())
    }
}

// --- dates -------------------------------------------------------------------

/// ISO-8601 timestamp member.
pub struct Iso8601;

fn parse_date<'de, P: ParsePolicy>(ps: &ParseState<'de, P>) -> Result<DateTime<Utc>> {
    let text = as_utf8(ps)?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::new(ErrorKind::InvalidString, ps.offset()))
}

impl<'de> JsonMember<'de> for Iso8601 {
    type Value = DateTime<Utc>;
    const KIND: MemberKind = MemberKind::Date;
    const BASE_KIND: BaseKind = BaseKind::String;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        ps.trim_left();
        let sub = skip::skip_string(ps)?;
        parse_date(&sub)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        parse_date(ps)
    }

    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.put(b'"');
        out.write(
            value
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .as_bytes(),
        );
        out.put(b'"');
        Ok(())
    }
}

// --- custom conversions ------------------------------------------------------

/// How the text handed to a [`JsonConverter`] is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFlavor {
    /// Scan a quoted string; the converter receives the content between
    /// the quotes.
    String,
    /// Scan up to the next end-of-item byte.
    Literal,
    /// A quoted string including its quotes, or any other scalar value.
    Any,
}

/// User-supplied conversion between raw JSON text and a value.
pub trait JsonConverter {
    /// The materialized type.
    type Value;

    /// How the raw text is scanned before conversion.
    const FLAVOR: CustomFlavor = CustomFlavor::String;

    /// Convert scanned text into a value.
    fn from_json(text: &str) -> core::result::Result<Self::Value, &'static str>;

    /// Render the value as literal JSON text, including quotes when the
    /// flavor scans them.
    fn to_json(value: &Self::Value) -> String;
}

/// Member whose value goes through a [`JsonConverter`].
pub struct Custom<C>(PhantomData<C>);

impl<'de, C: JsonConverter> JsonMember<'de> for Custom<C> {
    type Value = C::Value;
    const KIND: MemberKind = MemberKind::Custom;
    const BASE_KIND: BaseKind = match C::FLAVOR {
        CustomFlavor::String | CustomFlavor::Any => BaseKind::String,
        CustomFlavor::Literal => BaseKind::Number,
    };

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        ps.trim_left();
        let sub = match C::FLAVOR {
            CustomFlavor::String => skip::skip_string(ps)?,
            CustomFlavor::Literal => skip::skip_literal(ps)?,
            CustomFlavor::Any => {
                if P::CHECKED && !ps.has_more() {
                    return Err(ps.error(ErrorKind::UnexpectedEndOfData));
                }
                if ps.front() == b'"' {
                    let mut sub = skip::skip_string(ps)?;
                    sub.first -= 1;
                    sub.last += 1;
                    sub
                } else {
                    skip::skip_value(ps)?
                }
            }
        };
        convert::<C, P>(&sub)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<Self::Value> {
        let mut sub = *ps;
        if matches!(C::FLAVOR, CustomFlavor::Any) && sub.prev_byte() == Some(b'"') {
            sub.first -= 1;
            sub.last += 1;
        }
        convert::<C, P>(&sub)
    }

    fn serialize<W: JsonWrite>(
        value: &Self::Value,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.write(C::to_json(value).as_bytes());
        Ok(())
    }
}

fn convert<'de, C: JsonConverter, P: ParsePolicy>(
    sub: &ParseState<'de, P>,
) -> Result<C::Value> {
    if P::CHECKED && sub.has_more() && matches!(sub.front(), b'[' | b'{') {
        return Err(sub.error(ErrorKind::InvalidStartOfValue));
    }
    let text = as_utf8(sub)?;
    C::from_json(text).map_err(|_| sub.error(ErrorKind::InvalidString))
}

// --- raw capture -------------------------------------------------------------

/// Member capturing the raw text of an arbitrary value without
/// interpreting it.
pub struct Unknown;

impl<'de> JsonMember<'de> for Unknown {
    type Value = &'de str;
    const KIND: MemberKind = MemberKind::Unknown;
    const BASE_KIND: BaseKind = BaseKind::Class;

    fn parse<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<&'de str> {
        ps.trim_left();
        let start = ps.offset();
        skip::skip_value(ps)?;
        let sub = ps.subrange(start, ps.offset());
        as_utf8(&sub)
    }

    fn parse_known<P: ParsePolicy>(ps: &mut ParseState<'de, P>) -> Result<&'de str> {
        let mut sub = *ps;
        if sub.prev_byte() == Some(b'"') {
            sub.first -= 1;
            sub.last += 1;
        }
        as_utf8(&sub)
    }

    fn serialize<W: JsonWrite>(
        value: &&'de str,
        out: &mut SerializationPolicy<'_, W>,
    ) -> core::result::Result<(), SerializeError> {
        out.write(value.as_bytes());
        Ok(())
    }
}
