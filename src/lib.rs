#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(not(feature = "alloc"))]
compile_error!("feature `alloc` is required");

mod array;
mod class;
mod error;
mod keyvalue;
mod member;
mod number;
mod options;
mod parse_state;
mod serialize;
mod skip;
mod string;
mod tuple;
mod variant;

pub use array::{DependentName, List, SizedArray};
pub use class::{Class, ClassParser, ClassSerializer, JsonContract};
pub use error::{Error, ErrorKind, Result};
pub use keyvalue::{DefaultKvNames, KeyValue, KeyValueArray, KvNames};
pub use member::{
    parse_shape, BaseKind, Boolean, Custom, CustomFlavor, Iso8601, JsonConverter, JsonMember,
    LenientReal, MaybeQuoted, MemberKind, Nullable, Quoted, RawText, Real, Signed, Text, Unknown,
    Unsigned,
};
pub use number::{JsonFloat, JsonInteger};
pub use options::{
    CommentPolicy, CppCommentsPolicy, DefaultPolicy, EightBitMode, ExecMode, HashCommentsPolicy,
    MinifiedPolicy, ParsePolicy, ScalarPolicy, SevenBitRawPolicy, SimdPolicy, UncheckedPolicy,
    UncheckedSimdPolicy, ZeroTerminatedPolicy,
};
pub use parse_state::ParseState;
pub use serialize::{
    IndentationType, JsonWrite, NewLineDelimiter, RestrictedStringOutput, SerializationFormat,
    SerializationPolicy, SerializeError, SerializeOptions,
};
#[cfg(feature = "std")]
pub use serialize::StdWriteAdapter;
pub use tuple::{Tuple, TupleContract, TupleParser, TupleSerializer};
pub use variant::{
    TaggedAlternatives, Variant, VariantAlternatives, VariantIntrusive, VariantTagged,
};

use alloc::string::String;
use alloc::vec::Vec;

/// Parse a document as shape `M` with the default policy.
///
/// Contract roots are `Class<T>` or `Tuple<T>`; any other shape works as
/// a document root too.
pub fn from_str<'de, M: JsonMember<'de>>(json: &'de str) -> Result<M::Value> {
    from_slice_with::<M, DefaultPolicy>(json.as_bytes())
}

/// Parse a document as shape `M` under policy `P`.
pub fn from_str_with<'de, M: JsonMember<'de>, P: ParsePolicy>(json: &'de str) -> Result<M::Value> {
    from_slice_with::<M, P>(json.as_bytes())
}

/// Parse a byte slice as shape `M` with the default policy.
pub fn from_slice<'de, M: JsonMember<'de>>(json: &'de [u8]) -> Result<M::Value> {
    from_slice_with::<M, DefaultPolicy>(json)
}

/// Parse a byte slice as shape `M` under policy `P`.
pub fn from_slice_with<'de, M: JsonMember<'de>, P: ParsePolicy>(
    json: &'de [u8],
) -> Result<M::Value> {
    let mut ps = ParseState::<P>::new(json);
    ps.trim_left();
    M::parse(&mut ps)
}

/// Parse a top-level array of `E` elements into `C`.
pub fn array_from_str<'de, E, C>(json: &'de str) -> Result<C>
where
    E: JsonMember<'de>,
    C: FromIterator<E::Value>,
    for<'a> &'a C: IntoIterator<Item = &'a E::Value>,
{
    from_str::<List<E, C>>(json)
}

/// Parse a top-level array of `E` elements into `C` from a byte slice.
pub fn array_from_slice<'de, E, C>(json: &'de [u8]) -> Result<C>
where
    E: JsonMember<'de>,
    C: FromIterator<E::Value>,
    for<'a> &'a C: IntoIterator<Item = &'a E::Value>,
{
    from_slice::<List<E, C>>(json)
}

/// Serialize a value of shape `M` to a minified string.
pub fn to_string<'v, M: JsonMember<'v>>(value: &M::Value) -> String {
    to_string_with_options::<M>(value, &SerializeOptions::default())
}

/// Serialize a value of shape `M` to a pretty-printed string.
pub fn to_string_pretty<'v, M: JsonMember<'v>>(value: &M::Value) -> String {
    to_string_with_options::<M>(value, &SerializeOptions::default().pretty())
}

/// Serialize a value of shape `M` to a string with custom options.
pub fn to_string_with_options<'v, M: JsonMember<'v>>(
    value: &M::Value,
    options: &SerializeOptions,
) -> String {
    let mut buf = Vec::new();
    to_writer_with_options::<M, _>(value, &mut buf, options).unwrap();
    String::from_utf8(buf).unwrap()
}

/// Serialize a value of shape `M` into a [`JsonWrite`] sink.
pub fn to_writer<'v, M: JsonMember<'v>, W: JsonWrite>(
    value: &M::Value,
    writer: &mut W,
) -> core::result::Result<(), SerializeError> {
    to_writer_with_options::<M, W>(value, writer, &SerializeOptions::default())
}

/// Serialize a value of shape `M` into a [`JsonWrite`] sink with custom
/// options.
pub fn to_writer_with_options<'v, M: JsonMember<'v>, W: JsonWrite>(
    value: &M::Value,
    writer: &mut W,
    options: &SerializeOptions,
) -> core::result::Result<(), SerializeError> {
    let mut policy = SerializationPolicy::new(writer, options.clone());
    M::serialize(value, &mut policy)
}

/// Serialize a value of shape `M` into a `std::io::Write` writer.
#[cfg(feature = "std")]
pub fn to_writer_std<'v, M: JsonMember<'v>, W: std::io::Write>(
    writer: W,
    value: &M::Value,
) -> std::io::Result<()> {
    to_writer_std_with_options::<M, W>(writer, value, &SerializeOptions::default())
}

/// Serialize a value of shape `M` into a `std::io::Write` writer, pretty.
#[cfg(feature = "std")]
pub fn to_writer_std_pretty<'v, M: JsonMember<'v>, W: std::io::Write>(
    writer: W,
    value: &M::Value,
) -> std::io::Result<()> {
    to_writer_std_with_options::<M, W>(writer, value, &SerializeOptions::default().pretty())
}

/// Serialize a value of shape `M` into a `std::io::Write` writer with
/// custom options.
#[cfg(feature = "std")]
pub fn to_writer_std_with_options<'v, M: JsonMember<'v>, W: std::io::Write>(
    writer: W,
    value: &M::Value,
    options: &SerializeOptions,
) -> std::io::Result<()> {
    let mut adapter = StdWriteAdapter::new(writer);
    let _ = to_writer_with_options::<M, _>(value, &mut adapter, options);
    adapter.into_result()
}
